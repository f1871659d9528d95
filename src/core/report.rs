//! Report generation business logic.
//!
//! This module assembles the dashboard and provides the text formatting
//! helpers the bot uses in place of charts: currency amounts, progress bars,
//! bar rows and one-line transaction and alert summaries. All functions are
//! framework-agnostic and return plain data or strings.

use crate::{
    core::{
        alert,
        budget::{self, BudgetProgress},
        gamification::{LevelProgress, StreakTier},
        period::Month,
        profile,
        stats::{self, CategoryExpense, MonthlySummary},
        transaction,
    },
    entities::{
        AlertType, BudgetAlertModel, CategoryModel, EntryKind, ProfileModel, TransactionModel,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Everything shown on the dashboard.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// The user's profile
    pub profile: ProfileModel,
    /// Position inside the current level
    pub level: LevelProgress,
    /// Flavor tier of the current streak
    pub streak_tier: StreakTier,
    /// Current month totals
    pub summary: MonthlySummary,
    /// Spending against the monthly budget
    pub budget: BudgetProgress,
    /// Current month expense per category, largest first
    pub category_expenses: Vec<CategoryExpense>,
    /// Most recent transactions
    pub recent: Vec<(TransactionModel, Option<CategoryModel>)>,
    /// Unread alerts from the last week, including any raised by this load
    pub alerts: Vec<(BudgetAlertModel, Option<CategoryModel>)>,
}

/// Builds the dashboard for the month containing `today`.
///
/// Loading the dashboard also runs the budget alert detector, so alerts for
/// newly crossed thresholds show up immediately.
///
/// # Arguments
/// * `db` - Database connection
/// * `user_id` - Discord user id
/// * `today` - Reference day; selects the month and the alert period
pub async fn generate_dashboard(
    db: &DatabaseConnection,
    user_id: &str,
    today: NaiveDate,
) -> Result<Dashboard> {
    let month = Month::containing(today);

    alert::check_budget_alerts(db, user_id, today).await?;

    let profile = profile::require_profile(db, user_id).await?;
    let summary = stats::monthly_summary(db, user_id, month).await?;
    let budget = budget::budget_progress(db, user_id, month).await?;
    let category_expenses = stats::category_expenses(db, user_id, month).await?;
    let recent = transaction::recent_transactions(db, user_id, None).await?;
    let alerts = alert::unread_alerts(db, user_id).await?;

    Ok(Dashboard {
        level: LevelProgress::from_exp(profile.total_exp),
        streak_tier: StreakTier::for_days(profile.current_streak),
        profile,
        summary,
        budget,
        category_expenses,
        recent,
        alerts,
    })
}

/// Formats an amount as whole won with thousands separators, e.g. `₩1,234,500`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-₩{grouped}")
    } else {
        format!("₩{grouped}")
    }
}

/// Formats an amount with a sign for its direction: `+₩5,000` or `-₩5,000`.
#[must_use]
pub fn format_signed_amount(kind: EntryKind, amount: f64) -> String {
    match kind {
        EntryKind::Income => format!("+{}", format_currency(amount)),
        EntryKind::Expense => format!("-{}", format_currency(amount)),
    }
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
///
/// # Arguments
/// * `progress_percent` - Progress percentage; the bar is clamped to 0-100
/// * `bar_length` - Length of the progress bar in characters (default 10)
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = progress_percent.clamp(0.0, 100.0);

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = ((clamped / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {progress_percent:.1}%",
        "█".repeat(filled),
        "░".repeat(empty)
    )
}

/// One row of a text bar chart: `Mon  ██████░░░░  ₩20,000`.
///
/// The bar is scaled so that `max` fills `width` cells.
#[must_use]
pub fn format_bar_row(label: &str, amount: f64, max: f64, width: usize) -> String {
    let ratio = if max > 0.0 {
        (amount / max).clamp(0.0, 1.0)
    } else {
        0.0
    };

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = (ratio * width as f64).round() as usize;

    format!(
        "{label:<10} {}{} {}",
        "█".repeat(filled),
        "░".repeat(width.saturating_sub(filled)),
        format_currency(amount)
    )
}

/// Generates a summary line for a transaction.
///
/// Formatted like `#12 2024-03-01 -₩8,000 · Food · Lunch (+5 exp)`.
#[must_use]
pub fn format_transaction_line(tx: &TransactionModel, category: Option<&CategoryModel>) -> String {
    let category = category.map_or(stats::UNCATEGORIZED, |c| c.name.as_str());
    let description = tx
        .description
        .as_deref()
        .map(|d| format!(" · {d}"))
        .unwrap_or_default();

    format!(
        "#{} {} {} · {category}{description} (+{} exp)",
        tx.id,
        tx.date.format("%Y-%m-%d"),
        format_signed_amount(tx.kind, tx.amount),
        tx.exp_gained
    )
}

/// Describes a budget alert in one line.
#[must_use]
pub fn format_alert(alert: &BudgetAlertModel, category: Option<&CategoryModel>) -> String {
    let icon = if alert.percentage >= 100 { "🚨" } else { "⚠️" };
    let subject = match (alert.alert_type, category) {
        (AlertType::Category, Some(c)) => format!("{} spending", c.name),
        (AlertType::Category, None) => "Category spending".to_string(),
        (AlertType::Total, _) => "Monthly spending".to_string(),
    };

    format!(
        "{icon} {subject} reached {}% of its budget ({} / {})",
        alert.percentage,
        format_currency(alert.amount_used),
        format_currency(alert.budget_amount)
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Utc;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "₩0");
        assert_eq!(format_currency(999.0), "₩999");
        assert_eq!(format_currency(1000.0), "₩1,000");
        assert_eq!(format_currency(1_234_567.4), "₩1,234,567");
        assert_eq!(format_currency(-50_000.0), "-₩50,000");
    }

    #[test]
    fn test_format_signed_amount() {
        assert_eq!(format_signed_amount(EntryKind::Income, 5000.0), "+₩5,000");
        assert_eq!(format_signed_amount(EntryKind::Expense, 5000.0), "-₩5,000");
    }

    #[test]
    fn test_format_progress_bar() {
        assert_eq!(format_progress_bar(100.0, Some(10)), "[██████████] 100.0%");
        assert_eq!(format_progress_bar(50.0, Some(10)), "[█████░░░░░] 50.0%");
        assert_eq!(format_progress_bar(0.0, None), "[░░░░░░░░░░] 0.0%");
        // Overspending fills the bar but keeps the real number
        assert_eq!(format_progress_bar(150.0, Some(4)), "[████] 150.0%");
    }

    #[test]
    fn test_format_bar_row() {
        assert_eq!(format_bar_row("Mon", 50.0, 100.0, 4), "Mon        ██░░ ₩50");
        assert_eq!(format_bar_row("Tue", 10.0, 0.0, 2), "Tue        ░░ ₩10");
    }

    #[test]
    fn test_format_alert() {
        let alert = BudgetAlertModel {
            id: 1,
            user_id: "u".to_string(),
            alert_type: AlertType::Total,
            category_id: None,
            percentage: 80,
            amount_used: 1_600_000.0,
            budget_amount: 2_000_000.0,
            period: "2024-03".to_string(),
            is_read: false,
            created_at: Utc::now(),
        };
        assert_eq!(
            format_alert(&alert, None),
            "⚠️ Monthly spending reached 80% of its budget (₩1,600,000 / ₩2,000,000)"
        );
    }

    #[tokio::test]
    async fn test_format_transaction_line() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Meals", EntryKind::Expense).await?;
        let tx = insert_expense(
            &db,
            &profile.id,
            Some(food.id),
            8000.0,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
        .await?;

        let line = format_transaction_line(&tx, Some(&food));
        assert_eq!(
            line,
            format!("#{} 2024-03-01 -₩8,000 · Meals (+8 exp)", tx.id)
        );

        // Small amounts still earn the minimum
        let small = insert_expense(
            &db,
            &profile.id,
            None,
            4000.0,
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        )
        .await?;
        assert_eq!(
            format_transaction_line(&small, None),
            format!("#{} 2024-03-02 -₩4,000 · Uncategorized (+5 exp)", small.id)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_dashboard() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Meals", EntryKind::Expense).await?;
        budget::set_budget_goals(&db, &profile.id, 100_000.0, None).await?;

        for _ in 0..3 {
            create_test_transaction(&db, &profile.id, food.id, 20_000.0).await?;
        }

        let today = Utc::now().date_naive();
        let dashboard = generate_dashboard(&db, &profile.id, today).await?;
        assert_eq!(dashboard.summary.expense, 60_000.0);
        assert_eq!(dashboard.summary.count, 3);
        assert_eq!(dashboard.budget.percentage, 60.0);
        assert_eq!(dashboard.category_expenses.len(), 1);
        assert_eq!(dashboard.recent.len(), 3);
        assert_eq!(dashboard.profile.coins, 30);
        assert_eq!(dashboard.level.level, 1);
        // The 50% alert was raised by this load
        assert_eq!(dashboard.alerts.len(), 1);
        assert_eq!(dashboard.alerts[0].0.percentage, 50);

        Ok(())
    }
}
