//! Budget alert threshold detection and alert inbox.
//!
//! On every dashboard load the current month's spend is compared with the
//! overall budget and each category cap. Crossing 50, 80 or 100 percent
//! inserts one alert row per threshold; rows are unique per user, category
//! (or total), threshold and month, so re-running never duplicates them.

use crate::{
    core::{budget, period::Month, profile, stats},
    entities::{
        AlertType, BudgetAlert, BudgetAlertColumn, BudgetAlertModel, CategoryModel,
        budget_alert,
    },
    errors::Result,
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Percentages of a budget that raise an alert
pub const THRESHOLDS: [i32; 3] = [50, 80, 100];
/// How far back [`unread_alerts`] looks
pub const ALERT_WINDOW_DAYS: i64 = 7;

/// Inserts one alert per crossed threshold that has no row for this period.
async fn raise_crossed<C>(
    conn: &C,
    user_id: &str,
    period: &str,
    category_id: Option<i64>,
    spent: f64,
    budget_amount: f64,
) -> Result<Vec<BudgetAlertModel>>
where
    C: ConnectionTrait,
{
    let percentage = spent / budget_amount * 100.0;
    let alert_type = if category_id.is_some() {
        AlertType::Category
    } else {
        AlertType::Total
    };

    let mut raised = Vec::new();
    for threshold in THRESHOLDS {
        if percentage < f64::from(threshold) {
            break;
        }

        let category_filter = match category_id {
            Some(id) => BudgetAlertColumn::CategoryId.eq(id),
            None => BudgetAlertColumn::CategoryId.is_null(),
        };
        let exists = BudgetAlert::find()
            .filter(BudgetAlertColumn::UserId.eq(user_id))
            .filter(BudgetAlertColumn::AlertType.eq(alert_type))
            .filter(category_filter)
            .filter(BudgetAlertColumn::Percentage.eq(threshold))
            .filter(BudgetAlertColumn::Period.eq(period))
            .one(conn)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let alert = budget_alert::ActiveModel {
            user_id: Set(user_id.to_string()),
            alert_type: Set(alert_type),
            category_id: Set(category_id),
            percentage: Set(threshold),
            amount_used: Set(spent),
            budget_amount: Set(budget_amount),
            period: Set(period.to_string()),
            is_read: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        debug!(user_id, threshold, ?category_id, "Budget alert raised");
        raised.push(alert);
    }

    Ok(raised)
}

/// Checks the month containing `today` against the overall budget and every
/// category cap, inserting alerts for newly crossed thresholds.
///
/// Does nothing when the profile has no monthly budget. Caps of zero or less
/// are ignored. Returns the alerts created by this call.
#[instrument(skip(db))]
pub async fn check_budget_alerts(
    db: &DatabaseConnection,
    user_id: &str,
    today: NaiveDate,
) -> Result<Vec<BudgetAlertModel>> {
    let profile = profile::require_profile(db, user_id).await?;
    if profile.monthly_budget <= 0.0 {
        return Ok(Vec::new());
    }

    let month = Month::containing(today);
    let period = month.to_string();
    let txn = db.begin().await?;

    let totals = stats::month_totals(&txn, user_id, month).await?;
    let mut raised = raise_crossed(
        &txn,
        user_id,
        &period,
        None,
        totals.expense,
        profile.monthly_budget,
    )
    .await?;

    let spent: HashMap<i64, f64> = stats::expense_by_category(&txn, user_id, month)
        .await?
        .into_iter()
        .filter_map(|(id, amount)| id.map(|id| (id, amount)))
        .collect();

    for (cap, category) in budget::list_category_budgets(&txn, user_id).await? {
        if cap.amount <= 0.0 {
            continue;
        }
        let category_spent = spent.get(&category.id).copied().unwrap_or_default();
        raised.extend(
            raise_crossed(
                &txn,
                user_id,
                &period,
                Some(category.id),
                category_spent,
                cap.amount,
            )
            .await?,
        );
    }

    txn.commit().await?;

    if !raised.is_empty() {
        info!(user_id, count = raised.len(), %period, "New budget alerts");
    }
    Ok(raised)
}

/// Unread alerts from the last [`ALERT_WINDOW_DAYS`] days, newest first.
pub async fn unread_alerts(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<(BudgetAlertModel, Option<CategoryModel>)>> {
    let since = Utc::now() - Duration::days(ALERT_WINDOW_DAYS);

    BudgetAlert::find()
        .find_also_related(crate::entities::Category)
        .filter(BudgetAlertColumn::UserId.eq(user_id))
        .filter(BudgetAlertColumn::IsRead.eq(false))
        .filter(BudgetAlertColumn::CreatedAt.gte(since))
        .order_by_desc(BudgetAlertColumn::CreatedAt)
        .order_by_desc(BudgetAlertColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks one of the user's alerts read. Returns whether a row changed.
pub async fn mark_read(db: &DatabaseConnection, user_id: &str, alert_id: i64) -> Result<bool> {
    let result = BudgetAlert::update_many()
        .col_expr(BudgetAlertColumn::IsRead, Expr::value(true))
        .filter(BudgetAlertColumn::Id.eq(alert_id))
        .filter(BudgetAlertColumn::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Marks every unread alert of the user read. Returns how many changed.
pub async fn mark_all_read(db: &DatabaseConnection, user_id: &str) -> Result<u64> {
    let result = BudgetAlert::update_many()
        .col_expr(BudgetAlertColumn::IsRead, Expr::value(true))
        .filter(BudgetAlertColumn::UserId.eq(user_id))
        .filter(BudgetAlertColumn::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
