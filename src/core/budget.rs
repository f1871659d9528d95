//! Monthly budget, saving goal and per-category caps.
//!
//! The overall budget and saving goal live on the profile. Category caps are
//! rows in `category_budgets`, one per user and category, always monthly.

use crate::{
    core::{category, period::Month, profile, stats},
    entities::{
        CategoryBudget, CategoryBudgetColumn, CategoryBudgetModel, CategoryModel, EntryKind,
        ProfileModel, category_budget, profile as profile_entity,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;
use tracing::info;

/// How close spending is to a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// At most 70% used
    OnTrack,
    /// Between 70% and 90% used
    Caution,
    /// More than 90% used
    Over,
}

impl BudgetStatus {
    /// Status for a usage percentage.
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage <= 70.0 {
            Self::OnTrack
        } else if percentage <= 90.0 {
            Self::Caution
        } else {
            Self::Over
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OnTrack => "On track",
            Self::Caution => "Caution",
            Self::Over => "Over budget",
        }
    }
}

/// Progress toward the monthly saving goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavingProgress {
    /// Saving goal
    pub goal: f64,
    /// Income minus expense this month
    pub saved: f64,
    /// `saved` as a percentage of `goal`, never negative
    pub percentage: f64,
}

/// Spending against the overall monthly budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    /// Measured month
    pub month: Month,
    /// Monthly budget, 0 when none is set
    pub budget: f64,
    /// Expense this month
    pub spent: f64,
    /// Budget minus spent; negative when over
    pub remaining: f64,
    /// Spent as a percentage of the budget, 0 without a budget
    pub percentage: f64,
    /// Traffic-light status of `percentage`
    pub status: BudgetStatus,
    /// Saving goal progress, when a goal is set
    pub saving: Option<SavingProgress>,
}

/// Spending against one category cap.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBudgetProgress {
    /// Capped category
    pub category: CategoryModel,
    /// Cap amount
    pub budget: f64,
    /// Expense in the category this month
    pub spent: f64,
    /// Cap minus spent; negative when over
    pub remaining: f64,
    /// Spent as a percentage of the cap
    pub percentage: f64,
    /// Traffic-light status of `percentage`
    pub status: BudgetStatus,
}

/// Every category cap plus what is left of the monthly budget.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBudgetOverview {
    /// Progress per capped category, in category name order
    pub items: Vec<CategoryBudgetProgress>,
    /// Sum of all caps
    pub allocated: f64,
    /// Monthly budget minus `allocated`
    pub unallocated: f64,
}

fn percentage_of(spent: f64, budget: f64) -> f64 {
    if budget > 0.0 {
        spent / budget * 100.0
    } else {
        0.0
    }
}

fn validate_budget_amount(field: &'static str, amount: f64) -> Result<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(Error::Validation {
            field,
            message: format!("{amount} must be a non-negative number"),
        })
    }
}

/// Sets the monthly budget and saving goal. A zero saving goal clears it.
pub async fn set_budget_goals(
    db: &DatabaseConnection,
    user_id: &str,
    monthly_budget: f64,
    saving_goal: Option<f64>,
) -> Result<ProfileModel> {
    validate_budget_amount("monthly_budget", monthly_budget)?;
    if let Some(goal) = saving_goal {
        validate_budget_amount("saving_goal", goal)?;
    }

    let existing = profile::require_profile(db, user_id).await?;
    let mut active: profile_entity::ActiveModel = existing.into();
    active.monthly_budget = Set(monthly_budget);
    active.saving_goal = Set(saving_goal.filter(|g| *g > 0.0));
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    info!(user_id, monthly_budget, ?saving_goal, "Budget goals updated");
    Ok(updated)
}

/// Sets or clears the monthly cap of one of the user's expense categories.
///
/// An amount of zero deletes the cap and returns `None`.
pub async fn set_category_budget(
    db: &DatabaseConnection,
    user_id: &str,
    category_id: i64,
    amount: f64,
) -> Result<Option<CategoryBudgetModel>> {
    validate_budget_amount("amount", amount)?;

    let category = category::get_category(db, user_id, category_id).await?;
    if category.kind != EntryKind::Expense {
        return Err(Error::Validation {
            field: "category",
            message: format!("'{}' is not an expense category", category.name),
        });
    }

    let existing = CategoryBudget::find()
        .filter(CategoryBudgetColumn::UserId.eq(user_id))
        .filter(CategoryBudgetColumn::CategoryId.eq(category_id))
        .filter(CategoryBudgetColumn::Period.eq(category_budget::MONTHLY_PERIOD))
        .one(db)
        .await?;

    let now = Utc::now();
    match existing {
        Some(row) if amount == 0.0 => {
            row.delete(db).await?;
            info!(user_id, category = %category.name, "Category budget removed");
            Ok(None)
        }
        None if amount == 0.0 => Ok(None),
        Some(row) => {
            let mut active: category_budget::ActiveModel = row.into();
            active.amount = Set(amount);
            active.updated_at = Set(now);
            Ok(Some(active.update(db).await?))
        }
        None => {
            let model = category_budget::ActiveModel {
                user_id: Set(user_id.to_string()),
                category_id: Set(category_id),
                amount: Set(amount),
                period: Set(category_budget::MONTHLY_PERIOD.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            Ok(Some(model.insert(db).await?))
        }
    }
}

/// All of the user's monthly category caps with their categories.
pub async fn list_category_budgets<C>(
    conn: &C,
    user_id: &str,
) -> Result<Vec<(CategoryBudgetModel, CategoryModel)>>
where
    C: ConnectionTrait,
{
    let rows = CategoryBudget::find()
        .find_also_related(crate::entities::Category)
        .filter(CategoryBudgetColumn::UserId.eq(user_id))
        .filter(CategoryBudgetColumn::Period.eq(category_budget::MONTHLY_PERIOD))
        .order_by_asc(CategoryBudgetColumn::CategoryId)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(budget, category)| category.map(|c| (budget, c)))
        .collect())
}

/// Spending and saving progress against the profile's goals for `month`.
pub async fn budget_progress(
    db: &DatabaseConnection,
    user_id: &str,
    month: Month,
) -> Result<BudgetProgress> {
    let profile = profile::require_profile(db, user_id).await?;
    let totals = stats::month_totals(db, user_id, month).await?;

    let budget = profile.monthly_budget.max(0.0);
    let percentage = percentage_of(totals.expense, budget);
    let saving = profile.saving_goal.filter(|g| *g > 0.0).map(|goal| {
        let saved = totals.net();
        SavingProgress {
            goal,
            saved,
            percentage: percentage_of(saved, goal).max(0.0),
        }
    });

    Ok(BudgetProgress {
        month,
        budget,
        spent: totals.expense,
        remaining: budget - totals.expense,
        percentage,
        status: BudgetStatus::from_percentage(percentage),
        saving,
    })
}

/// Per-category cap progress for `month` and the unallocated budget.
pub async fn category_budget_progress(
    db: &DatabaseConnection,
    user_id: &str,
    month: Month,
) -> Result<CategoryBudgetOverview> {
    let profile = profile::require_profile(db, user_id).await?;
    let spent: HashMap<i64, f64> = stats::expense_by_category(db, user_id, month)
        .await?
        .into_iter()
        .filter_map(|(id, amount)| id.map(|id| (id, amount)))
        .collect();

    let mut items: Vec<CategoryBudgetProgress> = list_category_budgets(db, user_id)
        .await?
        .into_iter()
        .map(|(budget, category)| {
            let spent = spent.get(&category.id).copied().unwrap_or_default();
            let percentage = percentage_of(spent, budget.amount);
            CategoryBudgetProgress {
                category,
                budget: budget.amount,
                spent,
                remaining: budget.amount - spent,
                percentage,
                status: BudgetStatus::from_percentage(percentage),
            }
        })
        .collect();
    items.sort_by(|a, b| a.category.name.cmp(&b.category.name));

    let allocated: f64 = items.iter().map(|i| i.budget).sum();
    Ok(CategoryBudgetOverview {
        items,
        allocated,
        unallocated: profile.monthly_budget.max(0.0) - allocated,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_budget_status_thresholds() {
        assert_eq!(BudgetStatus::from_percentage(0.0), BudgetStatus::OnTrack);
        assert_eq!(BudgetStatus::from_percentage(70.0), BudgetStatus::OnTrack);
        assert_eq!(BudgetStatus::from_percentage(85.0), BudgetStatus::Caution);
        assert_eq!(BudgetStatus::from_percentage(90.0), BudgetStatus::Caution);
        assert_eq!(BudgetStatus::from_percentage(90.5), BudgetStatus::Over);
    }

    #[tokio::test]
    async fn test_set_budget_goals_validation() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;

        let result = set_budget_goals(&db, &profile.id, -1.0, None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        let result = set_budget_goals(&db, &profile.id, 1000.0, Some(f64::NAN)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let updated = set_budget_goals(&db, &profile.id, 2_000_000.0, Some(500_000.0)).await?;
        assert_eq!(updated.monthly_budget, 2_000_000.0);
        assert_eq!(updated.saving_goal, Some(500_000.0));

        let updated = set_budget_goals(&db, &profile.id, 2_000_000.0, Some(0.0)).await?;
        assert_eq!(updated.saving_goal, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_category_budget_upsert_and_delete() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Meals", EntryKind::Expense).await?;

        let created = set_category_budget(&db, &profile.id, food.id, 300_000.0).await?;
        assert_eq!(created.as_ref().unwrap().period, "monthly");

        let updated = set_category_budget(&db, &profile.id, food.id, 350_000.0)
            .await?
            .unwrap();
        assert_eq!(updated.id, created.unwrap().id);
        assert_eq!(updated.amount, 350_000.0);
        assert_eq!(list_category_budgets(&db, &profile.id).await?.len(), 1);

        assert!(set_category_budget(&db, &profile.id, food.id, 0.0).await?.is_none());
        assert!(list_category_budgets(&db, &profile.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_category_budget_rejects_income_category() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let pay = create_test_category(&db, &profile.id, "Paycheck", EntryKind::Income).await?;

        let result = set_category_budget(&db, &profile.id, pay.id, 1000.0).await;
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "category",
                ..
            })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_budget_progress() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Meals", EntryKind::Expense).await?;
        let pay = create_test_category(&db, &profile.id, "Paycheck", EntryKind::Income).await?;
        let uid = profile.id.as_str();
        set_budget_goals(&db, uid, 1_000_000.0, Some(200_000.0)).await?;

        insert_expense(&db, uid, Some(food.id), 800_000.0, date(2024, 3, 5)).await?;
        insert_income(&db, uid, Some(pay.id), 900_000.0, date(2024, 3, 25)).await?;

        let progress = budget_progress(&db, uid, Month::new(2024, 3)?).await?;
        assert_eq!(progress.spent, 800_000.0);
        assert_eq!(progress.remaining, 200_000.0);
        assert_eq!(progress.percentage, 80.0);
        assert_eq!(progress.status, BudgetStatus::Caution);

        let saving = progress.saving.unwrap();
        assert_eq!(saving.saved, 100_000.0);
        assert_eq!(saving.percentage, 50.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_budget_progress_without_budget() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;

        let progress = budget_progress(&db, &profile.id, Month::new(2024, 3)?).await?;
        assert_eq!(progress.budget, 0.0);
        assert_eq!(progress.percentage, 0.0);
        assert!(progress.saving.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_category_budget_progress() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Meals", EntryKind::Expense).await?;
        let fun = create_test_category(&db, &profile.id, "Fun", EntryKind::Expense).await?;
        let uid = profile.id.as_str();
        set_budget_goals(&db, uid, 1_000_000.0, None).await?;
        set_category_budget(&db, uid, food.id, 400_000.0).await?;
        set_category_budget(&db, uid, fun.id, 100_000.0).await?;

        insert_expense(&db, uid, Some(food.id), 100_000.0, date(2024, 3, 5)).await?;
        insert_expense(&db, uid, Some(fun.id), 150_000.0, date(2024, 3, 6)).await?;
        // Other months don't count
        insert_expense(&db, uid, Some(food.id), 999_000.0, date(2024, 2, 6)).await?;

        let overview = category_budget_progress(&db, uid, Month::new(2024, 3)?).await?;
        assert_eq!(overview.items.len(), 2);
        assert_eq!(overview.allocated, 500_000.0);
        assert_eq!(overview.unallocated, 500_000.0);

        let fun_progress = &overview.items[0];
        assert_eq!(fun_progress.category.name, "Fun");
        assert_eq!(fun_progress.spent, 150_000.0);
        assert_eq!(fun_progress.remaining, -50_000.0);
        assert_eq!(fun_progress.percentage, 150.0);
        assert_eq!(fun_progress.status, BudgetStatus::Over);

        let food_progress = &overview.items[1];
        assert_eq!(food_progress.percentage, 25.0);
        assert_eq!(food_progress.status, BudgetStatus::OnTrack);

        Ok(())
    }
}
