//! Budget alert entity - A notification fired when monthly spend crosses a
//! fixed percentage of a budget.
//!
//! At most one row exists per user, category (or total), threshold and period.

use super::kinds::AlertType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget alert database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_alerts")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning profile
    pub user_id: String,
    /// Overall budget or a single category cap
    pub alert_type: AlertType,
    /// Category for `AlertType::Category`, `None` for totals
    pub category_id: Option<i64>,
    /// Threshold that was crossed: 50, 80 or 100
    pub percentage: i32,
    /// Spend at the time the alert fired
    pub amount_used: f64,
    /// Budget the spend was measured against
    pub budget_amount: f64,
    /// Month the alert belongs to, formatted `YYYY-MM`
    pub period: String,
    /// Whether the user dismissed the alert
    pub is_read: bool,
    /// When the alert fired
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `BudgetAlert` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Category alerts point at their category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
