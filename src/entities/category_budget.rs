//! Category budget entity - A monthly spending cap for one category.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Only period currently in use
pub const MONTHLY_PERIOD: &str = "monthly";

/// Category budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category_budgets")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning profile
    pub user_id: String,
    /// Capped category
    pub category_id: i64,
    /// Cap amount per period
    pub amount: f64,
    /// Budget period, always `"monthly"`
    pub period: String,
    /// When the cap was first set
    pub created_at: DateTimeUtc,
    /// When the cap was last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `CategoryBudget` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each budget caps one category
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
