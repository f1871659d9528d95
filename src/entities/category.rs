//! Category entity - User-owned income/expense categories.
//!
//! Default categories are seeded at sign-up and flagged with `is_default`;
//! they cannot be deleted.

use super::kinds::EntryKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning profile
    pub user_id: String,
    /// Display name (e.g., "Food", "Salary")
    pub name: String,
    /// Hex color like `#FF6B6B`
    pub color: String,
    /// Icon name shown next to the category
    pub icon: Option<String>,
    /// Income or expense
    #[sea_orm(column_name = "type")]
    pub kind: EntryKind,
    /// Seeded at sign-up; cannot be deleted
    pub is_default: bool,
    /// When the category was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each category belongs to one profile
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
    /// One category has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One category has at most one monthly budget per user
    #[sea_orm(has_many = "super::category_budget::Entity")]
    CategoryBudgets,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::category_budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CategoryBudgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
