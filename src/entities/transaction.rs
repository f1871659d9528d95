//! Transaction entity - Every recorded income or expense.
//!
//! Amounts are always positive; `kind` carries the direction. `exp_gained`
//! is computed once at creation from the amount.
use super::kinds::EntryKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning profile
    pub user_id: String,
    /// Category, if any
    pub category_id: Option<i64>,
    /// Positive amount
    pub amount: f64,
    /// Income or expense
    #[sea_orm(column_name = "type")]
    pub kind: EntryKind,
    /// Calendar day the transaction belongs to
    pub date: Date,
    /// Free-form note
    pub description: Option<String>,
    /// Experience granted for recording this transaction
    pub exp_gained: i32,
    /// When the row was inserted
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one profile
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
    /// Each transaction optionally belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
