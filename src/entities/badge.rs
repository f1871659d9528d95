//! Badge entity - Static achievement catalog seeded from `config.toml`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Badge database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "badges")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique badge name
    #[sea_orm(unique)]
    pub name: String,
    /// What the badge is awarded for
    pub description: String,
    /// Emoji or icon name
    pub icon: String,
    /// Hex color
    pub color: Option<String>,
    /// `"transactions"`, `"streak"` or `"level"`
    pub requirement_type: String,
    /// Threshold the requirement must reach
    pub requirement_value: i64,
    /// Experience granted when earned
    pub exp_reward: i64,
    /// Coins granted when earned
    pub coin_reward: i64,
    /// When the badge was added to the catalog
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Badge and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One badge is earned by many users
    #[sea_orm(has_many = "super::user_badge::Entity")]
    UserBadges,
}

impl Related<super::user_badge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserBadges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
