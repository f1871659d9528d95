//! User badge entity - Join table of badges earned by profiles.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User badge database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_badges")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Profile that earned the badge
    pub user_id: String,
    /// Earned badge
    pub badge_id: i64,
    /// When it was earned
    pub earned_at: DateTimeUtc,
}

/// Defines relationships between `UserBadge` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row points at one badge
    #[sea_orm(
        belongs_to = "super::badge::Entity",
        from = "Column::BadgeId",
        to = "super::badge::Column::Id"
    )]
    Badge,
}

impl Related<super::badge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Badge.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
