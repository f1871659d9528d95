//! Profile entity - One row per user holding identity and gamification state.
//!
//! The primary key is the Discord user id; a row existing for a user is what
//! the route guard treats as a signed-in session.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Discord user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Public handle, 3-20 characters of `[A-Za-z0-9_]`
    pub username: Option<String>,
    /// Display name
    pub full_name: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Current level, derived from `total_exp`
    pub level: i32,
    /// Experience accumulated over the profile's lifetime
    pub total_exp: i64,
    /// Coin balance
    pub coins: i64,
    /// Consecutive days with at least one transaction, ending today or yesterday
    pub current_streak: i32,
    /// Best streak ever reached
    pub longest_streak: i32,
    /// Monthly spending budget; 0 means no budget set
    pub monthly_budget: f64,
    /// Monthly saving goal
    pub saving_goal: Option<f64>,
    /// Set once the onboarding wizard was completed or skipped
    pub onboarding_completed: bool,
    /// Set when the wizard was skipped rather than completed
    pub onboarding_skipped: bool,
    /// When the wizard was completed or skipped
    pub onboarding_completed_at: Option<DateTimeUtc>,
    /// When the profile was created (sign-up time)
    pub created_at: DateTimeUtc,
    /// When the profile was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Profile and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One profile owns many categories
    #[sea_orm(has_many = "super::category::Entity")]
    Categories,
    /// One profile owns many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
