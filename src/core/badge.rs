//! Achievement catalog and badge awarding.
//!
//! The catalog comes from `config.toml` and is seeded at startup. Badges are
//! checked after every recorded transaction; each is awarded at most once
//! per user and credits its experience and coin reward when earned.

use crate::{
    config::defaults::BadgeConfig,
    core::{gamification, profile, transaction},
    entities::{
        Badge, BadgeColumn, BadgeModel, ProfileModel, UserBadge, UserBadgeColumn,
        UserBadgeModel, badge, user_badge,
    },
    errors::Result,
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashSet;
use tracing::{info, warn};

/// What a badge requires, parsed from its `requirement_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// At least this many recorded transactions
    Transactions(i64),
    /// A streak (longest ever) of at least this many days
    Streak(i64),
    /// At least this level
    Level(i64),
}

impl Requirement {
    /// Parses a catalog entry's requirement. Unknown types yield `None`.
    #[must_use]
    pub fn from_badge(badge: &BadgeModel) -> Option<Self> {
        match badge.requirement_type.as_str() {
            "transactions" => Some(Self::Transactions(badge.requirement_value)),
            "streak" => Some(Self::Streak(badge.requirement_value)),
            "level" => Some(Self::Level(badge.requirement_value)),
            _ => None,
        }
    }

    /// Whether a profile with `transaction_count` transactions meets it.
    #[must_use]
    pub fn is_met(self, profile: &ProfileModel, transaction_count: u64) -> bool {
        match self {
            Self::Transactions(n) => i64::try_from(transaction_count).unwrap_or(i64::MAX) >= n,
            Self::Streak(n) => i64::from(profile.longest_streak) >= n,
            Self::Level(n) => i64::from(profile.level) >= n,
        }
    }
}

/// Inserts catalog badges that are not in the database yet.
///
/// Existing badges (matched by name) are left untouched. Returns how many
/// were inserted.
pub async fn seed_badges(db: &DatabaseConnection, catalog: &[BadgeConfig]) -> Result<usize> {
    let mut inserted = 0;

    for config in catalog {
        let existing = Badge::find()
            .filter(BadgeColumn::Name.eq(config.name.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            continue;
        }

        let model = badge::ActiveModel {
            name: Set(config.name.clone()),
            description: Set(config.description.clone()),
            icon: Set(config.icon.clone()),
            color: Set(config.color.clone()),
            requirement_type: Set(config.requirement_type.clone()),
            requirement_value: Set(config.requirement_value),
            exp_reward: Set(config.exp_reward),
            coin_reward: Set(config.coin_reward),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        model.insert(db).await?;
        inserted += 1;
    }

    info!(inserted, total = catalog.len(), "Badge catalog seeded");
    Ok(inserted)
}

/// The whole catalog, grouped by requirement and ordered by difficulty.
pub async fn list_badges(db: &DatabaseConnection) -> Result<Vec<BadgeModel>> {
    Badge::find()
        .order_by_asc(BadgeColumn::RequirementType)
        .order_by_asc(BadgeColumn::RequirementValue)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Badges the user has earned, most recent first.
pub async fn earned_badges(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<(UserBadgeModel, Option<BadgeModel>)>> {
    UserBadge::find()
        .find_also_related(Badge)
        .filter(UserBadgeColumn::UserId.eq(user_id))
        .order_by_desc(UserBadgeColumn::EarnedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Awards every badge whose requirement the user now meets.
///
/// Rewards from one badge can unlock a level badge, so evaluation repeats
/// until nothing new is earned.
pub async fn evaluate_badges<C>(conn: &C, user_id: &str) -> Result<Vec<BadgeModel>>
where
    C: ConnectionTrait,
{
    let catalog = Badge::find()
        .order_by_asc(BadgeColumn::Id)
        .all(conn)
        .await?;
    let mut earned: HashSet<i64> = UserBadge::find()
        .filter(UserBadgeColumn::UserId.eq(user_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|ub| ub.badge_id)
        .collect();

    let transaction_count = transaction::count_transactions(conn, user_id).await?;
    let mut awarded = Vec::new();

    loop {
        let profile = profile::require_profile(conn, user_id).await?;
        let mut progressed = false;

        for badge in &catalog {
            if earned.contains(&badge.id) {
                continue;
            }
            let Some(requirement) = Requirement::from_badge(badge) else {
                warn!(
                    badge = %badge.name,
                    kind = %badge.requirement_type,
                    "Unknown badge requirement"
                );
                continue;
            };
            if !requirement.is_met(&profile, transaction_count) {
                continue;
            }

            user_badge::ActiveModel {
                user_id: Set(user_id.to_string()),
                badge_id: Set(badge.id),
                earned_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            gamification::grant_reward(conn, user_id, badge.exp_reward, badge.coin_reward).await?;

            info!(user_id, badge = %badge.name, "Badge earned");
            earned.insert(badge.id);
            awarded.push(badge.clone());
            progressed = true;
        }

        if !progressed {
            break;
        }
    }

    Ok(awarded)
}
