//! First-run wizard state machine and rewards.
//!
//! The wizard walks a new user through five fixed steps. Which step each
//! user is on is kept in [`OnboardingSessions`]; the outcome (completed or
//! skipped) is persisted on the profile.

use crate::{
    core::{gamification, profile},
    entities::{ProfileModel, profile as profile_entity},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::Mutex;
use tracing::info;

/// Experience granted for finishing the wizard
pub const COMPLETION_EXP: i64 = 200;
/// Coins granted for finishing the wizard
pub const COMPLETION_COINS: i64 = 100;

/// One screen of the wizard, numbered 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OnboardingStep {
    /// Introduction
    Welcome = 1,
    /// Monthly budget and saving goal
    Goal = 2,
    /// Review and extend categories
    Category = 3,
    /// Record a first transaction
    FirstTransaction = 4,
    /// How levels, coins and badges work
    Gamification = 5,
}

impl OnboardingStep {
    /// Number of steps in the wizard
    pub const TOTAL: u8 = 5;

    /// 1-based position of the step
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Step at a 1-based position, if it exists
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Welcome),
            2 => Some(Self::Goal),
            3 => Some(Self::Category),
            4 => Some(Self::FirstTransaction),
            5 => Some(Self::Gamification),
            _ => None,
        }
    }

    /// The following step; stays put on the last one.
    #[must_use]
    pub const fn next(self) -> Self {
        match Self::from_number(self.number() + 1) {
            Some(step) => step,
            None => self,
        }
    }

    /// The preceding step; stays put on the first one.
    #[must_use]
    pub const fn prev(self) -> Self {
        match Self::from_number(self.number().saturating_sub(1)) {
            Some(step) => step,
            None => self,
        }
    }

    /// Whether this is the final step
    #[must_use]
    pub const fn is_last(self) -> bool {
        self.number() == Self::TOTAL
    }

    /// Screen title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome to LedgerQuest",
            Self::Goal => "Set your goals",
            Self::Category => "Pick your categories",
            Self::FirstTransaction => "Record your first transaction",
            Self::Gamification => "Level up your finances",
        }
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}/{}: {}", self.number(), Self::TOTAL, self.title())
    }
}

/// Which wizard step each user is on.
#[derive(Debug, Default)]
pub struct OnboardingSessions {
    steps: Mutex<HashMap<String, OnboardingStep>>,
}

impl OnboardingSessions {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the wizard for a user, or returns the step they are already on.
    pub async fn start(&self, user_id: &str) -> OnboardingStep {
        *self
            .steps
            .lock()
            .await
            .entry(user_id.to_string())
            .or_insert(OnboardingStep::Welcome)
    }

    /// The user's current step, if the wizard is running
    pub async fn current(&self, user_id: &str) -> Option<OnboardingStep> {
        self.steps.lock().await.get(user_id).copied()
    }

    /// Advances the user's wizard; `None` when it is not running.
    pub async fn next(&self, user_id: &str) -> Option<OnboardingStep> {
        let mut steps = self.steps.lock().await;
        let step = steps.get_mut(user_id)?;
        *step = step.next();
        Some(*step)
    }

    /// Moves the user's wizard back; `None` when it is not running.
    pub async fn prev(&self, user_id: &str) -> Option<OnboardingStep> {
        let mut steps = self.steps.lock().await;
        let step = steps.get_mut(user_id)?;
        *step = step.prev();
        Some(*step)
    }

    /// Forgets the user's wizard state
    pub async fn finish(&self, user_id: &str) {
        self.steps.lock().await.remove(user_id);
    }
}

/// Whether the wizard should open on its own for this profile.
#[must_use]
pub const fn should_auto_start(profile: &ProfileModel) -> bool {
    !profile.onboarding_completed
}

/// Marks onboarding completed and grants its reward.
///
/// The reward is +100 coins and +200 experience on top of the current
/// values, with the level recomputed. A profile that already finished the
/// wizard is returned unchanged.
pub async fn complete_onboarding(db: &DatabaseConnection, user_id: &str) -> Result<ProfileModel> {
    let txn = db.begin().await?;

    let existing = profile::require_profile(&txn, user_id).await?;
    if existing.onboarding_completed {
        return Ok(existing);
    }

    let now = Utc::now();
    let mut active: profile_entity::ActiveModel = existing.into();
    active.onboarding_completed = Set(true);
    active.onboarding_completed_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(&txn).await?;

    let updated =
        gamification::grant_reward(&txn, user_id, COMPLETION_EXP, COMPLETION_COINS).await?;

    txn.commit().await?;
    info!(user_id, "Onboarding completed");
    Ok(updated)
}

/// Marks onboarding completed and skipped without any reward.
///
/// A profile that already finished the wizard is returned unchanged.
pub async fn skip_onboarding(db: &DatabaseConnection, user_id: &str) -> Result<ProfileModel> {
    let existing = profile::require_profile(db, user_id).await?;
    if existing.onboarding_completed {
        return Ok(existing);
    }

    let now = Utc::now();
    let mut active: profile_entity::ActiveModel = existing.into();
    active.onboarding_completed = Set(true);
    active.onboarding_skipped = Set(true);
    active.onboarding_completed_at = Set(Some(now));
    active.updated_at = Set(now);

    let updated = active.update(db).await?;
    info!(user_id, "Onboarding skipped");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_step_bounds() {
        assert_eq!(OnboardingStep::Welcome.prev(), OnboardingStep::Welcome);
        assert_eq!(OnboardingStep::Gamification.next(), OnboardingStep::Gamification);
        assert_eq!(OnboardingStep::Welcome.next(), OnboardingStep::Goal);
        assert_eq!(OnboardingStep::Goal.prev(), OnboardingStep::Welcome);

        let mut step = OnboardingStep::Welcome;
        for _ in 0..10 {
            step = step.next();
            assert!((1..=OnboardingStep::TOTAL).contains(&step.number()));
        }
        assert!(step.is_last());

        assert_eq!(OnboardingStep::from_number(0), None);
        assert_eq!(OnboardingStep::from_number(6), None);
        assert_eq!(
            OnboardingStep::Category.to_string(),
            "Step 3/5: Pick your categories"
        );
    }

    #[tokio::test]
    async fn test_sessions() {
        let sessions = OnboardingSessions::new();
        assert_eq!(sessions.current("u1").await, None);
        assert_eq!(sessions.next("u1").await, None);

        assert_eq!(sessions.start("u1").await, OnboardingStep::Welcome);
        assert_eq!(sessions.prev("u1").await, Some(OnboardingStep::Welcome));
        assert_eq!(sessions.next("u1").await, Some(OnboardingStep::Goal));
        // Restarting resumes where the user left off
        assert_eq!(sessions.start("u1").await, OnboardingStep::Goal);

        // Users don't share state
        assert_eq!(sessions.start("u2").await, OnboardingStep::Welcome);

        sessions.finish("u1").await;
        assert_eq!(sessions.current("u1").await, None);
        assert_eq!(sessions.current("u2").await, Some(OnboardingStep::Welcome));
    }

    #[tokio::test]
    async fn test_complete_grants_reward_once() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        assert!(should_auto_start(&profile));
        let before = gamification::grant_reward(&db, &profile.id, 950, 7).await?;

        let completed = complete_onboarding(&db, &profile.id).await?;
        assert!(completed.onboarding_completed);
        assert!(!completed.onboarding_skipped);
        assert!(completed.onboarding_completed_at.is_some());
        assert_eq!(completed.coins, before.coins + 100);
        assert_eq!(completed.total_exp, before.total_exp + 200);
        assert_eq!(completed.level, 2);
        assert!(!should_auto_start(&completed));

        let again = complete_onboarding(&db, &profile.id).await?;
        assert_eq!(again.coins, completed.coins);
        assert_eq!(again.total_exp, completed.total_exp);

        Ok(())
    }

    #[tokio::test]
    async fn test_skip_grants_nothing() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;

        let skipped = skip_onboarding(&db, &profile.id).await?;
        assert!(skipped.onboarding_completed);
        assert!(skipped.onboarding_skipped);
        assert!(skipped.onboarding_completed_at.is_some());
        assert_eq!(skipped.coins, profile.coins);
        assert_eq!(skipped.total_exp, profile.total_exp);

        // Completing afterwards is a no-op
        let completed = complete_onboarding(&db, &profile.id).await?;
        assert_eq!(completed.coins, profile.coins);

        Ok(())
    }
}
