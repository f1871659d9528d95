//! Experience, levels, coins and streaks.
//!
//! Recording a transaction credits the profile with the transaction's
//! experience plus a flat coin reward, recomputes the level and refreshes the
//! streak counters from the distinct dates the user has recorded on.

use crate::{
    entities::{Profile, ProfileColumn, ProfileModel, TransactionColumn, profile},
    errors::{Error, Result},
};
use chrono::{Days, NaiveDate, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use tracing::debug;

/// Experience needed per level
pub const EXP_PER_LEVEL: i64 = 1000;
/// Minimum experience granted for any transaction
pub const MIN_EXP_PER_TRANSACTION: i32 = 5;
/// Coins granted for every recorded transaction
pub const COINS_PER_TRANSACTION: i64 = 10;

/// Experience earned by recording a transaction of `amount`.
///
/// One point per full 1,000 of the amount, never less than five.
#[must_use]
pub fn exp_for_amount(amount: f64) -> i32 {
    let thousands = (amount / 1000.0).floor();
    if !thousands.is_finite() || thousands <= f64::from(MIN_EXP_PER_TRANSACTION) {
        return MIN_EXP_PER_TRANSACTION;
    }
    if thousands >= f64::from(i32::MAX) {
        return i32::MAX;
    }
    #[allow(clippy::cast_possible_truncation)]
    let exp = thousands as i32;
    exp
}

/// Level reached with `total_exp` experience. Level 1 starts at zero.
#[must_use]
pub fn level_for_exp(total_exp: i64) -> i32 {
    let level = total_exp.max(0) / EXP_PER_LEVEL + 1;
    i32::try_from(level).unwrap_or(i32::MAX)
}

/// Where a profile stands inside its current level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelProgress {
    /// Current level
    pub level: i32,
    /// Experience gathered since the level started
    pub exp_in_level: i64,
    /// Experience still missing for the next level
    pub exp_to_next: i64,
    /// `exp_in_level` as a percentage of a level
    pub percent: f64,
}

impl LevelProgress {
    /// Computes level progress from a lifetime experience total.
    #[must_use]
    pub fn from_exp(total_exp: i64) -> Self {
        let total_exp = total_exp.max(0);
        let exp_in_level = total_exp % EXP_PER_LEVEL;
        #[allow(clippy::cast_precision_loss)]
        let percent = exp_in_level as f64 / EXP_PER_LEVEL as f64 * 100.0;
        Self {
            level: level_for_exp(total_exp),
            exp_in_level,
            exp_to_next: EXP_PER_LEVEL - exp_in_level,
            percent,
        }
    }
}

/// Flavor label for a running streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTier {
    /// Thirty days or more
    Legendary,
    /// A week or more
    OnFire,
    /// Three days or more
    Warming,
    /// Less than three days
    None,
}

impl StreakTier {
    /// Tier for a streak of `days`.
    #[must_use]
    pub const fn for_days(days: i32) -> Self {
        if days >= 30 {
            Self::Legendary
        } else if days >= 7 {
            Self::OnFire
        } else if days >= 3 {
            Self::Warming
        } else {
            Self::None
        }
    }

    /// Short label shown next to the streak counter
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::Legendary => Some("🏆 Legendary streak!"),
            Self::OnFire => Some("🔥 On fire!"),
            Self::Warming => Some("✨ Warming up"),
            Self::None => None,
        }
    }
}

/// Current and longest run of consecutive days in `dates`.
///
/// `dates` must be sorted ascending without duplicates. The current streak
/// only counts when its last day is `today` or the day before.
#[must_use]
pub fn compute_streaks(dates: &[NaiveDate], today: NaiveDate) -> (i32, i32) {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &date in dates {
        run = match previous {
            Some(prev) if prev.checked_add_days(Days::new(1)) == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }

    let yesterday = today.pred_opt().unwrap_or(today);
    let current = match previous {
        Some(last) if last == today || last == yesterday => run,
        _ => 0,
    };

    (current, longest)
}

/// Adds experience and coins to a profile and recomputes its level.
///
/// Uses column expressions so concurrent credits never overwrite each other.
pub async fn grant_reward<C>(conn: &C, user_id: &str, exp: i64, coins: i64) -> Result<ProfileModel>
where
    C: ConnectionTrait,
{
    let result = Profile::update_many()
        .col_expr(
            ProfileColumn::TotalExp,
            Expr::col(ProfileColumn::TotalExp).add(exp),
        )
        .col_expr(ProfileColumn::Coins, Expr::col(ProfileColumn::Coins).add(coins))
        .col_expr(ProfileColumn::UpdatedAt, Expr::value(Utc::now()))
        .filter(ProfileColumn::Id.eq(user_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ProfileNotFound {
            user_id: user_id.to_string(),
        });
    }

    let profile = find_profile(conn, user_id).await?;
    let level = level_for_exp(profile.total_exp);
    if level == profile.level {
        return Ok(profile);
    }

    debug!(user_id, from = profile.level, to = level, "Level changed");
    let mut active: profile::ActiveModel = profile.into();
    active.level = Set(level);
    active.update(conn).await.map_err(Into::into)
}

/// Credits the reward for one newly recorded transaction.
pub async fn credit_transaction<C>(conn: &C, user_id: &str, exp_gained: i32) -> Result<ProfileModel>
where
    C: ConnectionTrait,
{
    grant_reward(conn, user_id, i64::from(exp_gained), COINS_PER_TRANSACTION).await
}

/// Recomputes `current_streak` and `longest_streak` from transaction dates.
///
/// Future-dated transactions are ignored. `longest_streak` never decreases.
pub async fn refresh_streak<C>(conn: &C, user_id: &str, today: NaiveDate) -> Result<ProfileModel>
where
    C: ConnectionTrait,
{
    let dates: Vec<NaiveDate> = crate::entities::Transaction::find()
        .select_only()
        .column(TransactionColumn::Date)
        .distinct()
        .filter(TransactionColumn::UserId.eq(user_id))
        .filter(TransactionColumn::Date.lte(today))
        .order_by_asc(TransactionColumn::Date)
        .into_tuple::<NaiveDate>()
        .all(conn)
        .await?;

    let (current, longest) = compute_streaks(&dates, today);
    let profile = find_profile(conn, user_id).await?;
    let longest = longest.max(profile.longest_streak);

    if profile.current_streak == current && profile.longest_streak == longest {
        return Ok(profile);
    }

    let mut active: profile::ActiveModel = profile.into();
    active.current_streak = Set(current);
    active.longest_streak = Set(longest);
    active.updated_at = Set(Utc::now());
    active.update(conn).await.map_err(Into::into)
}

async fn find_profile<C>(conn: &C, user_id: &str) -> Result<ProfileModel>
where
    C: ConnectionTrait,
{
    Profile::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::ProfileNotFound {
            user_id: user_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::EntryKind;
    use crate::test_utils::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_exp_for_amount() {
        assert_eq!(exp_for_amount(4000.0), 5);
        assert_eq!(exp_for_amount(12000.0), 12);
        assert_eq!(exp_for_amount(12999.0), 12);
        assert_eq!(exp_for_amount(1.0), 5);
        assert_eq!(exp_for_amount(6000.0), 6);
    }

    #[test]
    fn test_level_arithmetic() {
        assert_eq!(level_for_exp(0), 1);
        assert_eq!(level_for_exp(999), 1);
        assert_eq!(level_for_exp(1000), 2);
        assert_eq!(level_for_exp(2500), 3);

        let progress = LevelProgress::from_exp(2500);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.exp_in_level, 500);
        assert_eq!(progress.exp_to_next, 500);
        assert_eq!(progress.percent, 50.0);

        let fresh = LevelProgress::from_exp(0);
        assert_eq!(fresh.exp_to_next, 1000);
    }

    #[test]
    fn test_streak_tiers() {
        assert_eq!(StreakTier::for_days(0), StreakTier::None);
        assert_eq!(StreakTier::for_days(3), StreakTier::Warming);
        assert_eq!(StreakTier::for_days(7), StreakTier::OnFire);
        assert_eq!(StreakTier::for_days(45), StreakTier::Legendary);
        assert!(StreakTier::None.label().is_none());
    }

    #[test]
    fn test_compute_streaks() {
        let today = date(2024, 3, 10);

        assert_eq!(compute_streaks(&[], today), (0, 0));

        // Ends today
        let dates = [date(2024, 3, 8), date(2024, 3, 9), date(2024, 3, 10)];
        assert_eq!(compute_streaks(&dates, today), (3, 3));

        // Ends yesterday still counts
        let dates = [date(2024, 3, 8), date(2024, 3, 9)];
        assert_eq!(compute_streaks(&dates, today), (2, 2));

        // Broken streak keeps the longest run
        let dates = [
            date(2024, 3, 1),
            date(2024, 3, 2),
            date(2024, 3, 3),
            date(2024, 3, 4),
            date(2024, 3, 7),
        ];
        assert_eq!(compute_streaks(&dates, today), (0, 4));

        // Across a month boundary
        let dates = [date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)];
        assert_eq!(compute_streaks(&dates, date(2024, 3, 1)), (3, 3));
    }

    #[tokio::test]
    async fn test_grant_reward_levels_up() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;

        let updated = grant_reward(&db, &profile.id, 1200, 100).await?;
        assert_eq!(updated.total_exp, 1200);
        assert_eq!(updated.coins, 100);
        assert_eq!(updated.level, 2);

        let updated = grant_reward(&db, &profile.id, 5, 10).await?;
        assert_eq!(updated.total_exp, 1205);
        assert_eq!(updated.coins, 110);
        assert_eq!(updated.level, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_grant_reward_missing_profile() -> Result<()> {
        let db = setup_test_db().await?;
        let result = grant_reward(&db, "nobody", 10, 10).await;
        assert!(matches!(result, Err(Error::ProfileNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_streak_keeps_longest() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let category = create_test_category(&db, &profile.id, "Streaks", EntryKind::Expense).await?;

        for day in 1..=4 {
            insert_raw_transaction(
                &db,
                &profile.id,
                Some(category.id),
                EntryKind::Expense,
                1000.0,
                date(2024, 3, day),
            )
            .await?;
        }

        let updated = refresh_streak(&db, &profile.id, date(2024, 3, 4)).await?;
        assert_eq!(updated.current_streak, 4);
        assert_eq!(updated.longest_streak, 4);

        // A week later the streak is gone but the record stays
        let updated = refresh_streak(&db, &profile.id, date(2024, 3, 11)).await?;
        assert_eq!(updated.current_streak, 0);
        assert_eq!(updated.longest_streak, 4);

        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_streak_ignores_future_dates() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let category = create_test_category(&db, &profile.id, "Later", EntryKind::Expense).await?;

        insert_raw_transaction(
            &db,
            &profile.id,
            Some(category.id),
            EntryKind::Expense,
            1000.0,
            date(2024, 3, 10),
        )
        .await?;
        insert_raw_transaction(
            &db,
            &profile.id,
            Some(category.id),
            EntryKind::Expense,
            1000.0,
            date(2024, 3, 11),
        )
        .await?;

        let updated = refresh_streak(&db, &profile.id, date(2024, 3, 10)).await?;
        assert_eq!(updated.current_streak, 1);
        assert_eq!(updated.longest_streak, 1);

        Ok(())
    }
}
