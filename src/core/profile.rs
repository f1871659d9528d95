//! Profile business logic - sign-up, lookup and editing.
//!
//! A profile row is created by `/signup` and is what makes a Discord user
//! count as signed in.

use crate::{
    config::defaults::CategoryConfig,
    entities::{Profile, ProfileModel, profile},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::info;

/// Fields a user may change on their profile. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New username
    pub username: Option<String>,
    /// New display name
    pub full_name: Option<String>,
    /// New avatar URL
    pub avatar_url: Option<String>,
}

/// Checks a username: 3-20 characters of letters, digits and underscores.
pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(3..=20).contains(&len) {
        return Err(Error::Validation {
            field: "username",
            message: "must be between 3 and 20 characters".to_string(),
        });
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(Error::Validation {
            field: "username",
            message: "may only contain letters, digits and underscores".to_string(),
        });
    }
    Ok(())
}

/// Checks a display name: 2-50 characters.
pub fn validate_full_name(full_name: &str) -> Result<()> {
    let len = full_name.trim().chars().count();
    if (2..=50).contains(&len) {
        Ok(())
    } else {
        Err(Error::Validation {
            field: "full_name",
            message: "must be between 2 and 50 characters".to_string(),
        })
    }
}

fn validate_avatar_url(url: &str) -> Result<()> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(Error::Validation {
            field: "avatar_url",
            message: "must be an http(s) URL".to_string(),
        })
    }
}

/// Creates the profile for `user_id` and seeds its default categories.
///
/// # Arguments
/// * `user_id` - Discord user id, used as the profile's primary key
/// * `username` - Optional handle, validated like [`validate_username`]
/// * `full_name` - Optional display name
/// * `defaults` - Categories copied into the new profile
pub async fn create_profile(
    db: &DatabaseConnection,
    user_id: &str,
    username: Option<String>,
    full_name: Option<String>,
    defaults: &[CategoryConfig],
) -> Result<ProfileModel> {
    if let Some(username) = &username {
        validate_username(username)?;
    }
    if let Some(full_name) = &full_name {
        validate_full_name(full_name)?;
    }

    let txn = db.begin().await?;

    if Profile::find_by_id(user_id).one(&txn).await?.is_some() {
        return Err(Error::ProfileExists {
            user_id: user_id.to_string(),
        });
    }

    let now = Utc::now();
    let model = profile::ActiveModel {
        id: Set(user_id.to_string()),
        username: Set(username),
        full_name: Set(full_name.map(|n| n.trim().to_string())),
        avatar_url: Set(None),
        level: Set(1),
        total_exp: Set(0),
        coins: Set(0),
        current_streak: Set(0),
        longest_streak: Set(0),
        monthly_budget: Set(0.0),
        saving_goal: Set(None),
        onboarding_completed: Set(false),
        onboarding_skipped: Set(false),
        onboarding_completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let profile = model.insert(&txn).await?;

    crate::core::category::seed_default_categories(&txn, user_id, defaults).await?;

    txn.commit().await?;
    info!(user_id, "Created profile");
    Ok(profile)
}

/// Returns the profile for `user_id`, if the user has signed up.
pub async fn get_profile(db: &DatabaseConnection, user_id: &str) -> Result<Option<ProfileModel>> {
    Profile::find_by_id(user_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the profile for `user_id`, or [`Error::ProfileNotFound`].
pub async fn require_profile<C>(conn: &C, user_id: &str) -> Result<ProfileModel>
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

/// Whether `user_id` has a profile, i.e. counts as signed in.
pub async fn has_session(db: &DatabaseConnection, user_id: &str) -> Result<bool> {
    Ok(get_profile(db, user_id).await?.is_some())
}

/// Applies a [`ProfileUpdate`] after validating every provided field.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: &str,
    update: ProfileUpdate,
) -> Result<ProfileModel> {
    if let Some(username) = &update.username {
        validate_username(username)?;
    }
    if let Some(full_name) = &update.full_name {
        validate_full_name(full_name)?;
    }
    if let Some(url) = &update.avatar_url {
        validate_avatar_url(url)?;
    }

    let profile = require_profile(db, user_id).await?;
    let mut active: profile::ActiveModel = profile.into();

    if let Some(username) = update.username {
        active.username = Set(Some(username));
    }
    if let Some(full_name) = update.full_name {
        active.full_name = Set(Some(full_name.trim().to_string()));
    }
    if let Some(url) = update.avatar_url {
        active.avatar_url = Set(Some(url));
    }
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("abc").is_ok());
        assert!(validate_username("money_maker_2024").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("a_very_long_username_1").is_err());
        assert!(validate_username("no spaces").is_err());
        assert!(validate_username("dash-name").is_err());
    }

    #[test]
    fn test_validate_full_name() {
        assert!(validate_full_name("Jo").is_ok());
        assert!(validate_full_name("J").is_err());
        assert!(validate_full_name(&"x".repeat(51)).is_err());
    }

    #[tokio::test]
    async fn test_create_profile_fresh_counters() -> Result<()> {
        let db = setup_test_db().await?;
        let profile = create_profile(
            &db,
            "user1",
            Some("saver_1".to_string()),
            Some("Sam Saver".to_string()),
            &test_default_categories(),
        )
        .await?;

        assert_eq!(profile.level, 1);
        assert_eq!(profile.total_exp, 0);
        assert_eq!(profile.coins, 0);
        assert_eq!(profile.current_streak, 0);
        assert_eq!(profile.monthly_budget, 0.0);
        assert!(!profile.onboarding_completed);
        assert!(has_session(&db, "user1").await?);
        assert!(!has_session(&db, "user2").await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_profile_twice_fails() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;

        let result = create_profile(&db, &profile.id, None, None, &[]).await;
        assert!(matches!(result, Err(Error::ProfileExists { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_profile_invalid_username_writes_nothing() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_profile(&db, "user1", Some("x".to_string()), None, &[]).await;
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "username",
                ..
            })
        ));
        assert!(get_profile(&db, "user1").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_require_profile_missing() -> Result<()> {
        let db = setup_test_db().await?;
        let result = require_profile(&db, "ghost").await;
        assert!(matches!(result, Err(Error::ProfileNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;

        let updated = update_profile(
            &db,
            &profile.id,
            ProfileUpdate {
                username: Some("new_name".to_string()),
                full_name: Some("  New Name ".to_string()),
                avatar_url: Some("https://cdn.example.com/a.png".to_string()),
            },
        )
        .await?;
        assert_eq!(updated.username.as_deref(), Some("new_name"));
        assert_eq!(updated.full_name.as_deref(), Some("New Name"));
        assert_eq!(
            updated.avatar_url.as_deref(),
            Some("https://cdn.example.com/a.png")
        );

        // Fields left as None stay untouched
        let updated = update_profile(
            &db,
            &profile.id,
            ProfileUpdate {
                full_name: Some("Other".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.username.as_deref(), Some("new_name"));

        let result = update_profile(
            &db,
            &profile.id,
            ProfileUpdate {
                avatar_url: Some("ftp://nope".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(result.is_err());

        Ok(())
    }
}
