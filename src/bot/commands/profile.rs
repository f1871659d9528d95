//! Profile Discord commands - `signup` and `profile`.
//!
//! Signing up creates the profile row that every other command relies on and
//! opens the onboarding wizard.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::onboarding::render_step, handlers::checks},
        core::{
            badge,
            gamification::{LevelProgress, StreakTier},
            onboarding,
            profile::{self, ProfileUpdate},
            report::{format_currency, format_progress_bar},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::collections::HashSet;
    use std::fmt::Write;
    use tracing::info;

    /// Creates your LedgerQuest profile and default categories.
    ///
    /// Your Discord account is your login; this command only needs to be run
    /// once. The onboarding wizard starts right after.
    #[poise::command(slash_command, check = "checks::signup_area")]
    pub async fn signup(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Public handle, 3-20 letters, digits or underscores"]
        username: Option<String>,
        #[description = "Your display name"] full_name: Option<String>,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let data = ctx.data();

        let created = profile::create_profile(
            &data.database,
            &user_id,
            username,
            full_name,
            &data.config.categories,
        )
        .await?;
        info!(user_id, "New sign-up");

        let mut message = format!(
            "🎉 Welcome aboard! Your profile is ready with {} default categories.\n\n",
            data.config.categories.len()
        );
        if onboarding::should_auto_start(&created) {
            let step = data.onboarding.start(&user_id).await;
            message.push_str(&render_step(step)?);
        }

        ctx.say(message).await?;
        Ok(())
    }

    /// Shows or edits your profile and badges.
    #[poise::command(
        slash_command,
        subcommands("profile_show", "profile_edit", "profile_badges"),
        check = "checks::profile_area"
    )]
    pub async fn profile(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Profile commands:\n\
            `/profile show` - Level, coins, streak and goals\n\
            `/profile edit` - Change username, display name or avatar\n\
            `/profile badges` - Earned and locked badges";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows your level, coins, streak and goals.
    #[poise::command(slash_command, rename = "show", check = "checks::profile_area")]
    pub async fn profile_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let profile = profile::require_profile(&ctx.data().database, &user_id).await?;

        let level = LevelProgress::from_exp(profile.total_exp);
        let mut progress = format!(
            "{}\n{} exp to level {}",
            format_progress_bar(level.percent, Some(12)),
            level.exp_to_next,
            level.level + 1
        );
        if let Some(label) = StreakTier::for_days(profile.current_streak).label() {
            write!(&mut progress, "\n{label}")?;
        }

        let goals = format!(
            "**Monthly budget:** {}\n**Saving goal:** {}",
            if profile.monthly_budget > 0.0 {
                format_currency(profile.monthly_budget)
            } else {
                "not set".to_string()
            },
            profile
                .saving_goal
                .map_or_else(|| "not set".to_string(), format_currency)
        );

        let title = profile
            .full_name
            .clone()
            .or_else(|| profile.username.clone())
            .unwrap_or_else(|| ctx.author().name.clone());

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("👤 {title}"))
            .color(0x0058_65F2)
            .field("Level", format!("⭐ {}", profile.level), true)
            .field("Experience", profile.total_exp.to_string(), true)
            .field("Coins", format!("🪙 {}", profile.coins), true)
            .field(
                "Streak",
                format!(
                    "🔥 {} days (best {})",
                    profile.current_streak, profile.longest_streak
                ),
                true,
            )
            .field("Progress", progress, false)
            .field("Goals", goals, false)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Member since {}",
                profile.created_at.format("%Y-%m-%d")
            )));
        if let Some(username) = &profile.username {
            embed = embed.description(format!("@{username}"));
        }
        if let Some(url) = &profile.avatar_url {
            embed = embed.thumbnail(url);
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Changes your username, display name or avatar URL.
    #[poise::command(slash_command, rename = "edit", check = "checks::profile_area")]
    pub async fn profile_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "New username, 3-20 letters, digits or underscores"]
        username: Option<String>,
        #[description = "New display name, 2-50 characters"] full_name: Option<String>,
        #[description = "Link to an avatar image"] avatar_url: Option<String>,
    ) -> Result<()> {
        if username.is_none() && full_name.is_none() && avatar_url.is_none() {
            ctx.say("Nothing to change. Pass at least one option.").await?;
            return Ok(());
        }

        let user_id = ctx.author().id.to_string();
        let updated = profile::update_profile(
            &ctx.data().database,
            &user_id,
            ProfileUpdate {
                username,
                full_name,
                avatar_url,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Profile updated. Username: {}, display name: {}",
            updated.username.as_deref().unwrap_or("-"),
            updated.full_name.as_deref().unwrap_or("-")
        ))
        .await?;
        Ok(())
    }

    /// Lists the badges you have earned and the ones still locked.
    #[poise::command(slash_command, rename = "badges", check = "checks::profile_area")]
    pub async fn profile_badges(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let earned = badge::earned_badges(db, &user_id).await?;
        let catalog = badge::list_badges(db).await?;
        let earned_ids: HashSet<i64> = earned.iter().map(|(ub, _)| ub.badge_id).collect();

        let mut unlocked = String::new();
        for (user_badge, badge) in &earned {
            if let Some(badge) = badge {
                writeln!(
                    &mut unlocked,
                    "{} **{}** - {} ({})",
                    badge.icon,
                    badge.name,
                    badge.description,
                    user_badge.earned_at.format("%Y-%m-%d")
                )?;
            }
        }
        if unlocked.is_empty() {
            unlocked.push_str("None yet. Record a transaction to get started!");
        }

        let mut locked = String::new();
        for badge in catalog.iter().filter(|b| !earned_ids.contains(&b.id)) {
            writeln!(&mut locked, "🔒 **{}** - {}", badge.name, badge.description)?;
        }
        if locked.is_empty() {
            locked.push_str("You've collected them all!");
        }

        let embed = serenity::CreateEmbed::default()
            .title("🏅 Badges")
            .color(0x00F5_9E0B)
            .field(format!("Earned ({})", earned.len()), unlocked, false)
            .field("Locked", locked, false);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
