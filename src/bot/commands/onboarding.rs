//! Onboarding Discord commands - the five-step setup wizard.
//!
//! The wizard opens by itself after `/signup` and on the first `/dashboard`
//! visit of a profile that has not finished it. Each step is rendered as
//! plain text pointing at the commands that act on it.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            budget,
            category::{self, RECOMMENDED_CATEGORIES},
            gamification,
            onboarding::{self, COMPLETION_COINS, COMPLETION_EXP, OnboardingStep},
            profile,
            report::format_currency,
        },
        entities::EntryKind,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Renders one wizard step with its instructions and navigation hints.
    pub fn render_step(step: OnboardingStep) -> Result<String> {
        let mut text = format!("**{step}**\n");
        let body = match step {
            OnboardingStep::Welcome => {
                "Welcome to LedgerQuest! Every income and expense you record earns \
                 experience and coins, and recording every day builds a streak.\n\
                 Let's set up your budget, categories and first transaction."
                    .to_string()
            }
            OnboardingStep::Goal => "Set how much you plan to spend each month and, if you \
                 like, how much you want to save.\n\
                 ➡️ `/onboarding goal <monthly_budget> [saving_goal]`"
                .to_string(),
            OnboardingStep::Category => {
                let mut body = String::from(
                    "You already have default categories. Want more? Suggestions:\n",
                );
                for r in RECOMMENDED_CATEGORIES {
                    let sign = match r.kind {
                        EntryKind::Income => "💰",
                        EntryKind::Expense => "💸",
                    };
                    writeln!(&mut body, "{sign} {}", r.name)?;
                }
                body.push_str(
                    "➡️ `/onboarding add_category <name>` or `/onboarding remove_category <name>`",
                );
                body
            }
            OnboardingStep::FirstTransaction => format!(
                "Record your first transaction. Each one earns at least {} exp and {} coins.\n\
                 ➡️ `/expense <amount> <category>` or `/income <amount> <category>`",
                gamification::MIN_EXP_PER_TRANSACTION,
                gamification::COINS_PER_TRANSACTION
            ),
            OnboardingStep::Gamification => format!(
                "⭐ Every {} exp is a level.\n🔥 Record on consecutive days to grow your \
                 streak.\n🏅 Badges unlock as you record, keep streaks and level up.\n\
                 Finish now for +{COMPLETION_EXP} exp and +{COMPLETION_COINS} coins!\n\
                 ➡️ `/onboarding complete`",
                gamification::EXP_PER_LEVEL
            ),
        };
        text.push_str(&body);

        text.push_str("\n\n");
        if step != OnboardingStep::Welcome {
            text.push_str("`/onboarding prev` · ");
        }
        if !step.is_last() {
            text.push_str("`/onboarding next` · ");
        }
        text.push_str("`/onboarding skip`");
        Ok(text)
    }

    const NOT_RUNNING: &str =
        "The setup wizard isn't running. Use `/onboarding start` to open it.";

    /// Walks you through setting up budgets, categories and your first entry.
    #[poise::command(
        slash_command,
        subcommands(
            "onboarding_start",
            "onboarding_next",
            "onboarding_prev",
            "onboarding_goal",
            "onboarding_add_category",
            "onboarding_remove_category",
            "onboarding_complete",
            "onboarding_skip"
        )
    )]
    pub async fn onboarding(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Use `/onboarding start` to open the setup wizard.")
            .await?;
        Ok(())
    }

    /// Opens the setup wizard, or shows the step you are on.
    #[poise::command(slash_command, rename = "start")]
    pub async fn onboarding_start(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();
        profile::require_profile(&data.database, &user_id).await?;

        let step = data.onboarding.start(&user_id).await;
        ctx.say(render_step(step)?).await?;
        Ok(())
    }

    /// Moves to the next wizard step.
    #[poise::command(slash_command, rename = "next")]
    pub async fn onboarding_next(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let message = match ctx.data().onboarding.next(&user_id).await {
            Some(step) => render_step(step)?,
            None => NOT_RUNNING.to_string(),
        };

        ctx.say(message).await?;
        Ok(())
    }

    /// Moves back to the previous wizard step.
    #[poise::command(slash_command, rename = "prev")]
    pub async fn onboarding_prev(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let message = match ctx.data().onboarding.prev(&user_id).await {
            Some(step) => render_step(step)?,
            None => NOT_RUNNING.to_string(),
        };

        ctx.say(message).await?;
        Ok(())
    }

    /// Sets your monthly budget and saving goal from the wizard.
    #[poise::command(slash_command, rename = "goal")]
    pub async fn onboarding_goal(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Monthly spending budget"] monthly_budget: f64,
        #[description = "Monthly saving goal"] saving_goal: Option<f64>,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let profile =
            budget::set_budget_goals(&ctx.data().database, &user_id, monthly_budget, saving_goal)
                .await?;

        let mut message = format!(
            "✅ Monthly budget: {}",
            format_currency(profile.monthly_budget)
        );
        if let Some(goal) = profile.saving_goal {
            write!(&mut message, " · Saving goal: {}", format_currency(goal))?;
        }
        message.push_str("\nContinue with `/onboarding next`.");

        ctx.say(message).await?;
        Ok(())
    }

    /// Adds a suggested category from the wizard.
    #[poise::command(slash_command, rename = "add_category")]
    pub async fn onboarding_add_category(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Suggested category"]
        #[autocomplete = "autocomplete::autocomplete_recommended_category"]
        name: String,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let created =
            category::add_recommended_category(&ctx.data().database, &user_id, &name).await?;

        ctx.say(format!("✅ Added **{}** ({})", created.name, created.kind))
            .await?;
        Ok(())
    }

    /// Removes a custom category from the wizard.
    #[poise::command(slash_command, rename = "remove_category")]
    pub async fn onboarding_remove_category(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Custom category to remove"]
        #[autocomplete = "autocomplete::autocomplete_custom_category"]
        name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let found = category::find_category_by_name(db, &user_id, &name, None).await?;
        category::delete_category(db, &user_id, found.id).await?;

        ctx.say(format!("🗑️ Removed **{}**", found.name)).await?;
        Ok(())
    }

    /// Finishes the wizard and collects the completion reward.
    #[poise::command(slash_command, rename = "complete")]
    pub async fn onboarding_complete(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();

        let before = profile::require_profile(&data.database, &user_id).await?;
        let after = onboarding::complete_onboarding(&data.database, &user_id).await?;
        data.onboarding.finish(&user_id).await;

        let message = if before.onboarding_completed {
            "You've already finished the setup wizard. Head to `/dashboard`!".to_string()
        } else {
            format!(
                "🎉 Setup complete! +{COMPLETION_EXP} exp and +{COMPLETION_COINS} coins.\n\
                 ⭐ Level {} · 🪙 {} coins. Head to `/dashboard` to see your ledger.",
                after.level, after.coins
            )
        };

        ctx.say(message).await?;
        Ok(())
    }

    /// Skips the wizard without a reward. It won't open by itself again.
    #[poise::command(slash_command, rename = "skip")]
    pub async fn onboarding_skip(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();

        onboarding::skip_onboarding(&data.database, &user_id).await?;
        data.onboarding.finish(&user_id).await;

        ctx.say("⏭️ Setup skipped. Use `/help` any time to see what you can do.")
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::onboarding::OnboardingStep;

    #[test]
    fn test_render_step_navigation() {
        let first = render_step(OnboardingStep::Welcome).unwrap();
        assert!(first.starts_with("**Step 1/5: "));
        assert!(!first.contains("/onboarding prev"));
        assert!(first.contains("/onboarding next"));

        let last = render_step(OnboardingStep::Gamification).unwrap();
        assert!(last.contains("/onboarding prev"));
        assert!(!last.contains("/onboarding next"));
        assert!(last.contains("/onboarding complete"));
    }

    #[test]
    fn test_render_category_step_lists_suggestions() {
        let text = render_step(OnboardingStep::Category).unwrap();
        assert!(text.contains("Cafe/Drinks"));
        assert!(text.contains("Investment Returns"));
    }

    #[test]
    fn test_render_first_transaction_points_to_expense() {
        assert!(render_step(OnboardingStep::FirstTransaction)
            .unwrap()
            .contains("/expense"));
    }
}
