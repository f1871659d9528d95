//! Budget Discord commands - monthly budget, saving goal and category caps.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            budget::{self, BudgetStatus},
            category,
            period::Month,
            report::{format_currency, format_progress_bar},
        },
        entities::EntryKind,
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    const fn status_icon(status: BudgetStatus) -> &'static str {
        match status {
            BudgetStatus::OnTrack => "🟢",
            BudgetStatus::Caution => "🟡",
            BudgetStatus::Over => "🔴",
        }
    }

    /// Shows and sets your monthly budget, saving goal and category caps.
    #[poise::command(
        slash_command,
        subcommands("budget_show", "budget_set", "budget_category")
    )]
    pub async fn budget(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Budget commands:\n\
            `/budget show` - This month's spending against your budgets\n\
            `/budget set` - Set the monthly budget and saving goal\n\
            `/budget category` - Cap spending in one expense category (0 removes the cap)";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows this month's spending against your budget and category caps.
    #[poise::command(slash_command, rename = "show")]
    pub async fn budget_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month as YYYY-MM (defaults to this month)"] month: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();
        let month = match month.as_deref() {
            Some(input) => input.parse::<Month>()?,
            None => Month::containing(Utc::now().date_naive()),
        };

        let progress = budget::budget_progress(db, &user_id, month).await?;
        let caps = budget::category_budget_progress(db, &user_id, month).await?;

        let overall = if progress.budget > 0.0 {
            format!(
                "{} {}\n{} of {} spent, {} left ({})",
                status_icon(progress.status),
                format_progress_bar(progress.percentage, Some(12)),
                format_currency(progress.spent),
                format_currency(progress.budget),
                format_currency(progress.remaining),
                progress.status.label()
            )
        } else {
            format!(
                "No monthly budget set. Spent {} so far.\nUse `/budget set` to add one.",
                format_currency(progress.spent)
            )
        };

        let saving = progress.saving.map_or_else(
            || "No saving goal set.".to_string(),
            |s| {
                format!(
                    "{}\n{} of {} saved",
                    format_progress_bar(s.percentage, Some(12)),
                    format_currency(s.saved),
                    format_currency(s.goal)
                )
            },
        );

        let mut cap_lines = String::new();
        for item in &caps.items {
            writeln!(
                &mut cap_lines,
                "{} **{}** {} / {} ({:.0}%)",
                status_icon(item.status),
                item.category.name,
                format_currency(item.spent),
                format_currency(item.budget),
                item.percentage
            )?;
        }
        if cap_lines.is_empty() {
            cap_lines.push_str("No category caps. Use `/budget category` to add one.");
        } else {
            write!(
                &mut cap_lines,
                "\nAllocated {} · Unallocated {}",
                format_currency(caps.allocated),
                format_currency(caps.unallocated)
            )?;
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("💼 Budget for {month}"))
            .color(0x00F5_9E0B)
            .field("Monthly budget", overall, false)
            .field("Saving goal", saving, false)
            .field("Category caps", cap_lines, false);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Sets your monthly budget and, optionally, a saving goal.
    #[poise::command(slash_command, rename = "set")]
    pub async fn budget_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Monthly spending budget"] monthly_budget: f64,
        #[description = "Monthly saving goal (0 clears it)"] saving_goal: Option<f64>,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let profile =
            budget::set_budget_goals(&ctx.data().database, &user_id, monthly_budget, saving_goal)
                .await?;

        ctx.say(format!(
            "✅ Monthly budget set to {}. Saving goal: {}",
            format_currency(profile.monthly_budget),
            profile
                .saving_goal
                .map_or_else(|| "none".to_string(), format_currency)
        ))
        .await?;
        Ok(())
    }

    /// Caps monthly spending in one expense category. An amount of 0 removes the cap.
    #[poise::command(slash_command, rename = "category")]
    pub async fn budget_category(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense category"]
        #[autocomplete = "autocomplete::autocomplete_expense_category"]
        category: String,
        #[description = "Monthly cap (0 removes it)"] amount: f64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let found =
            category::find_category_by_name(db, &user_id, &category, Some(EntryKind::Expense))
                .await?;
        let cap = budget::set_category_budget(db, &user_id, found.id, amount).await?;

        let message = match cap {
            Some(cap) => format!(
                "✅ **{}** is capped at {} per month",
                found.name,
                format_currency(cap.amount)
            ),
            None => format!("✅ Removed the cap on **{}**", found.name),
        };
        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
