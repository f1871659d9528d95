//! Insight Discord commands - `dashboard`, `trends` and `alerts`.
//!
//! These render the aggregates computed in [`crate::core::stats`] and
//! [`crate::core::report`] as embeds and text bar charts.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::onboarding::render_step, handlers::checks},
        core::{
            alert, onboarding,
            report::{
                self, format_bar_row, format_currency, format_progress_bar,
                format_transaction_line,
            },
            stats,
        },
        errors::{Error, Result},
    };
    use chrono::{Datelike, Utc};
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Width of text bar charts, in cells
    const BAR_WIDTH: usize = 12;
    /// Categories and transactions shown on the dashboard
    const DASHBOARD_ROWS: usize = 5;

    fn code_block(body: &str) -> String {
        format!("```\n{body}```")
    }

    /// Shows this month at a glance: level, budget, top spending and alerts.
    #[allow(clippy::too_many_lines)]
    #[poise::command(slash_command, check = "checks::dashboard_area")]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();
        let today = Utc::now().date_naive();

        let dashboard = report::generate_dashboard(&data.database, &user_id, today).await?;
        let profile = &dashboard.profile;

        let mut player = format!(
            "⭐ Level {} · 🪙 {} coins\n{}",
            dashboard.level.level,
            profile.coins,
            format_progress_bar(dashboard.level.percent, Some(BAR_WIDTH))
        );
        write!(
            &mut player,
            "\n🔥 {} day streak (best {})",
            profile.current_streak, profile.longest_streak
        )?;
        if let Some(label) = dashboard.streak_tier.label() {
            write!(&mut player, " · {label}")?;
        }

        let summary = &dashboard.summary;
        let mut month = format!(
            "💰 Income {}\n💸 Expense {}\n📈 Net {}\n🧾 {} transactions",
            format_currency(summary.income),
            format_currency(summary.expense),
            format_currency(summary.net),
            summary.count
        );
        if summary.expense_change != 0.0 {
            let arrow = if summary.expense_change > 0.0 { "▲" } else { "▼" };
            write!(
                &mut month,
                "\n{arrow} {:.1}% spending vs last month",
                summary.expense_change.abs()
            )?;
        }

        let budget = &dashboard.budget;
        let budget_text = if budget.budget > 0.0 {
            format!(
                "{}\n{} of {} ({})",
                format_progress_bar(budget.percentage, Some(BAR_WIDTH)),
                format_currency(budget.spent),
                format_currency(budget.budget),
                budget.status.label()
            )
        } else {
            "Not set. Use `/budget set`.".to_string()
        };

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("📊 Dashboard · {}", summary.month))
            .color(0x0058_65F2)
            .field("Player", player, false)
            .field("This month", month, true)
            .field("Budget", budget_text, true);

        if let Some(largest) = dashboard.category_expenses.first() {
            let max = largest.amount;
            let mut rows = String::new();
            for item in dashboard.category_expenses.iter().take(DASHBOARD_ROWS) {
                writeln!(
                    &mut rows,
                    "{}",
                    format_bar_row(&item.category, item.amount, max, BAR_WIDTH)
                )?;
            }
            embed = embed.field("Top spending", code_block(&rows), false);
        }

        if !dashboard.recent.is_empty() {
            let mut lines = String::new();
            for (tx, category) in dashboard.recent.iter().take(DASHBOARD_ROWS) {
                writeln!(&mut lines, "{}", format_transaction_line(tx, category.as_ref()))?;
            }
            embed = embed.field("Recent transactions", lines, false);
        }

        if !dashboard.alerts.is_empty() {
            let mut lines = String::new();
            for (alert, category) in &dashboard.alerts {
                writeln!(
                    &mut lines,
                    "`#{}` {}",
                    alert.id,
                    report::format_alert(alert, category.as_ref())
                )?;
            }
            lines.push_str("Dismiss with `/alerts read`.");
            embed = embed.field("Alerts", lines, false);
        }

        let mut reply = poise::CreateReply::default().embed(embed);
        if onboarding::should_auto_start(profile)
            && data.onboarding.current(&user_id).await.is_none()
        {
            let step = data.onboarding.start(&user_id).await;
            reply = reply.content(format!(
                "👋 Looks like you haven't finished setting up.\n\n{}",
                render_step(step)?
            ));
        }

        ctx.send(reply).await?;
        Ok(())
    }

    /// Which trend chart to draw
    #[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
    pub enum TrendView {
        #[name = "monthly"]
        Monthly,
        #[name = "categories"]
        Categories,
        #[name = "yearly"]
        Yearly,
        #[name = "patterns"]
        Patterns,
    }

    /// Charts income and spending over time.
    #[poise::command(slash_command)]
    pub async fn trends(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Chart to show"] view: TrendView,
        #[description = "Year to chart (defaults to this year)"] year: Option<i32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();
        let today = Utc::now().date_naive();
        let year = year.unwrap_or_else(|| today.year());

        let (title, body) = match view {
            TrendView::Monthly => {
                let trend = stats::monthly_trend(db, &user_id, year).await?;
                let max = trend
                    .iter()
                    .map(|m| m.income.max(m.expense))
                    .fold(0.0, f64::max);
                let mut rows = String::new();
                for m in &trend {
                    writeln!(
                        &mut rows,
                        "{}",
                        format_bar_row(&format!("{} in", m.month), m.income, max, BAR_WIDTH)
                    )?;
                    writeln!(
                        &mut rows,
                        "{}",
                        format_bar_row(&format!("{} out", m.month), m.expense, max, BAR_WIDTH)
                    )?;
                }
                (format!("📈 Monthly trend {year}"), code_block(&rows))
            }
            TrendView::Categories => {
                let trend = stats::category_trend(db, &user_id, year).await?;
                let max = trend.iter().map(|c| c.total).fold(0.0, f64::max);
                let mut rows = String::new();
                for c in &trend {
                    writeln!(&mut rows, "{}", format_bar_row(&c.name, c.total, max, BAR_WIDTH))?;
                }
                if rows.is_empty() {
                    rows.push_str("No spending recorded.\n");
                }
                (format!("🗂️ Spending by category {year}"), code_block(&rows))
            }
            TrendView::Yearly => {
                let comparison = stats::yearly_comparison(db, &user_id, year).await?;
                let mut rows = String::new();
                for y in &comparison.years {
                    writeln!(
                        &mut rows,
                        "{}  in {:>14}  out {:>14}  net {:>14}",
                        y.year,
                        format_currency(y.income),
                        format_currency(y.expense),
                        format_currency(y.net)
                    )?;
                }
                writeln!(
                    &mut rows,
                    "\nGrowth: income {:+.1}%, expense {:+.1}%",
                    comparison.growth.income, comparison.growth.expense
                )?;
                (format!("📅 Yearly comparison {year}"), code_block(&rows))
            }
            TrendView::Patterns => {
                let patterns = stats::spending_patterns(db, &user_id, today).await?;
                let max = patterns
                    .by_weekday
                    .iter()
                    .map(|d| d.amount)
                    .fold(0.0, f64::max);
                let mut rows = String::new();
                for d in &patterns.by_weekday {
                    writeln!(
                        &mut rows,
                        "{} {:>5.1}%",
                        format_bar_row(d.day, d.amount, max, BAR_WIDTH),
                        d.percentage
                    )?;
                }
                writeln!(
                    &mut rows,
                    "\nPer spending day: avg {} · max {} · min {}",
                    format_currency(patterns.daily.average),
                    format_currency(patterns.daily.max),
                    format_currency(patterns.daily.min)
                )?;
                (
                    format!("🗓️ Spending patterns, last {} days", stats::PATTERN_WINDOW_DAYS),
                    code_block(&rows),
                )
            }
        };

        let embed = serenity::CreateEmbed::default()
            .title(title)
            .description(body)
            .color(0x0045_B7D1);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Lists and dismisses budget alerts.
    #[poise::command(
        slash_command,
        subcommands("alerts_list", "alerts_read", "alerts_read_all")
    )]
    pub async fn alerts(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Alert commands:\n\
            `/alerts list` - Unread alerts from the last 7 days\n\
            `/alerts read` - Dismiss one alert by id\n\
            `/alerts read_all` - Dismiss every alert";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Checks your budgets and lists unread alerts from the last week.
    #[poise::command(slash_command, rename = "list")]
    pub async fn alerts_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        alert::check_budget_alerts(db, &user_id, Utc::now().date_naive()).await?;
        let alerts = alert::unread_alerts(db, &user_id).await?;

        if alerts.is_empty() {
            ctx.say("🔔 No unread alerts. Your budgets look fine!").await?;
            return Ok(());
        }

        let mut lines = String::new();
        for (alert, category) in &alerts {
            writeln!(
                &mut lines,
                "`#{}` {} · {}",
                alert.id,
                report::format_alert(alert, category.as_ref()),
                alert.created_at.format("%Y-%m-%d")
            )?;
        }

        ctx.say(lines).await?;
        Ok(())
    }

    /// Marks one alert as read.
    #[poise::command(slash_command, rename = "read")]
    pub async fn alerts_read(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Alert id"] id: i64,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let message = if alert::mark_read(&ctx.data().database, &user_id, id).await? {
            format!("✅ Alert #{id} dismissed")
        } else {
            format!("❌ Alert #{id} not found")
        };

        ctx.say(message).await?;
        Ok(())
    }

    /// Marks every alert as read.
    #[poise::command(slash_command, rename = "read_all")]
    pub async fn alerts_read_all(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let count = alert::mark_all_read(&ctx.data().database, &user_id).await?;

        ctx.say(format!("✅ Dismissed {count} alerts")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
