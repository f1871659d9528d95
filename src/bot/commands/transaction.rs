//! Transaction Discord commands - `income`, `expense` and `transactions`.
//!
//! Recording goes through the core reward path, so every reply also reports
//! the experience, coins, level-ups and badges the entry earned.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::{autocomplete, checks}},
        core::{
            category,
            gamification::{self, StreakTier},
            period::{self, Month},
            report,
            transaction::{self, NewTransaction, TransactionFilter, TransactionUpdate},
        },
        entities::EntryKind,
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Income or expense, as offered in slash command choices
    #[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
    pub enum KindChoice {
        #[name = "income"]
        Income,
        #[name = "expense"]
        Expense,
    }

    impl From<KindChoice> for EntryKind {
        fn from(choice: KindChoice) -> Self {
            match choice {
                KindChoice::Income => Self::Income,
                KindChoice::Expense => Self::Expense,
            }
        }
    }

    async fn record(
        ctx: poise::Context<'_, BotData, Error>,
        kind: EntryKind,
        amount: f64,
        category_name: &str,
        date: Option<String>,
        description: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let date = match date.as_deref() {
            Some(input) => period::parse_date(input)?,
            None => Utc::now().date_naive(),
        };
        let category = category::find_category_by_name(db, &user_id, category_name, Some(kind))
            .await?;

        let recorded = transaction::create_transaction(
            db,
            &user_id,
            NewTransaction {
                category_id: category.id,
                amount,
                kind,
                date,
                description,
            },
        )
        .await?;

        let tx = &recorded.transaction;
        let mut message = format!(
            "✅ Recorded {} in **{}** on {} (#{})\n✨ +{} exp · 🪙 +{} coins",
            report::format_signed_amount(tx.kind, tx.amount),
            category.name,
            tx.date.format("%Y-%m-%d"),
            tx.id,
            tx.exp_gained,
            gamification::COINS_PER_TRANSACTION
        );
        if recorded.leveled_up {
            write!(
                &mut message,
                "\n🎉 Level up! You're now level {}",
                recorded.profile.level
            )?;
        }
        for badge in &recorded.new_badges {
            write!(
                &mut message,
                "\n🏅 Badge unlocked: {} **{}** (+{} exp, +{} coins)",
                badge.icon, badge.name, badge.exp_reward, badge.coin_reward
            )?;
        }
        if let Some(label) = StreakTier::for_days(recorded.profile.current_streak).label() {
            write!(
                &mut message,
                "\n{label} {} day streak",
                recorded.profile.current_streak
            )?;
        }

        ctx.say(message).await?;
        Ok(())
    }

    /// Records money coming in.
    #[poise::command(slash_command, check = "checks::transactions_area")]
    pub async fn income(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Amount received"] amount: f64,
        #[description = "Income category"]
        #[autocomplete = "autocomplete::autocomplete_income_category"]
        category: String,
        #[description = "Date as YYYY-MM-DD (defaults to today)"] date: Option<String>,
        #[description = "Optional note"] description: Option<String>,
    ) -> Result<()> {
        record(ctx, EntryKind::Income, amount, &category, date, description).await
    }

    /// Records money going out.
    #[poise::command(slash_command, check = "checks::transactions_area")]
    pub async fn expense(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Amount spent"] amount: f64,
        #[description = "Expense category"]
        #[autocomplete = "autocomplete::autocomplete_expense_category"]
        category: String,
        #[description = "Date as YYYY-MM-DD (defaults to today)"] date: Option<String>,
        #[description = "Optional note"] description: Option<String>,
    ) -> Result<()> {
        record(ctx, EntryKind::Expense, amount, &category, date, description).await
    }

    /// Lists, edits and deletes recorded transactions.
    #[poise::command(
        slash_command,
        subcommands("transactions_list", "transactions_edit", "transactions_delete"),
        check = "checks::transactions_area"
    )]
    pub async fn transactions(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Transaction commands:\n\
            `/transactions list` - Browse with search, category, kind and month filters\n\
            `/transactions edit` - Change a transaction by id\n\
            `/transactions delete` - Remove a transaction by id";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows your transactions, newest first, 20 per page.
    #[poise::command(slash_command, rename = "list", check = "checks::transactions_area")]
    pub async fn transactions_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Text to look for in descriptions"] search: Option<String>,
        #[description = "Only this category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "Only income or only expense"] kind: Option<KindChoice>,
        #[description = "Only this month, as YYYY-MM"] month: Option<String>,
        #[description = "Page number, starting at 1"]
        #[min = 1]
        page: Option<u64>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();
        let kind = kind.map(EntryKind::from);

        let category_id = match category.as_deref() {
            Some(name) => Some(
                category::find_category_by_name(db, &user_id, name, kind)
                    .await?
                    .id,
            ),
            None => None,
        };
        let month = month.as_deref().map(str::parse::<Month>).transpose()?;

        let filter = TransactionFilter {
            search: search.clone(),
            category_id,
            kind,
            month,
            page: page.unwrap_or(1).saturating_sub(1),
        };
        let page = transaction::list_transactions(db, &user_id, &filter).await?;

        if page.items.is_empty() {
            let message = if page.total == 0 {
                "📭 No transactions match. Record one with `/income` or `/expense`."
            } else {
                "📭 That page is empty."
            };
            ctx.say(message).await?;
            return Ok(());
        }

        let mut lines = String::new();
        for (tx, category) in &page.items {
            writeln!(
                &mut lines,
                "{}",
                report::format_transaction_line(tx, category.as_ref())
            )?;
        }

        let mut filters = Vec::new();
        if let Some(search) = &search {
            filters.push(format!("search \"{search}\""));
        }
        if let Some(name) = &category {
            filters.push(format!("category {name}"));
        }
        if let Some(kind) = kind {
            filters.push(kind.to_string());
        }
        if let Some(month) = month {
            filters.push(month.to_string());
        }

        let mut embed = serenity::CreateEmbed::default()
            .title("📒 Transactions")
            .description(lines)
            .color(0x0010_B981)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Page {}/{} · {} transactions",
                page.page + 1,
                page.total_pages.max(1),
                page.total
            )));
        if !filters.is_empty() {
            embed = embed.field("Filters", filters.join(", "), false);
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Changes the amount, category, date or note of a transaction.
    #[poise::command(slash_command, rename = "edit", check = "checks::transactions_area")]
    pub async fn transactions_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Transaction id, as shown in the list"] id: i64,
        #[description = "New amount"] amount: Option<f64>,
        #[description = "New kind"] kind: Option<KindChoice>,
        #[description = "New category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "New date as YYYY-MM-DD"] date: Option<String>,
        #[description = "New note"] description: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let existing = transaction::get_transaction(db, &user_id, id).await?;
        let kind = kind.map(EntryKind::from);
        let category_id = match category.as_deref() {
            Some(name) => Some(
                category::find_category_by_name(
                    db,
                    &user_id,
                    name,
                    Some(kind.unwrap_or(existing.kind)),
                )
                .await?
                .id,
            ),
            None => None,
        };
        let date = date.as_deref().map(period::parse_date).transpose()?;

        let updated = transaction::update_transaction(
            db,
            &user_id,
            id,
            TransactionUpdate {
                category_id,
                amount,
                kind,
                date,
                description,
            },
        )
        .await?;
        let category = match updated.category_id {
            Some(category_id) => category::get_category(db, &user_id, category_id).await.ok(),
            None => None,
        };

        ctx.say(format!(
            "✅ Updated: {}",
            report::format_transaction_line(&updated, category.as_ref())
        ))
        .await?;
        Ok(())
    }

    /// Deletes a transaction. Rewards already earned are kept.
    #[poise::command(slash_command, rename = "delete", check = "checks::transactions_area")]
    pub async fn transactions_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Transaction id, as shown in the list"] id: i64,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        transaction::delete_transaction(&ctx.data().database, &user_id, id).await?;

        ctx.say(format!("🗑️ Deleted transaction #{id}")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
