//! Category Discord commands - `categories` and its subcommands.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::transaction::KindChoice, handlers::autocomplete},
        core::{
            category::{self, NewCategory, RECOMMENDED_CATEGORIES},
            stats,
        },
        entities::{CategoryModel, EntryKind},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    fn category_lines(categories: &[CategoryModel], kind: EntryKind) -> Result<String> {
        let mut lines = String::new();
        for c in categories.iter().filter(|c| c.kind == kind) {
            write!(&mut lines, "• **{}** `{}`", c.name, c.color)?;
            if c.is_default {
                lines.push_str(" (default)");
            }
            lines.push('\n');
        }
        if lines.is_empty() {
            lines.push_str("None");
        }
        Ok(lines)
    }

    /// Lists, adds and deletes your categories.
    #[poise::command(
        slash_command,
        subcommands(
            "categories_list",
            "categories_add",
            "categories_recommended",
            "categories_delete"
        )
    )]
    pub async fn categories(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Category commands:\n\
            `/categories list` - Your income and expense categories\n\
            `/categories add` - Create a custom category\n\
            `/categories recommended` - Add one of the suggested categories\n\
            `/categories delete` - Remove a custom category";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows your income and expense categories.
    #[poise::command(slash_command, rename = "list")]
    pub async fn categories_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let categories = category::list_categories(&ctx.data().database, &user_id).await?;

        if categories.is_empty() {
            ctx.say("📂 No categories yet. Use `/signup` or `/categories add`.")
                .await?;
            return Ok(());
        }

        let embed = serenity::CreateEmbed::default()
            .title("📂 Categories")
            .color(0x0045_B7D1)
            .field(
                "💰 Income",
                category_lines(&categories, EntryKind::Income)?,
                false,
            )
            .field(
                "💸 Expense",
                category_lines(&categories, EntryKind::Expense)?,
                false,
            );

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Creates a custom income or expense category.
    #[poise::command(slash_command, rename = "add")]
    pub async fn categories_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category name, up to 30 characters"] name: String,
        #[description = "Income or expense"] kind: KindChoice,
        #[description = "Hex color like #FF6B6B"] color: Option<String>,
        #[description = "Icon name"] icon: Option<String>,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let created = category::create_category(
            &ctx.data().database,
            &user_id,
            NewCategory {
                name,
                kind: kind.into(),
                color: color.unwrap_or_else(|| stats::UNCATEGORIZED_COLOR.to_string()),
                icon,
            },
            false,
        )
        .await?;

        ctx.say(format!(
            "✅ Created {} category **{}** ({})",
            created.kind, created.name, created.color
        ))
        .await?;
        Ok(())
    }

    /// Adds one of the suggested categories, or lists them.
    #[poise::command(slash_command, rename = "recommended")]
    pub async fn categories_recommended(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Suggested category to add (leave empty to list them)"]
        #[autocomplete = "autocomplete::autocomplete_recommended_category"]
        name: Option<String>,
    ) -> Result<()> {
        let Some(name) = name else {
            let mut list = String::from("Suggested categories:\n");
            for r in RECOMMENDED_CATEGORIES {
                writeln!(&mut list, "• **{}** ({})", r.name, r.kind)?;
            }
            ctx.say(list).await?;
            return Ok(());
        };

        let user_id = ctx.author().id.to_string();
        let created =
            category::add_recommended_category(&ctx.data().database, &user_id, &name).await?;

        ctx.say(format!("✅ Added **{}** to your {} categories", created.name, created.kind))
            .await?;
        Ok(())
    }

    /// Deletes a custom category. Its transactions become uncategorized.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn categories_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Custom category to delete"]
        #[autocomplete = "autocomplete::autocomplete_custom_category"]
        name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let found = category::find_category_by_name(db, &user_id, &name, None).await?;
        category::delete_category(db, &user_id, found.id).await?;

        ctx.say(format!(
            "🗑️ Deleted **{}**. Its transactions are now {}.",
            found.name,
            stats::UNCATEGORIZED.to_lowercase()
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
