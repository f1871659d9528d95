//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions come from the caller's own categories, so users only ever see
//! names they can actually use.

use crate::{
    bot::BotData,
    core::category::{self, RECOMMENDED_CATEGORIES},
    entities::{CategoryModel, EntryKind},
    errors::Error,
};

/// Discord's limit on autocomplete choices
const MAX_CHOICES: usize = 25;

async fn matching_categories(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
    keep: impl Fn(&CategoryModel) -> bool,
) -> Vec<String> {
    let db = &ctx.data().database;
    let user_id = ctx.author().id.to_string();

    let Ok(categories) = category::list_categories(db, &user_id).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    let mut names: Vec<String> = categories
        .into_iter()
        .filter(|c| keep(c) && c.name.to_lowercase().contains(&partial_lower))
        .map(|c| c.name)
        .collect();

    names.sort();
    names.dedup();
    names.truncate(MAX_CHOICES);
    names
}

/// Suggests any of the caller's category names.
pub async fn autocomplete_category(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching_categories(ctx, partial, |_| true).await
}

/// Suggests the caller's income category names.
pub async fn autocomplete_income_category(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching_categories(ctx, partial, |c| c.kind == EntryKind::Income).await
}

/// Suggests the caller's expense category names.
pub async fn autocomplete_expense_category(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching_categories(ctx, partial, |c| c.kind == EntryKind::Expense).await
}

/// Suggests the caller's categories that may be deleted.
pub async fn autocomplete_custom_category(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching_categories(ctx, partial, |c| !c.is_default).await
}

/// Suggests categories from the onboarding recommendation list.
pub async fn autocomplete_recommended_category(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let partial_lower = partial.to_lowercase();

    RECOMMENDED_CATEGORIES
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&partial_lower))
        .map(|r| r.name.to_string())
        .collect()
}
