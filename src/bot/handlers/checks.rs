//! Access checks backed by the route guard.
//!
//! Each command area maps to a logical path. When the guard redirects, the
//! caller gets a hint pointing at the right command and the command is
//! skipped.

use crate::{
    bot::BotData,
    core::{
        guard::{self, Access},
        profile,
    },
    errors::{Error, Result},
};
use tracing::debug;

async fn enforce(ctx: poise::Context<'_, BotData, Error>, path: &str) -> Result<bool> {
    let user_id = ctx.author().id.to_string();
    let has_session = profile::has_session(&ctx.data().database, &user_id).await?;

    match guard::check(path, has_session) {
        Access::Proceed => Ok(true),
        Access::Redirect(target) => {
            debug!(user_id, path, target, "Guard redirect");
            let hint = if target == guard::LOGIN_PATH {
                "🔒 You don't have a profile yet. Use `/signup` to create one."
            } else {
                "✅ You're already signed up. Head to `/dashboard` to see your ledger."
            };
            ctx.send(poise::CreateReply::default().content(hint).ephemeral(true))
                .await?;
            Ok(false)
        }
    }
}

/// Check for dashboard-area commands
pub async fn dashboard_area(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
    enforce(ctx, "/dashboard").await
}

/// Check for transaction-area commands
pub async fn transactions_area(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
    enforce(ctx, "/transactions").await
}

/// Check for profile-area commands
pub async fn profile_area(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
    enforce(ctx, "/profile").await
}

/// Check for sign-up, which only makes sense without a profile
pub async fn signup_area(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
    enforce(ctx, "/signup").await
}
