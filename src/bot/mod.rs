//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for `LedgerQuest`, including all
//! slash commands, autocomplete handlers, access checks and the bot context.

/// Discord command implementations grouped by area
pub mod commands;
/// Discord interaction handlers (autocomplete, access checks)
pub mod handlers;

use crate::{config::defaults::Config, core::onboarding::OnboardingSessions, errors::Error};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the loaded configuration and
/// the onboarding wizard state that commands need to access.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Default categories and badge catalog
    pub config: Config,
    /// Which onboarding step each user is on
    pub onboarding: OnboardingSessions,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection
    /// and configuration, with no onboarding wizards running.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: Config) -> Self {
        Self {
            database,
            config,
            onboarding: OnboardingSessions::new(),
        }
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().qualified_name, error);
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Every slash command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::signup(),
        commands::profile(),
        commands::income(),
        commands::expense(),
        commands::transactions(),
        commands::categories(),
        commands::budget(),
        commands::dashboard(),
        commands::trends(),
        commands::alerts(),
        commands::onboarding(),
    ]
}

/// Connects to Discord and serves commands until the client stops.
#[instrument(skip_all)]
pub async fn run_bot(token: String, data: BotData) -> Result<(), Error> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!(
                    "Registered {} commands globally",
                    framework.options().commands.len()
                );
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
