//! General Discord commands - ping and help.
//! These commands don't touch the database and are available to everyone,
//! signed up or not.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    ///
    /// Lists every command group with a one-line description so new users can
    /// find their way around.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**LedgerQuest Help**\n\
        Track your money, earn experience and keep your streak alive.\n\n\
        **Getting Started**\n\
        • `/signup [username] [full_name]` - Create your profile and default categories.\n\
        • `/onboarding start` - Walk through the five-step setup wizard.\n\n\
        **Recording**\n\
        • `/expense <amount> <category> [date] [description]` - Record spending.\n\
        • `/income <amount> <category> [date] [description]` - Record income.\n\
        • `/transactions list|edit|delete` - Browse and fix your history.\n\n\
        **Insights**\n\
        • `/dashboard` - This month at a glance, plus budget alerts.\n\
        • `/trends <view> [year]` - Monthly, category, yearly and weekday trends.\n\
        • `/alerts list|read|read_all` - Your budget alert inbox.\n\n\
        **Setup**\n\
        • `/budget show|set|category` - Monthly budget, saving goal and category caps.\n\
        • `/categories list|add|recommended|delete` - Manage your categories.\n\
        • `/profile show|edit|badges` - Your level, coins, streak and badges.\n\n\
        Every transaction earns at least 5 exp and 10 coins. 1,000 exp = 1 level!";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
