//! Unified error type for `LedgerQuest`.
//!
//! Every core operation returns [`Result`]; the bot layer logs the error and
//! replies with its display text.

use thiserror::Error;

/// All errors produced by the ledger, its storage and the Discord layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable cause
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Amount is zero, negative, NaN or infinite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A user-supplied field failed validation
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Why it was rejected
        message: String,
    },

    /// No profile exists for this user (not signed up)
    #[error("No profile found for user {user_id}. Use `/signup` first.")]
    ProfileNotFound {
        /// Discord user id
        user_id: String,
    },

    /// Sign-up attempted twice
    #[error("A profile already exists for user {user_id}")]
    ProfileExists {
        /// Discord user id
        user_id: String,
    },

    /// Category id/name does not resolve to one of the user's categories
    #[error("Category '{name}' not found")]
    CategoryNotFound {
        /// Name or id that was looked up
        name: String,
    },

    /// Default categories cannot be deleted
    #[error("Category '{name}' is a default category and cannot be deleted")]
    DefaultCategoryLocked {
        /// Category name
        name: String,
    },

    /// Transaction id does not resolve to one of the user's transactions
    #[error("Transaction {id} not found")]
    TransactionNotFound {
        /// Transaction id
        id: i64,
    },

    /// Environment variable missing or malformed
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Writing a reply into a `String` failed
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Numeric conversion overflowed
    #[error("Conversion error: {0}")]
    Conversion(#[from] std::num::TryFromIntError),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
