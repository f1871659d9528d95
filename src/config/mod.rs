/// Database configuration and connection management
pub mod database;

/// Default categories and badge catalog loaded from config.toml
pub mod defaults;
