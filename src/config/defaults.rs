//! Default categories and badge catalog loaded from config.toml
//!
//! The categories listed here are copied into every new profile at sign-up.
//! The badges form the global achievement catalog and are seeded once at
//! startup.

use crate::entities::EntryKind;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Categories seeded for every new profile
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// Achievement catalog
    #[serde(default)]
    pub badges: Vec<BadgeConfig>,
}

/// Configuration for a single default category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Name of the category
    pub name: String,
    /// `income` or `expense`
    pub kind: EntryKind,
    /// Hex color
    #[serde(default = "default_color")]
    pub color: String,
    /// Icon name
    pub icon: Option<String>,
}

/// Configuration for a single badge
#[derive(Debug, Deserialize, Clone)]
pub struct BadgeConfig {
    /// Unique badge name
    pub name: String,
    /// What the badge is awarded for
    pub description: String,
    /// Emoji or icon name
    pub icon: String,
    /// Hex color
    pub color: Option<String>,
    /// `transactions`, `streak` or `level`
    pub requirement_type: String,
    /// Value the requirement must reach
    pub requirement_value: i64,
    /// Experience granted when earned
    #[serde(default)]
    pub exp_reward: i64,
    /// Coins granted when earned
    #[serde(default)]
    pub coin_reward: i64,
}

fn default_color() -> String {
    "#6B7280".to_string()
}

/// Loads the ledger configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading configuration from {}", path_ref.display());
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the configuration named by `LEDGER_CONFIG`, or `./config.toml`
pub fn load_default_config() -> Result<Config> {
    let path =
        std::env::var("LEDGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_ledger_config() {
        let toml_str = r##"
            [[categories]]
            name = "Food"
            kind = "expense"
            color = "#FF6B6B"
            icon = "Utensils"

            [[categories]]
            name = "Salary"
            kind = "income"

            [[badges]]
            name = "First Steps"
            description = "Record your first transaction"
            icon = "🐣"
            requirement_type = "transactions"
            requirement_value = 1
            coin_reward = 50
        "##;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[0].name, "Food");
        assert_eq!(config.categories[0].kind, EntryKind::Expense);
        assert_eq!(config.categories[0].icon.as_deref(), Some("Utensils"));

        assert_eq!(config.categories[1].kind, EntryKind::Income);
        assert_eq!(config.categories[1].color, "#6B7280");

        assert_eq!(config.badges.len(), 1);
        assert_eq!(config.badges[0].requirement_value, 1);
        assert_eq!(config.badges[0].exp_reward, 0);
        assert_eq!(config.badges[0].coin_reward, 50);
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let toml_str = r#"
            [[categories]]
            name = "Odd"
            kind = "transfer"
        "#;

        let result: std::result::Result<Config, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
        assert!(config.categories.iter().any(|c| c.kind == EntryKind::Income));
        assert!(config.categories.iter().any(|c| c.kind == EntryKind::Expense));
        assert!(
            config
                .badges
                .iter()
                .all(|b| matches!(b.requirement_type.as_str(), "transactions" | "streak" | "level"))
        );
    }
}
