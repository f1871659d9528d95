//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions that are not
//! commands themselves: parameter autocomplete and per-command access checks.

/// Autocomplete handlers for category names
pub mod autocomplete;
/// Access checks backed by the route guard
pub mod checks;
