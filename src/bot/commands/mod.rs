//! Discord command implementations organized by area.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Monthly budget, saving goal and category caps
pub mod budget;

/// Category management
pub mod category;

/// Dashboard, trends and budget alerts
pub mod dashboard;

/// General utility commands
pub mod general;

/// First-run wizard
pub mod onboarding;

/// Sign-up and profile commands
pub mod profile;

/// Transaction commands
pub mod transaction;

// Export commands
pub use budget::*;
pub use category::*;
pub use dashboard::*;
pub use general::*;
pub use onboarding::*;
pub use profile::*;
pub use transaction::*;
