//! Core business logic - framework-agnostic ledger, budget, gamification and
//! reporting operations. Nothing in here knows about Discord.

/// Budget alert threshold detection and alert inbox
pub mod alert;
/// Achievement catalog and badge awarding
pub mod badge;
/// Monthly budget, saving goal and per-category caps
pub mod budget;
/// Category management and sign-up defaults
pub mod category;
/// Experience, levels, coins and streaks
pub mod gamification;
/// Access rules for protected and auth-only areas
pub mod guard;
/// First-run wizard state machine and rewards
pub mod onboarding;
/// Calendar month arithmetic
pub mod period;
/// Profile creation and editing
pub mod profile;
/// Dashboard assembly and text formatting helpers
pub mod report;
/// Aggregations over transactions
pub mod stats;
/// Transaction recording, editing and listing
pub mod transaction;
