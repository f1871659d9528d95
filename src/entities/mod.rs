//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the ledger tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod badge;
pub mod budget_alert;
pub mod category;
pub mod category_budget;
pub mod kinds;
pub mod profile;
pub mod transaction;
pub mod user_badge;

// Re-export specific types to avoid conflicts
pub use badge::{Column as BadgeColumn, Entity as Badge, Model as BadgeModel};
pub use budget_alert::{
    Column as BudgetAlertColumn, Entity as BudgetAlert, Model as BudgetAlertModel,
};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use category_budget::{
    Column as CategoryBudgetColumn, Entity as CategoryBudget, Model as CategoryBudgetModel,
};
pub use kinds::{AlertType, EntryKind};
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use user_badge::{Column as UserBadgeColumn, Entity as UserBadge, Model as UserBadgeModel};
