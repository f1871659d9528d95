//! Shared test utilities for `LedgerQuest`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::defaults::CategoryConfig,
    core::{
        category::{self, NewCategory},
        profile,
        transaction::{self, NewTransaction, RecordedTransaction},
    },
    entities::{CategoryModel, EntryKind, ProfileModel, TransactionModel, transaction as tx},
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Id of the profile created by [`setup_with_profile`]
pub const TEST_USER: &str = "test_user";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Default categories seeded into test profiles: two income, three expense.
#[must_use]
pub fn test_default_categories() -> Vec<CategoryConfig> {
    [
        ("Salary", EntryKind::Income, "#10B981"),
        ("Bonus", EntryKind::Income, "#34D399"),
        ("Food", EntryKind::Expense, "#EF4444"),
        ("Transport", EntryKind::Expense, "#3B82F6"),
        ("Housing", EntryKind::Expense, "#8B5CF6"),
    ]
    .into_iter()
    .map(|(name, kind, color)| CategoryConfig {
        name: name.to_string(),
        kind,
        color: color.to_string(),
        icon: None,
    })
    .collect()
}

/// Signs up a test profile with the [`test_default_categories`].
pub async fn create_test_profile(db: &DatabaseConnection, user_id: &str) -> Result<ProfileModel> {
    profile::create_profile(db, user_id, None, None, &test_default_categories()).await
}

/// Creates a non-default category with a fixed color.
pub async fn create_test_category(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    kind: EntryKind,
) -> Result<CategoryModel> {
    category::create_category(
        db,
        user_id,
        NewCategory {
            name: name.to_string(),
            kind,
            color: "#123ABC".to_string(),
            icon: None,
        },
        false,
    )
    .await
}

/// Records a transaction dated today through the normal reward path.
///
/// The kind follows the category's kind.
pub async fn create_test_recorded(
    db: &DatabaseConnection,
    user_id: &str,
    category_id: i64,
    amount: f64,
) -> Result<RecordedTransaction> {
    let category = category::get_category(db, user_id, category_id).await?;
    transaction::create_transaction(
        db,
        user_id,
        NewTransaction {
            category_id,
            amount,
            kind: category.kind,
            date: Utc::now().date_naive(),
            description: Some("Test transaction".to_string()),
        },
    )
    .await
}

/// Like [`create_test_recorded`] but returns only the inserted row.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    category_id: i64,
    amount: f64,
) -> Result<TransactionModel> {
    Ok(create_test_recorded(db, user_id, category_id, amount)
        .await?
        .transaction)
}

/// Inserts a transaction row directly, without rewards or validation.
///
/// Use this to place transactions on arbitrary dates for aggregation tests.
pub async fn insert_raw_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    category_id: Option<i64>,
    kind: EntryKind,
    amount: f64,
    date: NaiveDate,
) -> Result<TransactionModel> {
    let now = Utc::now();
    let model = tx::ActiveModel {
        user_id: Set(user_id.to_string()),
        category_id: Set(category_id),
        amount: Set(amount),
        kind: Set(kind),
        date: Set(date),
        description: Set(None),
        exp_gained: Set(crate::core::gamification::exp_for_amount(amount)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Inserts a raw expense row on `date`.
pub async fn insert_expense(
    db: &DatabaseConnection,
    user_id: &str,
    category_id: Option<i64>,
    amount: f64,
    date: NaiveDate,
) -> Result<TransactionModel> {
    insert_raw_transaction(db, user_id, category_id, EntryKind::Expense, amount, date).await
}

/// Inserts a raw income row on `date`.
pub async fn insert_income(
    db: &DatabaseConnection,
    user_id: &str,
    category_id: Option<i64>,
    amount: f64,
    date: NaiveDate,
) -> Result<TransactionModel> {
    insert_raw_transaction(db, user_id, category_id, EntryKind::Income, amount, date).await
}

/// Sets up a complete test environment with a signed-up profile.
/// Returns (db, profile) for common test scenarios.
pub async fn setup_with_profile() -> Result<(DatabaseConnection, ProfileModel)> {
    let db = setup_test_db().await?;
    let profile = create_test_profile(&db, TEST_USER).await?;
    Ok((db, profile))
}
