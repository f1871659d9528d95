//! Database configuration module for `LedgerQuest`.
//!
//! This module handles database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL.

use crate::entities::{
    Badge, BudgetAlert, BudgetAlertColumn, Category, CategoryBudget, CategoryBudgetColumn,
    Profile, Transaction, UserBadge, UserBadgeColumn,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://ledger_quest.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
#[instrument]
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

async fn create_unique_indexes(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();

    let statements = [
        Index::create()
            .name("idx_category_budgets_user_category_period")
            .table(CategoryBudget)
            .col(CategoryBudgetColumn::UserId)
            .col(CategoryBudgetColumn::CategoryId)
            .col(CategoryBudgetColumn::Period)
            .unique()
            .if_not_exists()
            .to_owned(),
        // Total alerts have a NULL category and are kept unique by the
        // check-and-insert transaction in `core::alert`
        Index::create()
            .name("idx_budget_alerts_user_category_threshold_period")
            .table(BudgetAlert)
            .col(BudgetAlertColumn::UserId)
            .col(BudgetAlertColumn::AlertType)
            .col(BudgetAlertColumn::CategoryId)
            .col(BudgetAlertColumn::Percentage)
            .col(BudgetAlertColumn::Period)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_user_badges_user_badge")
            .table(UserBadge)
            .col(UserBadgeColumn::UserId)
            .col(UserBadgeColumn::BadgeId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ];

    for statement in &statements {
        db.execute(builder.build(statement)).await?;
    }
    Ok(())
}

/// Creates every ledger table and unique index that does not exist yet.
///
/// Parents are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Profile).await?;
    create_table(db, &schema, Category).await?;
    create_table(db, &schema, Transaction).await?;
    create_table(db, &schema, CategoryBudget).await?;
    create_table(db, &schema, BudgetAlert).await?;
    create_table(db, &schema, Badge).await?;
    create_table(db, &schema, UserBadge).await?;
    create_unique_indexes(db).await?;

    info!("Database tables ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        BadgeModel, BudgetAlertModel, CategoryBudgetModel, CategoryModel, ProfileModel,
        TransactionModel, UserBadgeModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ProfileModel> = Profile::find().limit(1).all(&db).await?;
        let _: Vec<CategoryModel> = Category::find().limit(1).all(&db).await?;
        let _: Vec<TransactionModel> = Transaction::find().limit(1).all(&db).await?;
        let _: Vec<CategoryBudgetModel> = CategoryBudget::find().limit(1).all(&db).await?;
        let _: Vec<BudgetAlertModel> = BudgetAlert::find().limit(1).all(&db).await?;
        let _: Vec<BadgeModel> = Badge::find().limit(1).all(&db).await?;
        let _: Vec<UserBadgeModel> = UserBadge::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        // A restart runs the same statements against an existing schema
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_unique_indexes_reject_duplicates() -> Result<()> {
        use crate::entities::{AlertType, budget_alert, category_budget};
        use crate::test_utils::{create_test_category, setup_with_profile};
        use crate::entities::EntryKind;
        use chrono::Utc;
        use sea_orm::{ActiveModelTrait, Set};

        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Snacks", EntryKind::Expense).await?;

        let cap = || category_budget::ActiveModel {
            user_id: Set(profile.id.clone()),
            category_id: Set(food.id),
            amount: Set(50_000.0),
            period: Set(category_budget::MONTHLY_PERIOD.to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        cap().insert(&db).await?;
        assert!(cap().insert(&db).await.is_err());

        let alert = || budget_alert::ActiveModel {
            user_id: Set(profile.id.clone()),
            alert_type: Set(AlertType::Category),
            category_id: Set(Some(food.id)),
            percentage: Set(80),
            amount_used: Set(40_000.0),
            budget_amount: Set(50_000.0),
            period: Set("2024-03".to_string()),
            is_read: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        alert().insert(&db).await?;
        assert!(alert().insert(&db).await.is_err());

        // Same threshold in another month is a different alert
        let mut next_month = alert();
        next_month.period = Set("2024-04".to_string());
        next_month.insert(&db).await?;

        Ok(())
    }
}
