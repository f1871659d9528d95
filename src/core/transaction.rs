//! Transaction business logic - Handles all transaction-related operations.
//!
//! Recording a transaction is the main gameplay loop: the row is inserted,
//! the profile is credited with experience and coins, the streak is refreshed
//! and newly reached badges are awarded, all inside one database transaction.
//! Every read and write is scoped to the calling user.

use crate::{
    core::{badge, category, gamification, period::Month, profile},
    entities::{
        BadgeModel, Category, CategoryModel, EntryKind, ProfileModel, Transaction,
        TransactionColumn, TransactionModel, transaction,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Transactions shown per page by [`list_transactions`]
pub const PAGE_SIZE: u64 = 20;
/// Default number of entries returned by [`recent_transactions`]
pub const DEFAULT_RECENT_LIMIT: u64 = 10;

/// Input for recording a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Category the transaction is filed under
    pub category_id: i64,
    /// Positive amount
    pub amount: f64,
    /// Income or expense; must match the category
    pub kind: EntryKind,
    /// Day the money moved
    pub date: NaiveDate,
    /// Optional note
    pub description: Option<String>,
}

/// Fields to change on an existing transaction. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    /// New category
    pub category_id: Option<i64>,
    /// New amount
    pub amount: Option<f64>,
    /// New kind
    pub kind: Option<EntryKind>,
    /// New date
    pub date: Option<NaiveDate>,
    /// New note
    pub description: Option<String>,
}

/// Everything that changed because a transaction was recorded.
#[derive(Debug, Clone)]
pub struct RecordedTransaction {
    /// The inserted row
    pub transaction: TransactionModel,
    /// Profile after rewards, streak and badges were applied
    pub profile: ProfileModel,
    /// Whether the credit pushed the profile into a new level
    pub leveled_up: bool,
    /// Badges earned by this transaction
    pub new_badges: Vec<BadgeModel>,
}

/// Filters for [`list_transactions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Substring of the description
    pub search: Option<String>,
    /// Only this category
    pub category_id: Option<i64>,
    /// Only income or only expense
    pub kind: Option<EntryKind>,
    /// Only this calendar month
    pub month: Option<Month>,
    /// Zero-based page index
    pub page: u64,
}

/// One page of filtered transactions.
#[derive(Debug, Clone)]
pub struct TransactionPage {
    /// Transactions on this page with their category, if any
    pub items: Vec<(TransactionModel, Option<CategoryModel>)>,
    /// Number of transactions matching the filter
    pub total: u64,
    /// Number of pages matching the filter
    pub total_pages: u64,
    /// Zero-based index of this page
    pub page: u64,
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidAmount { amount })
    }
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn check_kind(category: &CategoryModel, kind: EntryKind) -> Result<()> {
    if category.kind == kind {
        Ok(())
    } else {
        Err(Error::Validation {
            field: "category",
            message: format!(
                "'{}' is an {} category and cannot hold {kind} entries",
                category.name, category.kind
            ),
        })
    }
}

/// Records a transaction and applies its gamification rewards.
///
/// The amount must be finite and positive and the category must belong to
/// the user and match the transaction's kind. Experience is computed with
/// [`gamification::exp_for_amount`]; the profile receives that experience
/// plus [`gamification::COINS_PER_TRANSACTION`] coins.
#[instrument(skip(db, new), fields(amount = new.amount, kind = %new.kind))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    new: NewTransaction,
) -> Result<RecordedTransaction> {
    validate_amount(new.amount)?;

    let txn = db.begin().await?;

    let before = profile::require_profile(&txn, user_id).await?;
    let category = category::get_category(&txn, user_id, new.category_id).await?;
    check_kind(&category, new.kind)?;

    let exp_gained = gamification::exp_for_amount(new.amount);
    let now = Utc::now();
    let model = transaction::ActiveModel {
        user_id: Set(user_id.to_string()),
        category_id: Set(Some(category.id)),
        amount: Set(new.amount),
        kind: Set(new.kind),
        date: Set(new.date),
        description: Set(clean_description(new.description)),
        exp_gained: Set(exp_gained),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let transaction = model.insert(&txn).await?;

    gamification::credit_transaction(&txn, user_id, exp_gained).await?;
    gamification::refresh_streak(&txn, user_id, now.date_naive()).await?;
    let new_badges = badge::evaluate_badges(&txn, user_id).await?;
    let profile = profile::require_profile(&txn, user_id).await?;

    txn.commit().await?;

    let leveled_up = profile.level > before.level;
    info!(
        user_id,
        transaction_id = transaction.id,
        exp_gained,
        leveled_up,
        "Recorded transaction"
    );

    Ok(RecordedTransaction {
        transaction,
        profile,
        leveled_up,
        new_badges,
    })
}

/// Fetches one of the user's transactions.
pub async fn get_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    transaction_id: i64,
) -> Result<TransactionModel> {
    Transaction::find_by_id(transaction_id)
        .filter(TransactionColumn::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })
}

/// Edits one of the user's transactions.
///
/// `exp_gained` is recomputed from the resulting amount; the profile is not
/// credited again.
pub async fn update_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    transaction_id: i64,
    update: TransactionUpdate,
) -> Result<TransactionModel> {
    if let Some(amount) = update.amount {
        validate_amount(amount)?;
    }

    let existing = get_transaction(db, user_id, transaction_id).await?;
    let kind = update.kind.unwrap_or(existing.kind);
    let category_id = update.category_id.or(existing.category_id);

    if let Some(category_id) = category_id {
        let category = category::get_category(db, user_id, category_id).await?;
        check_kind(&category, kind)?;
    }

    let amount = update.amount.unwrap_or(existing.amount);
    let mut active: transaction::ActiveModel = existing.into();
    active.amount = Set(amount);
    active.kind = Set(kind);
    active.category_id = Set(category_id);
    active.exp_gained = Set(gamification::exp_for_amount(amount));
    if let Some(date) = update.date {
        active.date = Set(date);
    }
    if update.description.is_some() {
        active.description = Set(clean_description(update.description));
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    debug!(user_id, transaction_id, "Updated transaction");
    Ok(updated)
}

/// Deletes one of the user's transactions. Rewards already granted stay.
pub async fn delete_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    transaction_id: i64,
) -> Result<()> {
    let result = Transaction::delete_many()
        .filter(TransactionColumn::Id.eq(transaction_id))
        .filter(TransactionColumn::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::TransactionNotFound { id: transaction_id });
    }

    info!(user_id, transaction_id, "Deleted transaction");
    Ok(())
}

/// Lists the user's transactions matching `filter`, newest first.
///
/// Ordered by date, then by creation time, [`PAGE_SIZE`] per page.
pub async fn list_transactions(
    db: &DatabaseConnection,
    user_id: &str,
    filter: &TransactionFilter,
) -> Result<TransactionPage> {
    let mut query = Transaction::find()
        .find_also_related(Category)
        .filter(TransactionColumn::UserId.eq(user_id));

    if let Some(search) = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        query = query.filter(TransactionColumn::Description.contains(search));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(TransactionColumn::CategoryId.eq(category_id));
    }
    if let Some(kind) = filter.kind {
        query = query.filter(TransactionColumn::Kind.eq(kind));
    }
    if let Some(month) = filter.month {
        query =
            query.filter(TransactionColumn::Date.between(month.first_day(), month.last_day()));
    }

    let paginator = query
        .order_by_desc(TransactionColumn::Date)
        .order_by_desc(TransactionColumn::CreatedAt)
        .order_by_desc(TransactionColumn::Id)
        .paginate(db, PAGE_SIZE);

    let counts = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(filter.page).await?;

    Ok(TransactionPage {
        items,
        total: counts.number_of_items,
        total_pages: counts.number_of_pages,
        page: filter.page,
    })
}

/// Most recently recorded transactions with their categories.
///
/// # Arguments
/// * `limit` - How many to return, [`DEFAULT_RECENT_LIMIT`] when `None`
pub async fn recent_transactions(
    db: &DatabaseConnection,
    user_id: &str,
    limit: Option<u64>,
) -> Result<Vec<(TransactionModel, Option<CategoryModel>)>> {
    Transaction::find()
        .find_also_related(Category)
        .filter(TransactionColumn::UserId.eq(user_id))
        .order_by_desc(TransactionColumn::CreatedAt)
        .order_by_desc(TransactionColumn::Id)
        .limit(limit.unwrap_or(DEFAULT_RECENT_LIMIT))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of transactions the user has recorded.
pub async fn count_transactions<C>(conn: &C, user_id: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    Transaction::find()
        .filter(TransactionColumn::UserId.eq(user_id))
        .count(conn)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn expense(category_id: i64, amount: f64) -> NewTransaction {
        NewTransaction {
            category_id,
            amount,
            kind: EntryKind::Expense,
            date: Utc::now().date_naive(),
            description: Some("Lunch".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_transaction_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        for amount in [0.0, -10.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = create_transaction(&db, "user1", expense(1, amount)).await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_credits_profile() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Meals", EntryKind::Expense).await?;

        let recorded = create_transaction(&db, &profile.id, expense(food.id, 12000.0)).await?;
        assert_eq!(recorded.transaction.exp_gained, 12);
        assert_eq!(recorded.transaction.category_id, Some(food.id));
        assert_eq!(recorded.transaction.description.as_deref(), Some("Lunch"));
        assert_eq!(recorded.profile.total_exp, 12);
        assert_eq!(recorded.profile.coins, 10);
        assert_eq!(recorded.profile.current_streak, 1);
        assert_eq!(recorded.profile.longest_streak, 1);
        assert!(!recorded.leveled_up);

        let recorded = create_transaction(&db, &profile.id, expense(food.id, 4000.0)).await?;
        assert_eq!(recorded.transaction.exp_gained, 5);
        assert_eq!(recorded.profile.total_exp, 17);
        assert_eq!(recorded.profile.coins, 20);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_level_up() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Meals", EntryKind::Expense).await?;

        let recorded = create_transaction(&db, &profile.id, expense(food.id, 1_500_000.0)).await?;
        assert_eq!(recorded.transaction.exp_gained, 1500);
        assert_eq!(recorded.profile.level, 2);
        assert!(recorded.leveled_up);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_requires_matching_kind() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let salary = create_test_category(&db, &profile.id, "Paycheck", EntryKind::Income).await?;

        let result = create_transaction(&db, &profile.id, expense(salary.id, 5000.0)).await;
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "category",
                ..
            })
        ));
        assert_eq!(count_transactions(&db, &profile.id).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_foreign_category() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let other = create_test_profile(&db, "other_user").await?;
        let theirs = create_test_category(&db, &other.id, "Theirs", EntryKind::Expense).await?;

        let result = create_transaction(&db, &profile.id, expense(theirs.id, 5000.0)).await;
        assert!(matches!(result, Err(Error::CategoryNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_without_profile() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_transaction(&db, "ghost", expense(1, 5000.0)).await;
        assert!(matches!(result, Err(Error::ProfileNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_recomputes_exp() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Meals", EntryKind::Expense).await?;
        let tx = create_test_transaction(&db, &profile.id, food.id, 4000.0).await?;

        let updated = update_transaction(
            &db,
            &profile.id,
            tx.id,
            TransactionUpdate {
                amount: Some(25000.0),
                description: Some("Dinner".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.amount, 25000.0);
        assert_eq!(updated.exp_gained, 25);
        assert_eq!(updated.description.as_deref(), Some("Dinner"));

        // Editing does not credit the profile a second time
        let profile = profile::require_profile(&db, &profile.id).await?;
        assert_eq!(profile.total_exp, 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_are_user_scoped() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Meals", EntryKind::Expense).await?;
        let tx = create_test_transaction(&db, &profile.id, food.id, 4000.0).await?;
        create_test_profile(&db, "intruder").await?;

        let result = update_transaction(
            &db,
            "intruder",
            tx.id,
            TransactionUpdate {
                amount: Some(1.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::TransactionNotFound { .. })));

        let result = delete_transaction(&db, "intruder", tx.id).await;
        assert!(matches!(result, Err(Error::TransactionNotFound { .. })));
        assert!(get_transaction(&db, &profile.id, tx.id).await.is_ok());

        delete_transaction(&db, &profile.id, tx.id).await?;
        assert!(get_transaction(&db, &profile.id, tx.id).await.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_filters() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Meals", EntryKind::Expense).await?;
        let pay = create_test_category(&db, &profile.id, "Paycheck", EntryKind::Income).await?;
        let march = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();

        insert_raw_transaction(
            &db,
            &profile.id,
            Some(food.id),
            EntryKind::Expense,
            8000.0,
            march(1),
        )
        .await?;
        insert_raw_transaction(
            &db,
            &profile.id,
            Some(food.id),
            EntryKind::Expense,
            9000.0,
            march(31),
        )
        .await?;
        insert_raw_transaction(
            &db,
            &profile.id,
            Some(pay.id),
            EntryKind::Income,
            3_000_000.0,
            march(25),
        )
        .await?;
        insert_raw_transaction(
            &db,
            &profile.id,
            Some(food.id),
            EntryKind::Expense,
            7000.0,
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        )
        .await?;

        let all = list_transactions(&db, &profile.id, &TransactionFilter::default()).await?;
        assert_eq!(all.total, 4);
        assert_eq!(all.total_pages, 1);
        // Newest date first
        assert_eq!(all.items[0].0.date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(all.items[3].0.date, march(1));
        assert_eq!(all.items[0].1.as_ref().map(|c| c.name.as_str()), Some("Meals"));

        let in_march = list_transactions(
            &db,
            &profile.id,
            &TransactionFilter {
                month: Some(Month::new(2024, 3)?),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(in_march.total, 3);

        let incomes = list_transactions(
            &db,
            &profile.id,
            &TransactionFilter {
                kind: Some(EntryKind::Income),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(incomes.total, 1);
        assert_eq!(incomes.items[0].0.amount, 3_000_000.0);

        let by_category = list_transactions(
            &db,
            &profile.id,
            &TransactionFilter {
                category_id: Some(food.id),
                month: Some(Month::new(2024, 3)?),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_category.total, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_search_and_pages() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Meals", EntryKind::Expense).await?;

        for i in 0..25 {
            let description = if i % 5 == 0 { "Coffee beans" } else { "Groceries" };
            create_transaction(
                &db,
                &profile.id,
                NewTransaction {
                    description: Some(description.to_string()),
                    ..expense(food.id, 1000.0)
                },
            )
            .await?;
        }

        let first = list_transactions(&db, &profile.id, &TransactionFilter::default()).await?;
        assert_eq!(first.total, 25);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.items.len(), 20);

        let second = list_transactions(
            &db,
            &profile.id,
            &TransactionFilter {
                page: 1,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(second.items.len(), 5);

        let coffee = list_transactions(
            &db,
            &profile.id,
            &TransactionFilter {
                search: Some("coffee".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(coffee.total, 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_recent_transactions_limit_and_order() -> Result<()> {
        let (db, profile) = setup_with_profile().await?;
        let food = create_test_category(&db, &profile.id, "Meals", EntryKind::Expense).await?;

        let mut last = None;
        for amount in 1..=12 {
            let amount = f64::from(amount) * 1000.0;
            last = Some(create_test_transaction(&db, &profile.id, food.id, amount).await?);
        }

        let recent = recent_transactions(&db, &profile.id, None).await?;
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].0, last.unwrap());

        let three = recent_transactions(&db, &profile.id, Some(3)).await?;
        assert_eq!(three.len(), 3);

        Ok(())
    }
}
