//! Category business logic - per-user income and expense categories.
//!
//! Every profile starts with the default categories from `config.toml`.
//! Users can add their own (or pick from a recommended list during
//! onboarding) and delete any category that is not a default.

use crate::{
    config::defaults::CategoryConfig,
    entities::{
        BudgetAlert, BudgetAlertColumn, Category, CategoryBudget, CategoryBudgetColumn,
        CategoryColumn, CategoryModel, EntryKind, Transaction, TransactionColumn, category,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Longest accepted category name, in characters
pub const MAX_NAME_LEN: usize = 30;

/// Input for creating a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    /// Display name
    pub name: String,
    /// Income or expense
    pub kind: EntryKind,
    /// Hex color, `#RRGGBB`
    pub color: String,
    /// Icon name
    pub icon: Option<String>,
}

impl From<&CategoryConfig> for NewCategory {
    fn from(config: &CategoryConfig) -> Self {
        Self {
            name: config.name.clone(),
            kind: config.kind,
            color: config.color.clone(),
            icon: config.icon.clone(),
        }
    }
}

/// A category suggested during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendedCategory {
    /// Display name
    pub name: &'static str,
    /// Hex color
    pub color: &'static str,
    /// Icon name
    pub icon: &'static str,
    /// Income or expense
    pub kind: EntryKind,
}

/// Categories offered in the onboarding category step.
pub const RECOMMENDED_CATEGORIES: &[RecommendedCategory] = &[
    RecommendedCategory {
        name: "Cafe/Drinks",
        color: "#8B4513",
        icon: "Coffee",
        kind: EntryKind::Expense,
    },
    RecommendedCategory {
        name: "Online Shopping",
        color: "#FF6B6B",
        icon: "ShoppingCart",
        kind: EntryKind::Expense,
    },
    RecommendedCategory {
        name: "Fitness",
        color: "#4ECDC4",
        icon: "Dumbbell",
        kind: EntryKind::Expense,
    },
    RecommendedCategory {
        name: "Culture",
        color: "#45B7D1",
        icon: "Film",
        kind: EntryKind::Expense,
    },
    RecommendedCategory {
        name: "Pets",
        color: "#FFA07A",
        icon: "Heart",
        kind: EntryKind::Expense,
    },
    RecommendedCategory {
        name: "Side Income",
        color: "#98D8C8",
        icon: "Briefcase",
        kind: EntryKind::Income,
    },
    RecommendedCategory {
        name: "Investment Returns",
        color: "#50C878",
        icon: "TrendingUp",
        kind: EntryKind::Income,
    },
];

impl From<&RecommendedCategory> for NewCategory {
    fn from(recommended: &RecommendedCategory) -> Self {
        Self {
            name: recommended.name.to_string(),
            kind: recommended.kind,
            color: recommended.color.to_string(),
            icon: Some(recommended.icon.to_string()),
        }
    }
}

/// Checks that `color` is a `#RRGGBB` hex color.
pub fn validate_color(color: &str) -> Result<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        Err(Error::Validation {
            field: "color",
            message: format!("'{color}' is not a #RRGGBB hex color"),
        })
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation {
            field: "name",
            message: "category name cannot be empty".to_string(),
        });
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::Validation {
            field: "name",
            message: format!("category name must be at most {MAX_NAME_LEN} characters"),
        });
    }
    Ok(())
}

/// Lists a user's categories, income first, then by name.
pub async fn list_categories<C>(conn: &C, user_id: &str) -> Result<Vec<CategoryModel>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(CategoryColumn::UserId.eq(user_id))
        .order_by_desc(CategoryColumn::Kind)
        .order_by_asc(CategoryColumn::Name)
        .all(conn)
        .await
        .map_err(Into::into)
}

/// Lists a user's categories of one kind, by name.
pub async fn list_categories_by_kind(
    db: &DatabaseConnection,
    user_id: &str,
    kind: EntryKind,
) -> Result<Vec<CategoryModel>> {
    Category::find()
        .filter(CategoryColumn::UserId.eq(user_id))
        .filter(CategoryColumn::Kind.eq(kind))
        .order_by_asc(CategoryColumn::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches one of the user's categories by id.
///
/// Categories owned by other users are reported as not found.
pub async fn get_category<C>(conn: &C, user_id: &str, category_id: i64) -> Result<CategoryModel>
where
    C: ConnectionTrait,
{
    Category::find_by_id(category_id)
        .filter(CategoryColumn::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            name: category_id.to_string(),
        })
}

/// Looks up one of the user's categories by exact name.
///
/// `kind` narrows the search when an income and an expense category share
/// a name; otherwise the income category wins.
pub async fn find_category_by_name(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    kind: Option<EntryKind>,
) -> Result<CategoryModel> {
    let mut query = Category::find()
        .filter(CategoryColumn::UserId.eq(user_id))
        .filter(CategoryColumn::Name.eq(name.trim()));
    if let Some(kind) = kind {
        query = query.filter(CategoryColumn::Kind.eq(kind));
    }

    query
        .order_by_desc(CategoryColumn::Kind)
        .one(db)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            name: name.to_string(),
        })
}

/// Creates a category for a user after validating name and color.
///
/// A user cannot have two categories of the same kind with the same name.
pub async fn create_category<C>(
    conn: &C,
    user_id: &str,
    new: NewCategory,
    is_default: bool,
) -> Result<CategoryModel>
where
    C: ConnectionTrait,
{
    let name = new.name.trim().to_string();
    validate_name(&name)?;
    validate_color(&new.color)?;

    let duplicate = Category::find()
        .filter(CategoryColumn::UserId.eq(user_id))
        .filter(CategoryColumn::Kind.eq(new.kind))
        .filter(CategoryColumn::Name.eq(name.as_str()))
        .one(conn)
        .await?;
    if duplicate.is_some() {
        return Err(Error::Validation {
            field: "name",
            message: format!("you already have a {} category named '{name}'", new.kind),
        });
    }

    let model = category::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name),
        color: Set(new.color),
        icon: Set(new.icon),
        kind: Set(new.kind),
        is_default: Set(is_default),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    model.insert(conn).await.map_err(Into::into)
}

/// Copies the configured default categories into a new profile.
pub async fn seed_default_categories<C>(
    conn: &C,
    user_id: &str,
    defaults: &[CategoryConfig],
) -> Result<Vec<CategoryModel>>
where
    C: ConnectionTrait,
{
    let mut created = Vec::with_capacity(defaults.len());
    for config in defaults {
        created.push(create_category(conn, user_id, config.into(), true).await?);
    }
    info!(user_id, count = created.len(), "Seeded default categories");
    Ok(created)
}

/// Adds one of [`RECOMMENDED_CATEGORIES`] to the user's categories.
pub async fn add_recommended_category(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
) -> Result<CategoryModel> {
    let recommended = RECOMMENDED_CATEGORIES
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| Error::CategoryNotFound {
            name: name.to_string(),
        })?;

    create_category(db, user_id, recommended.into(), false).await
}

/// Deletes a non-default category owned by `user_id`.
///
/// Transactions in the category become uncategorized. Its budget caps and
/// alerts are removed with it.
pub async fn delete_category(
    db: &DatabaseConnection,
    user_id: &str,
    category_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let category = get_category(&txn, user_id, category_id).await?;
    if category.is_default {
        return Err(Error::DefaultCategoryLocked {
            name: category.name,
        });
    }

    Transaction::update_many()
        .col_expr(TransactionColumn::CategoryId, Expr::value(Option::<i64>::None))
        .filter(TransactionColumn::CategoryId.eq(category_id))
        .filter(TransactionColumn::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    CategoryBudget::delete_many()
        .filter(CategoryBudgetColumn::CategoryId.eq(category_id))
        .exec(&txn)
        .await?;

    BudgetAlert::delete_many()
        .filter(BudgetAlertColumn::CategoryId.eq(category_id))
        .exec(&txn)
        .await?;

    info!(user_id, category = %category.name, "Deleting category");
    category.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}
