//! Aggregations over a user's transactions.
//!
//! Month and category totals are computed by the database with `SUM` and
//! `GROUP BY`; the yearly trend views bucket a single date-range query.
//! Every result is an explicit struct the bot layer can render.

use crate::{
    core::period::Month,
    entities::{Category, CategoryColumn, EntryKind, Transaction, TransactionColumn},
    errors::{Error, Result},
};
use chrono::{Datelike, Days, NaiveDate};
use sea_orm::{QuerySelect, prelude::*};
use std::collections::{BTreeMap, HashMap};

/// Label used for transactions without a category
pub const UNCATEGORIZED: &str = "Uncategorized";
/// Color used for transactions without a category
pub const UNCATEGORIZED_COLOR: &str = "#6B7280";
/// Window analyzed by [`spending_patterns`], in days
pub const PATTERN_WINDOW_DAYS: u64 = 90;
/// Weekday labels, Sunday first
pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Income and expense totals for a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    /// Sum of income amounts
    pub income: f64,
    /// Sum of expense amounts
    pub expense: f64,
    /// Number of transactions
    pub count: u64,
}

impl Totals {
    /// Income minus expense
    #[must_use]
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// Dashboard summary of one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    /// The summarized month
    pub month: Month,
    /// Total income
    pub income: f64,
    /// Total expense
    pub expense: f64,
    /// Income minus expense
    pub net: f64,
    /// Number of transactions
    pub count: u64,
    /// Percent change of expense versus the previous month, 0 if it had none
    pub expense_change: f64,
}

/// Expense total of one category in a month.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryExpense {
    /// Category id, `None` for uncategorized spending
    pub category_id: Option<i64>,
    /// Category name
    pub category: String,
    /// Category color
    pub color: String,
    /// Amount spent
    pub amount: f64,
}

/// Income and expense of one month in a yearly trend.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTrend {
    /// The month
    pub month: Month,
    /// Total income
    pub income: f64,
    /// Total expense
    pub expense: f64,
    /// Income minus expense
    pub net: f64,
}

/// Monthly expense series of one category over a year.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTrend {
    /// Category name
    pub name: String,
    /// Category color
    pub color: String,
    /// Expense per month, January first
    pub data: [f64; 12],
    /// Sum of `data`
    pub total: f64,
}

/// Totals of one calendar year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlySummary {
    /// The year
    pub year: i32,
    /// Total income
    pub income: f64,
    /// Total expense
    pub expense: f64,
    /// Income minus expense
    pub net: f64,
}

/// Year-over-year growth in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Growth {
    /// Income growth versus the previous year
    pub income: f64,
    /// Expense growth versus the previous year
    pub expense: f64,
}

/// The current year compared with the two before it.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyComparison {
    /// Oldest year first
    pub years: Vec<YearlySummary>,
    /// Latest year versus the one before
    pub growth: Growth,
}

/// Spending on one weekday.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekdaySpending {
    /// Short weekday name
    pub day: &'static str,
    /// Amount spent on this weekday
    pub amount: f64,
    /// Share of the window's total spending
    pub percentage: f64,
}

/// Statistics over days that had spending.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyStats {
    /// Mean spend per spending day
    pub average: f64,
    /// Largest daily spend
    pub max: f64,
    /// Smallest daily spend
    pub min: f64,
}

/// Expense habits over the last [`PATTERN_WINDOW_DAYS`] days.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingPatterns {
    /// Sunday first
    pub by_weekday: Vec<WeekdaySpending>,
    /// Daily statistics
    pub daily: DailyStats,
}

fn uncategorized() -> (String, String) {
    (UNCATEGORIZED.to_string(), UNCATEGORIZED_COLOR.to_string())
}

fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// Sums income and expense between `from` and `to` (inclusive).
pub async fn totals_between<C>(
    conn: &C,
    user_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Totals>
where
    C: ConnectionTrait,
{
    let rows: Vec<(String, Option<f64>, i64)> = Transaction::find()
        .select_only()
        .column(TransactionColumn::Kind)
        .column_as(Expr::col(TransactionColumn::Amount).sum(), "total")
        .column_as(Expr::col(TransactionColumn::Id).count(), "entries")
        .filter(TransactionColumn::UserId.eq(user_id))
        .filter(TransactionColumn::Date.between(from, to))
        .group_by(TransactionColumn::Kind)
        .into_tuple()
        .all(conn)
        .await?;

    let mut totals = Totals::default();
    for (kind, total, entries) in rows {
        let total = total.unwrap_or_default();
        if kind == EntryKind::Income.as_str() {
            totals.income += total;
        } else if kind == EntryKind::Expense.as_str() {
            totals.expense += total;
        }
        totals.count += u64::try_from(entries)?;
    }
    Ok(totals)
}

/// Sums income and expense for one month.
pub async fn month_totals<C>(conn: &C, user_id: &str, month: Month) -> Result<Totals>
where
    C: ConnectionTrait,
{
    totals_between(conn, user_id, month.first_day(), month.last_day()).await
}

/// Expense per category id for one month; `None` is uncategorized.
pub async fn expense_by_category<C>(
    conn: &C,
    user_id: &str,
    month: Month,
) -> Result<Vec<(Option<i64>, f64)>>
where
    C: ConnectionTrait,
{
    let rows: Vec<(Option<i64>, Option<f64>)> = Transaction::find()
        .select_only()
        .column(TransactionColumn::CategoryId)
        .column_as(Expr::col(TransactionColumn::Amount).sum(), "total")
        .filter(TransactionColumn::UserId.eq(user_id))
        .filter(TransactionColumn::Kind.eq(EntryKind::Expense))
        .filter(TransactionColumn::Date.between(month.first_day(), month.last_day()))
        .group_by(TransactionColumn::CategoryId)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(category_id, total)| (category_id, total.unwrap_or_default()))
        .collect())
}

async fn category_lookup(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<HashMap<i64, (String, String)>> {
    Ok(Category::find()
        .filter(CategoryColumn::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, (c.name, c.color)))
        .collect())
}

/// Income, expense and expense change versus the previous month.
pub async fn monthly_summary(
    db: &DatabaseConnection,
    user_id: &str,
    month: Month,
) -> Result<MonthlySummary> {
    let current = month_totals(db, user_id, month).await?;
    let previous = month_totals(db, user_id, month.previous()).await?;

    Ok(MonthlySummary {
        month,
        income: current.income,
        expense: current.expense,
        net: current.net(),
        count: current.count,
        expense_change: percent_change(current.expense, previous.expense),
    })
}

/// Non-zero expense per category for a month, largest first.
pub async fn category_expenses(
    db: &DatabaseConnection,
    user_id: &str,
    month: Month,
) -> Result<Vec<CategoryExpense>> {
    let lookup = category_lookup(db, user_id).await?;
    let mut expenses: Vec<CategoryExpense> = expense_by_category(db, user_id, month)
        .await?
        .into_iter()
        .filter(|(_, amount)| *amount > 0.0)
        .map(|(category_id, amount)| {
            let (category, color) = category_id
                .and_then(|id| lookup.get(&id).cloned())
                .unwrap_or_else(uncategorized);
            CategoryExpense {
                category_id,
                category,
                color,
                amount,
            }
        })
        .collect();

    expenses.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    Ok(expenses)
}

async fn year_rows(
    db: &DatabaseConnection,
    user_id: &str,
    year: i32,
) -> Result<Vec<(NaiveDate, String, Option<i64>, f64)>> {
    let first = Month::new(year, 1)?.first_day();
    let last = Month::new(year, 12)?.last_day();

    Transaction::find()
        .select_only()
        .column(TransactionColumn::Date)
        .column(TransactionColumn::Kind)
        .column(TransactionColumn::CategoryId)
        .column(TransactionColumn::Amount)
        .filter(TransactionColumn::UserId.eq(user_id))
        .filter(TransactionColumn::Date.between(first, last))
        .into_tuple()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Twelve monthly income/expense entries for `year`, January first.
pub async fn monthly_trend(
    db: &DatabaseConnection,
    user_id: &str,
    year: i32,
) -> Result<Vec<MonthlyTrend>> {
    let mut income = [0.0_f64; 12];
    let mut expense = [0.0_f64; 12];

    for (date, kind, _, amount) in year_rows(db, user_id, year).await? {
        let index = date.month0() as usize;
        if kind == EntryKind::Income.as_str() {
            income[index] += amount;
        } else {
            expense[index] += amount;
        }
    }

    (1..=12_u32)
        .map(|m| {
            let i = (m - 1) as usize;
            Ok(MonthlyTrend {
                month: Month::new(year, m)?,
                income: income[i],
                expense: expense[i],
                net: income[i] - expense[i],
            })
        })
        .collect()
}

/// Monthly expense series per category for `year`, largest total first.
pub async fn category_trend(
    db: &DatabaseConnection,
    user_id: &str,
    year: i32,
) -> Result<Vec<CategoryTrend>> {
    let lookup = category_lookup(db, user_id).await?;
    let mut series: BTreeMap<Option<i64>, [f64; 12]> = BTreeMap::new();

    for (date, kind, category_id, amount) in year_rows(db, user_id, year).await? {
        if kind != EntryKind::Expense.as_str() {
            continue;
        }
        // Deleted categories fold into the uncategorized bucket
        let key = category_id.filter(|id| lookup.contains_key(id));
        series.entry(key).or_insert([0.0; 12])[date.month0() as usize] += amount;
    }

    let mut trends: Vec<CategoryTrend> = series
        .into_iter()
        .map(|(category_id, data)| {
            let (name, color) = category_id
                .and_then(|id| lookup.get(&id).cloned())
                .unwrap_or_else(uncategorized);
            CategoryTrend {
                name,
                color,
                total: data.iter().sum(),
                data,
            }
        })
        .collect();

    trends.sort_by(|a, b| b.total.total_cmp(&a.total));
    Ok(trends)
}

/// Compares `current_year` with the two years before it.
pub async fn yearly_comparison(
    db: &DatabaseConnection,
    user_id: &str,
    current_year: i32,
) -> Result<YearlyComparison> {
    let first_year = current_year.checked_sub(2).ok_or_else(|| Error::Validation {
        field: "year",
        message: format!("{current_year} is out of range"),
    })?;

    let mut years = Vec::with_capacity(3);
    for year in first_year..=current_year {
        let first = Month::new(year, 1)?.first_day();
        let last = Month::new(year, 12)?.last_day();
        let totals = totals_between(db, user_id, first, last).await?;
        years.push(YearlySummary {
            year,
            income: totals.income,
            expense: totals.expense,
            net: totals.net(),
        });
    }

    let growth = match years.as_slice() {
        [.., previous, current] => Growth {
            income: percent_change(current.income, previous.income),
            expense: percent_change(current.expense, previous.expense),
        },
        _ => Growth::default(),
    };

    Ok(YearlyComparison { years, growth })
}

/// Weekday and daily spending statistics for the window ending `today`.
pub async fn spending_patterns(
    db: &DatabaseConnection,
    user_id: &str,
    today: NaiveDate,
) -> Result<SpendingPatterns> {
    let since = today
        .checked_sub_days(Days::new(PATTERN_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);

    let rows: Vec<(NaiveDate, f64)> = Transaction::find()
        .select_only()
        .column(TransactionColumn::Date)
        .column(TransactionColumn::Amount)
        .filter(TransactionColumn::UserId.eq(user_id))
        .filter(TransactionColumn::Kind.eq(EntryKind::Expense))
        .filter(TransactionColumn::Date.gte(since))
        .filter(TransactionColumn::Date.lte(today))
        .into_tuple()
        .all(db)
        .await?;

    let mut weekday_totals = [0.0_f64; 7];
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, amount) in rows {
        weekday_totals[date.weekday().num_days_from_sunday() as usize] += amount;
        *daily.entry(date).or_default() += amount;
    }

    let total: f64 = weekday_totals.iter().sum();
    let by_weekday = WEEKDAYS
        .iter()
        .zip(weekday_totals)
        .map(|(&day, amount)| WeekdaySpending {
            day,
            amount,
            percentage: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
        })
        .collect();

    let daily = if daily.is_empty() {
        DailyStats::default()
    } else {
        #[allow(clippy::cast_precision_loss)]
        let days = daily.len() as f64;
        DailyStats {
            average: daily.values().sum::<f64>() / days,
            max: daily.values().copied().fold(f64::MIN, f64::max),
            min: daily.values().copied().fold(f64::MAX, f64::min),
        }
    };

    Ok(SpendingPatterns { by_weekday, daily })
}
