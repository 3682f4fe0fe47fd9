//! Database query helpers for listing the transactions in a month.

use sqlx::SqlitePool;
use time::Month;

use crate::{
    Error,
    month::{MONTH_CONDITION, month_number},
    pagination::Page,
};

use super::core::Transaction;

/// Matches rows where the LIKE pattern bound to `?2` is found in the title,
/// description or price. Binding `NULL` for the pattern matches every row.
const SEARCH_CONDITION: &str = "(?2 IS NULL \
    OR title LIKE ?2 ESCAPE '\\' \
    OR description LIKE ?2 ESCAPE '\\' \
    OR CAST(price AS TEXT) LIKE ?2 ESCAPE '\\')";

/// The rows to include when listing or counting transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only include transactions sold in this calendar month, in any year.
    ///
    /// `None` matches no transactions.
    pub month: Option<Month>,
    /// Only include transactions whose title, description or price contain
    /// this text, ignoring case.
    pub search: Option<String>,
}

impl TransactionFilter {
    /// Create a filter for `month` and an optional `search` term.
    ///
    /// Search terms that are empty after trimming whitespace are ignored.
    pub fn new(month: Option<Month>, search: Option<&str>) -> Self {
        let search = search
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(str::to_owned);

        Self { month, search }
    }

    fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(like_pattern)
    }
}

/// Build a LIKE pattern that matches `search` anywhere in a string.
///
/// The wildcards `%` and `_` in `search` are escaped so they only match
/// themselves.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');

    for character in search.chars() {
        if matches!(character, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(character);
    }

    pattern.push('%');
    pattern
}

/// Get one page of the transactions matching `filter`, in order of ID.
///
/// # Errors
/// Returns [Error::ConnectionUnavailable] if no database connection could be
/// acquired, or [Error::SqlError] if the query fails.
pub async fn list_transactions(
    filter: &TransactionFilter,
    page: Page,
    pool: &SqlitePool,
) -> Result<Vec<Transaction>, Error> {
    let query = format!(
        "SELECT id, title, description, price, image, date_of_sale, sold, category \
        FROM product_transaction \
        WHERE {MONTH_CONDITION} AND {SEARCH_CONDITION} \
        ORDER BY id ASC \
        LIMIT ?3 OFFSET ?4"
    );

    let transactions = sqlx::query_as(&query)
        .bind(month_number(filter.month))
        .bind(filter.search_pattern())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    Ok(transactions)
}

/// Count all of the transactions matching `filter`, ignoring pagination.
///
/// # Errors
/// Returns [Error::ConnectionUnavailable] if no database connection could be
/// acquired, or [Error::SqlError] if the query fails.
pub async fn count_transactions(
    filter: &TransactionFilter,
    pool: &SqlitePool,
) -> Result<i64, Error> {
    let query = format!(
        "SELECT COUNT(*) FROM product_transaction WHERE {MONTH_CONDITION} AND {SEARCH_CONDITION}"
    );

    let count = sqlx::query_scalar(&query)
        .bind(month_number(filter.month))
        .bind(filter.search_pattern())
        .fetch_one(pool)
        .await?;

    Ok(count)
}
