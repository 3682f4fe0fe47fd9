//! Sale statistics for a month: how much was sold and how many items did and did not sell.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::Month;

use crate::{
    Error,
    month::{MONTH_CONDITION, MonthQuery, month_number},
};

/// Totals for the transactions in a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// The sum of the prices of the items that sold.
    pub total_sale_amount: f64,
    /// The number of items that sold.
    pub total_sold_items: i64,
    /// The number of items that did not sell.
    pub total_not_sold_items: i64,
}

/// Calculate the sale statistics for the transactions in `month`, in any year.
///
/// The sale amount is zero when nothing sold. A `month` of `None` matches no
/// transactions, so every total is zero.
///
/// # Errors
/// Returns [Error::ConnectionUnavailable] if no database connection could be
/// acquired, or [Error::SqlError] if the query fails.
pub async fn get_statistics(month: Option<Month>, pool: &SqlitePool) -> Result<Statistics, Error> {
    let query = format!(
        "SELECT CAST(COALESCE(SUM(price), 0) AS REAL) AS total_sale_amount, \
            COUNT(*) AS total_sold_items, \
            (SELECT COUNT(*) FROM product_transaction WHERE {MONTH_CONDITION} AND sold = 0) \
                AS total_not_sold_items \
        FROM product_transaction \
        WHERE {MONTH_CONDITION} AND sold = 1"
    );

    let statistics = sqlx::query_as(&query)
        .bind(month_number(month))
        .fetch_one(pool)
        .await?;

    Ok(statistics)
}

/// Get the sale statistics for a month.
pub async fn get_statistics_endpoint(
    State(db_pool): State<SqlitePool>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Statistics>, Error> {
    get_statistics(query.month(), &db_pool)
        .await
        .inspect_err(|error| tracing::error!("Error fetching statistics: {error}"))
        .map(Json)
}
