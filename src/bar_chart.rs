//! A histogram of the prices of the items listed in a month, in 100-wide bands.

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

/// The width of each price band.
pub const PRICE_BAND_WIDTH: i64 = 100;

/// The number of items with a price in `[price_range, price_range + 100)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PriceBand {
    /// The inclusive lower bound of the band, always a multiple of 100.
    pub price_range: i64,
    /// The number of items in the band.
    pub item_count: i64,
}

/// Count the items listed in `month` by price band, in order of increasing price.
///
/// Only bands with at least one item are returned.
///
/// # Errors
/// Returns [Error::ConnectionUnavailable] if no database connection could be
/// acquired, or [Error::SqlError] if the query fails.
pub async fn get_price_histogram(
    month: Option<Month>,
    pool: &SqlitePool,
) -> Result<Vec<PriceBand>, Error> {
    // CAST truncates towards zero, so step negative prices that are not on a
    // band boundary down one band to get the floor.
    let query = format!(
        "SELECT (CAST(price / {PRICE_BAND_WIDTH} AS INTEGER) \
                - (price < 0 AND price <> CAST(price / {PRICE_BAND_WIDTH} AS INTEGER) * {PRICE_BAND_WIDTH})) \
                * {PRICE_BAND_WIDTH} AS price_range, \
            COUNT(*) AS item_count \
        FROM product_transaction \
        WHERE {MONTH_CONDITION} AND price IS NOT NULL \
        GROUP BY price_range \
        ORDER BY price_range ASC"
    );

    let bands = sqlx::query_as(&query)
        .bind(month_number(month))
        .fetch_all(pool)
        .await?;

    Ok(bands)
}

/// Get the price histogram for a month.
pub async fn get_bar_chart_endpoint(
    State(db_pool): State<SqlitePool>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<PriceBand>>, Error> {
    get_price_histogram(query.month(), &db_pool)
        .await
        .inspect_err(|error| tracing::error!("Error fetching bar chart data: {error}"))
        .map(Json)
}
