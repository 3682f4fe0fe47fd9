//! The number of items listed in each category in a month.

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

/// The number of items listed in a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// The category name.
    pub category: String,
    /// The number of items in the category.
    pub item_count: i64,
}

/// Count the items listed in `month` per category, in order of category name.
///
/// # Errors
/// Returns [Error::ConnectionUnavailable] if no database connection could be
/// acquired, or [Error::SqlError] if the query fails.
pub async fn get_category_breakdown(
    month: Option<Month>,
    pool: &SqlitePool,
) -> Result<Vec<CategoryCount>, Error> {
    let query = format!(
        "SELECT category, COUNT(*) AS item_count \
        FROM product_transaction \
        WHERE {MONTH_CONDITION} \
        GROUP BY category \
        ORDER BY category ASC"
    );

    let categories = sqlx::query_as(&query)
        .bind(month_number(month))
        .fetch_all(pool)
        .await?;

    Ok(categories)
}

/// Get the category breakdown for a month.
pub async fn get_pie_chart_endpoint(
    State(db_pool): State<SqlitePool>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<CategoryCount>>, Error> {
    get_category_breakdown(query.month(), &db_pool)
        .await
        .inspect_err(|error| tracing::error!("Error fetching pie chart data: {error}"))
        .map(Json)
}
