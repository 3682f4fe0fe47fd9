//! Combines the transactions, statistics, bar chart and pie chart for a month into one response.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use time::Month;

use crate::{
    Error,
    bar_chart::{PriceBand, get_price_histogram},
    month::MonthQuery,
    pagination::Page,
    pie_chart::{CategoryCount, get_category_breakdown},
    statistics::{Statistics, get_statistics},
    transaction::{Transaction, TransactionFilter, TransactionsState, list_transactions},
};

/// Everything the dashboard shows for a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedData {
    /// The first page of the month's transactions, without a search filter.
    pub transactions: Vec<Transaction>,
    /// The month's sale statistics.
    pub statistics: Statistics,
    /// The month's price histogram.
    pub bar_chart: Vec<PriceBand>,
    /// The month's category breakdown.
    pub pie_chart: Vec<CategoryCount>,
}

/// Run the four queries for `month` concurrently and collect their results.
///
/// # Errors
/// Returns the first error from any of the four queries.
pub async fn get_combined_data(
    month: Option<Month>,
    state: &TransactionsState,
) -> Result<CombinedData, Error> {
    let filter = TransactionFilter::new(month, None);
    let page = Page::first(&state.pagination_config);
    let pool = &state.db_pool;

    let (transactions, statistics, bar_chart, pie_chart) = tokio::try_join!(
        list_transactions(&filter, page, pool),
        get_statistics(month, pool),
        get_price_histogram(month, pool),
        get_category_breakdown(month, pool),
    )?;

    Ok(CombinedData {
        transactions,
        statistics,
        bar_chart,
        pie_chart,
    })
}

/// Get the transactions, statistics, bar chart and pie chart for a month.
pub async fn get_combined_data_endpoint(
    State(state): State<TransactionsState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<CombinedData>, Error> {
    get_combined_data(query.month(), &state)
        .await
        .inspect_err(|error| tracing::error!("Error combining data: {error}"))
        .map(Json)
}
