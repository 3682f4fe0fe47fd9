//! The endpoint for listing the transactions in a month.

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    AppState, Error,
    month::parse_month,
    pagination::{Page, PaginationConfig},
};

use super::{
    core::Transaction,
    query::{TransactionFilter, list_transactions},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection pool.
    pub db_pool: SqlitePool,
    /// The config that controls the default page size.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters for the transactions endpoint.
///
/// Values are kept as strings so that malformed numbers fall back to
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    /// The month number, 1 for January through 12 for December.
    pub month: Option<String>,
    /// Text to find in the title, description or price.
    pub search: Option<String>,
    /// The page number, starting from 1.
    pub page: Option<String>,
    /// The number of transactions per page.
    pub per_page: Option<String>,
}

/// List one page of the transactions sold in a month, optionally filtered by a search term.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionsState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let filter = TransactionFilter::new(parse_month(query.month.as_deref()), query.search.as_deref());
    let page = Page::from_query(
        query.page.as_deref(),
        query.per_page.as_deref(),
        &state.pagination_config,
    );

    let transactions = list_transactions(&filter, page, &state.db_pool)
        .await
        .inspect_err(|error| tracing::error!("Error fetching transactions: {error}"))?;

    tracing::debug!("Fetched {} transactions", transactions.len());

    Ok(Json(transactions))
}
