//! A small dashboard for analysing product sale transactions.
//!
//! The library provides a JSON API over a single SQLite table of transactions
//! (monthly listings, statistics, price histogram and category breakdown), the
//! import of those transactions from a third-party JSON feed, and a
//! server-rendered HTML dashboard page.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::{Deserialize, Serialize};
use tokio::signal;

mod app_state;
mod bar_chart;
mod combined_data;
mod dashboard;
mod db;
mod endpoints;
mod html;
mod import;
mod logging;
mod month;
mod pagination;
mod pie_chart;
mod routing;
mod statistics;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, DEFAULT_FEED_URL};
pub use db::{DatabaseConfig, create_pool, initialize as initialize_db};
pub use import::{fetch_feed, import_transactions, read_feed_file};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use timezone::get_timezone;
pub use transaction::{NewTransaction, Transaction, bulk_insert};

/// The message sent to clients whenever a request fails.
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// A JSON body holding a single human readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The text of the message.
    pub message: String,
}

impl Message {
    /// Create a message from a string slice.
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

/// The errors that may occur in the application.
///
/// Every variant is reported to the client as the same generic internal
/// server error. The details are only written to the server logs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transaction feed could not be fetched or decoded.
    ///
    /// Callers should pass in the original error as a string.
    #[error("could not load the transaction feed: {0}")]
    FeedError(String),

    /// A connection could not be acquired from the database pool, either
    /// because the pool timed out waiting for a free connection or because
    /// the pool has been closed.
    #[error("could not acquire a database connection: {0}")]
    ConnectionUnavailable(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(sqlx::Error),

    /// The date of sale of an imported transaction could not be parsed.
    ///
    /// Holds the raw date string that caused the error.
    #[error("could not parse the date of sale \"{0}\"")]
    InvalidDateOfSale(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The allowed CORS origin is not a valid header value.
    #[error("invalid allowed origin \"{0}\"")]
    InvalidOrigin(String),

    /// The body of a request or response could not be read.
    #[error("could not read the HTTP body: {0}")]
    BodyError(String),

    /// A task spawned to run a query panicked or was cancelled.
    #[error("a database task failed to complete: {0}")]
    TaskFailed(String),
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Error::ConnectionUnavailable(value.to_string())
            }
            error => Error::SqlError(error),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::FeedError(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("An unexpected error occurred: {}", self);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Message::new(INTERNAL_SERVER_ERROR_MESSAGE)),
        )
            .into_response()
    }
}

impl Error {
    /// Render the error as the HTML error page rather than a JSON body.
    fn into_html_response(self) -> Response {
        tracing::error!("An unexpected error occurred: {}", self);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            html::error_view(
                "Internal Server Error",
                "500",
                "Sorry, something went wrong.",
                "Try again later or check the server logs",
            ),
        )
            .into_response()
    }
}
