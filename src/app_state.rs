//! Implements a struct that holds the state of the REST server.

use axum::{extract::FromRef, http::HeaderValue};
use sqlx::SqlitePool;

use crate::{Error, pagination::PaginationConfig, timezone::require_timezone};

/// The URL of the third-party product feed used to seed the database.
pub const DEFAULT_FEED_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The pool of database connections shared by every request.
    pub db_pool: SqlitePool,

    /// The client used to fetch the product feed.
    pub http_client: reqwest::Client,

    /// Where to fetch the product feed from.
    pub feed_url: String,

    /// The only origin allowed to make cross-origin requests.
    pub allowed_origin: HeaderValue,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] around an open database connection pool.
    ///
    /// The database should already have been initialized with
    /// [crate::initialize_db]. `local_timezone` should be a valid, canonical
    /// timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if `allowed_origin` is not a valid header value or
    /// `local_timezone` is not a known timezone.
    pub fn new(
        db_pool: SqlitePool,
        feed_url: &str,
        allowed_origin: &str,
        local_timezone: &str,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        let allowed_origin = HeaderValue::from_str(allowed_origin)
            .map_err(|_| Error::InvalidOrigin(allowed_origin.to_owned()))?;
        require_timezone(local_timezone)?;

        Ok(Self {
            db_pool,
            http_client: reqwest::Client::new(),
            feed_url: feed_url.to_owned(),
            allowed_origin,
            local_timezone: local_timezone.to_owned(),
            pagination_config,
        })
    }
}

// The endpoints that only run a query take the pool directly.
impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db_pool.clone()
    }
}
