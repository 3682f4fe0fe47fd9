#![allow(missing_docs)]

pub(crate) mod html;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use time_tz::Tz;

use crate::{
    AppState, DEFAULT_FEED_URL, PaginationConfig,
    db::initialize,
    timezone::get_timezone,
    transaction::{NewTransaction, Transaction, insert_transaction},
};

pub(crate) use html::{assert_valid_html, parse_html_document};

/// Create an initialized in-memory database.
///
/// Each connection to `sqlite::memory:` opens its own database, so the pool
/// holds a single connection that is never recycled.
pub(crate) async fn get_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Could not open in-memory database");

    initialize(&pool)
        .await
        .expect("Could not initialize database");

    pool
}

/// The UTC timezone, used where tests don't care about local time.
pub(crate) fn utc() -> &'static Tz {
    get_timezone("Etc/UTC").expect("Etc/UTC should be a known timezone")
}

/// Insert `transactions` in order, with dates of sale read as UTC.
pub(crate) async fn seed(transactions: Vec<NewTransaction>, pool: &SqlitePool) -> Vec<Transaction> {
    let mut inserted = Vec::with_capacity(transactions.len());

    for transaction in &transactions {
        inserted.push(
            insert_transaction(transaction, utc(), pool)
                .await
                .expect("Could not insert test transaction"),
        );
    }

    inserted
}

pub(crate) async fn count_all_rows(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM product_transaction")
        .fetch_one(pool)
        .await
        .expect("Could not count rows")
}

pub(crate) fn get_test_app_state(db_pool: SqlitePool) -> AppState {
    AppState {
        db_pool,
        http_client: reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("Could not build HTTP client"),
        feed_url: DEFAULT_FEED_URL.to_owned(),
        allowed_origin: "http://localhost:3000".parse().expect("Invalid origin"),
        local_timezone: "Etc/UTC".to_owned(),
        pagination_config: PaginationConfig::default(),
    }
}
