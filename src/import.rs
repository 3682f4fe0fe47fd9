//! Seeding the transaction table from the third-party product feed.
//!
//! The feed is a JSON array of products. It is either fetched over HTTP, which
//! is what the `/initialize-database` endpoint does, or read from a local copy
//! of the file by the `import_feed` binary.

use std::path::Path;

use axum::{
    Json,
    extract::{FromRef, State},
};
use sqlx::SqlitePool;
use time_tz::Tz;

use crate::{
    AppState, Error, Message,
    timezone::require_timezone,
    transaction::{NewTransaction, bulk_insert},
};

/// The response message when the database has been seeded.
pub const INITIALIZED_MESSAGE: &str = "Database initialized successfully";

/// The state needed to import the product feed.
#[derive(Debug, Clone)]
pub struct ImportState {
    /// The database connection pool.
    pub db_pool: SqlitePool,
    /// The client used to fetch the feed.
    pub http_client: reqwest::Client,
    /// Where to fetch the feed from.
    pub feed_url: String,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
            http_client: state.http_client.clone(),
            feed_url: state.feed_url.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Fetch and decode the product feed at `url`.
///
/// # Errors
/// Returns [Error::FeedError] if the request fails, the server responds with
/// an error status, or the body is not a JSON array of products.
#[tracing::instrument(skip(client))]
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<Vec<NewTransaction>, Error> {
    let new_transactions = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<NewTransaction>>()
        .await?;

    tracing::info!("Fetched {} products from the feed", new_transactions.len());

    Ok(new_transactions)
}

/// Read and decode a local copy of the product feed.
///
/// # Errors
/// Returns [Error::FeedError] if the file cannot be read or is not a JSON
/// array of products.
pub async fn read_feed_file(path: &Path) -> Result<Vec<NewTransaction>, Error> {
    let contents = tokio::fs::read(path)
        .await
        .map_err(|error| Error::FeedError(format!("could not read {}: {error}", path.display())))?;

    serde_json::from_slice(&contents)
        .map_err(|error| Error::FeedError(format!("could not parse {}: {error}", path.display())))
}

/// Insert every product in `new_transactions` and log how many rows were added.
///
/// # Errors
/// Returns the first error from [bulk_insert].
pub async fn import_transactions(
    new_transactions: Vec<NewTransaction>,
    timezone: &'static Tz,
    pool: &SqlitePool,
) -> Result<usize, Error> {
    let inserted_count = bulk_insert(new_transactions, timezone, pool)
        .await
        .inspect_err(|error| tracing::error!("Error inserting data: {error}"))?;

    tracing::info!("Inserted {inserted_count} transactions");

    Ok(inserted_count)
}

/// Fetch the product feed and insert every product into the database.
///
/// Inserts are not rolled back if one of them fails, so a failed request may
/// leave some of the products in the table.
pub async fn initialize_database_endpoint(
    State(state): State<ImportState>,
) -> Result<Json<Message>, Error> {
    let timezone = require_timezone(&state.local_timezone)?;

    let new_transactions = fetch_feed(&state.http_client, &state.feed_url)
        .await
        .inspect_err(|error| tracing::error!("Error fetching data from API: {error}"))?;

    import_transactions(new_transactions, timezone, &state.db_pool).await?;

    Ok(Json(Message::new(INITIALIZED_MESSAGE)))
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        AppState, INTERNAL_SERVER_ERROR_MESSAGE, Message, build_router, endpoints,
        test_utils::{count_all_rows, get_test_app_state, get_test_pool},
    };

    use super::{INITIALIZED_MESSAGE, read_feed_file};

    /// Serve `body` from a local HTTP server and return the URL of the feed.
    async fn serve_feed(status: StatusCode, body: Value) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Could not bind feed server");
        let address = listener.local_addr().expect("Could not get feed address");
        let app = Router::new().route(
            "/product_transaction.json",
            get(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        );

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Feed server stopped unexpectedly");
        });

        format!("http://{address}/product_transaction.json")
    }

    fn feed_record(id: i64, date_of_sale: &str) -> Value {
        json!({
            "id": id,
            "title": format!("Product #{id}"),
            "price": 10.5 * id as f64,
            "description": "A product",
            "category": "electronics",
            "image": "https://example.com/product.jpg",
            "sold": id % 2 == 0,
            "dateOfSale": date_of_sale
        })
    }

    async fn get_test_server(feed_url: String) -> (TestServer, sqlx::SqlitePool) {
        let pool = get_test_pool().await;
        let state = AppState {
            feed_url,
            ..get_test_app_state(pool.clone())
        };
        let server = TestServer::new(build_router(state)).expect("Could not create test server.");

        (server, pool)
    }

    #[tokio::test]
    async fn imports_every_product() {
        let feed = json!([
            feed_record(1, "2021-11-27T20:29:54+05:30"),
            feed_record(2, "2022-03-27T20:29:54+05:30"),
            feed_record(3, "2022-03-01T00:00:00Z"),
        ]);
        let (server, pool) = get_test_server(serve_feed(StatusCode::OK, feed).await).await;

        let response = server.get(endpoints::INITIALIZE_DATABASE).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Message>(), Message::new(INITIALIZED_MESSAGE));
        assert_eq!(count_all_rows(&pool).await, 3);
    }

    #[tokio::test]
    async fn converts_dates_with_offset_in_effect_at_time_of_sale() {
        let feed = json!([feed_record(1, "2022-03-01T04:30:00Z")]);
        let pool = get_test_pool().await;
        let state = AppState {
            feed_url: serve_feed(StatusCode::OK, feed).await,
            local_timezone: "America/New_York".to_owned(),
            ..get_test_app_state(pool.clone())
        };
        let server = TestServer::new(build_router(state)).expect("Could not create test server.");

        server
            .get(endpoints::INITIALIZE_DATABASE)
            .await
            .assert_status_ok();

        let stored: String = sqlx::query_scalar("SELECT date_of_sale FROM product_transaction")
            .fetch_one(&pool)
            .await
            .expect("Could not query date of sale");
        assert_eq!(stored, "2022-02-28 23:30:00");
    }

    #[tokio::test]
    async fn keeps_inserted_rows_when_a_product_fails() {
        let feed = json!([
            feed_record(1, "2022-03-01T00:00:00Z"),
            feed_record(2, "sometime in March"),
            feed_record(3, "2022-03-02T00:00:00Z"),
        ]);
        let (server, pool) = get_test_server(serve_feed(StatusCode::OK, feed).await).await;

        let response = server.get(endpoints::INITIALIZE_DATABASE).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<Message>(),
            Message::new(INTERNAL_SERVER_ERROR_MESSAGE)
        );
        assert_eq!(count_all_rows(&pool).await, 2);
    }

    #[tokio::test]
    async fn feed_error_status_returns_internal_server_error() {
        let feed_url = serve_feed(StatusCode::SERVICE_UNAVAILABLE, json!({})).await;
        let (server, pool) = get_test_server(feed_url).await;

        let response = server.get(endpoints::INITIALIZE_DATABASE).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(count_all_rows(&pool).await, 0);
    }

    #[tokio::test]
    async fn malformed_feed_returns_internal_server_error() {
        let feed_url = serve_feed(StatusCode::OK, json!({"products": []})).await;
        let (server, pool) = get_test_server(feed_url).await;

        let response = server.get(endpoints::INITIALIZE_DATABASE).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(count_all_rows(&pool).await, 0);
    }

    #[tokio::test]
    async fn reads_feed_from_file() {
        let path = std::env::temp_dir().join(format!(
            "sales_dashboard_feed_{}.json",
            std::process::id()
        ));
        let feed = json!([feed_record(1, "2022-03-01T00:00:00Z")]);
        tokio::fs::write(&path, feed.to_string())
            .await
            .expect("Could not write feed file");

        let got = read_feed_file(&path).await;
        tokio::fs::remove_file(&path)
            .await
            .expect("Could not remove feed file");

        let got = got.expect("Could not read feed file");
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].title, "Product #1");
        assert!(!got[0].sold);
    }

    #[tokio::test]
    async fn missing_feed_file_is_a_feed_error() {
        let result = read_feed_file(std::path::Path::new("/definitely/not/a/feed.json")).await;

        assert!(
            matches!(result, Err(crate::Error::FeedError(_))),
            "want FeedError, got {result:?}"
        );
    }
}
