use std::{fs::OpenOptions, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use sales_dashboard::{
    AppState, DEFAULT_FEED_URL, DatabaseConfig, PaginationConfig, build_router, create_pool,
    graceful_shutdown, initialize_db, logging_middleware,
};

/// The REST API server for the sales dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, default_value = "transactions.db")]
    db_path: PathBuf,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 4000)]
    port: u16,

    /// The only origin allowed to make cross-origin requests.
    #[arg(long, default_value = "http://localhost:3000")]
    allowed_origin: String,

    /// Where `/initialize-database` fetches the product feed from.
    #[arg(long, default_value = DEFAULT_FEED_URL)]
    feed_url: String,

    /// The largest number of open database connections.
    #[arg(long, default_value_t = 10)]
    max_connections: u32,

    /// How long a request waits for a free database connection, in seconds.
    #[arg(long, default_value_t = 30)]
    acquire_timeout_secs: u64,

    /// The canonical timezone that dates of sale are converted to, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let db_config = DatabaseConfig {
        path: args.db_path,
        max_connections: args.max_connections,
        acquire_timeout: Duration::from_secs(args.acquire_timeout_secs),
    };
    let db_pool = create_pool(&db_config)
        .await
        .expect("Could not open the database.");
    initialize_db(&db_pool)
        .await
        .expect("Could not initialize the database.");

    let app_state = AppState::new(
        db_pool,
        &args.feed_url,
        &args.allowed_origin,
        &args.timezone,
        PaginationConfig::default(),
    )
    .expect("Invalid server configuration.");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(app_state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server stopped with an error: {error}");
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sales_dashboard=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG)
                .with_filter(env_filter),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
