//! Creates the database connection pool and the schema for the transaction table.

use std::{path::PathBuf, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use crate::{Error, transaction::create_transaction_table};

/// The settings for the database connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// File path to the SQLite database. The file is created if it does not exist.
    pub path: PathBuf,
    /// The most connections the pool will hold open at once.
    ///
    /// Requests that need a connection while all of them are in use wait in
    /// a queue until one is released.
    pub max_connections: u32,
    /// How long a request waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Create a config for the database at `path` with the default pool settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("transactions.db"),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Open a bounded connection pool to the database described by `config`.
///
/// # Errors
/// Returns an error if the database file cannot be opened or created.
#[tracing::instrument(skip(config), fields(path = %config.path.display()))]
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, Error> {
    tracing::info!("Connecting to database...");

    let connect_options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(connect_options)
        .await?;

    tracing::info!(
        "Database connection pool created with up to {} connections",
        config.max_connections
    );

    Ok(pool)
}

/// Create the tables for the domain models if they do not already exist.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub async fn initialize(pool: &SqlitePool) -> Result<(), Error> {
    create_transaction_table(pool).await
}
