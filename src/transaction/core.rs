//! Defines the core data models and database queries for transactions.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, SqlitePool, sqlite::SqliteRow};
use time::{
    OffsetDateTime, PrimitiveDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use time_tz::{OffsetDateTimeExt, Tz};
use tokio::task::JoinSet;

use crate::Error;

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

/// The format dates of sale are stored and serialized in.
const SALE_DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Offset-less ISO 8601 date-times, e.g. "2021-11-27T20:29:54".
const ISO_LOCAL_DATE_TIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

time::serde::format_description!(
    sale_date_format,
    PrimitiveDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second]"
);

// ============================================================================
// MODELS
// ============================================================================

/// A product that has been listed for sale, and whether it sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The name of the product.
    pub title: String,
    /// A text description of the product.
    pub description: String,
    /// The asking price of the product.
    pub price: f64,
    /// A URL to a picture of the product.
    pub image: String,
    /// When the product was listed for sale, in local time.
    #[serde(with = "sale_date_format")]
    pub date_of_sale: PrimitiveDateTime,
    /// Whether the product sold.
    pub sold: bool,
    /// The category of the product, e.g. "electronics".
    pub category: String,
}

impl Transaction {
    /// The date of sale in the format it is stored in.
    pub fn formatted_date_of_sale(&self) -> String {
        format_date_of_sale(self.date_of_sale)
    }
}

impl FromRow<'_, SqliteRow> for Transaction {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let date_of_sale: String = row.try_get("date_of_sale")?;
        let date_of_sale = PrimitiveDateTime::parse(&date_of_sale, SALE_DATE_FORMAT).map_err(
            |error| sqlx::Error::ColumnDecode {
                index: "date_of_sale".to_owned(),
                source: Box::new(error),
            },
        )?;

        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            image: row.try_get("image")?,
            date_of_sale,
            sold: row.try_get("sold")?,
            category: row.try_get("category")?,
        })
    }
}

/// A transaction as it appears in the third-party product feed.
///
/// Any extra fields in the feed, such as its own `id`, are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// The name of the product.
    pub title: String,
    /// A text description of the product.
    pub description: String,
    /// The asking price of the product.
    pub price: f64,
    /// A URL to a picture of the product.
    pub image: String,
    /// When the product was listed for sale.
    ///
    /// Either an RFC 3339 timestamp with an offset, or a local date-time
    /// without one, see [normalize_date_of_sale].
    pub date_of_sale: String,
    /// Whether the product sold.
    pub sold: bool,
    /// The category of the product.
    pub category: String,
}

impl NewTransaction {
    /// Create an unsold, uncategorised transaction with an empty description and image.
    pub fn build(title: &str, price: f64, date_of_sale: &str) -> Self {
        Self {
            title: title.to_owned(),
            description: String::new(),
            price,
            image: String::new(),
            date_of_sale: date_of_sale.to_owned(),
            sold: false,
            category: String::new(),
        }
    }

    /// Set the description of the product.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the URL of the product image.
    pub fn image(mut self, image: &str) -> Self {
        self.image = image.to_owned();
        self
    }

    /// Set whether the product sold.
    pub fn sold(mut self, sold: bool) -> Self {
        self.sold = sold;
        self
    }

    /// Set the category of the product.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }
}

/// Convert a date of sale from the feed to a local date-time.
///
/// Timestamps with an offset (RFC 3339) are converted to `timezone`, using
/// the offset that was in effect at that instant.
/// Date-times without an offset, either `YYYY-MM-DD HH:mm:ss` or
/// `YYYY-MM-DDTHH:mm:ss`, are assumed to already be in local time.
///
/// # Errors
/// Returns [Error::InvalidDateOfSale] if `date_of_sale` matches none of these formats.
pub fn normalize_date_of_sale(
    date_of_sale: &str,
    timezone: &Tz,
) -> Result<PrimitiveDateTime, Error> {
    let date_of_sale = date_of_sale.trim();

    if let Ok(timestamp) = OffsetDateTime::parse(date_of_sale, &Rfc3339) {
        let local = timestamp.to_timezone(timezone);
        return Ok(PrimitiveDateTime::new(local.date(), local.time()));
    }

    PrimitiveDateTime::parse(date_of_sale, SALE_DATE_FORMAT)
        .or_else(|_| PrimitiveDateTime::parse(date_of_sale, ISO_LOCAL_DATE_TIME_FORMAT))
        .map_err(|_| Error::InvalidDateOfSale(date_of_sale.to_owned()))
}

fn format_date_of_sale(date_of_sale: PrimitiveDateTime) -> String {
    // The format only has components that every date-time has, so formatting cannot fail.
    date_of_sale
        .format(SALE_DATE_FORMAT)
        .unwrap_or_else(|_| date_of_sale.to_string())
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Insert a single transaction into the database.
///
/// The date of sale is normalized with [normalize_date_of_sale] and stored as
/// `YYYY-MM-DD HH:mm:ss`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidDateOfSale] if the date of sale cannot be parsed,
/// - or [Error::ConnectionUnavailable] if no database connection could be acquired,
/// - or [Error::SqlError] if there is some other SQL error.
pub async fn insert_transaction(
    new_transaction: &NewTransaction,
    timezone: &Tz,
    pool: &SqlitePool,
) -> Result<Transaction, Error> {
    let date_of_sale = normalize_date_of_sale(&new_transaction.date_of_sale, timezone)?;

    let transaction = sqlx::query_as(
        "INSERT INTO product_transaction (title, description, price, image, date_of_sale, sold, category)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         RETURNING id, title, description, price, image, date_of_sale, sold, category",
    )
    .bind(&new_transaction.title)
    .bind(&new_transaction.description)
    .bind(new_transaction.price)
    .bind(&new_transaction.image)
    .bind(format_date_of_sale(date_of_sale))
    .bind(new_transaction.sold)
    .bind(&new_transaction.category)
    .fetch_one(pool)
    .await?;

    Ok(transaction)
}

/// Insert every transaction in `new_transactions`, one row each.
///
/// All of the inserts are issued at once and may run on different pooled
/// connections in any order. This is not a database transaction: if one
/// insert fails, the rows that were inserted stay in the table and the whole
/// batch reports the first failure seen.
///
/// Returns the number of rows inserted.
///
/// # Errors
/// Returns the first error from [insert_transaction], or
/// [Error::TaskFailed] if an insert task panicked.
pub async fn bulk_insert(
    new_transactions: Vec<NewTransaction>,
    timezone: &'static Tz,
    pool: &SqlitePool,
) -> Result<usize, Error> {
    let mut inserts = JoinSet::new();

    for new_transaction in new_transactions {
        let pool = pool.clone();
        inserts.spawn(async move { insert_transaction(&new_transaction, timezone, &pool).await });
    }

    let mut inserted_count = 0;
    let mut first_error = None;

    while let Some(result) = inserts.join_next().await {
        match result {
            Ok(Ok(_)) => inserted_count += 1,
            Ok(Err(error)) => {
                tracing::error!("Error inserting transaction: {error}");
                first_error.get_or_insert(error);
            }
            Err(error) => {
                tracing::error!("Insert task failed: {error}");
                first_error.get_or_insert(Error::TaskFailed(error.to_string()));
            }
        }
    }

    match first_error {
        Some(error) => Err(error),
        None => Ok(inserted_count),
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub async fn create_transaction_table(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS product_transaction (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL,
                image TEXT NOT NULL,
                date_of_sale TEXT NOT NULL,
                sold INTEGER NOT NULL,
                category TEXT NOT NULL
                )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
