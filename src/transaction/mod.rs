//! Product sale transactions.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the `NewTransaction` records read from the feed
//! - Database functions for storing and bulk inserting transactions
//! - The monthly listing query with search and pagination, and its endpoint

mod core;
mod list_endpoint;
mod query;

pub use core::{
    NewTransaction, Transaction, bulk_insert, create_transaction_table, insert_transaction,
    normalize_date_of_sale,
};
pub use list_endpoint::{TransactionsState, get_transactions_endpoint};
pub use query::{TransactionFilter, count_transactions, list_transactions};
