//! Dashboard module
//!
//! Provides a page showing the transactions, sale statistics and charts for a
//! month, built from the same queries as the JSON endpoints.

mod charts;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;
