//! The API endpoints URIs.

/// The HTML dashboard page.
pub const DASHBOARD_VIEW: &str = "/";
/// The route that seeds the database from the product feed.
pub const INITIALIZE_DATABASE: &str = "/initialize-database";
/// The route to list the transactions in a month.
pub const TRANSACTIONS: &str = "/transactions";
/// The route for the sale statistics of a month.
pub const STATISTICS: &str = "/statistics";
/// The route for the price histogram of a month.
pub const BAR_CHART: &str = "/bar-chart";
/// The route for the category breakdown of a month.
pub const PIE_CHART: &str = "/pie-chart";
/// The route for the transactions, statistics and charts of a month in one response.
pub const COMBINED_DATA: &str = "/combined-data";

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INITIALIZE_DATABASE);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::STATISTICS);
        assert_endpoint_is_valid_uri(endpoints::BAR_CHART);
        assert_endpoint_is_valid_uri(endpoints::PIE_CHART);
        assert_endpoint_is_valid_uri(endpoints::COMBINED_DATA);
    }
}
