//! Parsing of the `month` query parameter used to filter transactions.
//!
//! Transactions are filtered on the calendar month of their date of sale only,
//! so sales from the same month of different years are grouped together.

use serde::Deserialize;
use time::Month;

/// The SQL condition that matches rows whose date of sale falls in the month bound to `?1`.
///
/// Binding `NULL` matches no rows.
pub(crate) const MONTH_CONDITION: &str = "CAST(strftime('%m', date_of_sale) AS INTEGER) = ?1";

/// Query parameters for the endpoints that only take a month.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// The month number, 1 for January through 12 for December.
    pub month: Option<String>,
}

impl MonthQuery {
    /// The month to filter on, or `None` if the parameter is missing or invalid.
    pub fn month(&self) -> Option<Month> {
        parse_month(self.month.as_deref())
    }
}

/// Parse a month number between 1 and 12.
///
/// Missing, non-numeric and out of range values all give `None`, which
/// filters out every transaction rather than rejecting the request.
pub fn parse_month(value: Option<&str>) -> Option<Month> {
    let number = value?.trim().parse::<u8>().ok()?;

    Month::try_from(number).ok()
}

/// The value to bind for [MONTH_CONDITION].
pub(crate) fn month_number(month: Option<Month>) -> Option<i64> {
    month.map(|month| i64::from(u8::from(month)))
}
