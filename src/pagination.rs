//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u32,
    /// The number of transactions per page when not specified in a request.
    pub default_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
        }
    }
}

/// A single page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The page number, starting from 1.
    pub number: u32,
    /// The number of items on a page.
    pub size: u32,
}

impl Page {
    /// The first page with the default page size.
    pub fn first(config: &PaginationConfig) -> Self {
        Self {
            number: config.default_page.max(1),
            size: config.default_page_size.max(1),
        }
    }

    /// Build a page from the raw `page` and `perPage` query parameters.
    ///
    /// Missing, non-numeric and zero values fall back to the defaults in `config`.
    /// Any other page size is used as is.
    pub fn from_query(page: Option<&str>, per_page: Option<&str>, config: &PaginationConfig) -> Self {
        let first = Self::first(config);

        Self {
            number: parse_positive(page).unwrap_or(first.number),
            size: parse_positive(per_page).unwrap_or(first.size),
        }
    }

    /// The number of rows to skip to get to this page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.number) - 1) * i64::from(self.size)
    }

    /// The maximum number of rows on this page.
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// The number of pages needed to show `item_count` items.
    pub fn page_count(&self, item_count: i64) -> i64 {
        let size = i64::from(self.size);

        (item_count.max(0) + size - 1) / size
    }
}

fn parse_positive(value: Option<&str>) -> Option<u32> {
    value?.trim().parse::<u32>().ok().filter(|&number| number > 0)
}

#[cfg(test)]
mod tests {
    use crate::pagination::{Page, PaginationConfig};

    #[test]
    fn uses_defaults_when_missing() {
        let got = Page::from_query(None, None, &PaginationConfig::default());

        assert_eq!(got, Page { number: 1, size: 10 });
        assert_eq!(got.offset(), 0);
        assert_eq!(got.limit(), 10);
    }

    #[test]
    fn uses_defaults_for_invalid_values() {
        let config = PaginationConfig::default();

        assert_eq!(
            Page::from_query(Some("0"), Some("0"), &config),
            Page { number: 1, size: 10 }
        );
        assert_eq!(
            Page::from_query(Some("two"), Some("-5"), &config),
            Page { number: 1, size: 10 }
        );
    }

    #[test]
    fn offset_skips_previous_pages() {
        let got = Page::from_query(Some("3"), Some("25"), &PaginationConfig::default());

        assert_eq!(got, Page { number: 3, size: 25 });
        assert_eq!(got.offset(), 50);
    }

    #[test]
    fn keeps_large_page_sizes() {
        let got = Page::from_query(Some("2"), Some("200"), &PaginationConfig::default());

        assert_eq!(got, Page { number: 2, size: 200 });
        assert_eq!(got.limit(), 200);
        assert_eq!(got.offset(), 200);
    }

    #[test]
    fn counts_pages() {
        let page = Page { number: 1, size: 10 };

        assert_eq!(page.page_count(0), 0);
        assert_eq!(page.page_count(1), 1);
        assert_eq!(page.page_count(10), 1);
        assert_eq!(page.page_count(11), 2);
    }
}
