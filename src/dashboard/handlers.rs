//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - HTML view functions for rendering the dashboard UI
//! - The query type used by the handler

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Month;

use crate::{
    Error,
    bar_chart::get_price_histogram,
    dashboard::{
        charts::{DashboardChart, category_chart, charts_script, charts_view, price_range_chart},
        tables::{statistics_panel, transactions_table},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, ECHARTS_URL, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, base, link,
    },
    month::parse_month,
    pagination::Page,
    pie_chart::get_category_breakdown,
    statistics::{Statistics, get_statistics},
    transaction::{
        Transaction, TransactionFilter, TransactionsState, count_transactions, list_transactions,
    },
};

/// The month shown when the request does not name a valid one.
const DEFAULT_MONTH: Month = Month::March;

/// The query parameters for the dashboard page.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The month number, 1 for January through 12 for December.
    pub month: Option<String>,
    /// Text to find in the title, description or price.
    pub search: Option<String>,
    /// The page number of the transactions table, starting from 1.
    pub page: Option<String>,
}

/// The query string of a link to another page of the dashboard.
#[derive(Serialize)]
struct DashboardLink<'a> {
    month: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    page: u32,
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    month: Month,
    filter: TransactionFilter,
    page: Page,
    page_count: i64,
    transactions: Vec<Transaction>,
    statistics: Statistics,
    charts: [DashboardChart; 2],
}

/// Display a page with the transactions, statistics and charts for a month.
pub async fn get_dashboard_page(
    State(state): State<TransactionsState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    match build_dashboard_data(&query, &state).await {
        Ok(data) => dashboard_view(&data).into_response(),
        Err(error) => error.into_html_response(),
    }
}

/// Fetches and builds all data needed for the dashboard display.
///
/// The five queries run concurrently.
///
/// # Errors
/// Returns the first error from any of the queries.
async fn build_dashboard_data(
    query: &DashboardQuery,
    state: &TransactionsState,
) -> Result<DashboardData, Error> {
    let month = parse_month(query.month.as_deref()).unwrap_or(DEFAULT_MONTH);
    let filter = TransactionFilter::new(Some(month), query.search.as_deref());
    let page = Page::from_query(query.page.as_deref(), None, &state.pagination_config);
    let pool = &state.db_pool;

    let (transactions, transaction_count, statistics, price_bands, categories) = tokio::try_join!(
        list_transactions(&filter, page, pool),
        count_transactions(&filter, pool),
        get_statistics(Some(month), pool),
        get_price_histogram(Some(month), pool),
        get_category_breakdown(Some(month), pool),
    )
    .inspect_err(|error| tracing::error!("Could not build the dashboard: {error}"))?;

    let charts = [
        DashboardChart {
            id: "price-range-chart",
            options: price_range_chart(month, &price_bands).to_string(),
        },
        DashboardChart {
            id: "category-chart",
            options: category_chart(month, &categories).to_string(),
        },
    ];

    Ok(DashboardData {
        month,
        page_count: page.page_count(transaction_count),
        filter,
        page,
        transactions,
        statistics,
        charts,
    })
}

/// The URL of the dashboard for `month`, `search` and `page`.
fn dashboard_url(month: Month, search: Option<&str>, page: u32) -> String {
    let link = DashboardLink {
        month: u8::from(month),
        search,
        page,
    };

    match serde_urlencoded::to_string(&link) {
        Ok(query_string) => format!("{}?{query_string}", endpoints::DASHBOARD_VIEW),
        Err(error) => {
            tracing::warn!("Could not encode dashboard link: {error}");
            endpoints::DASHBOARD_VIEW.to_owned()
        }
    }
}

/// Renders the month selector and search box.
fn filter_form(month: Month, search: Option<&str>) -> Markup {
    let months = (1..=12u8).filter_map(|number| Month::try_from(number).ok());

    html!(
        form
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="w-full flex flex-col md:flex-row gap-4 items-end mb-4"
        {
            div class="w-full md:w-1/3"
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                select id="month" name="month" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for choice in months {
                        option value=(u8::from(choice)) selected[choice == month] { (choice) }
                    }
                }
            }

            div class="w-full md:w-1/2"
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }

                input
                    id="search"
                    type="search"
                    name="search"
                    placeholder="Title, description or price"
                    value=[search]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
        }
    )
}

/// Renders the previous and next page links for the transactions table.
fn pagination_links(data: &DashboardData) -> Markup {
    let search = data.filter.search.as_deref();
    let page_number = data.page.number;
    let has_previous = page_number > 1;
    let has_next = i64::from(page_number) < data.page_count;

    html!(
        nav
            id="pagination"
            class="w-full flex justify-between items-center my-4"
        {
            @if has_previous {
                (link(&dashboard_url(data.month, search, page_number - 1), "Previous"))
            } @else {
                span {}
            }

            span class="text-sm" { "Page " (page_number) " of " (data.page_count.max(1)) }

            @if has_next {
                (link(&dashboard_url(data.month, search, page_number + 1), "Next"))
            } @else {
                span {}
            }
        }
    )
}

/// Renders the main dashboard page with the filter form, statistics, transactions and charts.
fn dashboard_view(data: &DashboardData) -> Markup {
    let content = html!(
        div
            id="dashboard-content"
            class={(PAGE_CONTAINER_STYLE) " max-w-screen-xl"}
        {
            h1 class="text-2xl font-bold mb-4" { "Transactions for " (data.month) }

            (filter_form(data.month, data.filter.search.as_deref()))
            (statistics_panel(&data.statistics))
            (transactions_table(&data.transactions))
            (pagination_links(data))
            (charts_view(&data.charts))
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
        charts_script(&data.charts),
    ];

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use scraper::{Html, Selector};
    use time::Month;

    use crate::{
        build_router, endpoints,
        test_utils::{
            assert_valid_html, get_test_app_state, get_test_pool, parse_html_document, seed,
        },
        transaction::NewTransaction,
    };

    use super::dashboard_url;

    async fn get_test_server() -> (TestServer, sqlx::SqlitePool) {
        let pool = get_test_pool().await;
        let server = TestServer::new(build_router(get_test_app_state(pool.clone())))
            .expect("Could not create test server.");

        (server, pool)
    }

    fn march_transactions(count: usize) -> Vec<NewTransaction> {
        (1..=count)
            .map(|i| {
                NewTransaction::build(&format!("Product {i}"), 50.0 * i as f64, "2022-03-10 12:00:00")
                    .category("electronics")
                    .sold(i % 2 == 0)
            })
            .collect()
    }

    #[track_caller]
    fn select_text(html: &Html, selector: &str) -> String {
        let selector = Selector::parse(selector).unwrap();
        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("No element matches {selector:?}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[track_caller]
    fn count_rows(html: &Html) -> usize {
        let selector = Selector::parse("#transactions-table tbody tr[data-transaction-id]").unwrap();
        html.select(&selector).count()
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{}' not found",
            chart_id
        );
    }

    #[tokio::test]
    async fn dashboard_page_loads_successfully() {
        let (server, pool) = get_test_server().await;
        seed(march_transactions(3), &pool).await;

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_query_param("month", 3)
            .await;

        response.assert_status_ok();
        let html = parse_html_document(&response);
        assert_valid_html(&html);
        assert_eq!(count_rows(&html), 3);
        assert_eq!(select_text(&html, "#total-sale-amount"), "$100.00");
        assert_eq!(select_text(&html, "#total-sold-items"), "1");
        assert_eq!(select_text(&html, "#total-not-sold-items"), "2");
        assert_chart_exists(&html, "price-range-chart");
        assert_chart_exists(&html, "category-chart");
    }

    #[tokio::test]
    async fn defaults_to_march() {
        let (server, pool) = get_test_server().await;
        seed(march_transactions(2), &pool).await;

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_query_param("month", "not a month")
            .await;

        response.assert_status_ok();
        let html = parse_html_document(&response);
        assert_eq!(count_rows(&html), 2);
        assert_eq!(select_text(&html, "#month option[selected]"), "March");
    }

    #[tokio::test]
    async fn shows_placeholder_when_there_are_no_transactions() {
        let (server, _pool) = get_test_server().await;

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_query_param("month", 7)
            .await;

        response.assert_status_ok();
        let html = parse_html_document(&response);
        assert_eq!(count_rows(&html), 0);
        assert_eq!(
            select_text(&html, "#transactions-table tbody td"),
            "No transactions found."
        );
        assert_eq!(select_text(&html, "#total-sale-amount"), "$0.00");
    }

    #[tokio::test]
    async fn filters_by_search_term() {
        let (server, pool) = get_test_server().await;
        seed(march_transactions(3), &pool).await;

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_query_param("month", 3)
            .add_query_param("search", "Product 2")
            .await;

        response.assert_status_ok();
        let html = parse_html_document(&response);
        assert_eq!(count_rows(&html), 1);
        assert_eq!(
            select_text(&html, "#transactions-table tbody tr td:nth-child(2)"),
            "Product 2"
        );
    }

    #[tokio::test]
    async fn category_names_are_escaped_in_chart_script() {
        let (server, pool) = get_test_server().await;
        seed(
            vec![
                NewTransaction::build("Product 1", 50.0, "2022-03-10 12:00:00")
                    .category("</script><script>alert(1)</script>"),
            ],
            &pool,
        )
        .await;

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_query_param("month", 3)
            .await;

        response.assert_status_ok();
        let body = response.text();
        assert!(
            !body.contains("<script>alert(1)</script>"),
            "category was rendered as markup"
        );
        assert_chart_exists(&parse_html_document(&response), "category-chart");
    }

    #[tokio::test]
    async fn links_to_neighbouring_pages() {
        let (server, pool) = get_test_server().await;
        seed(march_transactions(25), &pool).await;

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_query_param("month", 3)
            .add_query_param("page", 2)
            .await;

        response.assert_status_ok();
        let html = parse_html_document(&response);
        assert_eq!(count_rows(&html), 10);
        assert_eq!(
            select_text(&html, "#transactions-table tbody tr td:first-child"),
            "11"
        );

        let selector = Selector::parse("#pagination a").unwrap();
        let links: Vec<_> = html
            .select(&selector)
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(links, ["/?month=3&page=1", "/?month=3&page=3"]);
    }

    #[tokio::test]
    async fn renders_error_page_when_database_is_unavailable() {
        let (server, pool) = get_test_server().await;
        pool.close().await;

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_document(&response);
        assert_eq!(select_text(&html, "h1"), "500");
    }

    #[test]
    fn encodes_search_in_links() {
        assert_eq!(
            dashboard_url(Month::March, Some("blue & green"), 2),
            "/?month=3&search=blue+%26+green&page=2"
        );
        assert_eq!(dashboard_url(Month::July, None, 1), "/?month=7&page=1");
    }
}
