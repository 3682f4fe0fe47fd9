//! Table views for dashboard data display.

use maud::{Markup, html};

use crate::{
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency},
    statistics::Statistics,
    transaction::Transaction,
};

const STATISTIC_LABEL_STYLE: &str = "text-sm text-gray-500 dark:text-gray-400";
const STATISTIC_VALUE_STYLE: &str = "text-2xl font-semibold text-gray-900 dark:text-white";
const TABLE_CELL_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const TABLE_CELL_RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// Renders a table of one page of transactions.
///
/// Shows a single placeholder row when `transactions` is empty.
pub(super) fn transactions_table(transactions: &[Transaction]) -> Markup {
    html! {
        div class="w-full overflow-x-auto rounded-lg shadow" {
            table
                id="transactions-table"
                class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE) {
                    tr {
                        th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Price" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Sold" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Image" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date of Sale" }
                    }
                }
                tbody {
                    @for transaction in transactions {
                        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id) {
                            td class=(TABLE_CELL_STYLE) { (transaction.id) }
                            td class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"} {
                                (transaction.title)
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.description) }
                            td class={(TABLE_CELL_STYLE) " whitespace-nowrap"} {
                                (format_currency(transaction.price))
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.category) }
                            @if transaction.sold {
                                td class={(TABLE_CELL_STYLE) " " (TABLE_CELL_GREEN_STYLE)} { "Yes" }
                            } @else {
                                td class={(TABLE_CELL_STYLE) " " (TABLE_CELL_RED_STYLE)} { "No" }
                            }
                            td class=(TABLE_CELL_STYLE) {
                                img
                                    src=(transaction.image)
                                    alt=(transaction.title)
                                    class="w-12 h-12 object-contain"
                                    loading="lazy";
                            }
                            td class={(TABLE_CELL_STYLE) " whitespace-nowrap"} {
                                (transaction.formatted_date_of_sale())
                            }
                        }
                    }

                    @if transactions.is_empty() {
                        tr class=(TABLE_ROW_STYLE) {
                            td colspan="8" class={(TABLE_CELL_STYLE) " text-center"} {
                                "No transactions found."
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the sale statistics for a month as three cards.
pub(super) fn statistics_panel(statistics: &Statistics) -> Markup {
    html! {
        section id="statistics" class="w-full grid grid-cols-1 md:grid-cols-3 gap-4 mb-4" {
            div class="p-4 bg-white dark:bg-gray-800 rounded-lg shadow" {
                p class=(STATISTIC_LABEL_STYLE) { "Total Sale" }
                p id="total-sale-amount" class=(STATISTIC_VALUE_STYLE) {
                    (format_currency(statistics.total_sale_amount))
                }
            }
            div class="p-4 bg-white dark:bg-gray-800 rounded-lg shadow" {
                p class=(STATISTIC_LABEL_STYLE) { "Total Sold Items" }
                p id="total-sold-items" class=(STATISTIC_VALUE_STYLE) {
                    (statistics.total_sold_items)
                }
            }
            div class="p-4 bg-white dark:bg-gray-800 rounded-lg shadow" {
                p class=(STATISTIC_LABEL_STYLE) { "Total Not Sold Items" }
                p id="total-not-sold-items" class=(STATISTIC_VALUE_STYLE) {
                    (statistics.total_not_sold_items)
                }
            }
        }
    }
}
