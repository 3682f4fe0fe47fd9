//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations for a month:
//! - **Price Range Chart**: Bar chart of the number of items in each price band
//! - **Category Chart**: Pie chart of the number of items in each category
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, Orient, Tooltip, Trigger},
    series::{Pie, bar},
};
use maud::{Markup, PreEscaped, html};
use time::Month;

use crate::{
    bar_chart::{PRICE_BAND_WIDTH, PriceBand},
    html::HeadElement,
    pie_chart::CategoryCount,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing. The chart options carry text from the product
/// feed, so they are escaped with [escape_script_json] first.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id,
                escape_script_json(&chart.options)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Escape the characters in `json` that could end an inline `<script>` element.
///
/// The escapes are valid inside JSON strings, so the parsed value is unchanged.
pub(super) fn escape_script_json(json: &str) -> String {
    json.replace('&', "\\u0026")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

/// The label for the price band starting at `price_range`, e.g. "100 - 199".
pub(super) fn price_band_label(price_range: i64) -> String {
    format!("{} - {}", price_range, price_range + PRICE_BAND_WIDTH - 1)
}

pub(super) fn price_range_chart(month: Month, price_bands: &[PriceBand]) -> Chart {
    let labels: Vec<String> = price_bands
        .iter()
        .map(|band| price_band_label(band.price_range))
        .collect();
    let values: Vec<f64> = price_bands
        .iter()
        .map(|band| band.item_count as f64)
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Items by Price Range")
                .subtext(month.to_string()),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(bar::Bar::new().name("Items").data(values))
}

pub(super) fn category_chart(month: Month, categories: &[CategoryCount]) -> Chart {
    let data: Vec<(f64, String)> = categories
        .iter()
        .map(|category| (category.item_count as f64, category.category.clone()))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Items by Category")
                .subtext(month.to_string()),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().orient(Orient::Vertical).left("left").top("15%"))
        .series(Pie::new().name("Items").radius("60%").data(data))
}
