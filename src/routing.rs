//! Application router configuration.

use axum::{Router, http::Method, routing::get};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    bar_chart::get_bar_chart_endpoint,
    combined_data::get_combined_data_endpoint,
    dashboard::get_dashboard_page,
    endpoints,
    import::initialize_database_endpoint,
    pie_chart::get_pie_chart_endpoint,
    statistics::get_statistics_endpoint,
    transaction::get_transactions_endpoint,
};

/// Return a router with all the app's routes.
///
/// Cross-origin requests are only allowed from [AppState::allowed_origin].
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.allowed_origin.clone())
        .allow_methods([Method::GET]);

    Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(
            endpoints::INITIALIZE_DATABASE,
            get(initialize_database_endpoint),
        )
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .route(endpoints::STATISTICS, get(get_statistics_endpoint))
        .route(endpoints::BAR_CHART, get(get_bar_chart_endpoint))
        .route(endpoints::PIE_CHART, get(get_pie_chart_endpoint))
        .route(endpoints::COMBINED_DATA, get(get_combined_data_endpoint))
        .layer(cors)
        .with_state(state)
}
