use crate::errors::ApiError;
use crate::handlers::common::success_response;
use crate::services::analytics::{CategorySummary, InventoryValueReport, LowStockProduct};
use crate::AppState;
use axum::{extract::State, response::IntoResponse, routing::get, Router};

/// Create the analytics router
pub fn analytics_router() -> Router<AppState> {
    Router::new()
        .route("/inventory-value", get(inventory_value))
        .route("/low-stock", get(low_stock))
        .route("/category-summary", get(category_summary))
}

/// Inventory value per store and the grand total
#[utoipa::path(
    get,
    path = "/api/v1/analytics/inventory-value",
    responses(
        (status = 200, description = "Inventory value report", body = InventoryValueReport),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn inventory_value(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.services.analytics.inventory_value().await?;
    Ok(success_response(report))
}

/// Products at or below their low-stock threshold
#[utoipa::path(
    get,
    path = "/api/v1/analytics/low-stock",
    responses(
        (status = 200, description = "Low-stock listing", body = Vec<LowStockProduct>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn low_stock(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state.services.analytics.low_stock_products().await?;
    Ok(success_response(products))
}

/// Per-category product rollups
#[utoipa::path(
    get,
    path = "/api/v1/analytics/category-summary",
    responses(
        (status = 200, description = "Category summaries", body = Vec<CategorySummary>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn category_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let summaries = state.services.analytics.category_summary().await?;
    Ok(success_response(summaries))
}
