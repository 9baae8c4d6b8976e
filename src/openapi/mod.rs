use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "0.1.0",
        description = "Multi-store inventory management: store and product catalog, optimistic-concurrency stock updates, and inventory analytics."
    ),
    paths(
        crate::health::health_check,
        crate::handlers::stores::list_stores,
        crate::handlers::stores::get_store,
        crate::handlers::stores::create_store,
        crate::handlers::stores::update_store,
        crate::handlers::stores::delete_store,
        crate::handlers::products::list_products,
        crate::handlers::products::list_categories,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::adjust_quantity,
        crate::handlers::products::delete_product,
        crate::handlers::analytics::inventory_value,
        crate::handlers::analytics::low_stock,
        crate::handlers::analytics::category_summary,
    ),
    components(schemas(
        crate::entities::store::Model,
        crate::entities::product::Model,
        crate::errors::ErrorResponse,
        crate::health::HealthInfo,
        crate::services::stores::CreateStoreInput,
        crate::services::stores::UpdateStoreInput,
        crate::services::stores::StoreWithProductCount,
        crate::services::products::CreateProductInput,
        crate::services::products::UpdateProductInput,
        crate::services::products::AdjustQuantityInput,
        crate::services::products::AdjustmentReason,
        crate::services::products::ProductWithStore,
        crate::services::analytics::InventoryValueReport,
        crate::services::analytics::StoreInventoryValue,
        crate::services::analytics::LowStockProduct,
        crate::services::analytics::CategorySummary,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "stores", description = "Store management"),
        (name = "products", description = "Product catalog and stock"),
        (name = "analytics", description = "Inventory analytics"),
    )
)]
pub struct ApiDoc;

/// Swagger UI router, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
