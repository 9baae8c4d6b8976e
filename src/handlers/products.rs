use crate::errors::ApiError;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::queries::{
    ProductSearchQuery, ProductSortField, SortDirection, DEFAULT_LIMIT, DEFAULT_PAGE,
};
use crate::services::products::{
    AdjustQuantityInput, CreateProductInput, ProductWithStore, UpdateProductInput,
};
use crate::{AppState, PaginatedResponse};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

/// Query string parameters for the product listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListParams {
    /// Restrict to one store
    pub store_id: Option<Uuid>,
    /// Exact category match
    pub category: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound
    pub max_price: Option<Decimal>,
    /// Only products with quantity > 0
    pub in_stock: Option<bool>,
    /// Only products at or below their low-stock threshold
    pub low_stock: Option<bool>,
    /// Case-insensitive substring match over name, description and SKU
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub sort_by: ProductSortField,
    #[serde(default)]
    pub sort_order: SortDirection,
}

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl From<ProductListParams> for ProductSearchQuery {
    fn from(params: ProductListParams) -> Self {
        Self {
            store_id: params.store_id,
            category: params.category,
            min_price: params.min_price,
            max_price: params.max_price,
            in_stock: params.in_stock,
            low_stock: params.low_stock,
            search: params.search,
            page: params.page,
            limit: params.limit,
            sort_by: params.sort_by,
            sort_order: params.sort_order,
        }
    }
}

/// Create the products router
pub fn products_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/categories", get(list_categories))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/:id/adjust-quantity", post(adjust_quantity))
}

/// List products with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListParams),
    responses(
        (status = 200, description = "Paginated product list", body = PaginatedResponse<ProductWithStore>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .services
        .products
        .list_products(params.into())
        .await?;

    let items: Vec<ProductWithStore> = page
        .items
        .into_iter()
        .map(|(product, store)| ProductWithStore { product, store })
        .collect();

    Ok(success_response(PaginatedResponse::new(
        items, page.page, page.limit, page.total,
    )))
}

/// Distinct category labels, sorted ascending
#[utoipa::path(
    get,
    path = "/api/v1/products/categories",
    responses(
        (status = 200, description = "Category labels", body = Vec<String>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.services.products.list_categories().await?;
    Ok(success_response(categories))
}

/// Fetch a single product with its store
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductWithStore),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.services.products.get_product(id).await?;
    Ok(success_response(product))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created", body = ProductWithStore),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Store not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let product = state.services.products.create_product(payload).await?;
    Ok(created_response(product))
}

/// Versioned product update (optimistic concurrency)
#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Product updated", body = ProductWithStore),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Version conflict or duplicate SKU", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let product = state.services.products.update_product(id, payload).await?;
    Ok(success_response(product))
}

/// Adjust stock level by a signed delta (bypasses the version check)
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/adjust-quantity",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = AdjustQuantityInput,
    responses(
        (status = 200, description = "Quantity adjusted", body = ProductWithStore),
        (status = 400, description = "Adjustment would drive quantity negative", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn adjust_quantity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustQuantityInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let product = state.services.products.adjust_quantity(id, payload).await?;
    Ok(success_response(product))
}

/// Delete a product, returning its last-known state
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = crate::entities::product::Model),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.services.products.delete_product(id).await?;
    Ok(success_response(product))
}
