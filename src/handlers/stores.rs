use crate::errors::ApiError;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::services::stores::{CreateStoreInput, StoreWithProductCount, UpdateStoreInput};
use crate::AppState;
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use uuid::Uuid;

/// Create the stores router
pub fn stores_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stores).post(create_store))
        .route(
            "/:id",
            get(get_store).patch(update_store).delete(delete_store),
        )
}

/// List all stores, newest first
#[utoipa::path(
    get,
    path = "/api/v1/stores",
    responses(
        (status = 200, description = "Store list with product counts", body = Vec<StoreWithProductCount>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stores"
)]
pub async fn list_stores(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stores = state.services.stores.list_stores().await?;
    Ok(success_response(stores))
}

/// Fetch a single store with its product count
#[utoipa::path(
    get,
    path = "/api/v1/stores/{id}",
    params(("id" = Uuid, Path, description = "Store id")),
    responses(
        (status = 200, description = "Store found", body = StoreWithProductCount),
        (status = 404, description = "Store not found", body = crate::errors::ErrorResponse)
    ),
    tag = "stores"
)]
pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.services.stores.get_store(id).await?;
    Ok(success_response(store))
}

/// Create a store
#[utoipa::path(
    post,
    path = "/api/v1/stores",
    request_body = CreateStoreInput,
    responses(
        (status = 201, description = "Store created", body = crate::entities::store::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "stores"
)]
pub async fn create_store(
    State(state): State<AppState>,
    Json(payload): Json<CreateStoreInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let store = state.services.stores.create_store(payload).await?;
    Ok(created_response(store))
}

/// Partially update a store
#[utoipa::path(
    patch,
    path = "/api/v1/stores/{id}",
    params(("id" = Uuid, Path, description = "Store id")),
    request_body = UpdateStoreInput,
    responses(
        (status = 200, description = "Store updated", body = crate::entities::store::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Store not found", body = crate::errors::ErrorResponse)
    ),
    tag = "stores"
)]
pub async fn update_store(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStoreInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let store = state.services.stores.update_store(id, payload).await?;
    Ok(success_response(store))
}

/// Delete a store with no remaining products
#[utoipa::path(
    delete,
    path = "/api/v1/stores/{id}",
    params(("id" = Uuid, Path, description = "Store id")),
    responses(
        (status = 200, description = "Store deleted", body = crate::entities::store::Model),
        (status = 404, description = "Store not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Store still has products", body = crate::errors::ErrorResponse)
    ),
    tag = "stores"
)]
pub async fn delete_store(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.services.stores.delete_store(id).await?;
    Ok(success_response(store))
}
