use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::common::{created, ok, Created, PaginationParams};
use crate::{
    auth::AuthContext,
    entities::sku,
    errors::ServiceError,
    services::skus::{CreateSkuRequest, SkuFilter, UpdateSkuRequest},
    ApiResult, AppState, PaginatedResponse,
};

/// Creates a SKU; figures left out of the request are computed from the
/// handling unit and storage unit dimensions
#[utoipa::path(
    post,
    path = "/api/skus",
    request_body = CreateSkuRequest,
    responses(
        (status = 201, description = "SKU created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU code in use", body = crate::errors::ErrorResponse)
    ),
    tag = "skus"
)]
pub async fn create_sku(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateSkuRequest>,
) -> Created<sku::Model> {
    Ok(created(state.services.skus.create(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/skus",
    params(PaginationParams, SkuFilter),
    responses((status = 200, description = "SKUs")),
    tag = "skus"
)]
pub async fn list_skus(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<SkuFilter>,
) -> ApiResult<PaginatedResponse<sku::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state.services.skus.list(&ctx, filter, page, per_page).await?))
}

#[utoipa::path(
    get,
    path = "/api/skus/{id}",
    params(("id" = Uuid, Path, description = "SKU id")),
    responses(
        (status = 200, description = "SKU"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "skus"
)]
pub async fn get_sku(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<sku::Model> {
    Ok(ok(state.services.skus.get(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/skus/{id}",
    params(("id" = Uuid, Path, description = "SKU id")),
    request_body = UpdateSkuRequest,
    responses(
        (status = 200, description = "SKU updated"),
        (status = 409, description = "SKU code in use", body = crate::errors::ErrorResponse)
    ),
    tag = "skus"
)]
pub async fn update_sku(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSkuRequest>,
) -> ApiResult<sku::Model> {
    Ok(ok(state.services.skus.update(&ctx, id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/skus/{id}",
    params(("id" = Uuid, Path, description = "SKU id")),
    responses(
        (status = 204, description = "SKU deleted"),
        (status = 409, description = "SKU still has pallets in stock", body = crate::errors::ErrorResponse)
    ),
    tag = "skus"
)]
pub async fn delete_sku(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.skus.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
