use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::common::{created, ok, Created, PaginationParams};
use crate::{
    auth::AuthContext,
    entities::{storage_unit, warehouse},
    errors::ServiceError,
    services::warehouses::{
        CreateWarehouseRequest, StorageUnitRequest, UpdateStorageUnitRequest,
        UpdateWarehouseRequest,
    },
    ApiResult, AppState, PaginatedResponse,
};

#[utoipa::path(
    post,
    path = "/api/warehouses",
    request_body = CreateWarehouseRequest,
    responses(
        (status = 201, description = "Warehouse created"),
        (status = 409, description = "Warehouse code in use", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn create_warehouse(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateWarehouseRequest>,
) -> Created<warehouse::Model> {
    Ok(created(state.services.warehouses.create_warehouse(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/warehouses",
    params(PaginationParams),
    responses((status = 200, description = "Warehouses")),
    tag = "warehouses"
)]
pub async fn list_warehouses(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<warehouse::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state.services.warehouses.list_warehouses(&ctx, page, per_page).await?))
}

#[utoipa::path(
    get,
    path = "/api/warehouses/{id}",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Warehouse"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn get_warehouse(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<warehouse::Model> {
    Ok(ok(state.services.warehouses.get_warehouse(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/warehouses/{id}",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    request_body = UpdateWarehouseRequest,
    responses((status = 200, description = "Warehouse updated")),
    tag = "warehouses"
)]
pub async fn update_warehouse(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWarehouseRequest>,
) -> ApiResult<warehouse::Model> {
    Ok(ok(state.services.warehouses.update_warehouse(&ctx, id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/warehouses/{id}",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    responses(
        (status = 204, description = "Warehouse deleted"),
        (status = 409, description = "Warehouse still holds pallets", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn delete_warehouse(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.warehouses.delete_warehouse(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/storage-units",
    request_body = StorageUnitRequest,
    responses((status = 201, description = "Storage unit created")),
    tag = "warehouses"
)]
pub async fn create_storage_unit(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<StorageUnitRequest>,
) -> Created<storage_unit::Model> {
    Ok(created(
        state.services.warehouses.create_storage_unit(&ctx, request).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/storage-units",
    params(PaginationParams),
    responses((status = 200, description = "Storage units")),
    tag = "warehouses"
)]
pub async fn list_storage_units(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<storage_unit::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state
        .services
        .warehouses
        .list_storage_units(&ctx, page, per_page)
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/storage-units/{id}",
    params(("id" = Uuid, Path, description = "Storage unit id")),
    responses(
        (status = 200, description = "Storage unit"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn get_storage_unit(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<storage_unit::Model> {
    Ok(ok(state.services.warehouses.get_storage_unit(&ctx, id).await?))
}

/// Dimension changes also refresh the automatic figures of SKUs on the unit
#[utoipa::path(
    put,
    path = "/api/storage-units/{id}",
    params(("id" = Uuid, Path, description = "Storage unit id")),
    request_body = UpdateStorageUnitRequest,
    responses((status = 200, description = "Storage unit updated")),
    tag = "warehouses"
)]
pub async fn update_storage_unit(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStorageUnitRequest>,
) -> ApiResult<storage_unit::Model> {
    Ok(ok(state
        .services
        .warehouses
        .update_storage_unit(&ctx, id, request)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/storage-units/{id}",
    params(("id" = Uuid, Path, description = "Storage unit id")),
    responses(
        (status = 204, description = "Storage unit deleted"),
        (status = 409, description = "Storage unit used by SKUs", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn delete_storage_unit(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.warehouses.delete_storage_unit(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
