use axum::extract::{Json, Path, Query, State};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{created, ok, Created, PaginationParams};
use crate::{
    auth::AuthContext,
    entities::put_away_stock,
    services::lpn::{
        BatchUpdateRequest, BatchUpdateResult, CreateLpnRequest, InventoryRecord, LpnFilter,
        UpdateLpnRequest,
    },
    ApiResult, AppState, PaginatedResponse,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct LpnDeleted {
    pub id: Uuid,
    /// `false` when the pallet was only marked deleted
    pub permanent: bool,
}

#[utoipa::path(
    post,
    path = "/api/put-away-stock",
    request_body = CreateLpnRequest,
    responses(
        (status = 201, description = "Pallet recorded"),
        (status = 409, description = "LPN number in use", body = crate::errors::ErrorResponse)
    ),
    tag = "put-away"
)]
pub async fn create_lpn(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateLpnRequest>,
) -> Created<put_away_stock::Model> {
    Ok(created(state.services.lpns.create(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/put-away-stock",
    params(PaginationParams, LpnFilter),
    responses((status = 200, description = "Pallets")),
    tag = "put-away"
)]
pub async fn list_lpns(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<LpnFilter>,
) -> ApiResult<PaginatedResponse<put_away_stock::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state.services.lpns.list(&ctx, filter, page, per_page).await?))
}

#[utoipa::path(
    get,
    path = "/api/put-away-stock/{id}",
    params(("id" = Uuid, Path, description = "Pallet id")),
    responses(
        (status = 200, description = "Pallet, including soft-deleted ones"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "put-away"
)]
pub async fn get_lpn(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<put_away_stock::Model> {
    Ok(ok(state.services.lpns.get(&ctx, id).await?))
}

/// Setting `allocation_status` to `allocated` claims the pallet for the
/// given outbound job. A pallet held by another job is rejected with 409.
#[utoipa::path(
    put,
    path = "/api/put-away-stock/{id}",
    params(("id" = Uuid, Path, description = "Pallet id")),
    request_body = UpdateLpnRequest,
    responses(
        (status = 200, description = "Pallet updated"),
        (status = 400, description = "Pallet deleted or job missing", body = crate::errors::ErrorResponse),
        (status = 409, description = "Pallet allocated to another job", body = crate::errors::ErrorResponse)
    ),
    tag = "put-away"
)]
pub async fn update_lpn(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateLpnRequest>,
) -> ApiResult<put_away_stock::Model> {
    Ok(ok(state.services.lpns.update(&ctx, id, request).await?))
}

/// The first delete marks the pallet deleted, a second one removes it
#[utoipa::path(
    delete,
    path = "/api/put-away-stock/{id}",
    params(("id" = Uuid, Path, description = "Pallet id")),
    responses((status = 200, description = "Pallet deleted", body = LpnDeleted)),
    tag = "put-away"
)]
pub async fn delete_lpn(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<LpnDeleted> {
    let permanent = state.services.lpns.delete(&ctx, id).await?;
    Ok(ok(LpnDeleted { id, permanent }))
}

#[utoipa::path(
    get,
    path = "/api/inventory/records/{id}",
    params(("id" = Uuid, Path, description = "Pallet id")),
    responses(
        (status = 200, description = "Pallet with SKU and warehouse labels"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "put-away"
)]
pub async fn get_inventory_record(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<InventoryRecord> {
    Ok(ok(state.services.lpns.get_record(&ctx, id).await?))
}

/// Rows are applied one by one; a failed row does not stop the batch
#[utoipa::path(
    post,
    path = "/api/inventory/records/batch",
    request_body = BatchUpdateRequest,
    responses((status = 200, description = "Per-row outcome", body = BatchUpdateResult)),
    tag = "put-away"
)]
pub async fn batch_update_records(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<BatchUpdateRequest>,
) -> ApiResult<BatchUpdateResult> {
    Ok(ok(state.services.lpns.batch_update(&ctx, request).await?))
}
