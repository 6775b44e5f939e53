use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::common::{created, ok, Created, PaginationParams};
use crate::{
    auth::AuthContext,
    entities::{allocation_line, stock_allocation},
    errors::ServiceError,
    services::stock_allocations::{
        AllocationDetail, AllocationFilter, AllocationLineRequest, CreateAllocationRequest,
        UpdateAllocationLineRequest, UpdateAllocationRequest,
    },
    ApiResult, AppState, PaginatedResponse,
};

#[utoipa::path(
    post,
    path = "/api/stock-allocations",
    request_body = CreateAllocationRequest,
    responses(
        (status = 201, description = "Allocation created with its lines"),
        (status = 400, description = "Job does not match the container direction", body = crate::errors::ErrorResponse)
    ),
    tag = "allocations"
)]
pub async fn create_allocation(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateAllocationRequest>,
) -> Created<AllocationDetail> {
    Ok(created(state.services.allocations.create(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/stock-allocations",
    params(PaginationParams, AllocationFilter),
    responses((status = 200, description = "Stock allocations")),
    tag = "allocations"
)]
pub async fn list_allocations(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<AllocationFilter>,
) -> ApiResult<PaginatedResponse<stock_allocation::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state
        .services
        .allocations
        .list(&ctx, filter, page, per_page)
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/stock-allocations/{id}",
    params(("id" = Uuid, Path, description = "Allocation id")),
    responses(
        (status = 200, description = "Allocation with its lines"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "allocations"
)]
pub async fn get_allocation(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<AllocationDetail> {
    Ok(ok(state.services.allocations.get(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/stock-allocations/{id}",
    params(("id" = Uuid, Path, description = "Allocation id")),
    request_body = UpdateAllocationRequest,
    responses((status = 200, description = "Allocation updated")),
    tag = "allocations"
)]
pub async fn update_allocation(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAllocationRequest>,
) -> ApiResult<stock_allocation::Model> {
    Ok(ok(state.services.allocations.update(&ctx, id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/stock-allocations/{id}",
    params(("id" = Uuid, Path, description = "Allocation id")),
    responses((status = 204, description = "Allocation deleted")),
    tag = "allocations"
)]
pub async fn delete_allocation(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.allocations.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/stock-allocations/{id}/lines",
    params(("id" = Uuid, Path, description = "Allocation id")),
    request_body = AllocationLineRequest,
    responses((status = 201, description = "Line added")),
    tag = "allocations"
)]
pub async fn add_allocation_line(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<AllocationLineRequest>,
) -> Created<allocation_line::Model> {
    Ok(created(state.services.allocations.add_line(&ctx, id, request).await?))
}

/// Quantity changes recompute the container status
#[utoipa::path(
    put,
    path = "/api/stock-allocations/lines/{line_id}",
    params(("line_id" = Uuid, Path, description = "Allocation line id")),
    request_body = UpdateAllocationLineRequest,
    responses((status = 200, description = "Line updated")),
    tag = "allocations"
)]
pub async fn update_allocation_line(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(line_id): Path<Uuid>,
    Json(request): Json<UpdateAllocationLineRequest>,
) -> ApiResult<allocation_line::Model> {
    Ok(ok(state
        .services
        .allocations
        .update_line(&ctx, line_id, request)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/stock-allocations/lines/{line_id}",
    params(("line_id" = Uuid, Path, description = "Allocation line id")),
    responses((status = 204, description = "Line removed")),
    tag = "allocations"
)]
pub async fn delete_allocation_line(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(line_id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.allocations.delete_line(&ctx, line_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
