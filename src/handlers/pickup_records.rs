use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::common::{created, ok, Created, PaginationParams};
use crate::{
    auth::AuthContext,
    entities::pickup_record,
    errors::ServiceError,
    services::pickup_records::{CreatePickupRequest, PickupFilter, UpdatePickupRequest},
    ApiResult, AppState, PaginatedResponse,
};

#[utoipa::path(
    post,
    path = "/api/pickup-records",
    request_body = CreatePickupRequest,
    responses(
        (status = 201, description = "Pickup recorded"),
        (status = 400, description = "Not an export container", body = crate::errors::ErrorResponse)
    ),
    tag = "pickups"
)]
pub async fn create_pickup(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreatePickupRequest>,
) -> Created<pickup_record::Model> {
    Ok(created(state.services.pickups.create(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/pickup-records",
    params(PaginationParams, PickupFilter),
    responses((status = 200, description = "Pickup records")),
    tag = "pickups"
)]
pub async fn list_pickups(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<PickupFilter>,
) -> ApiResult<PaginatedResponse<pickup_record::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state.services.pickups.list(&ctx, filter, page, per_page).await?))
}

#[utoipa::path(
    get,
    path = "/api/pickup-records/{id}",
    params(("id" = Uuid, Path, description = "Pickup record id")),
    responses(
        (status = 200, description = "Pickup record"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "pickups"
)]
pub async fn get_pickup(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<pickup_record::Model> {
    Ok(ok(state.services.pickups.get(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/pickup-records/{id}",
    params(("id" = Uuid, Path, description = "Pickup record id")),
    request_body = UpdatePickupRequest,
    responses((status = 200, description = "Pickup record updated")),
    tag = "pickups"
)]
pub async fn update_pickup(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePickupRequest>,
) -> ApiResult<pickup_record::Model> {
    Ok(ok(state.services.pickups.update(&ctx, id, request).await?))
}

#[utoipa::path(
    post,
    path = "/api/pickup-records/{id}/complete",
    params(("id" = Uuid, Path, description = "Pickup record id")),
    responses((status = 200, description = "Pickup completed")),
    tag = "pickups"
)]
pub async fn complete_pickup(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<pickup_record::Model> {
    Ok(ok(state.services.pickups.complete(&ctx, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/pickup-records/{id}",
    params(("id" = Uuid, Path, description = "Pickup record id")),
    responses((status = 204, description = "Pickup record deleted")),
    tag = "pickups"
)]
pub async fn delete_pickup(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.pickups.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
