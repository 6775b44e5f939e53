use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::common::{created, ok, Created, PaginationParams};
use crate::{
    auth::AuthContext,
    entities::fleet_asset,
    errors::ServiceError,
    services::fleet::{CreateFleetAssetRequest, FleetFilter, UpdateFleetAssetRequest},
    ApiResult, AppState, PaginatedResponse,
};

#[utoipa::path(
    post,
    path = "/api/fleet-assets",
    request_body = CreateFleetAssetRequest,
    responses(
        (status = 201, description = "Fleet asset registered"),
        (status = 409, description = "Registration in use", body = crate::errors::ErrorResponse)
    ),
    tag = "fleet"
)]
pub async fn create_asset(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateFleetAssetRequest>,
) -> Created<fleet_asset::Model> {
    Ok(created(state.services.fleet.create(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/fleet-assets",
    params(PaginationParams, FleetFilter),
    responses((status = 200, description = "Fleet assets")),
    tag = "fleet"
)]
pub async fn list_assets(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<FleetFilter>,
) -> ApiResult<PaginatedResponse<fleet_asset::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state.services.fleet.list(&ctx, filter, page, per_page).await?))
}

#[utoipa::path(
    get,
    path = "/api/fleet-assets/{id}",
    params(("id" = Uuid, Path, description = "Fleet asset id")),
    responses(
        (status = 200, description = "Fleet asset"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "fleet"
)]
pub async fn get_asset(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<fleet_asset::Model> {
    Ok(ok(state.services.fleet.get(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/fleet-assets/{id}",
    params(("id" = Uuid, Path, description = "Fleet asset id")),
    request_body = UpdateFleetAssetRequest,
    responses((status = 200, description = "Fleet asset updated")),
    tag = "fleet"
)]
pub async fn update_asset(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateFleetAssetRequest>,
) -> ApiResult<fleet_asset::Model> {
    Ok(ok(state.services.fleet.update(&ctx, id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/fleet-assets/{id}",
    params(("id" = Uuid, Path, description = "Fleet asset id")),
    responses((status = 204, description = "Fleet asset removed")),
    tag = "fleet"
)]
pub async fn delete_asset(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.fleet.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
