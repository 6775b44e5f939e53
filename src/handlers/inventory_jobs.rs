use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{created, ok, Created, PaginationParams};
use crate::{
    auth::AuthContext,
    entities::{inbound_job, inbound_product_line, outbound_job, outbound_product_line},
    errors::ServiceError,
    services::inventory_jobs::{
        CreateInboundJobRequest, CreateOutboundJobRequest, InboundJobDetail, InboundLineRequest,
        JobFilter, OutboundJobDetail, OutboundLineRequest, UpdateInboundJobRequest,
        UpdateInboundLineRequest, UpdateOutboundJobRequest,
    },
    ApiResult, AppState, PaginatedResponse,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOutboundLineRequest {
    pub required_qty: i32,
}

#[utoipa::path(
    post,
    path = "/api/inbound-inventory",
    request_body = CreateInboundJobRequest,
    responses(
        (status = 201, description = "Inbound job created with its lines"),
        (status = 409, description = "Job code in use", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn create_inbound(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateInboundJobRequest>,
) -> Created<InboundJobDetail> {
    Ok(created(state.services.inventory_jobs.create_inbound(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/inbound-inventory",
    params(PaginationParams, JobFilter),
    responses((status = 200, description = "Inbound jobs")),
    tag = "inventory"
)]
pub async fn list_inbound(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<JobFilter>,
) -> ApiResult<PaginatedResponse<inbound_job::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state
        .services
        .inventory_jobs
        .list_inbound(&ctx, filter, page, per_page)
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/inbound-inventory/{id}",
    params(("id" = Uuid, Path, description = "Inbound job id")),
    responses(
        (status = 200, description = "Inbound job with its lines"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_inbound(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<InboundJobDetail> {
    Ok(ok(state.services.inventory_jobs.get_inbound(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/inbound-inventory/{id}",
    params(("id" = Uuid, Path, description = "Inbound job id")),
    request_body = UpdateInboundJobRequest,
    responses((status = 200, description = "Inbound job updated")),
    tag = "inventory"
)]
pub async fn update_inbound(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInboundJobRequest>,
) -> ApiResult<inbound_job::Model> {
    Ok(ok(state
        .services
        .inventory_jobs
        .update_inbound(&ctx, id, request)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/inbound-inventory/{id}",
    params(("id" = Uuid, Path, description = "Inbound job id")),
    responses(
        (status = 204, description = "Inbound job deleted"),
        (status = 409, description = "Pallets still reference the job", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn delete_inbound(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.inventory_jobs.delete_inbound(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/inbound-inventory/{id}/lines",
    params(("id" = Uuid, Path, description = "Inbound job id")),
    request_body = InboundLineRequest,
    responses((status = 201, description = "Line added")),
    tag = "inventory"
)]
pub async fn add_inbound_line(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<InboundLineRequest>,
) -> Created<inbound_product_line::Model> {
    Ok(created(
        state
            .services
            .inventory_jobs
            .add_inbound_line(&ctx, id, request)
            .await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/inbound-inventory/lines/{line_id}",
    params(("line_id" = Uuid, Path, description = "Inbound line id")),
    request_body = UpdateInboundLineRequest,
    responses((status = 200, description = "Line updated")),
    tag = "inventory"
)]
pub async fn update_inbound_line(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(line_id): Path<Uuid>,
    Json(request): Json<UpdateInboundLineRequest>,
) -> ApiResult<inbound_product_line::Model> {
    Ok(ok(state
        .services
        .inventory_jobs
        .update_inbound_line(&ctx, line_id, request)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/inbound-inventory/lines/{line_id}",
    params(("line_id" = Uuid, Path, description = "Inbound line id")),
    responses((status = 204, description = "Line removed")),
    tag = "inventory"
)]
pub async fn delete_inbound_line(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(line_id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.inventory_jobs.delete_inbound_line(&ctx, line_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/outbound-inventory",
    request_body = CreateOutboundJobRequest,
    responses(
        (status = 201, description = "Outbound job created with its lines"),
        (status = 409, description = "Job code in use", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn create_outbound(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateOutboundJobRequest>,
) -> Created<OutboundJobDetail> {
    Ok(created(state.services.inventory_jobs.create_outbound(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/outbound-inventory",
    params(PaginationParams, JobFilter),
    responses((status = 200, description = "Outbound jobs")),
    tag = "inventory"
)]
pub async fn list_outbound(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<JobFilter>,
) -> ApiResult<PaginatedResponse<outbound_job::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state
        .services
        .inventory_jobs
        .list_outbound(&ctx, filter, page, per_page)
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/outbound-inventory/{id}",
    params(("id" = Uuid, Path, description = "Outbound job id")),
    responses(
        (status = 200, description = "Outbound job with its lines"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_outbound(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<OutboundJobDetail> {
    Ok(ok(state.services.inventory_jobs.get_outbound(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/outbound-inventory/{id}",
    params(("id" = Uuid, Path, description = "Outbound job id")),
    request_body = UpdateOutboundJobRequest,
    responses((status = 200, description = "Outbound job updated")),
    tag = "inventory"
)]
pub async fn update_outbound(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOutboundJobRequest>,
) -> ApiResult<outbound_job::Model> {
    Ok(ok(state
        .services
        .inventory_jobs
        .update_outbound(&ctx, id, request)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/outbound-inventory/{id}",
    params(("id" = Uuid, Path, description = "Outbound job id")),
    responses(
        (status = 204, description = "Outbound job deleted"),
        (status = 409, description = "Pallets are allocated to the job", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn delete_outbound(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.inventory_jobs.delete_outbound(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/outbound-inventory/{id}/lines",
    params(("id" = Uuid, Path, description = "Outbound job id")),
    request_body = OutboundLineRequest,
    responses((status = 201, description = "Line added")),
    tag = "inventory"
)]
pub async fn add_outbound_line(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<OutboundLineRequest>,
) -> Created<outbound_product_line::Model> {
    Ok(created(
        state
            .services
            .inventory_jobs
            .add_outbound_line(&ctx, id, request)
            .await?,
    ))
}

/// Only the required quantity is editable; allocated and picked quantities
/// follow the pallets
#[utoipa::path(
    put,
    path = "/api/outbound-inventory/lines/{line_id}",
    params(("line_id" = Uuid, Path, description = "Outbound line id")),
    request_body = UpdateOutboundLineRequest,
    responses((status = 200, description = "Line updated")),
    tag = "inventory"
)]
pub async fn update_outbound_line(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(line_id): Path<Uuid>,
    Json(request): Json<UpdateOutboundLineRequest>,
) -> ApiResult<outbound_product_line::Model> {
    Ok(ok(state
        .services
        .inventory_jobs
        .update_outbound_line(&ctx, line_id, request.required_qty)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/outbound-inventory/lines/{line_id}",
    params(("line_id" = Uuid, Path, description = "Outbound line id")),
    responses(
        (status = 204, description = "Line removed"),
        (status = 409, description = "Stock is allocated to the line", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn delete_outbound_line(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(line_id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .inventory_jobs
        .delete_outbound_line(&ctx, line_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
