use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::common::{created, ok, Created, PaginationParams};
use crate::{
    auth::AuthContext,
    entities::{container_booking, container_detail},
    errors::ServiceError,
    services::container_bookings::{
        BookingDetail, BookingFilter, ContainerFilter, CreateBookingRequest,
        CreateContainerRequest, UpdateBookingRequest, UpdateContainerRequest,
    },
    ApiResult, AppState, PaginatedResponse,
};

#[utoipa::path(
    post,
    path = "/api/container-bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created with its containers"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateBookingRequest>,
) -> Created<BookingDetail> {
    Ok(created(state.services.bookings.create_booking(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/container-bookings",
    params(PaginationParams, BookingFilter),
    responses((status = 200, description = "Bookings")),
    tag = "bookings"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<BookingFilter>,
) -> ApiResult<PaginatedResponse<container_booking::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state
        .services
        .bookings
        .list_bookings(&ctx, filter, page, per_page)
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/container-bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking with its containers"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<BookingDetail> {
    Ok(ok(state.services.bookings.get_booking(&ctx, id).await?))
}

/// The status can only be set to `cancelled` or `completed`
#[utoipa::path(
    put,
    path = "/api/container-bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking id")),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Booking updated"),
        (status = 400, description = "Derived status cannot be set", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn update_booking(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookingRequest>,
) -> ApiResult<container_booking::Model> {
    Ok(ok(state.services.bookings.update_booking(&ctx, id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/container-bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 409, description = "Pallets were put away from its containers", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn delete_booking(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.bookings.delete_booking(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/container-details",
    request_body = CreateContainerRequest,
    responses((status = 201, description = "Container added to the booking")),
    tag = "bookings"
)]
pub async fn create_container(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateContainerRequest>,
) -> Created<container_detail::Model> {
    Ok(created(state.services.bookings.create_container(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/container-details",
    params(PaginationParams, ContainerFilter),
    responses((status = 200, description = "Containers")),
    tag = "bookings"
)]
pub async fn list_containers(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ContainerFilter>,
) -> ApiResult<PaginatedResponse<container_detail::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state
        .services
        .bookings
        .list_containers(&ctx, filter, page, per_page)
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/container-details/{id}",
    params(("id" = Uuid, Path, description = "Container id")),
    responses(
        (status = 200, description = "Container"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn get_container(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<container_detail::Model> {
    Ok(ok(state.services.bookings.get_container(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/container-details/{id}",
    params(("id" = Uuid, Path, description = "Container id")),
    request_body = UpdateContainerRequest,
    responses((status = 200, description = "Container updated")),
    tag = "bookings"
)]
pub async fn update_container(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateContainerRequest>,
) -> ApiResult<container_detail::Model> {
    Ok(ok(state.services.bookings.update_container(&ctx, id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/container-details/{id}",
    params(("id" = Uuid, Path, description = "Container id")),
    responses(
        (status = 204, description = "Container removed"),
        (status = 409, description = "Pallets were put away from the container", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn delete_container(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.bookings.delete_container(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/container-details/{id}/dispatch",
    params(("id" = Uuid, Path, description = "Container id")),
    responses(
        (status = 200, description = "Container dispatched"),
        (status = 400, description = "Not an export container or not picked up yet", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn dispatch_container(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<container_detail::Model> {
    Ok(ok(state.services.bookings.dispatch_container(&ctx, id).await?))
}
