use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::common::{created, ok, Created, PaginationParams};
use crate::{
    auth::AuthContext,
    entities::{customer, paying_customer},
    errors::ServiceError,
    services::customers::{CreatePartyRequest, UpdatePartyRequest},
    ApiResult, AppState, PaginatedResponse,
};

#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreatePartyRequest,
    responses(
        (status = 201, description = "Customer created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreatePartyRequest>,
) -> Created<customer::Model> {
    Ok(created(state.services.customers.create_customer(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/customers",
    params(PaginationParams),
    responses((status = 200, description = "Customers")),
    tag = "customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<customer::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state.services.customers.list_customers(&ctx, page, per_page).await?))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<customer::Model> {
    Ok(ok(state.services.customers.get_customer(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    request_body = UpdatePartyRequest,
    responses((status = 200, description = "Customer updated")),
    tag = "customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePartyRequest>,
) -> ApiResult<customer::Model> {
    Ok(ok(state.services.customers.update_customer(&ctx, id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 409, description = "Customer still owns SKUs or jobs", body = crate::errors::ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.customers.delete_customer(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/paying-customers",
    request_body = CreatePartyRequest,
    responses((status = 201, description = "Paying customer created")),
    tag = "customers"
)]
pub async fn create_paying_customer(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreatePartyRequest>,
) -> Created<paying_customer::Model> {
    Ok(created(
        state.services.customers.create_paying_customer(&ctx, request).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/paying-customers",
    params(PaginationParams),
    responses((status = 200, description = "Paying customers")),
    tag = "customers"
)]
pub async fn list_paying_customers(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<paying_customer::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state
        .services
        .customers
        .list_paying_customers(&ctx, page, per_page)
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/paying-customers/{id}",
    params(("id" = Uuid, Path, description = "Paying customer id")),
    responses(
        (status = 200, description = "Paying customer"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn get_paying_customer(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<paying_customer::Model> {
    Ok(ok(state.services.customers.get_paying_customer(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/paying-customers/{id}",
    params(("id" = Uuid, Path, description = "Paying customer id")),
    request_body = UpdatePartyRequest,
    responses((status = 200, description = "Paying customer updated")),
    tag = "customers"
)]
pub async fn update_paying_customer(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePartyRequest>,
) -> ApiResult<paying_customer::Model> {
    Ok(ok(state
        .services
        .customers
        .update_paying_customer(&ctx, id, request)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/paying-customers/{id}",
    params(("id" = Uuid, Path, description = "Paying customer id")),
    responses((status = 204, description = "Paying customer deleted")),
    tag = "customers"
)]
pub async fn delete_paying_customer(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.customers.delete_paying_customer(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
