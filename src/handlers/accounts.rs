use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::common::{created, ok, Created, PaginationParams};
use crate::{
    auth::AuthContext,
    entities::{role, user},
    errors::ServiceError,
    services::accounts::{CreateRoleRequest, CreateUserRequest, UpdateRoleRequest, UpdateUserRequest},
    ApiResult, AppState, PaginatedResponse,
};

#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn create_role(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateRoleRequest>,
) -> Created<role::Model> {
    Ok(created(state.services.accounts.create_role(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/roles",
    params(PaginationParams),
    responses((status = 200, description = "Roles of the caller's tenant and platform roles")),
    tag = "accounts"
)]
pub async fn list_roles(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<role::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state.services.accounts.list_roles(&ctx, page, per_page).await?))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn get_role(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<role::Model> {
    Ok(ok(state.services.accounts.get_role(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn update_role(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> ApiResult<role::Model> {
    Ok(ok(state.services.accounts.update_role(&ctx, id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 400, description = "System roles cannot be deleted", body = crate::errors::ErrorResponse),
        (status = 409, description = "Role still assigned to users", body = crate::errors::ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn delete_role(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.accounts.delete_role(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn create_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateUserRequest>,
) -> Created<user::Model> {
    Ok(created(state.services.accounts.create_user(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(PaginationParams),
    responses((status = 200, description = "Users of the caller's tenant")),
    tag = "accounts"
)]
pub async fn list_users(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<user::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state.services.accounts.list_users(&ctx, page, per_page).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn get_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<user::Model> {
    Ok(ok(state.services.accounts.get_user(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses((status = 200, description = "User updated")),
    tag = "accounts"
)]
pub async fn update_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<user::Model> {
    Ok(ok(state.services.accounts.update_user(&ctx, id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete yourself", body = crate::errors::ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.accounts.delete_user(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
