use axum::extract::{Json, Path, Query, State};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::common::{created, ok, Created, PaginationParams};
use crate::{
    auth::AuthContext,
    entities::tenant,
    services::tenants::{CreateTenantRequest, SubdomainAvailability, UpdateTenantRequest},
    ApiResult, AppState, PaginatedResponse,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubdomainQuery {
    pub subdomain: String,
}

/// Reports whether a subdomain is valid and still free. No token needed.
#[utoipa::path(
    get,
    path = "/api/tenants/check-subdomain",
    params(SubdomainQuery),
    responses(
        (status = 200, description = "Availability of the subdomain", body = SubdomainAvailability),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "tenants"
)]
pub async fn check_subdomain(
    State(state): State<AppState>,
    Query(query): Query<SubdomainQuery>,
) -> ApiResult<SubdomainAvailability> {
    let availability = state.services.tenants.check_subdomain(&query.subdomain).await?;
    Ok(ok(availability))
}

#[utoipa::path(
    post,
    path = "/api/tenants",
    request_body = CreateTenantRequest,
    responses(
        (status = 201, description = "Tenant created"),
        (status = 400, description = "Invalid subdomain", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not a platform administrator", body = crate::errors::ErrorResponse),
        (status = 409, description = "Subdomain taken", body = crate::errors::ErrorResponse)
    ),
    tag = "tenants"
)]
pub async fn create_tenant(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateTenantRequest>,
) -> Created<tenant::Model> {
    Ok(created(state.services.tenants.create(&ctx, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/tenants",
    params(PaginationParams),
    responses((status = 200, description = "Tenants visible to the caller")),
    tag = "tenants"
)]
pub async fn list_tenants(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<tenant::Model>> {
    let (page, per_page) = pagination.resolve(&state.config);
    Ok(ok(state.services.tenants.list(&ctx, page, per_page).await?))
}

#[utoipa::path(
    get,
    path = "/api/tenants/{id}",
    params(("id" = Uuid, Path, description = "Tenant id")),
    responses(
        (status = 200, description = "Tenant"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "tenants"
)]
pub async fn get_tenant(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<tenant::Model> {
    Ok(ok(state.services.tenants.get(&ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/tenants/{id}",
    params(("id" = Uuid, Path, description = "Tenant id")),
    request_body = UpdateTenantRequest,
    responses(
        (status = 200, description = "Tenant updated"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "tenants"
)]
pub async fn update_tenant(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTenantRequest>,
) -> ApiResult<tenant::Model> {
    Ok(ok(state.services.tenants.update(&ctx, id, request).await?))
}

/// Deactivates the tenant together with all of its users
#[utoipa::path(
    post,
    path = "/api/tenants/{id}/deactivate",
    params(("id" = Uuid, Path, description = "Tenant id")),
    responses(
        (status = 200, description = "Tenant deactivated"),
        (status = 403, description = "Not a platform administrator", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "tenants"
)]
pub async fn deactivate_tenant(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<tenant::Model> {
    Ok(ok(state.services.tenants.deactivate(&ctx, id).await?))
}
