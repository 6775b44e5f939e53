//! FreightWMS API Library
//!
//! Multi-tenant warehouse and freight-logistics backend: bookings and their
//! containers, stock allocations, put-away pallets (LPNs), outbound jobs and
//! pickups, with container and booking statuses derived from the records
//! underneath them.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::{AuthRouterExt, AuthService, UserRole};
use crate::db::DbPool;

const TENANT_MANAGERS: &[UserRole] = &[UserRole::SuperAdmin];
const ACCOUNT_MANAGERS: &[UserRole] = &[UserRole::SuperAdmin, UserRole::TenantAdmin];

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub auth: Arc<AuthService>,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[test]
    fn validation_errors_are_listed() {
        let response = ApiResponse::<()>::validation_errors(vec!["qty: range".into()]);
        assert!(!response.success);
        assert_eq!(response.errors, Some(vec!["qty: range".to_string()]));
        assert!(response.meta.is_some());
    }

    #[test]
    fn pagination_serializes_all_fields() {
        let page = PaginatedResponse {
            items: vec![1, 2],
            total: 12,
            page: 2,
            limit: 2,
            total_pages: 6,
        };
        let value = serde_json::to_value(&page).expect("serializable");
        assert_eq!(value["total_pages"], 6);
        assert_eq!(value["items"].as_array().map(Vec::len), Some(2));
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Every `/api` route. Tenant management is limited to super admins and
/// account management to tenant admins; everything else authenticates and
/// leaves the per-record decision to the services.
pub fn api_routes(auth: Arc<AuthService>) -> Router<AppState> {
    use axum::routing::put;
    use handlers::*;

    let public = Router::new().route(
        "/tenants/check-subdomain",
        get(tenants::check_subdomain),
    );

    let tenant_admin = Router::new()
        .route(
            "/tenants",
            post(tenants::create_tenant).get(tenants::list_tenants),
        )
        .route("/tenants/:id/deactivate", post(tenants::deactivate_tenant))
        .with_roles(auth.clone(), TENANT_MANAGERS);

    let tenant_self = Router::new()
        .route(
            "/tenants/:id",
            get(tenants::get_tenant).put(tenants::update_tenant),
        )
        .with_auth(auth.clone());

    let account_routes = Router::new()
        .route(
            "/roles",
            post(accounts::create_role).get(accounts::list_roles),
        )
        .route(
            "/roles/:id",
            get(accounts::get_role)
                .put(accounts::update_role)
                .delete(accounts::delete_role),
        )
        .route(
            "/users",
            post(accounts::create_user).get(accounts::list_users),
        )
        .route(
            "/users/:id",
            get(accounts::get_user)
                .put(accounts::update_user)
                .delete(accounts::delete_user),
        )
        .with_roles(auth.clone(), ACCOUNT_MANAGERS);

    let master_data = Router::new()
        .route(
            "/customers",
            post(customers::create_customer).get(customers::list_customers),
        )
        .route(
            "/customers/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route(
            "/paying-customers",
            post(customers::create_paying_customer).get(customers::list_paying_customers),
        )
        .route(
            "/paying-customers/:id",
            get(customers::get_paying_customer)
                .put(customers::update_paying_customer)
                .delete(customers::delete_paying_customer),
        )
        .route(
            "/warehouses",
            post(warehouses::create_warehouse).get(warehouses::list_warehouses),
        )
        .route(
            "/warehouses/:id",
            get(warehouses::get_warehouse)
                .put(warehouses::update_warehouse)
                .delete(warehouses::delete_warehouse),
        )
        .route(
            "/storage-units",
            post(warehouses::create_storage_unit).get(warehouses::list_storage_units),
        )
        .route(
            "/storage-units/:id",
            get(warehouses::get_storage_unit)
                .put(warehouses::update_storage_unit)
                .delete(warehouses::delete_storage_unit),
        )
        .route("/skus", post(skus::create_sku).get(skus::list_skus))
        .route(
            "/skus/:id",
            get(skus::get_sku)
                .put(skus::update_sku)
                .delete(skus::delete_sku),
        )
        .route(
            "/fleet-assets",
            post(fleet::create_asset).get(fleet::list_assets),
        )
        .route(
            "/fleet-assets/:id",
            get(fleet::get_asset)
                .put(fleet::update_asset)
                .delete(fleet::delete_asset),
        )
        .with_auth(auth.clone());

    let inventory_routes = Router::new()
        .route(
            "/inbound-inventory",
            post(inventory_jobs::create_inbound).get(inventory_jobs::list_inbound),
        )
        .route(
            "/inbound-inventory/:id",
            get(inventory_jobs::get_inbound)
                .put(inventory_jobs::update_inbound)
                .delete(inventory_jobs::delete_inbound),
        )
        .route(
            "/inbound-inventory/:id/lines",
            post(inventory_jobs::add_inbound_line),
        )
        .route(
            "/inbound-inventory/lines/:line_id",
            put(inventory_jobs::update_inbound_line).delete(inventory_jobs::delete_inbound_line),
        )
        .route(
            "/outbound-inventory",
            post(inventory_jobs::create_outbound).get(inventory_jobs::list_outbound),
        )
        .route(
            "/outbound-inventory/:id",
            get(inventory_jobs::get_outbound)
                .put(inventory_jobs::update_outbound)
                .delete(inventory_jobs::delete_outbound),
        )
        .route(
            "/outbound-inventory/:id/lines",
            post(inventory_jobs::add_outbound_line),
        )
        .route(
            "/outbound-inventory/lines/:line_id",
            put(inventory_jobs::update_outbound_line)
                .delete(inventory_jobs::delete_outbound_line),
        )
        .route(
            "/put-away-stock",
            post(put_away_stock::create_lpn).get(put_away_stock::list_lpns),
        )
        .route(
            "/put-away-stock/:id",
            get(put_away_stock::get_lpn)
                .put(put_away_stock::update_lpn)
                .delete(put_away_stock::delete_lpn),
        )
        .route(
            "/inventory/records/batch",
            post(put_away_stock::batch_update_records),
        )
        .route(
            "/inventory/records/:id",
            get(put_away_stock::get_inventory_record),
        )
        .with_auth(auth.clone());

    let freight_routes = Router::new()
        .route(
            "/container-bookings",
            post(container_bookings::create_booking).get(container_bookings::list_bookings),
        )
        .route(
            "/container-bookings/:id",
            get(container_bookings::get_booking)
                .put(container_bookings::update_booking)
                .delete(container_bookings::delete_booking),
        )
        .route(
            "/container-details",
            post(container_bookings::create_container).get(container_bookings::list_containers),
        )
        .route(
            "/container-details/:id",
            get(container_bookings::get_container)
                .put(container_bookings::update_container)
                .delete(container_bookings::delete_container),
        )
        .route(
            "/container-details/:id/dispatch",
            post(container_bookings::dispatch_container),
        )
        .route(
            "/stock-allocations",
            post(stock_allocations::create_allocation).get(stock_allocations::list_allocations),
        )
        .route(
            "/stock-allocations/:id",
            get(stock_allocations::get_allocation)
                .put(stock_allocations::update_allocation)
                .delete(stock_allocations::delete_allocation),
        )
        .route(
            "/stock-allocations/:id/lines",
            post(stock_allocations::add_allocation_line),
        )
        .route(
            "/stock-allocations/lines/:line_id",
            put(stock_allocations::update_allocation_line)
                .delete(stock_allocations::delete_allocation_line),
        )
        .route(
            "/pickup-records",
            post(pickup_records::create_pickup).get(pickup_records::list_pickups),
        )
        .route(
            "/pickup-records/:id",
            get(pickup_records::get_pickup)
                .put(pickup_records::update_pickup)
                .delete(pickup_records::delete_pickup),
        )
        .route(
            "/pickup-records/:id/complete",
            post(pickup_records::complete_pickup),
        )
        .with_auth(auth);

    Router::new()
        .merge(public)
        .merge(tenant_admin)
        .merge(tenant_self)
        .merge(account_routes)
        .merge(master_data)
        .merge(inventory_routes)
        .merge(freight_routes)
}

/// The full application router without the outer HTTP layers
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .nest("/api", api_routes(state.auth.clone()))
        .merge(openapi::swagger_ui())
        .with_state(state)
}

async fn api_status(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(Json(ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "freightwms-api",
        "environment": state.config.environment,
        "event_handlers": state.services.events.handler_names(),
        "timestamp": Utc::now().to_rfc3339(),
    }))))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match db::check_connection(&state.db).await {
        Ok(()) => "healthy",
        Err(_) => "unhealthy",
    };

    Ok(Json(ApiResponse::success(json!({
        "status": db_status,
        "checks": { "database": db_status },
        "timestamp": Utc::now().to_rfc3339(),
    }))))
}
