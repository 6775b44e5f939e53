use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FreightWMS API",
        version = "1.0.0",
        description = r#"
# FreightWMS API

Warehouse and freight operations for many tenants: container bookings,
stock allocations, put-away pallets (LPNs), inbound and outbound jobs,
pickups and fleet assets.

## Authentication

Every endpoint except `/api/tenants/check-subdomain`, `/health` and `/status`
expects a bearer token:

```
Authorization: Bearer <your-jwt-token>
```

## Derived statuses

Container statuses follow their allocation lines, pallets and pickups; a
booking's status follows its containers. Both are recomputed on every
write that touches them.

## Pagination

List endpoints take `page` (default 1) and `per_page` (bounded by the
server configuration).
        "#
    ),
    modifiers(&BearerAuth),
    security(("bearer_auth" = [])),
    tags(
        (name = "tenants", description = "Tenant registration and lifecycle"),
        (name = "accounts", description = "Roles and users"),
        (name = "customers", description = "Customers and paying customers"),
        (name = "warehouses", description = "Warehouses and storage units"),
        (name = "skus", description = "SKUs and their derived figures"),
        (name = "inventory", description = "Inbound and outbound inventory jobs"),
        (name = "bookings", description = "Container bookings and containers"),
        (name = "allocations", description = "Stock allocations"),
        (name = "put-away", description = "Put-away pallets and inventory records"),
        (name = "pickups", description = "Pickup records"),
        (name = "fleet", description = "Fleet assets")
    ),
    paths(
        handlers::tenants::check_subdomain,
        handlers::tenants::create_tenant,
        handlers::tenants::list_tenants,
        handlers::tenants::get_tenant,
        handlers::tenants::update_tenant,
        handlers::tenants::deactivate_tenant,

        handlers::accounts::create_role,
        handlers::accounts::list_roles,
        handlers::accounts::get_role,
        handlers::accounts::update_role,
        handlers::accounts::delete_role,
        handlers::accounts::create_user,
        handlers::accounts::list_users,
        handlers::accounts::get_user,
        handlers::accounts::update_user,
        handlers::accounts::delete_user,

        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,
        handlers::customers::create_paying_customer,
        handlers::customers::list_paying_customers,
        handlers::customers::get_paying_customer,
        handlers::customers::update_paying_customer,
        handlers::customers::delete_paying_customer,

        handlers::warehouses::create_warehouse,
        handlers::warehouses::list_warehouses,
        handlers::warehouses::get_warehouse,
        handlers::warehouses::update_warehouse,
        handlers::warehouses::delete_warehouse,
        handlers::warehouses::create_storage_unit,
        handlers::warehouses::list_storage_units,
        handlers::warehouses::get_storage_unit,
        handlers::warehouses::update_storage_unit,
        handlers::warehouses::delete_storage_unit,

        handlers::skus::create_sku,
        handlers::skus::list_skus,
        handlers::skus::get_sku,
        handlers::skus::update_sku,
        handlers::skus::delete_sku,

        handlers::inventory_jobs::create_inbound,
        handlers::inventory_jobs::list_inbound,
        handlers::inventory_jobs::get_inbound,
        handlers::inventory_jobs::update_inbound,
        handlers::inventory_jobs::delete_inbound,
        handlers::inventory_jobs::add_inbound_line,
        handlers::inventory_jobs::update_inbound_line,
        handlers::inventory_jobs::delete_inbound_line,
        handlers::inventory_jobs::create_outbound,
        handlers::inventory_jobs::list_outbound,
        handlers::inventory_jobs::get_outbound,
        handlers::inventory_jobs::update_outbound,
        handlers::inventory_jobs::delete_outbound,
        handlers::inventory_jobs::add_outbound_line,
        handlers::inventory_jobs::update_outbound_line,
        handlers::inventory_jobs::delete_outbound_line,

        handlers::container_bookings::create_booking,
        handlers::container_bookings::list_bookings,
        handlers::container_bookings::get_booking,
        handlers::container_bookings::update_booking,
        handlers::container_bookings::delete_booking,
        handlers::container_bookings::create_container,
        handlers::container_bookings::list_containers,
        handlers::container_bookings::get_container,
        handlers::container_bookings::update_container,
        handlers::container_bookings::delete_container,
        handlers::container_bookings::dispatch_container,

        handlers::stock_allocations::create_allocation,
        handlers::stock_allocations::list_allocations,
        handlers::stock_allocations::get_allocation,
        handlers::stock_allocations::update_allocation,
        handlers::stock_allocations::delete_allocation,
        handlers::stock_allocations::add_allocation_line,
        handlers::stock_allocations::update_allocation_line,
        handlers::stock_allocations::delete_allocation_line,

        handlers::put_away_stock::create_lpn,
        handlers::put_away_stock::list_lpns,
        handlers::put_away_stock::get_lpn,
        handlers::put_away_stock::update_lpn,
        handlers::put_away_stock::delete_lpn,
        handlers::put_away_stock::get_inventory_record,
        handlers::put_away_stock::batch_update_records,

        handlers::pickup_records::create_pickup,
        handlers::pickup_records::list_pickups,
        handlers::pickup_records::get_pickup,
        handlers::pickup_records::update_pickup,
        handlers::pickup_records::complete_pickup,
        handlers::pickup_records::delete_pickup,

        handlers::fleet::create_asset,
        handlers::fleet::list_assets,
        handlers::fleet::get_asset,
        handlers::fleet::update_asset,
        handlers::fleet::delete_asset,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::errors::ErrorResponse,
            crate::auth::UserRole,
            handlers::inventory_jobs::UpdateOutboundLineRequest,
            handlers::put_away_stock::LpnDeleted,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_surface() {
        let json = serde_json::to_string(&ApiDoc::openapi()).expect("serializable");
        assert!(json.contains("FreightWMS API"));
        for path in [
            "/api/tenants/check-subdomain",
            "/api/container-details/{id}/dispatch",
            "/api/put-away-stock/{id}",
            "/api/inventory/records/batch",
            "/api/pickup-records/{id}/complete",
            "/api/fleet-assets",
        ] {
            assert!(json.contains(path), "missing {path}");
        }
        assert!(json.contains("bearer_auth"));
    }
}
