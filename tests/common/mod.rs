#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    middleware, Router,
};
use freightwms_api::{
    auth::{AuthConfig, AuthContext, AuthService, UserRole},
    config::AppConfig,
    db,
    entities::{container_detail, sku, JobType},
    events::{self, EventSender},
    handlers::AppServices,
    middleware_helpers::request_id::request_id_middleware,
    services::{
        container_bookings::{BookingDetail, ContainerRequest, CreateBookingRequest},
        skus::CreateSkuRequest,
        stock_allocations::{AllocationLineRequest, CreateAllocationRequest},
    },
    AppState,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_SECRET: &str = "integration_test_secret_0123456789_abcdefghijklmnop";

/// Application state and router backed by a private in-memory SQLite database
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub tenant_id: Uuid,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // one connection keeps every query on the same in-memory database
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to open test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity);
        let event_task = tokio::spawn(events::process_events(event_rx));
        let services = AppServices::new(
            db_arc.clone(),
            Some(EventSender::new(event_tx)),
            cfg.event_cascade_limit,
        );
        let auth = Arc::new(AuthService::new(AuthConfig::from(&cfg)));

        let state = AppState {
            db: db_arc,
            config: cfg,
            services,
            auth,
        };
        let router = freightwms_api::app(state.clone())
            .layer(middleware::from_fn(request_id_middleware));

        Self {
            router,
            state,
            tenant_id: Uuid::new_v4(),
            _event_task: event_task,
        }
    }

    /// Warehouse staff of the test tenant
    pub fn staff(&self) -> AuthContext {
        AuthContext::staff(Uuid::new_v4(), UserRole::WarehouseStaff, self.tenant_id)
    }

    pub fn tenant_admin(&self) -> AuthContext {
        AuthContext::staff(Uuid::new_v4(), UserRole::TenantAdmin, self.tenant_id)
    }

    pub fn token_for(&self, ctx: &AuthContext) -> String {
        self.state
            .auth
            .issue_token(ctx, Some("Test User".to_string()), None)
            .expect("token")
    }

    /// Sends a request through the full router and decodes the JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn seed_sku(&self, code: &str) -> sku::Model {
        self.state
            .services
            .skus
            .create(
                &self.staff(),
                CreateSkuRequest {
                    tenant_id: None,
                    customer_id: None,
                    sku_code: code.to_string(),
                    description: None,
                    storage_unit_id: None,
                    length_per_hu_mm: None,
                    width_per_hu_mm: None,
                    height_per_hu_mm: None,
                    weight_per_hu_kg: None,
                    figures: Default::default(),
                },
            )
            .await
            .expect("sku")
    }

    pub async fn seed_booking(&self, job_type: JobType, code: &str, containers: usize) -> BookingDetail {
        let containers = (0..containers)
            .map(|i| ContainerRequest {
                container_number: format!("MSCU{:07}", i + 1),
                container_size: Some("40HC".to_string()),
                sequence: None,
                warehouse_id: None,
            })
            .collect();
        self.state
            .services
            .bookings
            .create_booking(
                &self.staff(),
                CreateBookingRequest {
                    tenant_id: None,
                    job_type,
                    booking_code: code.to_string(),
                    charge_to: None,
                    vessel: Some("MAERSK SEOUL".to_string()),
                    voyage: Some("412E".to_string()),
                    eta: None,
                    etd: None,
                    notes: None,
                    containers,
                },
            )
            .await
            .expect("booking")
    }

    /// Receives every line of an import container
    pub async fn receive(&self, container_detail_id: Uuid, sku_id: Uuid, qty: i32) {
        self.state
            .services
            .allocations
            .create(
                &self.staff(),
                CreateAllocationRequest {
                    container_detail_id,
                    inbound_job_id: None,
                    outbound_job_id: None,
                    lines: vec![AllocationLineRequest {
                        sku_id,
                        expected_qty: qty,
                        received_qty: qty,
                        allocated_qty: 0,
                        picked_qty: 0,
                    }],
                },
            )
            .await
            .expect("allocation");
    }

    pub async fn container(&self, id: Uuid) -> container_detail::Model {
        self.state
            .services
            .bookings
            .get_container(&self.staff(), id)
            .await
            .expect("container")
    }

    pub async fn booking_status(&self, id: Uuid) -> String {
        self.state
            .services
            .bookings
            .get_booking(&self.staff(), id)
            .await
            .expect("booking")
            .booking
            .status
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}
