mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use freightwms_api::auth::AuthContext;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn health_and_status_are_public() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");

    let (status, body) = app.request(Method::GET, "/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["service"], "freightwms-api");
    let handlers = body["data"]["event_handlers"].as_array().expect("handlers");
    assert_eq!(handlers.len(), 2);
}

#[tokio::test]
async fn api_requires_a_bearer_token() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(Method::GET, "/api/container-bookings", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = app
        .request(
            Method::GET,
            "/api/container-bookings",
            None,
            Some("not-a-jwt"),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn account_routes_are_limited_to_admins() {
    let app = TestApp::new().await;
    let staff_token = app.token_for(&app.staff());
    let admin_token = app.token_for(&app.tenant_admin());

    let (status, _) = app
        .request(Method::GET, "/api/roles", None, Some(&staff_token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(Method::GET, "/api/roles", None, Some(&admin_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);

    // creating tenants needs a platform administrator
    let tenant = json!({ "name": "Harbour", "subdomain": "harbour" });
    let (status, _) = app
        .request(Method::POST, "/api/tenants", Some(tenant.clone()), Some(&admin_token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let root_token = app.token_for(&AuthContext::super_admin(Uuid::new_v4()));
    let (status, body) = app
        .request(Method::POST, "/api/tenants", Some(tenant), Some(&root_token))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["subdomain"], "harbour");
}

#[tokio::test]
async fn subdomain_check_needs_no_token() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::GET,
            "/api/tenants/check-subdomain?subdomain=Northport",
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["subdomain"], "northport");
    assert_eq!(body["data"]["available"], true);
}

#[tokio::test]
async fn bookings_round_trip_over_http() {
    let app = TestApp::new().await;
    let token = app.token_for(&app.staff());

    let (status, body) = app
        .request(
            Method::POST,
            "/api/container-bookings",
            Some(json!({
                "job_type": "import",
                "booking_code": "IMP-HTTP-1",
                "containers": [
                    { "container_number": " tcnu1234567 " },
                    { "container_number": "TCNU7654321", "container_size": "20GP" }
                ]
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "expecting");
    let containers = body["data"]["containers"].as_array().expect("containers");
    assert_eq!(containers.len(), 2);
    assert_eq!(containers[0]["container_number"], "TCNU1234567");
    let booking_id = body["data"]["id"].as_str().expect("id").to_string();

    let (status, body) = app
        .request(
            Method::GET,
            "/api/container-bookings?job_type=import",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/container-bookings/{}", booking_id),
            Some(json!({ "status": "put_away" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap_or_default().contains("derived"));

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/container-bookings/{}", booking_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/container-bookings/{}", booking_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/put-away-stock/{id}"].is_object());
}
