mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use common::TestApp;
use freightwms_api::{
    auth::{AuthContext, UserRole},
    entities::{outbound_product_line, AllocationStatus},
    errors::ServiceError,
    services::{
        inventory_jobs::{
            CreateInboundJobRequest, CreateOutboundJobRequest, InboundLineRequest,
            OutboundJobDetail, OutboundLineRequest,
        },
        lpn::{BatchUpdateRequest, BatchUpdateRow, CreateLpnRequest, LpnFilter, UpdateLpnRequest},
    },
};
use sea_orm::ConnectionTrait;
use serde_json::json;
use uuid::Uuid;

fn lpn(number: &str) -> CreateLpnRequest {
    CreateLpnRequest {
        tenant_id: None,
        lpn_number: number.to_string(),
        warehouse_id: None,
        location: Some("B-02-03".to_string()),
        sku_id: None,
        qty: 40,
        inbound_job_id: None,
        inbound_product_line_id: None,
        container_detail_id: None,
        outbound_job_id: None,
        outbound_product_line_id: None,
        allocation_status: None,
    }
}

fn allocate_to(job: &OutboundJobDetail) -> UpdateLpnRequest {
    UpdateLpnRequest {
        allocation_status: Some(AllocationStatus::Allocated),
        outbound_job_id: Some(job.job.id),
        outbound_product_line_id: Some(job.lines[0].id),
        ..Default::default()
    }
}

async fn outbound_job(app: &TestApp, code: &str, sku_id: Uuid) -> OutboundJobDetail {
    app.state
        .services
        .inventory_jobs
        .create_outbound(
            &app.staff(),
            CreateOutboundJobRequest {
                tenant_id: None,
                job_code: code.to_string(),
                customer_id: None,
                warehouse_id: None,
                required_date: None,
                notes: None,
                lines: vec![OutboundLineRequest {
                    sku_id,
                    required_qty: 80,
                }],
            },
        )
        .await
        .expect("outbound job")
}

async fn outbound_line(app: &TestApp, job: &OutboundJobDetail) -> outbound_product_line::Model {
    app.state
        .services
        .inventory_jobs
        .get_outbound(&app.staff(), job.job.id)
        .await
        .expect("job")
        .lines
        .remove(0)
}

#[tokio::test]
async fn second_outbound_job_cannot_take_an_allocated_pallet() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let sku = app.seed_sku("PALLET-SKU").await;
    let job_a = outbound_job(&app, "OUT-A", sku.id).await;
    let job_b = outbound_job(&app, "OUT-B", sku.id).await;
    let lpns = &app.state.services.lpns;

    let pallet = lpns.create(&ctx, lpn("LPN-000123")).await.expect("pallet");
    assert_eq!(pallet.allocation_status, "available");

    let allocated = lpns
        .update(&ctx, pallet.id, allocate_to(&job_a))
        .await
        .expect("first allocation");
    assert_eq!(allocated.outbound_job_id, Some(job_a.job.id));
    assert_eq!(outbound_line(&app, &job_a).await.allocated_qty, 40);

    let err = lpns
        .update(&ctx, pallet.id, allocate_to(&job_b))
        .await
        .expect_err("double allocation");
    assert_matches!(&err, ServiceError::Conflict(message) if message.contains("OUT-A"));
    assert_eq!(
        err.to_string(),
        "Conflict: LPN LPN-000123 is already allocated to outbound job OUT-A"
    );

    // nothing was written by the rejected update
    let stored = lpns.get(&ctx, pallet.id).await.expect("pallet");
    assert_eq!(stored.outbound_job_id, Some(job_a.job.id));
    assert_eq!(outbound_line(&app, &job_b).await.allocated_qty, 0);

    // re-allocating to the holder is accepted
    lpns.update(&ctx, pallet.id, allocate_to(&job_a))
        .await
        .expect("same job");
}

#[tokio::test]
async fn held_pallet_cannot_be_moved_to_another_job_by_changing_status() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let sku = app.seed_sku("PALLET-SKU").await;
    let job_a = outbound_job(&app, "OUT-J", sku.id).await;
    let job_b = outbound_job(&app, "OUT-K", sku.id).await;
    let lpns = &app.state.services.lpns;
    let pallet = lpns.create(&ctx, lpn("LPN-000150")).await.expect("pallet");
    lpns.update(&ctx, pallet.id, allocate_to(&job_a))
        .await
        .expect("allocate");

    for status in [
        AllocationStatus::Reserved,
        AllocationStatus::Picked,
        AllocationStatus::Dispatched,
    ] {
        let result = lpns
            .update(
                &ctx,
                pallet.id,
                UpdateLpnRequest {
                    allocation_status: Some(status),
                    outbound_job_id: Some(job_b.job.id),
                    outbound_product_line_id: Some(job_b.lines[0].id),
                    ..Default::default()
                },
            )
            .await;
        assert_matches!(result, Err(ServiceError::Conflict(message)) if message.contains("OUT-J"));
    }

    // naming no job keeps the holder
    let reallocated = lpns
        .update(
            &ctx,
            pallet.id,
            UpdateLpnRequest {
                allocation_status: Some(AllocationStatus::Allocated),
                ..Default::default()
            },
        )
        .await
        .expect("same job");
    assert_eq!(reallocated.outbound_job_id, Some(job_a.job.id));
    assert_eq!(outbound_line(&app, &job_b).await.allocated_qty, 0);
    assert_eq!(outbound_line(&app, &job_a).await.allocated_qty, 40);
}

#[tokio::test]
async fn releasing_a_pallet_frees_it_for_another_job() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let sku = app.seed_sku("PALLET-SKU").await;
    let job_a = outbound_job(&app, "OUT-C", sku.id).await;
    let job_b = outbound_job(&app, "OUT-D", sku.id).await;
    let lpns = &app.state.services.lpns;
    let pallet = lpns.create(&ctx, lpn("LPN-000200")).await.expect("pallet");

    lpns.update(&ctx, pallet.id, allocate_to(&job_a))
        .await
        .expect("allocate");
    lpns.update(
        &ctx,
        pallet.id,
        UpdateLpnRequest {
            allocation_status: Some(AllocationStatus::Picked),
            ..Default::default()
        },
    )
    .await
    .expect("pick");
    let line = outbound_line(&app, &job_a).await;
    assert_eq!((line.allocated_qty, line.picked_qty), (40, 40));

    let released = lpns
        .update(
            &ctx,
            pallet.id,
            UpdateLpnRequest {
                allocation_status: Some(AllocationStatus::Available),
                ..Default::default()
            },
        )
        .await
        .expect("release");
    assert_eq!(released.outbound_job_id, None);
    assert_eq!(released.outbound_product_line_id, None);
    let line = outbound_line(&app, &job_a).await;
    assert_eq!((line.allocated_qty, line.picked_qty), (0, 0));

    lpns.update(&ctx, pallet.id, allocate_to(&job_b))
        .await
        .expect("allocate to the second job");
    assert_eq!(outbound_line(&app, &job_b).await.allocated_qty, 40);
}

#[tokio::test]
async fn deleted_or_jobless_pallets_are_not_allocated() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let sku = app.seed_sku("PALLET-SKU").await;
    let job = outbound_job(&app, "OUT-E", sku.id).await;
    let lpns = &app.state.services.lpns;

    let jobless = lpns.create(&ctx, lpn("LPN-000300")).await.expect("pallet");
    let result = lpns
        .update(
            &ctx,
            jobless.id,
            UpdateLpnRequest {
                allocation_status: Some(AllocationStatus::Allocated),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));

    let deleted = lpns.create(&ctx, lpn("LPN-000301")).await.expect("pallet");
    lpns.delete(&ctx, deleted.id).await.expect("soft delete");
    let result = lpns.update(&ctx, deleted.id, allocate_to(&job)).await;
    assert_matches!(result, Err(ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn pallets_are_soft_deleted_before_they_are_removed() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let sku = app.seed_sku("PALLET-SKU").await;
    let inbound = app
        .state
        .services
        .inventory_jobs
        .create_inbound(
            &ctx,
            CreateInboundJobRequest {
                tenant_id: None,
                job_code: "IN-0001".to_string(),
                customer_id: None,
                warehouse_id: None,
                expected_date: None,
                notes: None,
                lines: vec![InboundLineRequest {
                    sku_id: sku.id,
                    expected_qty: 40,
                    received_qty: 40,
                    batch_number: Some("B-17".to_string()),
                }],
            },
        )
        .await
        .expect("inbound job");
    let line_id = inbound.lines[0].id;

    let lpns = &app.state.services.lpns;
    let mut request = lpn("LPN-000400");
    request.inbound_job_id = Some(inbound.job.id);
    request.inbound_product_line_id = Some(line_id);
    let pallet = lpns.create(&ctx, request).await.expect("pallet");

    let put_away_qty = |detail: freightwms_api::services::inventory_jobs::InboundJobDetail| {
        detail.lines[0].put_away_qty
    };
    let jobs = &app.state.services.inventory_jobs;
    assert_eq!(put_away_qty(jobs.get_inbound(&ctx, inbound.job.id).await.expect("job")), 40);

    assert!(!lpns.delete(&ctx, pallet.id).await.expect("soft delete"));
    assert_eq!(put_away_qty(jobs.get_inbound(&ctx, inbound.job.id).await.expect("job")), 0);

    let stored = lpns.get(&ctx, pallet.id).await.expect("still readable");
    assert!(stored.is_deleted);
    assert!(stored.deleted_at.is_some());

    let live = lpns
        .list(&ctx, LpnFilter::default(), 1, 20)
        .await
        .expect("list");
    assert_eq!(live.total, 0);
    let all = lpns
        .list(
            &ctx,
            LpnFilter {
                include_deleted: true,
                ..Default::default()
            },
            1,
            20,
        )
        .await
        .expect("list");
    assert_eq!(all.total, 1);

    assert!(lpns.delete(&ctx, pallet.id).await.expect("hard delete"));
    assert_matches!(
        lpns.get(&ctx, pallet.id).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn batch_update_reports_each_row() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let sku = app.seed_sku("PALLET-SKU").await;
    let job_a = outbound_job(&app, "OUT-F", sku.id).await;
    let job_b = outbound_job(&app, "OUT-G", sku.id).await;
    let lpns = &app.state.services.lpns;
    let held = lpns.create(&ctx, lpn("LPN-000500")).await.expect("pallet");
    let free = lpns.create(&ctx, lpn("LPN-000501")).await.expect("pallet");
    lpns.update(&ctx, held.id, allocate_to(&job_a))
        .await
        .expect("allocate");

    let result = lpns
        .batch_update(
            &ctx,
            BatchUpdateRequest {
                updates: vec![
                    BatchUpdateRow {
                        id: free.id,
                        changes: allocate_to(&job_b),
                    },
                    BatchUpdateRow {
                        id: held.id,
                        changes: allocate_to(&job_b),
                    },
                ],
            },
        )
        .await
        .expect("batch");

    assert_eq!((result.succeeded, result.failed), (1, 1));
    assert!(result.results[0].success);
    let error = result.results[1].error.as_deref().unwrap_or_default();
    assert!(error.contains("OUT-F"), "unexpected error: {error}");
    // the successful row stays applied
    assert_eq!(outbound_line(&app, &job_b).await.allocated_qty, 40);
}

#[tokio::test]
async fn conflict_is_reported_over_http() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let token = app.token_for(&ctx);
    let sku = app.seed_sku("PALLET-SKU").await;
    let job_a = outbound_job(&app, "OUT-H", sku.id).await;
    let job_b = outbound_job(&app, "OUT-I", sku.id).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/put-away-stock",
            Some(json!({ "lpn_number": "LPN-000600", "qty": 12 })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().expect("id").to_string();

    let uri = format!("/api/put-away-stock/{}", id);
    let (status, _) = app
        .request(
            Method::PUT,
            &uri,
            Some(json!({ "allocation_status": "allocated", "outbound_job_id": job_a.job.id })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::PUT,
            &uri,
            Some(json!({ "allocation_status": "allocated", "outbound_job_id": job_b.job.id })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.contains("OUT-H"), "unexpected message: {message}");

    // pallets of another tenant are invisible
    let outsider = AuthContext::staff(Uuid::new_v4(), UserRole::WarehouseStaff, Uuid::new_v4());
    let (status, _) = app
        .request(Method::GET, &uri, None, Some(&app.token_for(&outsider)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pallet_write_stands_when_the_line_roll_up_fails() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let sku = app.seed_sku("PALLET-SKU").await;
    let inbound = app
        .state
        .services
        .inventory_jobs
        .create_inbound(
            &ctx,
            CreateInboundJobRequest {
                tenant_id: None,
                job_code: "IN-0002".to_string(),
                customer_id: None,
                warehouse_id: None,
                expected_date: None,
                notes: None,
                lines: vec![InboundLineRequest {
                    sku_id: sku.id,
                    expected_qty: 40,
                    received_qty: 40,
                    batch_number: None,
                }],
            },
        )
        .await
        .expect("inbound job");

    // line reads now fail while pallet writes still work
    app.state
        .db
        .execute_unprepared(
            "ALTER TABLE inbound_product_lines RENAME COLUMN put_away_qty TO put_away_qty_moved",
        )
        .await
        .expect("rename column");

    let lpns = &app.state.services.lpns;
    let mut request = lpn("LPN-000700");
    request.inbound_job_id = Some(inbound.job.id);
    request.inbound_product_line_id = Some(inbound.lines[0].id);
    let pallet = lpns.create(&ctx, request).await.expect("pallet write stands");

    let result = lpns
        .batch_update(
            &ctx,
            BatchUpdateRequest {
                updates: vec![BatchUpdateRow {
                    id: pallet.id,
                    changes: UpdateLpnRequest {
                        qty: Some(35),
                        ..Default::default()
                    },
                }],
            },
        )
        .await
        .expect("batch");
    assert_eq!((result.succeeded, result.failed), (1, 0));
    assert_eq!(lpns.get(&ctx, pallet.id).await.expect("pallet").qty, 35);
}
