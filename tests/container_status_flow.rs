mod common;

use assert_matches::assert_matches;
use common::TestApp;
use freightwms_api::{
    entities::{container_detail, BookingStatus, ContainerStatus, JobType, PickupStatus},
    errors::ServiceError,
    services::{
        booking_status::BookingStatusAggregator,
        container_bookings::UpdateBookingRequest,
        inventory_jobs::{CreateOutboundJobRequest, OutboundLineRequest},
        lpn::CreateLpnRequest,
        pickup_records::CreatePickupRequest,
        stock_allocations::{
            AllocationLineRequest, CreateAllocationRequest, UpdateAllocationLineRequest,
        },
    },
};
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

fn pallet(number: &str, container_detail_id: Uuid, sku_id: Uuid) -> CreateLpnRequest {
    CreateLpnRequest {
        tenant_id: None,
        lpn_number: number.to_string(),
        warehouse_id: None,
        location: Some("A-01-01".to_string()),
        sku_id: Some(sku_id),
        qty: 40,
        inbound_job_id: None,
        inbound_product_line_id: None,
        container_detail_id: Some(container_detail_id),
        outbound_job_id: None,
        outbound_product_line_id: None,
        allocation_status: None,
    }
}

#[tokio::test]
async fn import_booking_follows_its_containers() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let sku = app.seed_sku("CARTON-01").await;
    let detail = app.seed_booking(JobType::Import, "IMP-0001", 3).await;
    let booking_id = detail.booking.id;
    let ids: Vec<Uuid> = detail.containers.iter().map(|c| c.id).collect();

    assert_eq!(detail.booking.status, "expecting");
    assert!(detail.containers.iter().all(|c| c.status == "expecting"));
    assert_eq!(
        detail.containers.iter().map(|c| c.sequence).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    app.receive(ids[0], sku.id, 10).await;
    assert_eq!(app.container(ids[0]).await.status, "received");
    assert_eq!(app.booking_status(booking_id).await, "partially_received");

    app.receive(ids[1], sku.id, 10).await;
    app.receive(ids[2], sku.id, 10).await;
    assert_eq!(app.booking_status(booking_id).await, "received");

    let lpns = &app.state.services.lpns;
    let third = lpns
        .create(&ctx, pallet("LPN-0003", ids[2], sku.id))
        .await
        .expect("pallet");
    assert_eq!(app.container(ids[2]).await.status, "put_away");
    assert_eq!(app.booking_status(booking_id).await, "partially_put_away");

    lpns.create(&ctx, pallet("LPN-0001", ids[0], sku.id))
        .await
        .expect("pallet");
    lpns.create(&ctx, pallet("LPN-0002", ids[1], sku.id))
        .await
        .expect("pallet");
    assert_eq!(app.booking_status(booking_id).await, "put_away");

    // a soft-deleted pallet no longer counts as put away
    let permanent = lpns.delete(&ctx, third.id).await.expect("soft delete");
    assert!(!permanent);
    assert_eq!(app.container(ids[2]).await.status, "received");
    assert_eq!(app.booking_status(booking_id).await, "partially_put_away");
}

#[tokio::test]
async fn cancelled_booking_is_never_recalculated() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let sku = app.seed_sku("CARTON-02").await;
    let detail = app.seed_booking(JobType::Import, "IMP-0002", 2).await;
    let booking_id = detail.booking.id;

    app.state
        .services
        .bookings
        .update_booking(
            &ctx,
            booking_id,
            UpdateBookingRequest {
                status: Some(BookingStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .expect("cancel");

    app.receive(detail.containers[0].id, sku.id, 5).await;
    app.receive(detail.containers[1].id, sku.id, 5).await;

    assert_eq!(app.container(detail.containers[0].id).await.status, "received");
    assert_eq!(app.booking_status(booking_id).await, "cancelled");
}

#[tokio::test]
async fn derived_booking_status_cannot_be_set_by_hand() {
    let app = TestApp::new().await;
    let detail = app.seed_booking(JobType::Import, "IMP-0003", 1).await;

    let result = app
        .state
        .services
        .bookings
        .update_booking(
            &app.staff(),
            detail.booking.id,
            UpdateBookingRequest {
                status: Some(BookingStatus::Received),
                ..Default::default()
            },
        )
        .await;

    assert_matches!(result, Err(ServiceError::InvalidStatus(_)));
    assert_eq!(app.booking_status(detail.booking.id).await, "expecting");
}

#[tokio::test]
async fn export_container_moves_through_pickup_and_dispatch() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let services = &app.state.services;
    let sku = app.seed_sku("CARTON-03").await;
    let detail = app.seed_booking(JobType::Export, "EXP-0001", 1).await;
    let booking_id = detail.booking.id;
    let container_id = detail.containers[0].id;

    assert_eq!(detail.booking.status, "allocated");
    assert_eq!(detail.containers[0].status, "allocated");

    let job = services
        .inventory_jobs
        .create_outbound(
            &ctx,
            CreateOutboundJobRequest {
                tenant_id: None,
                job_code: "OUT-0001".to_string(),
                customer_id: None,
                warehouse_id: None,
                required_date: None,
                notes: None,
                lines: vec![OutboundLineRequest {
                    sku_id: sku.id,
                    required_qty: 10,
                }],
            },
        )
        .await
        .expect("outbound job");

    let allocation = services
        .allocations
        .create(
            &ctx,
            CreateAllocationRequest {
                container_detail_id: container_id,
                inbound_job_id: None,
                outbound_job_id: Some(job.job.id),
                lines: vec![AllocationLineRequest {
                    sku_id: sku.id,
                    expected_qty: 10,
                    received_qty: 0,
                    allocated_qty: 10,
                    picked_qty: 0,
                }],
            },
        )
        .await
        .expect("allocation");

    // not picked up yet
    let early = services.bookings.dispatch_container(&ctx, container_id).await;
    assert_matches!(early, Err(ServiceError::InvalidStatus(_)));

    services
        .allocations
        .update_line(
            &ctx,
            allocation.lines[0].id,
            UpdateAllocationLineRequest {
                picked_qty: Some(10),
                ..Default::default()
            },
        )
        .await
        .expect("picked");
    // fully picked but without a completed pickup
    assert_eq!(app.container(container_id).await.status, "allocated");

    let pickup = services
        .pickups
        .create(
            &ctx,
            CreatePickupRequest {
                container_detail_id: container_id,
                outbound_job_id: Some(job.job.id),
                status: None,
                notes: None,
            },
        )
        .await
        .expect("pickup");
    assert_eq!(pickup.status, PickupStatus::Draft.to_string());
    assert_eq!(app.container(container_id).await.status, "allocated");

    let completed = services.pickups.complete(&ctx, pickup.id).await.expect("complete");
    assert!(completed.completed_at.is_some());
    assert_eq!(app.container(container_id).await.status, "picked_up");
    assert_eq!(app.booking_status(booking_id).await, "ready_to_dispatch");

    let dispatched = services
        .bookings
        .dispatch_container(&ctx, container_id)
        .await
        .expect("dispatch");
    assert_eq!(dispatched.status, "dispatched");
    assert_eq!(app.booking_status(booking_id).await, "dispatched");

    // dispatched containers keep their status when lines change again
    services
        .allocations
        .update_line(
            &ctx,
            allocation.lines[0].id,
            UpdateAllocationLineRequest {
                picked_qty: Some(4),
                ..Default::default()
            },
        )
        .await
        .expect("edit after dispatch");
    assert_eq!(app.container(container_id).await.status, "dispatched");
}

#[tokio::test]
async fn import_containers_cannot_be_dispatched() {
    let app = TestApp::new().await;
    let detail = app.seed_booking(JobType::Import, "IMP-0004", 1).await;

    let result = app
        .state
        .services
        .bookings
        .dispatch_container(&app.staff(), detail.containers[0].id)
        .await;

    assert_matches!(result, Err(ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn booking_with_put_away_pallets_cannot_be_deleted() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let sku = app.seed_sku("CARTON-04").await;
    let detail = app.seed_booking(JobType::Import, "IMP-0005", 1).await;
    let container_id = detail.containers[0].id;

    app.receive(container_id, sku.id, 3).await;
    let lpn = app
        .state
        .services
        .lpns
        .create(&ctx, pallet("LPN-0100", container_id, sku.id))
        .await
        .expect("pallet");

    let blocked = app
        .state
        .services
        .bookings
        .delete_booking(&ctx, detail.booking.id)
        .await;
    assert_matches!(blocked, Err(ServiceError::Conflict(_)));

    app.state.services.lpns.delete(&ctx, lpn.id).await.expect("soft delete");
    app.state
        .services
        .bookings
        .delete_booking(&ctx, detail.booking.id)
        .await
        .expect("delete once no live pallet remains");
}

#[tokio::test]
async fn unreadable_container_status_stops_aggregation() {
    let app = TestApp::new().await;
    let detail = app.seed_booking(JobType::Import, "IMP-0006", 2).await;
    let db = &*app.state.db;

    let mut received: container_detail::ActiveModel = detail.containers[0].clone().into();
    received.status = Set(ContainerStatus::Received.to_string());
    received.update(db).await.expect("received");
    let mut stray: container_detail::ActiveModel = detail.containers[1].clone().into();
    stray.status = Set("mislabelled".to_string());
    stray.update(db).await.expect("stray status");

    // aggregating over the readable container alone would say received
    let result = BookingStatusAggregator::new(app.state.db.clone())
        .recalculate(detail.booking.id)
        .await;

    assert_matches!(result, Err(ServiceError::InternalError(message)) if message.contains("mislabelled"));
    assert_eq!(app.booking_status(detail.booking.id).await, "expecting");
}
