mod common;

use assert_matches::assert_matches;
use common::TestApp;
use freightwms_api::{
    auth::AuthContext,
    errors::ServiceError,
    services::{
        accounts::{CreateRoleRequest, CreateUserRequest},
        container_bookings::{ContainerRequest, CreateBookingRequest},
        customers::CreatePartyRequest,
        inventory_jobs::{CreateInboundJobRequest, CreateOutboundJobRequest},
        sku_metrics::ManualFigures,
        skus::{CreateSkuRequest, UpdateSkuRequest},
        tenants::CreateTenantRequest,
        warehouses::StorageUnitRequest,
    },
};
use freightwms_api::entities::{ChargeTo, ChargeToKind, JobType, UserCollection};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn sku_request(code: &str, storage_unit_id: Option<Uuid>) -> CreateSkuRequest {
    CreateSkuRequest {
        tenant_id: None,
        customer_id: None,
        sku_code: code.to_string(),
        description: Some("Boxed ceramic tiles".to_string()),
        storage_unit_id,
        length_per_hu_mm: Some(dec!(500)),
        width_per_hu_mm: Some(dec!(500)),
        height_per_hu_mm: Some(dec!(500)),
        weight_per_hu_kg: Some(dec!(18.5)),
        figures: ManualFigures::default(),
    }
}

#[tokio::test]
async fn sku_figures_are_derived_from_dimensions() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let unit = app
        .state
        .services
        .warehouses
        .create_storage_unit(
            &ctx,
            StorageUnitRequest {
                tenant_id: None,
                name: "Standard pallet".to_string(),
                length_per_su_mm: Some(dec!(1000)),
                width_per_su_mm: Some(dec!(1000)),
                height_per_su_mm: Some(dec!(1500)),
            },
        )
        .await
        .expect("storage unit");

    let sku = app
        .state
        .services
        .skus
        .create(&ctx, sku_request("TILE-60", Some(unit.id)))
        .await
        .expect("sku");

    assert_eq!(sku.expected_cubic_per_hu, Some(dec!(0.125)));
    assert_eq!(sku.sqm_per_su, Some(dec!(1)));
    assert_eq!(sku.cases_per_layer, Some(4));
    assert_eq!(sku.layers_per_pallet, Some(3));
    assert_eq!(sku.cases_per_pallet, Some(12));
    assert!(sku.cases_per_layer_auto && sku.cases_per_pallet_auto);

    // a manual override sticks and still feeds the automatic product
    let updated = app
        .state
        .services
        .skus
        .update(
            &ctx,
            sku.id,
            UpdateSkuRequest {
                figures: ManualFigures {
                    cases_per_layer: Some(5),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .await
        .expect("manual override");
    assert_eq!(updated.cases_per_layer, Some(5));
    assert!(!updated.cases_per_layer_auto);
    assert_eq!(updated.cases_per_pallet, Some(15));

    // recomputing drops the override again
    let reset = app
        .state
        .services
        .skus
        .update(
            &ctx,
            sku.id,
            UpdateSkuRequest {
                auto_calculate: true,
                ..Default::default()
            },
        )
        .await
        .expect("auto calculate");
    assert_eq!(reset.cases_per_layer, Some(4));
    assert!(reset.cases_per_layer_auto);
    assert_eq!(reset.cases_per_pallet, Some(12));
}

#[tokio::test]
async fn sku_codes_are_unique_per_tenant() {
    let app = TestApp::new().await;
    let skus = &app.state.services.skus;

    skus.create(&app.staff(), sku_request("DUP-1", None))
        .await
        .expect("first");
    let second = skus.create(&app.staff(), sku_request("DUP-1", None)).await;
    assert_matches!(second, Err(ServiceError::Conflict(_)));

    let other_tenant = AuthContext::staff(
        Uuid::new_v4(),
        freightwms_api::auth::UserRole::WarehouseStaff,
        Uuid::new_v4(),
    );
    skus.create(&other_tenant, sku_request("DUP-1", None))
        .await
        .expect("other tenant may reuse the code");
}

#[tokio::test]
async fn tenants_are_created_by_platform_admins_only() {
    let app = TestApp::new().await;
    let tenants = &app.state.services.tenants;
    let request = CreateTenantRequest {
        name: "Acme Logistics".to_string(),
        subdomain: " Acme-Logistics ".to_string(),
        contact_email: Some("ops@acme.example".to_string()),
    };

    let refused = tenants.create(&app.tenant_admin(), request.clone()).await;
    assert_matches!(refused, Err(ServiceError::Forbidden(_)));

    let admin = AuthContext::super_admin(Uuid::new_v4());
    let tenant = tenants.create(&admin, request.clone()).await.expect("tenant");
    assert_eq!(tenant.subdomain, "acme-logistics");
    assert!(tenant.is_active);

    let taken = tenants.check_subdomain("ACME-logistics").await.expect("check");
    assert!(!taken.available);
    assert_eq!(taken.subdomain, "acme-logistics");

    let duplicate = tenants.create(&admin, request).await;
    assert_matches!(duplicate, Err(ServiceError::Conflict(_)));

    for (raw, available) in [("harbour-freight", true), ("ab", false), ("www", false), ("-dock", false)] {
        let result = tenants.check_subdomain(raw).await.expect("check");
        assert_eq!(result.available, available, "subdomain {raw}");
        assert_eq!(result.reason.is_none(), available, "subdomain {raw}");
    }
}

#[tokio::test]
async fn assigned_roles_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.tenant_admin();
    let accounts = &app.state.services.accounts;

    let role = accounts
        .create_role(
            &admin,
            CreateRoleRequest {
                tenant_id: None,
                name: "Forklift driver".to_string(),
                description: None,
                is_system: false,
                permissions: vec!["put_away:write".to_string()],
            },
        )
        .await
        .expect("role");
    assert_eq!(role.tenant_id, Some(app.tenant_id));

    let user = accounts
        .create_user(
            &admin,
            CreateUserRequest {
                tenant_id: None,
                email: "Driver@Example.com".to_string(),
                name: "Driver".to_string(),
                role_id: Some(role.id),
                collection: UserCollection::Users,
                customer_id: None,
            },
        )
        .await
        .expect("user");
    assert_eq!(user.email, "driver@example.com");

    let blocked = accounts.delete_role(&admin, role.id).await;
    assert_matches!(blocked, Err(ServiceError::Conflict(_)));

    accounts.delete_user(&admin, user.id).await.expect("delete user");
    accounts.delete_role(&admin, role.id).await.expect("delete role");
}

#[tokio::test]
async fn customer_users_need_an_existing_customer() {
    let app = TestApp::new().await;
    let admin = app.tenant_admin();
    let accounts = &app.state.services.accounts;
    let portal_user = |customer_id| CreateUserRequest {
        tenant_id: None,
        email: "buyer@retail.example".to_string(),
        name: "Buyer".to_string(),
        role_id: None,
        collection: UserCollection::CustomerUsers,
        customer_id,
    };

    let missing = accounts
        .create_user(&admin, portal_user(Some(Uuid::new_v4())))
        .await;
    assert_matches!(missing, Err(ServiceError::ValidationError(_)));

    let customer = app
        .state
        .services
        .customers
        .create_customer(
            &admin,
            CreatePartyRequest {
                tenant_id: None,
                name: "Retail Co".to_string(),
                email: Some("accounts@retail.example".to_string()),
                phone: None,
                address_line1: Some("12 Wharf St".to_string()),
                address_line2: None,
                city: Some("Fremantle".to_string()),
                state: Some("WA".to_string()),
                postcode: Some("6160".to_string()),
                country: Some("AU".to_string()),
            },
        )
        .await
        .expect("customer");

    let user = accounts
        .create_user(&admin, portal_user(Some(customer.id)))
        .await
        .expect("portal user");
    assert_eq!(user.customer_id, Some(customer.id));
}

fn party(name: &str, email: &str) -> CreatePartyRequest {
    CreatePartyRequest {
        tenant_id: None,
        name: name.to_string(),
        email: Some(email.to_string()),
        phone: Some("+61 8 9430 0000".to_string()),
        address_line1: Some("12 Wharf St".to_string()),
        address_line2: None,
        city: Some("Fremantle".to_string()),
        state: Some("WA".to_string()),
        postcode: Some("6160".to_string()),
        country: Some("AU".to_string()),
    }
}

fn booking(code: &str, charge_to: Option<ChargeTo>) -> CreateBookingRequest {
    CreateBookingRequest {
        tenant_id: None,
        job_type: JobType::Import,
        booking_code: code.to_string(),
        charge_to,
        vessel: None,
        voyage: None,
        eta: None,
        etd: None,
        notes: None,
        containers: vec![ContainerRequest {
            container_number: "TGHU1234567".to_string(),
            container_size: None,
            sequence: None,
            warehouse_id: None,
        }],
    }
}

fn inbound(code: &str, customer_id: Uuid) -> CreateInboundJobRequest {
    CreateInboundJobRequest {
        tenant_id: None,
        job_code: code.to_string(),
        customer_id: Some(customer_id),
        warehouse_id: None,
        expected_date: None,
        notes: None,
        lines: vec![],
    }
}

fn outbound(code: &str, customer_id: Uuid) -> CreateOutboundJobRequest {
    CreateOutboundJobRequest {
        tenant_id: None,
        job_code: code.to_string(),
        customer_id: Some(customer_id),
        warehouse_id: None,
        required_date: None,
        notes: None,
        lines: vec![],
    }
}

#[tokio::test]
async fn party_details_are_copied_onto_documents() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let services = &app.state.services;
    let customer = services
        .customers
        .create_customer(&ctx, party("Retail Co", "accounts@retail.example"))
        .await
        .expect("customer");
    let payer = services
        .customers
        .create_paying_customer(&ctx, party("Harbour Finance", "ap@harbour.example"))
        .await
        .expect("paying customer");

    let charged = services
        .bookings
        .create_booking(
            &ctx,
            booking(
                "IMP-CHG-1",
                Some(ChargeTo {
                    kind: ChargeToKind::Customer,
                    id: customer.id,
                }),
            ),
        )
        .await
        .expect("booking");
    assert_eq!(charged.booking.charge_to_name.as_deref(), Some("Retail Co"));
    assert_eq!(
        charged.booking.charge_to_email.as_deref(),
        Some("accounts@retail.example")
    );
    assert_eq!(
        charged.booking.charge_to_address.as_deref(),
        Some("12 Wharf St, Fremantle, WA, 6160, AU")
    );

    let paid = services
        .bookings
        .create_booking(
            &ctx,
            booking(
                "IMP-CHG-2",
                Some(ChargeTo {
                    kind: ChargeToKind::PayingCustomer,
                    id: payer.id,
                }),
            ),
        )
        .await
        .expect("booking");
    assert_eq!(paid.booking.charge_to_name.as_deref(), Some("Harbour Finance"));
    assert_eq!(paid.booking.charge_to_email.as_deref(), Some("ap@harbour.example"));

    let receipt = services
        .inventory_jobs
        .create_inbound(&ctx, inbound("IN-CUST-1", customer.id))
        .await
        .expect("inbound job");
    assert_eq!(receipt.job.customer_name.as_deref(), Some("Retail Co"));
    assert_eq!(receipt.job.delivery_address_line1.as_deref(), Some("12 Wharf St"));
    assert_eq!(receipt.job.delivery_city.as_deref(), Some("Fremantle"));
    assert_eq!(receipt.job.delivery_postcode.as_deref(), Some("6160"));

    let shipment = services
        .inventory_jobs
        .create_outbound(&ctx, outbound("OUT-CUST-1", customer.id))
        .await
        .expect("outbound job");
    assert_eq!(shipment.job.consignee_name.as_deref(), Some("Retail Co"));
    assert_eq!(
        shipment.job.consignee_email.as_deref(),
        Some("accounts@retail.example")
    );
    assert_eq!(shipment.job.consignee_phone.as_deref(), Some("+61 8 9430 0000"));
    assert_eq!(shipment.job.consignee_country.as_deref(), Some("AU"));
}

#[tokio::test]
async fn missing_parties_do_not_block_the_write() {
    let app = TestApp::new().await;
    let ctx = app.staff();
    let services = &app.state.services;
    let unknown = Uuid::new_v4();

    let charged = services
        .bookings
        .create_booking(
            &ctx,
            booking(
                "IMP-CHG-3",
                Some(ChargeTo {
                    kind: ChargeToKind::PayingCustomer,
                    id: unknown,
                }),
            ),
        )
        .await
        .expect("booking is saved");
    assert_eq!(charged.booking.charge_to_id, Some(unknown));
    assert_eq!(charged.booking.charge_to_name, None);
    assert_eq!(charged.booking.charge_to_address, None);

    let receipt = services
        .inventory_jobs
        .create_inbound(&ctx, inbound("IN-CUST-2", unknown))
        .await
        .expect("inbound job is saved");
    assert_eq!(receipt.job.customer_id, Some(unknown));
    assert_eq!(receipt.job.customer_name, None);

    let shipment = services
        .inventory_jobs
        .create_outbound(&ctx, outbound("OUT-CUST-2", unknown))
        .await
        .expect("outbound job is saved");
    assert_eq!(shipment.job.consignee_name, None);
}
