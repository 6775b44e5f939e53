use std::sync::Arc;

use crate::{
    db::DbPool,
    events::{EventBus, EventSender},
    services::{
        accounts::AccountService, booking_status::BookingStatusAggregator,
        container_bookings::ContainerBookingService, container_status::ContainerStatusRecalculator,
        customers::CustomerService, fleet::FleetService, inventory_jobs::InventoryJobService,
        lpn::LpnService, pickup_records::PickupRecordService, skus::SkuService,
        stock_allocations::StockAllocationService, tenants::TenantService,
        warehouses::WarehouseService,
    },
};

pub mod accounts;
pub mod common;
pub mod container_bookings;
pub mod customers;
pub mod fleet;
pub mod inventory_jobs;
pub mod pickup_records;
pub mod put_away_stock;
pub mod skus;
pub mod stock_allocations;
pub mod tenants;
pub mod warehouses;

/// Every service the HTTP layer calls into
#[derive(Clone)]
pub struct AppServices {
    pub tenants: Arc<TenantService>,
    pub accounts: Arc<AccountService>,
    pub customers: Arc<CustomerService>,
    pub warehouses: Arc<WarehouseService>,
    pub skus: Arc<SkuService>,
    pub inventory_jobs: Arc<InventoryJobService>,
    pub bookings: Arc<ContainerBookingService>,
    pub allocations: Arc<StockAllocationService>,
    pub lpns: Arc<LpnService>,
    pub pickups: Arc<PickupRecordService>,
    pub fleet: Arc<FleetService>,
    pub events: Arc<EventBus>,
}

impl AppServices {
    /// Wires the services around one event bus carrying the status
    /// recalculation handlers.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<EventSender>, cascade_limit: usize) -> Self {
        let mut bus = EventBus::new(cascade_limit)
            .with_handler(Arc::new(ContainerStatusRecalculator::new(db_pool.clone())))
            .with_handler(Arc::new(BookingStatusAggregator::new(db_pool.clone())));
        if let Some(sender) = event_sender {
            bus = bus.with_sender(sender);
        }
        let events = Arc::new(bus);

        Self {
            tenants: Arc::new(TenantService::new(db_pool.clone(), events.clone())),
            accounts: Arc::new(AccountService::new(db_pool.clone())),
            customers: Arc::new(CustomerService::new(db_pool.clone())),
            warehouses: Arc::new(WarehouseService::new(db_pool.clone())),
            skus: Arc::new(SkuService::new(db_pool.clone())),
            inventory_jobs: Arc::new(InventoryJobService::new(db_pool.clone())),
            bookings: Arc::new(ContainerBookingService::new(db_pool.clone(), events.clone())),
            allocations: Arc::new(StockAllocationService::new(db_pool.clone(), events.clone())),
            lpns: Arc::new(LpnService::new(db_pool.clone(), events.clone())),
            pickups: Arc::new(PickupRecordService::new(db_pool.clone(), events.clone())),
            fleet: Arc::new(FleetService::new(db_pool)),
            events,
        }
    }
}
