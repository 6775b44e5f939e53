use sea_orm::{EntityTrait, FromQueryResult, PaginatorTrait, Select};

use crate::{db::DbPool, errors::ServiceError, PaginatedResponse};

pub mod accounts;
pub mod booking_status;
pub mod container_bookings;
pub mod container_status;
pub mod customers;
pub mod denormalize;
pub mod fleet;
pub mod inventory_jobs;
pub mod lpn;
pub mod lpn_guard;
pub mod pickup_records;
pub mod sku_metrics;
pub mod skus;
pub mod status_rules;
pub mod stock_allocations;
pub mod tenants;
pub mod warehouses;

/// Runs `query` one page at a time; pages are 1-based
pub(crate) async fn paginate<E>(
    db: &DbPool,
    query: Select<E>,
    page: u64,
    per_page: u64,
) -> Result<PaginatedResponse<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let per_page = per_page.max(1);
    let paginator = query.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.max(1) - 1).await?;

    Ok(PaginatedResponse {
        items,
        total,
        page: page.max(1),
        limit: per_page,
        total_pages: total.div_ceil(per_page),
    })
}
