//! sea-orm entities, one module per table.
//!
//! Status columns are stored as snake_case strings; the matching strum enums
//! live next to the entity that owns them.

pub mod allocation_line;
pub mod container_booking;
pub mod container_detail;
pub mod customer;
pub mod fleet_asset;
pub mod inbound_job;
pub mod inbound_product_line;
pub mod outbound_job;
pub mod outbound_product_line;
pub mod paying_customer;
pub mod pickup_record;
pub mod put_away_stock;
pub mod role;
pub mod sku;
pub mod stock_allocation;
pub mod storage_unit;
pub mod tenant;
pub mod user;
pub mod warehouse;

pub use container_booking::{BookingStatus, ChargeTo, ChargeToKind, JobType};
pub use container_detail::ContainerStatus;
pub use fleet_asset::{FleetAssetStatus, FleetAssetType};
pub use inbound_job::InboundJobStatus;
pub use outbound_job::OutboundJobStatus;
pub use pickup_record::PickupStatus;
pub use put_away_stock::AllocationStatus;
pub use user::UserCollection;

/// Joins the non-empty parts of an address with ", "
pub(crate) fn join_address(parts: &[&Option<String>]) -> Option<String> {
    let joined = parts
        .iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::join_address;

    #[test]
    fn join_address_skips_blank_parts() {
        let line1 = Some("1 Dock Rd".to_string());
        let blank = Some("  ".to_string());
        let city = Some("Botany".to_string());
        assert_eq!(
            join_address(&[&line1, &blank, &None, &city]),
            Some("1 Dock Rd, Botany".to_string())
        );
        assert_eq!(join_address(&[&None, &blank]), None);
    }
}
