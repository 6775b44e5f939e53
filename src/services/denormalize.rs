//! Copies contact and address details of a referenced party onto the
//! document that references it.
//!
//! A failed lookup never fails the write: it is logged and the document is
//! saved with whatever details it already had.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::warn;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        container_booking, customer, inbound_job, outbound_job, paying_customer, ChargeTo,
        ChargeToKind,
    },
};

/// Name, email and one-line address of a customer or paying customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartySnapshot {
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Loads a customer of `tenant_id`, logging and swallowing lookup failures
pub async fn find_customer(db: &DbPool, tenant_id: Uuid, customer_id: Uuid) -> Option<customer::Model> {
    let result = customer::Entity::find_by_id(customer_id)
        .filter(customer::Column::TenantId.eq(tenant_id))
        .one(db)
        .await;

    match result {
        Ok(Some(customer)) => Some(customer),
        Ok(None) => {
            warn!(%customer_id, %tenant_id, "customer not found; saving without its details");
            None
        }
        Err(e) => {
            warn!(%customer_id, error = %e, "customer lookup failed; saving without its details");
            None
        }
    }
}

pub async fn charge_to_snapshot(db: &DbPool, tenant_id: Uuid, charge_to: ChargeTo) -> Option<PartySnapshot> {
    let snapshot = match charge_to.kind {
        ChargeToKind::Customer => find_customer(db, tenant_id, charge_to.id)
            .await
            .map(|c| PartySnapshot {
                address: c.formatted_address(),
                name: c.name,
                email: c.email,
            }),
        ChargeToKind::PayingCustomer => {
            let result = paying_customer::Entity::find_by_id(charge_to.id)
                .filter(paying_customer::Column::TenantId.eq(tenant_id))
                .one(db)
                .await;
            match result {
                Ok(found) => found.map(|p| PartySnapshot {
                    address: p.formatted_address(),
                    name: p.name,
                    email: p.email,
                }),
                Err(e) => {
                    warn!(paying_customer_id = %charge_to.id, error = %e, "paying customer lookup failed");
                    None
                }
            }
        }
    };

    if snapshot.is_none() {
        warn!(
            kind = %charge_to.kind,
            id = %charge_to.id,
            "charge-to party not found; booking keeps its previous details"
        );
    }
    snapshot
}

pub fn apply_charge_to(snapshot: PartySnapshot, booking: &mut container_booking::ActiveModel) {
    booking.charge_to_name = Set(Some(snapshot.name));
    booking.charge_to_email = Set(snapshot.email);
    booking.charge_to_address = Set(snapshot.address);
}

/// Inbound jobs carry the customer's name and address as the delivery point
pub fn apply_customer_to_inbound(customer: customer::Model, job: &mut inbound_job::ActiveModel) {
    job.customer_name = Set(Some(customer.name));
    job.delivery_address_line1 = Set(customer.address_line1);
    job.delivery_address_line2 = Set(customer.address_line2);
    job.delivery_city = Set(customer.city);
    job.delivery_state = Set(customer.state);
    job.delivery_postcode = Set(customer.postcode);
    job.delivery_country = Set(customer.country);
}

pub fn apply_customer_to_outbound(customer: customer::Model, job: &mut outbound_job::ActiveModel) {
    job.consignee_name = Set(Some(customer.name));
    job.consignee_email = Set(customer.email);
    job.consignee_phone = Set(customer.phone);
    job.consignee_address_line1 = Set(customer.address_line1);
    job.consignee_address_line2 = Set(customer.address_line2);
    job.consignee_city = Set(customer.city);
    job.consignee_state = Set(customer.state);
    job.consignee_postcode = Set(customer.postcode);
    job.consignee_country = Set(customer.country);
}
