use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Direction of a container movement
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobType {
    Import,
    Export,
}

/// Booking status; import and export bookings use disjoint ladders
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookingStatus {
    // import
    Expecting,
    PartiallyReceived,
    Received,
    PartiallyPutAway,
    PutAway,
    // export
    Allocated,
    PartiallyPicked,
    ReadyToDispatch,
    PartiallyDispatched,
    Dispatched,
    // terminal
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn initial(job_type: JobType) -> Self {
        match job_type {
            JobType::Import => BookingStatus::Expecting,
            JobType::Export => BookingStatus::Allocated,
        }
    }

    /// Terminal statuses are never overwritten by recalculation
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

/// Kind of party a booking is charged to
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ChargeToKind {
    Customer,
    PayingCustomer,
}

/// Polymorphic reference to the party a booking is charged to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChargeTo {
    pub kind: ChargeToKind,
    pub id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "container_bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub job_type: String,
    pub booking_code: String,
    pub status: String,
    pub charge_to_kind: Option<String>,
    pub charge_to_id: Option<Uuid>,
    pub charge_to_name: Option<String>,
    pub charge_to_email: Option<String>,
    pub charge_to_address: Option<String>,
    pub vessel: Option<String>,
    pub voyage: Option<String>,
    pub eta: Option<DateTime<Utc>>,
    pub etd: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn job_type(&self) -> Option<JobType> {
        self.job_type.parse().ok()
    }

    pub fn booking_status(&self) -> Option<BookingStatus> {
        self.status.parse().ok()
    }

    pub fn charge_to(&self) -> Option<ChargeTo> {
        let kind = self.charge_to_kind.as_deref()?.parse().ok()?;
        Some(ChargeTo {
            kind,
            id: self.charge_to_id?,
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::container_detail::Entity")]
    Containers,
}

impl Related<super::container_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Containers.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
        }
        active_model.updated_at = Set(now);

        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_to_kind_uses_camel_case_on_the_wire_and_in_storage() {
        assert_eq!(ChargeToKind::PayingCustomer.as_ref(), "payingCustomer");
        assert_eq!(
            serde_json::to_value(ChargeToKind::PayingCustomer).unwrap(),
            serde_json::json!("payingCustomer")
        );
        assert_eq!(
            "customer".parse::<ChargeToKind>().unwrap(),
            ChargeToKind::Customer
        );
    }

    #[test]
    fn booking_status_round_trips_snake_case() {
        assert_eq!(BookingStatus::PartiallyPutAway.to_string(), "partially_put_away");
        assert_eq!(
            "ready_to_dispatch".parse::<BookingStatus>().unwrap(),
            BookingStatus::ReadyToDispatch
        );
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Dispatched.is_terminal());
    }
}
