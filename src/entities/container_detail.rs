use super::container_booking::JobType;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Container status. Import containers move expecting -> received -> put_away,
/// export containers move allocated -> picked_up -> dispatched.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContainerStatus {
    Expecting,
    Received,
    PutAway,
    Allocated,
    PickedUp,
    Dispatched,
}

impl ContainerStatus {
    pub fn initial(job_type: JobType) -> Self {
        match job_type {
            JobType::Import => ContainerStatus::Expecting,
            JobType::Export => ContainerStatus::Allocated,
        }
    }

    pub fn belongs_to(&self, job_type: JobType) -> bool {
        match job_type {
            JobType::Import => matches!(
                self,
                ContainerStatus::Expecting | ContainerStatus::Received | ContainerStatus::PutAway
            ),
            JobType::Export => matches!(
                self,
                ContainerStatus::Allocated | ContainerStatus::PickedUp | ContainerStatus::Dispatched
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "container_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub booking_id: Uuid,
    pub job_type: String,
    pub container_number: String,
    pub container_size: Option<String>,
    /// Position inside the booking
    pub sequence: i32,
    pub status: String,
    pub warehouse_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn job_type(&self) -> Option<JobType> {
        self.job_type.parse().ok()
    }

    pub fn container_status(&self) -> Option<ContainerStatus> {
        self.status.parse().ok()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::container_booking::Entity",
        from = "Column::BookingId",
        to = "super::container_booking::Column::Id",
        on_delete = "Cascade"
    )]
    Booking,
    #[sea_orm(has_many = "super::stock_allocation::Entity")]
    StockAllocations,
}

impl Related<super::container_booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl Related<super::stock_allocation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockAllocations.def()
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
