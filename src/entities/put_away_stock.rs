use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Allocation state of a pallet (LPN)
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
pub enum AllocationStatus {
    Available,
    Reserved,
    Allocated,
    Picked,
    Dispatched,
}

impl AllocationStatus {
    /// Counts towards an outbound line's allocated quantity
    pub fn counts_as_allocated(&self) -> bool {
        matches!(
            self,
            AllocationStatus::Allocated | AllocationStatus::Picked | AllocationStatus::Dispatched
        )
    }

    /// Counts towards an outbound line's picked quantity
    pub fn counts_as_picked(&self) -> bool {
        matches!(self, AllocationStatus::Picked | AllocationStatus::Dispatched)
    }
}

/// A put-away pallet, identified by its licence plate number
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "put_away_stock")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub lpn_number: String,
    pub warehouse_id: Option<Uuid>,
    pub location: Option<String>,
    pub sku_id: Option<Uuid>,
    pub qty: i32,
    pub inbound_job_id: Option<Uuid>,
    pub inbound_product_line_id: Option<Uuid>,
    pub container_detail_id: Option<Uuid>,
    pub outbound_job_id: Option<Uuid>,
    pub outbound_product_line_id: Option<Uuid>,
    pub allocation_status: String,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn allocation_status(&self) -> Option<AllocationStatus> {
        self.allocation_status.parse().ok()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sku::Entity",
        from = "Column::SkuId",
        to = "super::sku::Column::Id"
    )]
    Sku,
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,
}

impl Related<super::sku::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sku.def()
    }
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
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
