use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product line of a stock allocation
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "allocation_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub stock_allocation_id: Uuid,
    pub sku_id: Uuid,
    pub expected_qty: i32,
    pub received_qty: i32,
    pub allocated_qty: i32,
    pub picked_qty: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_allocation::Entity",
        from = "Column::StockAllocationId",
        to = "super::stock_allocation::Column::Id",
        on_delete = "Cascade"
    )]
    StockAllocation,
}

impl Related<super::stock_allocation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockAllocation.def()
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
