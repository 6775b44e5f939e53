use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stock allocated against one container; the quantities live on its lines
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub container_detail_id: Uuid,
    pub job_type: String,
    pub inbound_job_id: Option<Uuid>,
    pub outbound_job_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::container_detail::Entity",
        from = "Column::ContainerDetailId",
        to = "super::container_detail::Column::Id",
        on_delete = "Cascade"
    )]
    ContainerDetail,
    #[sea_orm(has_many = "super::allocation_line::Entity")]
    Lines,
}

impl Related<super::container_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContainerDetail.def()
    }
}

impl Related<super::allocation_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
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
