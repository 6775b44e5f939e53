use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of an outbound inventory job
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
pub enum OutboundJobStatus {
    Draft,
    Allocated,
    Picked,
    Dispatched,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "outbound_jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub job_code: String,
    pub customer_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub status: String,
    pub required_date: Option<DateTime<Utc>>,
    pub consignee_name: Option<String>,
    pub consignee_email: Option<String>,
    pub consignee_phone: Option<String>,
    pub consignee_address_line1: Option<String>,
    pub consignee_address_line2: Option<String>,
    pub consignee_city: Option<String>,
    pub consignee_state: Option<String>,
    pub consignee_postcode: Option<String>,
    pub consignee_country: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Code used when reporting this job to callers, falling back to the id
    pub fn display_code(&self) -> String {
        if self.job_code.trim().is_empty() {
            self.id.to_string()
        } else {
            self.job_code.clone()
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::outbound_product_line::Entity")]
    ProductLines,
}

impl Related<super::outbound_product_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductLines.def()
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
