use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stock keeping unit. Dimensions are per handling unit (case) in millimetres.
///
/// Each derived packing figure carries an `*_auto` marker: while it is true the
/// figure is recomputed from the dimensions on every save, once a caller
/// supplies the figure explicitly the marker is cleared and the value is kept.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "skus")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub sku_code: String,
    pub description: Option<String>,
    pub storage_unit_id: Option<Uuid>,
    pub length_per_hu_mm: Option<Decimal>,
    pub width_per_hu_mm: Option<Decimal>,
    pub height_per_hu_mm: Option<Decimal>,
    pub weight_per_hu_kg: Option<Decimal>,
    pub expected_cubic_per_hu: Option<Decimal>,
    pub expected_cubic_per_hu_auto: bool,
    pub sqm_per_su: Option<Decimal>,
    pub sqm_per_su_auto: bool,
    pub cases_per_layer: Option<i32>,
    pub cases_per_layer_auto: bool,
    pub layers_per_pallet: Option<i32>,
    pub layers_per_pallet_auto: bool,
    pub cases_per_pallet: Option<i32>,
    pub cases_per_pallet_auto: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::storage_unit::Entity",
        from = "Column::StorageUnitId",
        to = "super::storage_unit::Column::Id"
    )]
    StorageUnit,
    #[sea_orm(has_many = "super::put_away_stock::Entity")]
    PutAwayStock,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::storage_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StorageUnit.def()
    }
}

impl Related<super::put_away_stock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PutAwayStock.def()
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
