use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        access::{customer_condition, ensure_read, ensure_write, tenant_condition, write_tenant},
        AuthContext,
    },
    db::DbPool,
    entities::{customer, put_away_stock, sku, storage_unit},
    errors::ServiceError,
    services::sku_metrics::{HandlingUnit, ManualFigures, SkuMetrics, StorageFootprint},
    PaginatedResponse,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSkuRequest {
    pub tenant_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub sku_code: String,
    pub description: Option<String>,
    pub storage_unit_id: Option<Uuid>,
    pub length_per_hu_mm: Option<Decimal>,
    pub width_per_hu_mm: Option<Decimal>,
    pub height_per_hu_mm: Option<Decimal>,
    pub weight_per_hu_kg: Option<Decimal>,
    /// Figures given here are stored as manual overrides
    #[serde(flatten)]
    pub figures: ManualFigures,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSkuRequest {
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub sku_code: Option<String>,
    pub description: Option<String>,
    pub storage_unit_id: Option<Uuid>,
    pub length_per_hu_mm: Option<Decimal>,
    pub width_per_hu_mm: Option<Decimal>,
    pub height_per_hu_mm: Option<Decimal>,
    pub weight_per_hu_kg: Option<Decimal>,
    /// Drops every manual override and recomputes all figures
    #[serde(default)]
    pub auto_calculate: bool,
    #[serde(flatten)]
    pub figures: ManualFigures,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SkuFilter {
    pub customer_id: Option<Uuid>,
    pub storage_unit_id: Option<Uuid>,
    /// Substring of the SKU code
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct SkuService {
    db_pool: Arc<DbPool>,
}

impl SkuService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    async fn storage_footprint(
        &self,
        tenant_id: Uuid,
        storage_unit_id: Option<Uuid>,
    ) -> Result<Option<StorageFootprint>, ServiceError> {
        let Some(id) = storage_unit_id else {
            return Ok(None);
        };
        let unit = storage_unit::Entity::find_by_id(id)
            .filter(storage_unit::Column::TenantId.eq(tenant_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("Storage unit {} does not exist", id))
            })?;
        Ok(Some(StorageFootprint::from(&unit)))
    }

    async fn check_customer(&self, tenant_id: Uuid, customer_id: Option<Uuid>) -> Result<(), ServiceError> {
        let Some(id) = customer_id else {
            return Ok(());
        };
        let found = customer::Entity::find_by_id(id)
            .filter(customer::Column::TenantId.eq(tenant_id))
            .count(&*self.db_pool)
            .await?;
        if found == 0 {
            return Err(ServiceError::ValidationError(format!(
                "Customer {} does not exist",
                id
            )));
        }
        Ok(())
    }

    async fn check_code_free(
        &self,
        tenant_id: Uuid,
        sku_code: &str,
        except: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = sku::Entity::find()
            .filter(sku::Column::TenantId.eq(tenant_id))
            .filter(sku::Column::SkuCode.eq(sku_code));
        if let Some(id) = except {
            query = query.filter(sku::Column::Id.ne(id));
        }
        if query.count(&*self.db_pool).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "SKU code {} is already in use",
                sku_code
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(sku_code = %request.sku_code))]
    pub async fn create(&self, ctx: &AuthContext, request: CreateSkuRequest) -> Result<sku::Model, ServiceError> {
        request.validate()?;
        let tenant_id = write_tenant(ctx, request.tenant_id)?;
        self.check_customer(tenant_id, request.customer_id).await?;
        self.check_code_free(tenant_id, &request.sku_code, None).await?;

        let footprint = self
            .storage_footprint(tenant_id, request.storage_unit_id)
            .await?;
        let hu = HandlingUnit {
            length_mm: request.length_per_hu_mm,
            width_mm: request.width_per_hu_mm,
            height_mm: request.height_per_hu_mm,
        };
        let metrics =
            SkuMetrics::default().recalculate(&request.figures, false, &hu, footprint.as_ref());

        let mut active = sku::ActiveModel {
            tenant_id: Set(tenant_id),
            customer_id: Set(request.customer_id),
            sku_code: Set(request.sku_code),
            description: Set(request.description),
            storage_unit_id: Set(request.storage_unit_id),
            length_per_hu_mm: Set(request.length_per_hu_mm),
            width_per_hu_mm: Set(request.width_per_hu_mm),
            height_per_hu_mm: Set(request.height_per_hu_mm),
            weight_per_hu_kg: Set(request.weight_per_hu_kg),
            ..Default::default()
        };
        metrics.write_to(&mut active);
        let sku = active.insert(&*self.db_pool).await?;

        info!(sku_id = %sku.id, "SKU created");
        Ok(sku)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> Result<sku::Model, ServiceError> {
        let sku = sku::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Sku", id))?;
        ensure_read(ctx, "Sku", id, sku.tenant_id, sku.customer_id)?;
        Ok(sku)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: SkuFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<sku::Model>, ServiceError> {
        let mut query = sku::Entity::find()
            .filter(tenant_condition(ctx, sku::Column::TenantId))
            .filter(customer_condition(ctx, sku::Column::CustomerId))
            .order_by_asc(sku::Column::SkuCode);
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(sku::Column::CustomerId.eq(customer_id));
        }
        if let Some(storage_unit_id) = filter.storage_unit_id {
            query = query.filter(sku::Column::StorageUnitId.eq(storage_unit_id));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(sku::Column::SkuCode.contains(search.trim()));
        }
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    /// Applies the edit and recomputes the automatic figures from the
    /// resulting dimensions and storage unit
    #[instrument(skip(self, ctx))]
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateSkuRequest,
    ) -> Result<sku::Model, ServiceError> {
        request.validate()?;
        let sku = self.get(ctx, id).await?;
        ensure_write(ctx, sku.tenant_id)?;

        if request.customer_id.is_some() {
            self.check_customer(sku.tenant_id, request.customer_id).await?;
        }
        if let Some(code) = &request.sku_code {
            self.check_code_free(sku.tenant_id, code, Some(id)).await?;
        }

        let storage_unit_id = request.storage_unit_id.or(sku.storage_unit_id);
        let footprint = self.storage_footprint(sku.tenant_id, storage_unit_id).await?;
        let hu = HandlingUnit {
            length_mm: request.length_per_hu_mm.or(sku.length_per_hu_mm),
            width_mm: request.width_per_hu_mm.or(sku.width_per_hu_mm),
            height_mm: request.height_per_hu_mm.or(sku.height_per_hu_mm),
        };
        let metrics = SkuMetrics::from(&sku).recalculate(
            &request.figures,
            request.auto_calculate,
            &hu,
            footprint.as_ref(),
        );

        let mut active: sku::ActiveModel = sku.into();
        if request.customer_id.is_some() {
            active.customer_id = Set(request.customer_id);
        }
        if let Some(code) = request.sku_code {
            active.sku_code = Set(code);
        }
        if request.description.is_some() {
            active.description = Set(request.description);
        }
        active.storage_unit_id = Set(storage_unit_id);
        active.length_per_hu_mm = Set(hu.length_mm);
        active.width_per_hu_mm = Set(hu.width_mm);
        active.height_per_hu_mm = Set(hu.height_mm);
        if request.weight_per_hu_kg.is_some() {
            active.weight_per_hu_kg = Set(request.weight_per_hu_kg);
        }
        metrics.write_to(&mut active);

        let sku = active.update(&*self.db_pool).await?;
        info!(sku_id = %id, auto_calculate = request.auto_calculate, "SKU updated");
        Ok(sku)
    }

    /// SKUs with pallets on hand are kept
    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let sku = self.get(ctx, id).await?;
        ensure_write(ctx, sku.tenant_id)?;

        let db = &*self.db_pool;
        let pallets = put_away_stock::Entity::find()
            .filter(put_away_stock::Column::SkuId.eq(id))
            .filter(put_away_stock::Column::IsDeleted.eq(false))
            .count(db)
            .await?;
        if pallets > 0 {
            return Err(ServiceError::Conflict(format!(
                "SKU {} still has {} pallet(s) in stock",
                sku.sku_code, pallets
            )));
        }

        sku.delete(db).await?;
        info!(sku_id = %id, "SKU deleted");
        Ok(())
    }
}

/// Recomputes the automatic figures of every SKU stored on `unit` after the
/// unit's dimensions changed. Returns how many SKUs were rewritten.
pub(crate) async fn recalculate_for_storage_unit(
    db: &DbPool,
    unit: &storage_unit::Model,
) -> Result<u64, ServiceError> {
    let footprint = StorageFootprint::from(unit);
    let skus = sku::Entity::find()
        .filter(sku::Column::StorageUnitId.eq(unit.id))
        .all(db)
        .await?;

    let mut rewritten = 0;
    for sku in skus {
        let current = SkuMetrics::from(&sku);
        let next = current.recalculate(
            &ManualFigures::default(),
            false,
            &HandlingUnit::from(&sku),
            Some(&footprint),
        );
        if next == current {
            continue;
        }
        let mut active: sku::ActiveModel = sku.into();
        next.write_to(&mut active);
        active.update(db).await?;
        rewritten += 1;
    }

    debug!(storage_unit_id = %unit.id, rewritten, "SKU figures refreshed for storage unit");
    Ok(rewritten)
}
