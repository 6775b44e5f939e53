use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        access::{ensure_read, ensure_write, tenant_condition, write_tenant},
        AuthContext,
    },
    db::DbPool,
    entities::{put_away_stock, sku, storage_unit, warehouse},
    errors::ServiceError,
    PaginatedResponse,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateWarehouseRequest {
    pub tenant_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateWarehouseRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub code: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct StorageUnitRequest {
    pub tenant_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub length_per_su_mm: Option<Decimal>,
    pub width_per_su_mm: Option<Decimal>,
    /// Maximum stack height
    pub height_per_su_mm: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStorageUnitRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub length_per_su_mm: Option<Decimal>,
    pub width_per_su_mm: Option<Decimal>,
    pub height_per_su_mm: Option<Decimal>,
}

fn check_dimensions(values: &[Option<Decimal>]) -> Result<(), ServiceError> {
    if values.iter().flatten().any(|v| v.is_sign_negative()) {
        return Err(ServiceError::ValidationError(
            "Dimensions cannot be negative".to_string(),
        ));
    }
    Ok(())
}

/// Warehouses and the storage unit (pallet) types used in them
#[derive(Clone)]
pub struct WarehouseService {
    db_pool: Arc<DbPool>,
}

impl WarehouseService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, ctx))]
    pub async fn create_warehouse(
        &self,
        ctx: &AuthContext,
        request: CreateWarehouseRequest,
    ) -> Result<warehouse::Model, ServiceError> {
        request.validate()?;
        let tenant_id = write_tenant(ctx, request.tenant_id)?;

        let db = &*self.db_pool;
        let clash = warehouse::Entity::find()
            .filter(warehouse::Column::TenantId.eq(tenant_id))
            .filter(warehouse::Column::Code.eq(request.code.clone()))
            .count(db)
            .await?;
        if clash > 0 {
            return Err(ServiceError::Conflict(format!(
                "Warehouse code {} is already in use",
                request.code
            )));
        }

        let warehouse = warehouse::ActiveModel {
            tenant_id: Set(tenant_id),
            name: Set(request.name),
            code: Set(request.code),
            address_line1: Set(request.address_line1),
            address_line2: Set(request.address_line2),
            city: Set(request.city),
            state: Set(request.state),
            postcode: Set(request.postcode),
            country: Set(request.country),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(warehouse_id = %warehouse.id, code = %warehouse.code, "Warehouse created");
        Ok(warehouse)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_warehouse(&self, ctx: &AuthContext, id: Uuid) -> Result<warehouse::Model, ServiceError> {
        let warehouse = warehouse::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Warehouse", id))?;
        ensure_read(ctx, "Warehouse", id, warehouse.tenant_id, None)?;
        Ok(warehouse)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_warehouses(
        &self,
        ctx: &AuthContext,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<warehouse::Model>, ServiceError> {
        let query = warehouse::Entity::find()
            .filter(tenant_condition(ctx, warehouse::Column::TenantId))
            .order_by_asc(warehouse::Column::Code);
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update_warehouse(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateWarehouseRequest,
    ) -> Result<warehouse::Model, ServiceError> {
        request.validate()?;
        let warehouse = self.get_warehouse(ctx, id).await?;
        ensure_write(ctx, warehouse.tenant_id)?;

        let mut active: warehouse::ActiveModel = warehouse.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(code) = request.code {
            active.code = Set(code);
        }
        if request.address_line1.is_some() {
            active.address_line1 = Set(request.address_line1);
        }
        if request.address_line2.is_some() {
            active.address_line2 = Set(request.address_line2);
        }
        if request.city.is_some() {
            active.city = Set(request.city);
        }
        if request.state.is_some() {
            active.state = Set(request.state);
        }
        if request.postcode.is_some() {
            active.postcode = Set(request.postcode);
        }
        if request.country.is_some() {
            active.country = Set(request.country);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        Ok(active.update(&*self.db_pool).await?)
    }

    /// Warehouses holding live pallets are kept
    #[instrument(skip(self, ctx))]
    pub async fn delete_warehouse(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let warehouse = self.get_warehouse(ctx, id).await?;
        ensure_write(ctx, warehouse.tenant_id)?;

        let db = &*self.db_pool;
        let pallets = put_away_stock::Entity::find()
            .filter(put_away_stock::Column::WarehouseId.eq(id))
            .filter(put_away_stock::Column::IsDeleted.eq(false))
            .count(db)
            .await?;
        if pallets > 0 {
            return Err(ServiceError::Conflict(format!(
                "Warehouse {} still holds {} pallet(s)",
                warehouse.code, pallets
            )));
        }
        warehouse.delete(db).await?;
        info!(warehouse_id = %id, "Warehouse deleted");
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub async fn create_storage_unit(
        &self,
        ctx: &AuthContext,
        request: StorageUnitRequest,
    ) -> Result<storage_unit::Model, ServiceError> {
        request.validate()?;
        check_dimensions(&[
            request.length_per_su_mm,
            request.width_per_su_mm,
            request.height_per_su_mm,
        ])?;
        let tenant_id = write_tenant(ctx, request.tenant_id)?;

        let unit = storage_unit::ActiveModel {
            tenant_id: Set(tenant_id),
            name: Set(request.name),
            length_per_su_mm: Set(request.length_per_su_mm),
            width_per_su_mm: Set(request.width_per_su_mm),
            height_per_su_mm: Set(request.height_per_su_mm),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(storage_unit_id = %unit.id, "Storage unit created");
        Ok(unit)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_storage_unit(
        &self,
        ctx: &AuthContext,
        id: Uuid,
    ) -> Result<storage_unit::Model, ServiceError> {
        let unit = storage_unit::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("StorageUnit", id))?;
        ensure_read(ctx, "StorageUnit", id, unit.tenant_id, None)?;
        Ok(unit)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_storage_units(
        &self,
        ctx: &AuthContext,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<storage_unit::Model>, ServiceError> {
        let query = storage_unit::Entity::find()
            .filter(tenant_condition(ctx, storage_unit::Column::TenantId))
            .order_by_asc(storage_unit::Column::Name);
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    /// Dimension changes refresh the automatic figures of the SKUs stored
    /// on this unit
    #[instrument(skip(self, ctx))]
    pub async fn update_storage_unit(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateStorageUnitRequest,
    ) -> Result<storage_unit::Model, ServiceError> {
        request.validate()?;
        check_dimensions(&[
            request.length_per_su_mm,
            request.width_per_su_mm,
            request.height_per_su_mm,
        ])?;
        let unit = self.get_storage_unit(ctx, id).await?;
        ensure_write(ctx, unit.tenant_id)?;

        let dimensions_changed = [
            (request.length_per_su_mm, unit.length_per_su_mm),
            (request.width_per_su_mm, unit.width_per_su_mm),
            (request.height_per_su_mm, unit.height_per_su_mm),
        ]
        .iter()
        .any(|(requested, stored)| requested.is_some() && requested != stored);

        let mut active: storage_unit::ActiveModel = unit.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if request.length_per_su_mm.is_some() {
            active.length_per_su_mm = Set(request.length_per_su_mm);
        }
        if request.width_per_su_mm.is_some() {
            active.width_per_su_mm = Set(request.width_per_su_mm);
        }
        if request.height_per_su_mm.is_some() {
            active.height_per_su_mm = Set(request.height_per_su_mm);
        }

        let db = &*self.db_pool;
        let unit = active.update(db).await?;
        if dimensions_changed {
            let rewritten = super::skus::recalculate_for_storage_unit(db, &unit).await?;
            info!(storage_unit_id = %id, skus = rewritten, "Storage unit dimensions changed");
        }
        Ok(unit)
    }

    /// Units still referenced by SKUs are kept
    #[instrument(skip(self, ctx))]
    pub async fn delete_storage_unit(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let unit = self.get_storage_unit(ctx, id).await?;
        ensure_write(ctx, unit.tenant_id)?;

        let db = &*self.db_pool;
        let skus = sku::Entity::find()
            .filter(sku::Column::StorageUnitId.eq(id))
            .count(db)
            .await?;
        if skus > 0 {
            return Err(ServiceError::Conflict(format!(
                "Storage unit {} is used by {} SKU(s)",
                unit.name, skus
            )));
        }
        unit.delete(db).await?;
        info!(storage_unit_id = %id, "Storage unit deleted");
        Ok(())
    }
}
