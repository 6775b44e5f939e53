use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        access::{ensure_read, ensure_write, tenant_condition, write_tenant},
        AuthContext,
    },
    db::DbPool,
    entities::{fleet_asset, FleetAssetStatus, FleetAssetType},
    errors::ServiceError,
    PaginatedResponse,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFleetAssetRequest {
    pub tenant_id: Option<Uuid>,
    pub asset_type: FleetAssetType,
    #[validate(length(min = 1, max = 32))]
    pub registration: String,
    pub name: Option<String>,
    pub status: Option<FleetAssetStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFleetAssetRequest {
    pub asset_type: Option<FleetAssetType>,
    #[validate(length(min = 1, max = 32))]
    pub registration: Option<String>,
    pub name: Option<String>,
    pub status: Option<FleetAssetStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FleetFilter {
    pub asset_type: Option<FleetAssetType>,
    pub status: Option<FleetAssetStatus>,
}

fn normalize_registration(registration: &str) -> String {
    registration.trim().to_ascii_uppercase()
}

#[derive(Clone)]
pub struct FleetService {
    db_pool: Arc<DbPool>,
}

impl FleetService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    async fn check_registration_free(
        &self,
        tenant_id: Uuid,
        registration: &str,
        except: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = fleet_asset::Entity::find()
            .filter(fleet_asset::Column::TenantId.eq(tenant_id))
            .filter(fleet_asset::Column::Registration.eq(registration));
        if let Some(id) = except {
            query = query.filter(fleet_asset::Column::Id.ne(id));
        }
        if query.count(&*self.db_pool).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "Registration {} is already in the fleet",
                registration
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub async fn create(
        &self,
        ctx: &AuthContext,
        request: CreateFleetAssetRequest,
    ) -> Result<fleet_asset::Model, ServiceError> {
        request.validate()?;
        let tenant_id = write_tenant(ctx, request.tenant_id)?;
        let registration = normalize_registration(&request.registration);
        self.check_registration_free(tenant_id, &registration, None).await?;

        let asset = fleet_asset::ActiveModel {
            tenant_id: Set(tenant_id),
            asset_type: Set(request.asset_type.to_string()),
            registration: Set(registration),
            name: Set(request.name),
            status: Set(request.status.unwrap_or(FleetAssetStatus::Active).to_string()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(fleet_asset_id = %asset.id, asset_type = %asset.asset_type, "Fleet asset added");
        Ok(asset)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> Result<fleet_asset::Model, ServiceError> {
        let asset = fleet_asset::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("FleetAsset", id))?;
        ensure_read(ctx, "FleetAsset", id, asset.tenant_id, None)?;
        Ok(asset)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: FleetFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<fleet_asset::Model>, ServiceError> {
        let mut query = fleet_asset::Entity::find()
            .filter(tenant_condition(ctx, fleet_asset::Column::TenantId))
            .order_by_asc(fleet_asset::Column::Registration);
        if let Some(asset_type) = filter.asset_type {
            query = query.filter(fleet_asset::Column::AssetType.eq(asset_type.to_string()));
        }
        if let Some(status) = filter.status {
            query = query.filter(fleet_asset::Column::Status.eq(status.to_string()));
        }
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateFleetAssetRequest,
    ) -> Result<fleet_asset::Model, ServiceError> {
        request.validate()?;
        let asset = self.get(ctx, id).await?;
        ensure_write(ctx, asset.tenant_id)?;

        let registration = request.registration.as_deref().map(normalize_registration);
        if let Some(registration) = &registration {
            self.check_registration_free(asset.tenant_id, registration, Some(id))
                .await?;
        }

        let mut active: fleet_asset::ActiveModel = asset.into();
        if let Some(asset_type) = request.asset_type {
            active.asset_type = Set(asset_type.to_string());
        }
        if let Some(registration) = registration {
            active.registration = Set(registration);
        }
        if request.name.is_some() {
            active.name = Set(request.name);
        }
        if let Some(status) = request.status {
            active.status = Set(status.to_string());
        }
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let asset = self.get(ctx, id).await?;
        ensure_write(ctx, asset.tenant_id)?;
        asset.delete(&*self.db_pool).await?;
        info!(fleet_asset_id = %id, "Fleet asset removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_registration;

    #[test]
    fn registrations_are_stored_upper_case() {
        assert_eq!(normalize_registration("  abc-123 "), "ABC-123");
    }
}
