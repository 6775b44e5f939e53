use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        access::{ensure_read, ensure_write, tenant_condition},
        AuthContext,
    },
    db::DbPool,
    entities::{container_detail, pickup_record, JobType, PickupStatus},
    errors::ServiceError,
    events::{Event, EventBus},
    PaginatedResponse,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePickupRequest {
    pub container_detail_id: Uuid,
    pub outbound_job_id: Option<Uuid>,
    /// Defaults to `draft`
    pub status: Option<PickupStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePickupRequest {
    pub outbound_job_id: Option<Uuid>,
    pub status: Option<PickupStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PickupFilter {
    pub container_detail_id: Option<Uuid>,
    pub status: Option<PickupStatus>,
}

/// Pickup records of export containers. A completed pickup lets a fully
/// picked container move to `picked_up`.
#[derive(Clone)]
pub struct PickupRecordService {
    db_pool: Arc<DbPool>,
    events: Arc<EventBus>,
}

impl PickupRecordService {
    pub fn new(db_pool: Arc<DbPool>, events: Arc<EventBus>) -> Self {
        Self { db_pool, events }
    }

    async fn pickup_written(&self, record: &pickup_record::Model) {
        self.events
            .publish(Event::PickupCompleted {
                tenant_id: record.tenant_id,
                container_detail_id: record.container_detail_id,
                pickup_record_id: record.id,
            })
            .await;
    }

    #[instrument(skip(self, ctx))]
    pub async fn create(
        &self,
        ctx: &AuthContext,
        request: CreatePickupRequest,
    ) -> Result<pickup_record::Model, ServiceError> {
        request.validate()?;
        let container = container_detail::Entity::find_by_id(request.container_detail_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Container {} does not exist",
                    request.container_detail_id
                ))
            })?;
        ensure_write(ctx, container.tenant_id)?;
        if container.job_type() != Some(JobType::Export) {
            return Err(ServiceError::InvalidOperation(
                "Pickups can only be recorded for export containers".to_string(),
            ));
        }

        let status = request.status.unwrap_or(PickupStatus::Draft);
        let record = pickup_record::ActiveModel {
            tenant_id: Set(container.tenant_id),
            container_detail_id: Set(container.id),
            outbound_job_id: Set(request.outbound_job_id),
            status: Set(status.to_string()),
            completed_at: Set((status == PickupStatus::Completed).then(Utc::now)),
            notes: Set(request.notes),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(pickup_record_id = %record.id, status = %status, "Pickup recorded");
        if status == PickupStatus::Completed {
            self.pickup_written(&record).await;
        }
        Ok(record)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> Result<pickup_record::Model, ServiceError> {
        let record = pickup_record::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("PickupRecord", id))?;
        ensure_read(ctx, "PickupRecord", id, record.tenant_id, None)?;
        Ok(record)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: PickupFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<pickup_record::Model>, ServiceError> {
        let mut query = pickup_record::Entity::find()
            .filter(tenant_condition(ctx, pickup_record::Column::TenantId))
            .order_by_desc(pickup_record::Column::CreatedAt);
        if let Some(container_detail_id) = filter.container_detail_id {
            query = query.filter(pickup_record::Column::ContainerDetailId.eq(container_detail_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(pickup_record::Column::Status.eq(status.to_string()));
        }
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdatePickupRequest,
    ) -> Result<pickup_record::Model, ServiceError> {
        request.validate()?;
        let record = self.get(ctx, id).await?;
        ensure_write(ctx, record.tenant_id)?;

        let was_completed = record.status == PickupStatus::Completed.as_ref();
        let mut active: pickup_record::ActiveModel = record.into();
        if request.outbound_job_id.is_some() {
            active.outbound_job_id = Set(request.outbound_job_id);
        }
        if request.notes.is_some() {
            active.notes = Set(request.notes);
        }
        if let Some(status) = request.status {
            active.status = Set(status.to_string());
            match status {
                PickupStatus::Completed if !was_completed => active.completed_at = Set(Some(Utc::now())),
                PickupStatus::Draft => active.completed_at = Set(None),
                PickupStatus::Completed => {}
            }
        }
        let record = active.update(&*self.db_pool).await?;

        let is_completed = record.status == PickupStatus::Completed.as_ref();
        if was_completed != is_completed {
            self.pickup_written(&record).await;
        }
        Ok(record)
    }

    /// Shorthand for setting the status to `completed`
    #[instrument(skip(self, ctx))]
    pub async fn complete(&self, ctx: &AuthContext, id: Uuid) -> Result<pickup_record::Model, ServiceError> {
        self.update(
            ctx,
            id,
            UpdatePickupRequest {
                status: Some(PickupStatus::Completed),
                ..Default::default()
            },
        )
        .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let record = self.get(ctx, id).await?;
        ensure_write(ctx, record.tenant_id)?;

        let removed = record.clone();
        record.delete(&*self.db_pool).await?;
        info!(pickup_record_id = %id, "Pickup record deleted");
        if removed.status == PickupStatus::Completed.as_ref() {
            // the container may no longer qualify as picked up
            self.pickup_written(&removed).await;
        }
        Ok(())
    }
}
