use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
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
    entities::{allocation_line, container_detail, sku, stock_allocation, JobType},
    errors::ServiceError,
    events::{Event, EventBus},
    PaginatedResponse,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AllocationLineRequest {
    pub sku_id: Uuid,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub expected_qty: i32,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub received_qty: i32,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub allocated_qty: i32,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub picked_qty: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAllocationLineRequest {
    #[validate(range(min = 0))]
    pub expected_qty: Option<i32>,
    #[validate(range(min = 0))]
    pub received_qty: Option<i32>,
    #[validate(range(min = 0))]
    pub allocated_qty: Option<i32>,
    #[validate(range(min = 0))]
    pub picked_qty: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAllocationRequest {
    pub container_detail_id: Uuid,
    pub inbound_job_id: Option<Uuid>,
    pub outbound_job_id: Option<Uuid>,
    #[serde(default)]
    #[validate]
    pub lines: Vec<AllocationLineRequest>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAllocationRequest {
    pub inbound_job_id: Option<Uuid>,
    pub outbound_job_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AllocationFilter {
    pub container_detail_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationDetail {
    #[serde(flatten)]
    pub allocation: stock_allocation::Model,
    pub lines: Vec<allocation_line::Model>,
}

/// Import allocations reference inbound jobs, export allocations outbound jobs
fn check_job_refs(
    job_type: JobType,
    inbound_job_id: Option<Uuid>,
    outbound_job_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    match job_type {
        JobType::Import if outbound_job_id.is_some() => Err(ServiceError::ValidationError(
            "Import allocations cannot reference an outbound job".to_string(),
        )),
        JobType::Export if inbound_job_id.is_some() => Err(ServiceError::ValidationError(
            "Export allocations cannot reference an inbound job".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Stock allocations link a container to the SKUs and quantities it carries.
/// Every line change publishes `AllocationLinesChanged` so the container
/// status follows.
#[derive(Clone)]
pub struct StockAllocationService {
    db_pool: Arc<DbPool>,
    events: Arc<EventBus>,
}

impl StockAllocationService {
    pub fn new(db_pool: Arc<DbPool>, events: Arc<EventBus>) -> Self {
        Self { db_pool, events }
    }

    async fn lines_changed(&self, allocation: &stock_allocation::Model) {
        self.events
            .publish(Event::AllocationLinesChanged {
                tenant_id: allocation.tenant_id,
                container_detail_id: allocation.container_detail_id,
            })
            .await;
    }

    async fn check_sku(&self, tenant_id: Uuid, sku_id: Uuid) -> Result<(), ServiceError> {
        sku::Entity::find_by_id(sku_id)
            .filter(sku::Column::TenantId.eq(tenant_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::ValidationError(format!("SKU {} does not exist", sku_id)))?;
        Ok(())
    }

    async fn insert_line(
        &self,
        allocation: &stock_allocation::Model,
        line: AllocationLineRequest,
    ) -> Result<allocation_line::Model, ServiceError> {
        self.check_sku(allocation.tenant_id, line.sku_id).await?;
        Ok(allocation_line::ActiveModel {
            tenant_id: Set(allocation.tenant_id),
            stock_allocation_id: Set(allocation.id),
            sku_id: Set(line.sku_id),
            expected_qty: Set(line.expected_qty),
            received_qty: Set(line.received_qty),
            allocated_qty: Set(line.allocated_qty),
            picked_qty: Set(line.picked_qty),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?)
    }

    #[instrument(skip(self, ctx, request), fields(container_detail_id = %request.container_detail_id))]
    pub async fn create(
        &self,
        ctx: &AuthContext,
        request: CreateAllocationRequest,
    ) -> Result<AllocationDetail, ServiceError> {
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

        let job_type = container.job_type().ok_or_else(|| {
            ServiceError::InternalError(format!("container {} has unknown job type", container.id))
        })?;
        check_job_refs(job_type, request.inbound_job_id, request.outbound_job_id)?;

        let allocation = stock_allocation::ActiveModel {
            tenant_id: Set(container.tenant_id),
            container_detail_id: Set(container.id),
            job_type: Set(job_type.to_string()),
            inbound_job_id: Set(request.inbound_job_id),
            outbound_job_id: Set(request.outbound_job_id),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        let mut lines = Vec::with_capacity(request.lines.len());
        for line in request.lines {
            lines.push(self.insert_line(&allocation, line).await?);
        }

        info!(
            stock_allocation_id = %allocation.id,
            lines = lines.len(),
            "Stock allocation created"
        );
        if !lines.is_empty() {
            self.lines_changed(&allocation).await;
        }
        Ok(AllocationDetail { allocation, lines })
    }

    async fn find(&self, ctx: &AuthContext, id: Uuid) -> Result<stock_allocation::Model, ServiceError> {
        let allocation = stock_allocation::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("StockAllocation", id))?;
        ensure_read(ctx, "StockAllocation", id, allocation.tenant_id, None)?;
        Ok(allocation)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> Result<AllocationDetail, ServiceError> {
        let allocation = self.find(ctx, id).await?;
        let lines = allocation
            .find_related(allocation_line::Entity)
            .order_by_asc(allocation_line::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(AllocationDetail { allocation, lines })
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: AllocationFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<stock_allocation::Model>, ServiceError> {
        let mut query = stock_allocation::Entity::find()
            .filter(tenant_condition(ctx, stock_allocation::Column::TenantId))
            .order_by_desc(stock_allocation::Column::CreatedAt);
        if let Some(container_detail_id) = filter.container_detail_id {
            query = query.filter(stock_allocation::Column::ContainerDetailId.eq(container_detail_id));
        }
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateAllocationRequest,
    ) -> Result<stock_allocation::Model, ServiceError> {
        let allocation = self.find(ctx, id).await?;
        ensure_write(ctx, allocation.tenant_id)?;

        let job_type = allocation.job_type.parse::<JobType>().map_err(|_| {
            ServiceError::InternalError(format!("allocation {} has unknown job type", id))
        })?;
        check_job_refs(job_type, request.inbound_job_id, request.outbound_job_id)?;

        let mut active: stock_allocation::ActiveModel = allocation.into();
        if request.inbound_job_id.is_some() {
            active.inbound_job_id = Set(request.inbound_job_id);
        }
        if request.outbound_job_id.is_some() {
            active.outbound_job_id = Set(request.outbound_job_id);
        }
        Ok(active.update(&*self.db_pool).await?)
    }

    /// Removes the allocation and its lines
    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let allocation = self.find(ctx, id).await?;
        ensure_write(ctx, allocation.tenant_id)?;

        let removed = allocation.clone();
        allocation.delete(&*self.db_pool).await?;
        info!(stock_allocation_id = %id, "Stock allocation deleted");
        self.lines_changed(&removed).await;
        Ok(())
    }

    #[instrument(skip(self, ctx, request))]
    pub async fn add_line(
        &self,
        ctx: &AuthContext,
        allocation_id: Uuid,
        request: AllocationLineRequest,
    ) -> Result<allocation_line::Model, ServiceError> {
        request.validate()?;
        let allocation = self.find(ctx, allocation_id).await?;
        ensure_write(ctx, allocation.tenant_id)?;

        let line = self.insert_line(&allocation, request).await?;
        self.lines_changed(&allocation).await;
        Ok(line)
    }

    async fn find_line(
        &self,
        ctx: &AuthContext,
        line_id: Uuid,
    ) -> Result<(allocation_line::Model, stock_allocation::Model), ServiceError> {
        let line = allocation_line::Entity::find_by_id(line_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("AllocationLine", line_id))?;
        let allocation = self.find(ctx, line.stock_allocation_id).await?;
        ensure_write(ctx, allocation.tenant_id)?;
        Ok((line, allocation))
    }

    #[instrument(skip(self, ctx))]
    pub async fn update_line(
        &self,
        ctx: &AuthContext,
        line_id: Uuid,
        request: UpdateAllocationLineRequest,
    ) -> Result<allocation_line::Model, ServiceError> {
        request.validate()?;
        let (line, allocation) = self.find_line(ctx, line_id).await?;

        let mut active: allocation_line::ActiveModel = line.into();
        if let Some(qty) = request.expected_qty {
            active.expected_qty = Set(qty);
        }
        if let Some(qty) = request.received_qty {
            active.received_qty = Set(qty);
        }
        if let Some(qty) = request.allocated_qty {
            active.allocated_qty = Set(qty);
        }
        if let Some(qty) = request.picked_qty {
            active.picked_qty = Set(qty);
        }
        let line = active.update(&*self.db_pool).await?;

        self.lines_changed(&allocation).await;
        Ok(line)
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_line(&self, ctx: &AuthContext, line_id: Uuid) -> Result<(), ServiceError> {
        let (line, allocation) = self.find_line(ctx, line_id).await?;
        line.delete(&*self.db_pool).await?;
        self.lines_changed(&allocation).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn job_refs_must_match_the_container_direction() {
        let job = Some(Uuid::new_v4());
        assert!(check_job_refs(JobType::Import, job, None).is_ok());
        assert!(check_job_refs(JobType::Export, None, job).is_ok());
        assert_matches!(
            check_job_refs(JobType::Import, None, job),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            check_job_refs(JobType::Export, job, None),
            Err(ServiceError::ValidationError(_))
        );
    }
}
