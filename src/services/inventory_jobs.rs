use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        access::{customer_condition, ensure_read, ensure_write, tenant_condition, write_tenant},
        AuthContext,
    },
    db::DbPool,
    entities::{
        inbound_job, inbound_product_line, outbound_job, outbound_product_line, put_away_stock,
        InboundJobStatus, OutboundJobStatus,
    },
    errors::ServiceError,
    services::denormalize,
    PaginatedResponse,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct InboundLineRequest {
    pub sku_id: Uuid,
    #[validate(range(min = 0))]
    pub expected_qty: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub received_qty: i32,
    pub batch_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateInboundLineRequest {
    #[validate(range(min = 0))]
    pub expected_qty: Option<i32>,
    #[validate(range(min = 0))]
    pub received_qty: Option<i32>,
    pub batch_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInboundJobRequest {
    pub tenant_id: Option<Uuid>,
    #[validate(length(min = 1, max = 64))]
    pub job_code: String,
    pub customer_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub expected_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[serde(default)]
    #[validate]
    pub lines: Vec<InboundLineRequest>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateInboundJobRequest {
    pub customer_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub status: Option<InboundJobStatus>,
    pub expected_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OutboundLineRequest {
    pub sku_id: Uuid,
    #[validate(range(min = 0))]
    pub required_qty: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOutboundJobRequest {
    pub tenant_id: Option<Uuid>,
    #[validate(length(min = 1, max = 64))]
    pub job_code: String,
    pub customer_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub required_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[serde(default)]
    #[validate]
    pub lines: Vec<OutboundLineRequest>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOutboundJobRequest {
    pub customer_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub status: Option<OutboundJobStatus>,
    pub required_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JobFilter {
    pub customer_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub status: Option<String>,
}

/// An inbound job with its product lines
#[derive(Debug, Clone, Serialize)]
pub struct InboundJobDetail {
    #[serde(flatten)]
    pub job: inbound_job::Model,
    pub lines: Vec<inbound_product_line::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutboundJobDetail {
    #[serde(flatten)]
    pub job: outbound_job::Model,
    pub lines: Vec<outbound_product_line::Model>,
}

/// Inbound (receipt) and outbound (dispatch) inventory jobs
#[derive(Clone)]
pub struct InventoryJobService {
    db_pool: Arc<DbPool>,
}

impl InventoryJobService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    fn duplicate_code(code: &str) -> ServiceError {
        ServiceError::Conflict(format!("Job code {} is already in use", code))
    }

    #[instrument(skip(self, ctx, request), fields(job_code = %request.job_code))]
    pub async fn create_inbound(
        &self,
        ctx: &AuthContext,
        request: CreateInboundJobRequest,
    ) -> Result<InboundJobDetail, ServiceError> {
        request.validate()?;
        let tenant_id = write_tenant(ctx, request.tenant_id)?;
        let db = &*self.db_pool;
        let clash = inbound_job::Entity::find()
            .filter(inbound_job::Column::TenantId.eq(tenant_id))
            .filter(inbound_job::Column::JobCode.eq(request.job_code.clone()))
            .count(db)
            .await?;
        if clash > 0 {
            return Err(Self::duplicate_code(&request.job_code));
        }

        let mut active = inbound_job::ActiveModel {
            tenant_id: Set(tenant_id),
            job_code: Set(request.job_code),
            customer_id: Set(request.customer_id),
            warehouse_id: Set(request.warehouse_id),
            status: Set(InboundJobStatus::Expected.to_string()),
            expected_date: Set(request.expected_date),
            notes: Set(request.notes),
            ..Default::default()
        };
        if let Some(customer_id) = request.customer_id {
            if let Some(customer) = denormalize::find_customer(db, tenant_id, customer_id).await {
                denormalize::apply_customer_to_inbound(customer, &mut active);
            }
        }
        let job = active.insert(db).await?;

        let mut lines = Vec::with_capacity(request.lines.len());
        for line in request.lines {
            lines.push(self.insert_inbound_line(&job, line).await?);
        }

        info!(inbound_job_id = %job.id, lines = lines.len(), "Inbound job created");
        Ok(InboundJobDetail { job, lines })
    }

    async fn insert_inbound_line(
        &self,
        job: &inbound_job::Model,
        line: InboundLineRequest,
    ) -> Result<inbound_product_line::Model, ServiceError> {
        Ok(inbound_product_line::ActiveModel {
            tenant_id: Set(job.tenant_id),
            inbound_job_id: Set(job.id),
            sku_id: Set(line.sku_id),
            expected_qty: Set(line.expected_qty),
            received_qty: Set(line.received_qty),
            put_away_qty: Set(0),
            batch_number: Set(line.batch_number),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?)
    }

    async fn find_inbound(&self, ctx: &AuthContext, id: Uuid) -> Result<inbound_job::Model, ServiceError> {
        let job = inbound_job::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("InboundJob", id))?;
        ensure_read(ctx, "InboundJob", id, job.tenant_id, job.customer_id)?;
        Ok(job)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_inbound(&self, ctx: &AuthContext, id: Uuid) -> Result<InboundJobDetail, ServiceError> {
        let job = self.find_inbound(ctx, id).await?;
        let lines = job
            .find_related(inbound_product_line::Entity)
            .order_by_asc(inbound_product_line::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(InboundJobDetail { job, lines })
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_inbound(
        &self,
        ctx: &AuthContext,
        filter: JobFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<inbound_job::Model>, ServiceError> {
        let mut query = inbound_job::Entity::find()
            .filter(tenant_condition(ctx, inbound_job::Column::TenantId))
            .filter(customer_condition(ctx, inbound_job::Column::CustomerId))
            .order_by_desc(inbound_job::Column::CreatedAt);
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(inbound_job::Column::CustomerId.eq(customer_id));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(inbound_job::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(inbound_job::Column::Status.eq(status));
        }
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    /// A changed customer refreshes the copied delivery details
    #[instrument(skip(self, ctx))]
    pub async fn update_inbound(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateInboundJobRequest,
    ) -> Result<inbound_job::Model, ServiceError> {
        request.validate()?;
        let job = self.find_inbound(ctx, id).await?;
        ensure_write(ctx, job.tenant_id)?;

        let db = &*self.db_pool;
        let tenant_id = job.tenant_id;
        let mut active: inbound_job::ActiveModel = job.into();
        if let Some(customer_id) = request.customer_id {
            active.customer_id = Set(Some(customer_id));
            if let Some(customer) = denormalize::find_customer(db, tenant_id, customer_id).await {
                denormalize::apply_customer_to_inbound(customer, &mut active);
            }
        }
        if request.warehouse_id.is_some() {
            active.warehouse_id = Set(request.warehouse_id);
        }
        if let Some(status) = request.status {
            active.status = Set(status.to_string());
        }
        if request.expected_date.is_some() {
            active.expected_date = Set(request.expected_date);
        }
        if request.notes.is_some() {
            active.notes = Set(request.notes);
        }
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_inbound(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let job = self.find_inbound(ctx, id).await?;
        ensure_write(ctx, job.tenant_id)?;

        let db = &*self.db_pool;
        let pallets = put_away_stock::Entity::find()
            .filter(put_away_stock::Column::InboundJobId.eq(id))
            .filter(put_away_stock::Column::IsDeleted.eq(false))
            .count(db)
            .await?;
        if pallets > 0 {
            return Err(ServiceError::Conflict(format!(
                "Inbound job {} has {} pallet(s) put away",
                job.job_code, pallets
            )));
        }
        job.delete(db).await?;
        info!(inbound_job_id = %id, "Inbound job deleted");
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub async fn add_inbound_line(
        &self,
        ctx: &AuthContext,
        job_id: Uuid,
        request: InboundLineRequest,
    ) -> Result<inbound_product_line::Model, ServiceError> {
        request.validate()?;
        let job = self.find_inbound(ctx, job_id).await?;
        ensure_write(ctx, job.tenant_id)?;
        self.insert_inbound_line(&job, request).await
    }

    /// `put_away_qty` is maintained from the pallets and cannot be set here
    #[instrument(skip(self, ctx))]
    pub async fn update_inbound_line(
        &self,
        ctx: &AuthContext,
        line_id: Uuid,
        request: UpdateInboundLineRequest,
    ) -> Result<inbound_product_line::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let line = inbound_product_line::Entity::find_by_id(line_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("InboundProductLine", line_id))?;
        let job = self.find_inbound(ctx, line.inbound_job_id).await?;
        ensure_write(ctx, job.tenant_id)?;

        let mut active: inbound_product_line::ActiveModel = line.into();
        if let Some(expected) = request.expected_qty {
            active.expected_qty = Set(expected);
        }
        if let Some(received) = request.received_qty {
            active.received_qty = Set(received);
        }
        if request.batch_number.is_some() {
            active.batch_number = Set(request.batch_number);
        }
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_inbound_line(&self, ctx: &AuthContext, line_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let line = inbound_product_line::Entity::find_by_id(line_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("InboundProductLine", line_id))?;
        let job = self.find_inbound(ctx, line.inbound_job_id).await?;
        ensure_write(ctx, job.tenant_id)?;
        line.delete(db).await?;
        Ok(())
    }

    #[instrument(skip(self, ctx, request), fields(job_code = %request.job_code))]
    pub async fn create_outbound(
        &self,
        ctx: &AuthContext,
        request: CreateOutboundJobRequest,
    ) -> Result<OutboundJobDetail, ServiceError> {
        request.validate()?;
        let tenant_id = write_tenant(ctx, request.tenant_id)?;
        let db = &*self.db_pool;
        let clash = outbound_job::Entity::find()
            .filter(outbound_job::Column::TenantId.eq(tenant_id))
            .filter(outbound_job::Column::JobCode.eq(request.job_code.clone()))
            .count(db)
            .await?;
        if clash > 0 {
            return Err(Self::duplicate_code(&request.job_code));
        }

        let mut active = outbound_job::ActiveModel {
            tenant_id: Set(tenant_id),
            job_code: Set(request.job_code),
            customer_id: Set(request.customer_id),
            warehouse_id: Set(request.warehouse_id),
            status: Set(OutboundJobStatus::Draft.to_string()),
            required_date: Set(request.required_date),
            notes: Set(request.notes),
            ..Default::default()
        };
        if let Some(customer_id) = request.customer_id {
            if let Some(customer) = denormalize::find_customer(db, tenant_id, customer_id).await {
                denormalize::apply_customer_to_outbound(customer, &mut active);
            }
        }
        let job = active.insert(db).await?;

        let mut lines = Vec::with_capacity(request.lines.len());
        for line in request.lines {
            lines.push(self.insert_outbound_line(&job, line).await?);
        }

        info!(outbound_job_id = %job.id, lines = lines.len(), "Outbound job created");
        Ok(OutboundJobDetail { job, lines })
    }

    async fn insert_outbound_line(
        &self,
        job: &outbound_job::Model,
        line: OutboundLineRequest,
    ) -> Result<outbound_product_line::Model, ServiceError> {
        Ok(outbound_product_line::ActiveModel {
            tenant_id: Set(job.tenant_id),
            outbound_job_id: Set(job.id),
            sku_id: Set(line.sku_id),
            required_qty: Set(line.required_qty),
            allocated_qty: Set(0),
            picked_qty: Set(0),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?)
    }

    async fn find_outbound(&self, ctx: &AuthContext, id: Uuid) -> Result<outbound_job::Model, ServiceError> {
        let job = outbound_job::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("OutboundJob", id))?;
        ensure_read(ctx, "OutboundJob", id, job.tenant_id, job.customer_id)?;
        Ok(job)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_outbound(&self, ctx: &AuthContext, id: Uuid) -> Result<OutboundJobDetail, ServiceError> {
        let job = self.find_outbound(ctx, id).await?;
        let lines = job
            .find_related(outbound_product_line::Entity)
            .order_by_asc(outbound_product_line::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(OutboundJobDetail { job, lines })
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_outbound(
        &self,
        ctx: &AuthContext,
        filter: JobFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<outbound_job::Model>, ServiceError> {
        let mut query = outbound_job::Entity::find()
            .filter(tenant_condition(ctx, outbound_job::Column::TenantId))
            .filter(customer_condition(ctx, outbound_job::Column::CustomerId))
            .order_by_desc(outbound_job::Column::CreatedAt);
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(outbound_job::Column::CustomerId.eq(customer_id));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(outbound_job::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(outbound_job::Column::Status.eq(status));
        }
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update_outbound(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateOutboundJobRequest,
    ) -> Result<outbound_job::Model, ServiceError> {
        request.validate()?;
        let job = self.find_outbound(ctx, id).await?;
        ensure_write(ctx, job.tenant_id)?;

        let db = &*self.db_pool;
        let tenant_id = job.tenant_id;
        let mut active: outbound_job::ActiveModel = job.into();
        if let Some(customer_id) = request.customer_id {
            active.customer_id = Set(Some(customer_id));
            if let Some(customer) = denormalize::find_customer(db, tenant_id, customer_id).await {
                denormalize::apply_customer_to_outbound(customer, &mut active);
            }
        }
        if request.warehouse_id.is_some() {
            active.warehouse_id = Set(request.warehouse_id);
        }
        if let Some(status) = request.status {
            active.status = Set(status.to_string());
        }
        if request.required_date.is_some() {
            active.required_date = Set(request.required_date);
        }
        if request.notes.is_some() {
            active.notes = Set(request.notes);
        }
        Ok(active.update(db).await?)
    }

    /// Jobs still holding pallets are kept; release the pallets first
    #[instrument(skip(self, ctx))]
    pub async fn delete_outbound(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let job = self.find_outbound(ctx, id).await?;
        ensure_write(ctx, job.tenant_id)?;

        let db = &*self.db_pool;
        let pallets = put_away_stock::Entity::find()
            .filter(put_away_stock::Column::OutboundJobId.eq(id))
            .filter(put_away_stock::Column::IsDeleted.eq(false))
            .count(db)
            .await?;
        if pallets > 0 {
            return Err(ServiceError::Conflict(format!(
                "Outbound job {} still holds {} pallet(s)",
                job.display_code(),
                pallets
            )));
        }
        job.delete(db).await?;
        info!(outbound_job_id = %id, "Outbound job deleted");
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub async fn add_outbound_line(
        &self,
        ctx: &AuthContext,
        job_id: Uuid,
        request: OutboundLineRequest,
    ) -> Result<outbound_product_line::Model, ServiceError> {
        request.validate()?;
        let job = self.find_outbound(ctx, job_id).await?;
        ensure_write(ctx, job.tenant_id)?;
        self.insert_outbound_line(&job, request).await
    }

    /// Only the required quantity is editable; allocated and picked
    /// quantities follow the pallets
    #[instrument(skip(self, ctx))]
    pub async fn update_outbound_line(
        &self,
        ctx: &AuthContext,
        line_id: Uuid,
        required_qty: i32,
    ) -> Result<outbound_product_line::Model, ServiceError> {
        if required_qty < 0 {
            return Err(ServiceError::ValidationError(
                "required_qty cannot be negative".to_string(),
            ));
        }
        let db = &*self.db_pool;
        let line = outbound_product_line::Entity::find_by_id(line_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("OutboundProductLine", line_id))?;
        let job = self.find_outbound(ctx, line.outbound_job_id).await?;
        ensure_write(ctx, job.tenant_id)?;

        let mut active: outbound_product_line::ActiveModel = line.into();
        active.required_qty = Set(required_qty);
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_outbound_line(&self, ctx: &AuthContext, line_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let line = outbound_product_line::Entity::find_by_id(line_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("OutboundProductLine", line_id))?;
        let job = self.find_outbound(ctx, line.outbound_job_id).await?;
        ensure_write(ctx, job.tenant_id)?;
        if line.allocated_qty > 0 {
            return Err(ServiceError::Conflict(format!(
                "Line {} has {} unit(s) allocated",
                line_id, line.allocated_qty
            )));
        }
        line.delete(db).await?;
        Ok(())
    }
}
