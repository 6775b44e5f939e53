use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        access::{ensure_read, ensure_write, tenant_condition, write_tenant},
        AuthContext,
    },
    db::DbPool,
    entities::{
        inbound_product_line, outbound_job, outbound_product_line, put_away_stock, sku, warehouse,
        AllocationStatus,
    },
    errors::ServiceError,
    events::{Event, EventBus},
    services::lpn_guard::{check_allocation, AllocationCheck, AllocationRejection},
    PaginatedResponse,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLpnRequest {
    pub tenant_id: Option<Uuid>,
    #[validate(length(min = 1, max = 64))]
    pub lpn_number: String,
    pub warehouse_id: Option<Uuid>,
    pub location: Option<String>,
    pub sku_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub qty: i32,
    pub inbound_job_id: Option<Uuid>,
    pub inbound_product_line_id: Option<Uuid>,
    pub container_detail_id: Option<Uuid>,
    pub outbound_job_id: Option<Uuid>,
    pub outbound_product_line_id: Option<Uuid>,
    /// Defaults to `available`
    pub allocation_status: Option<AllocationStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateLpnRequest {
    #[validate(length(min = 1, max = 64))]
    pub lpn_number: Option<String>,
    pub warehouse_id: Option<Uuid>,
    pub location: Option<String>,
    pub sku_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub qty: Option<i32>,
    pub inbound_job_id: Option<Uuid>,
    pub inbound_product_line_id: Option<Uuid>,
    pub container_detail_id: Option<Uuid>,
    pub outbound_job_id: Option<Uuid>,
    pub outbound_product_line_id: Option<Uuid>,
    /// `available` releases the pallet and clears its outbound references
    pub allocation_status: Option<AllocationStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LpnFilter {
    pub warehouse_id: Option<Uuid>,
    pub sku_id: Option<Uuid>,
    pub container_detail_id: Option<Uuid>,
    pub outbound_job_id: Option<Uuid>,
    pub allocation_status: Option<AllocationStatus>,
    /// Prefix of the LPN number
    pub search: Option<String>,
    /// Also return soft-deleted pallets
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BatchUpdateRow {
    pub id: Uuid,
    #[serde(flatten)]
    #[validate]
    pub changes: UpdateLpnRequest,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BatchUpdateRequest {
    #[validate(length(min = 1, max = 500))]
    pub updates: Vec<BatchUpdateRow>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchRowResult {
    pub id: Uuid,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchUpdateResult {
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BatchRowResult>,
}

/// A pallet joined with the labels of its SKU and warehouse
#[derive(Debug, Clone, Serialize)]
pub struct InventoryRecord {
    #[serde(flatten)]
    pub lpn: put_away_stock::Model,
    pub sku_code: Option<String>,
    pub warehouse_name: Option<String>,
}

/// Line references a pallet contributes to before and after a write
#[derive(Debug, Default)]
struct TouchedRefs {
    inbound_lines: BTreeSet<Uuid>,
    outbound_lines: BTreeSet<Uuid>,
    containers: BTreeSet<Uuid>,
}

impl TouchedRefs {
    fn record(&mut self, lpn: &put_away_stock::Model) {
        self.inbound_lines.extend(lpn.inbound_product_line_id);
        self.outbound_lines.extend(lpn.outbound_product_line_id);
        self.containers.extend(lpn.container_detail_id);
    }
}

/// Put-away pallets (LPNs): allocation to outbound jobs, soft delete and
/// the quantity roll-up into job lines
#[derive(Clone)]
pub struct LpnService {
    db_pool: Arc<DbPool>,
    events: Arc<EventBus>,
}

impl LpnService {
    pub fn new(db_pool: Arc<DbPool>, events: Arc<EventBus>) -> Self {
        Self { db_pool, events }
    }

    async fn check_number_free(
        &self,
        tenant_id: Uuid,
        lpn_number: &str,
        except: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = put_away_stock::Entity::find()
            .filter(put_away_stock::Column::TenantId.eq(tenant_id))
            .filter(put_away_stock::Column::LpnNumber.eq(lpn_number));
        if let Some(id) = except {
            query = query.filter(put_away_stock::Column::Id.ne(id));
        }
        if query.count(&*self.db_pool).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "LPN {} already exists",
                lpn_number
            )));
        }
        Ok(())
    }

    async fn outbound_job(&self, tenant_id: Uuid, id: Uuid) -> Result<outbound_job::Model, ServiceError> {
        outbound_job::Entity::find_by_id(id)
            .filter(outbound_job::Column::TenantId.eq(tenant_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::ValidationError(format!("Outbound job {} does not exist", id)))
    }

    /// Turns a guard rejection into the caller-facing error. A conflict
    /// names the holding job by its code when it can be found.
    async fn rejection_error(&self, tenant_id: Uuid, rejection: AllocationRejection) -> ServiceError {
        match rejection {
            AllocationRejection::AlreadyAllocated { lpn_number, job_id } => {
                let label = match self.outbound_job(tenant_id, job_id).await {
                    Ok(job) => job.display_code(),
                    Err(_) => job_id.to_string(),
                };
                counter!("freightwms_lpn.allocation_conflicts", 1);
                ServiceError::Conflict(format!(
                    "LPN {} is already allocated to outbound job {}",
                    lpn_number, label
                ))
            }
            AllocationRejection::Deleted { .. } => ServiceError::InvalidOperation(rejection.to_string()),
            AllocationRejection::MissingOutboundJob => ServiceError::ValidationError(rejection.to_string()),
        }
    }

    #[instrument(skip(self, ctx, request), fields(lpn_number = %request.lpn_number))]
    pub async fn create(
        &self,
        ctx: &AuthContext,
        request: CreateLpnRequest,
    ) -> Result<put_away_stock::Model, ServiceError> {
        request.validate()?;
        let tenant_id = write_tenant(ctx, request.tenant_id)?;
        self.check_number_free(tenant_id, &request.lpn_number, None).await?;

        let status = request.allocation_status.unwrap_or(AllocationStatus::Available);
        let (outbound_job_id, outbound_product_line_id) = if status == AllocationStatus::Available {
            (None, None)
        } else {
            (request.outbound_job_id, request.outbound_product_line_id)
        };
        if status == AllocationStatus::Allocated {
            let job_id = outbound_job_id
                .ok_or_else(|| ServiceError::ValidationError(AllocationRejection::MissingOutboundJob.to_string()))?;
            self.outbound_job(tenant_id, job_id).await?;
        }

        let lpn = put_away_stock::ActiveModel {
            tenant_id: Set(tenant_id),
            lpn_number: Set(request.lpn_number),
            warehouse_id: Set(request.warehouse_id),
            location: Set(request.location),
            sku_id: Set(request.sku_id),
            qty: Set(request.qty),
            inbound_job_id: Set(request.inbound_job_id),
            inbound_product_line_id: Set(request.inbound_product_line_id),
            container_detail_id: Set(request.container_detail_id),
            outbound_job_id: Set(outbound_job_id),
            outbound_product_line_id: Set(outbound_product_line_id),
            allocation_status: Set(status.to_string()),
            is_deleted: Set(false),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(lpn_id = %lpn.id, status = %status, "LPN recorded");
        let mut touched = TouchedRefs::default();
        touched.record(&lpn);
        self.after_write(&lpn, touched).await;
        if status != AllocationStatus::Available {
            self.allocation_changed(&lpn, status).await;
        }
        Ok(lpn)
    }

    async fn find(&self, ctx: &AuthContext, id: Uuid) -> Result<put_away_stock::Model, ServiceError> {
        let lpn = put_away_stock::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("PutAwayStock", id))?;
        ensure_read(ctx, "PutAwayStock", id, lpn.tenant_id, None)?;
        Ok(lpn)
    }

    /// Soft-deleted pallets stay readable by id
    #[instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> Result<put_away_stock::Model, ServiceError> {
        self.find(ctx, id).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_record(&self, ctx: &AuthContext, id: Uuid) -> Result<InventoryRecord, ServiceError> {
        let lpn = self.find(ctx, id).await?;
        let db = &*self.db_pool;
        let sku_code = lpn
            .find_related(sku::Entity)
            .one(db)
            .await?
            .map(|s| s.sku_code);
        let warehouse_name = lpn
            .find_related(warehouse::Entity)
            .one(db)
            .await?
            .map(|w| w.name);
        Ok(InventoryRecord {
            lpn,
            sku_code,
            warehouse_name,
        })
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: LpnFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<put_away_stock::Model>, ServiceError> {
        let mut query = put_away_stock::Entity::find()
            .filter(tenant_condition(ctx, put_away_stock::Column::TenantId))
            .order_by_asc(put_away_stock::Column::LpnNumber);
        if !filter.include_deleted {
            query = query.filter(put_away_stock::Column::IsDeleted.eq(false));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(put_away_stock::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(sku_id) = filter.sku_id {
            query = query.filter(put_away_stock::Column::SkuId.eq(sku_id));
        }
        if let Some(container_detail_id) = filter.container_detail_id {
            query = query.filter(put_away_stock::Column::ContainerDetailId.eq(container_detail_id));
        }
        if let Some(outbound_job_id) = filter.outbound_job_id {
            query = query.filter(put_away_stock::Column::OutboundJobId.eq(outbound_job_id));
        }
        if let Some(status) = filter.allocation_status {
            query = query.filter(put_away_stock::Column::AllocationStatus.eq(status.to_string()));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(put_away_stock::Column::LpnNumber.starts_with(search.trim()));
        }
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    /// Applies an edit to a pallet.
    ///
    /// Allocating a pallet already held by another outbound job fails with
    /// a conflict; releasing it clears the outbound references. Job line
    /// quantities and container statuses are refreshed afterwards.
    #[instrument(skip(self, ctx, request))]
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateLpnRequest,
    ) -> Result<put_away_stock::Model, ServiceError> {
        request.validate()?;
        let stored = self.find(ctx, id).await?;
        ensure_write(ctx, stored.tenant_id)?;
        let tenant_id = stored.tenant_id;

        let check = match check_allocation(&stored, request.allocation_status, request.outbound_job_id) {
            Ok(check) => check,
            Err(rejection) => {
                warn!(lpn_id = %id, "LPN allocation rejected: {}", rejection);
                return Err(self.rejection_error(tenant_id, rejection).await);
            }
        };
        if let AllocationCheck::Allocate(job_id) = check {
            self.outbound_job(tenant_id, job_id).await?;
        }
        if let Some(number) = &request.lpn_number {
            self.check_number_free(tenant_id, number, Some(id)).await?;
        }

        let old_status = stored.allocation_status();
        let old_job = stored.outbound_job_id;
        let mut touched = TouchedRefs::default();
        touched.record(&stored);

        let mut active: put_away_stock::ActiveModel = stored.into();
        if let Some(number) = request.lpn_number {
            active.lpn_number = Set(number);
        }
        if request.warehouse_id.is_some() {
            active.warehouse_id = Set(request.warehouse_id);
        }
        if request.location.is_some() {
            active.location = Set(request.location);
        }
        if request.sku_id.is_some() {
            active.sku_id = Set(request.sku_id);
        }
        if let Some(qty) = request.qty {
            active.qty = Set(qty);
        }
        if request.inbound_job_id.is_some() {
            active.inbound_job_id = Set(request.inbound_job_id);
        }
        if request.inbound_product_line_id.is_some() {
            active.inbound_product_line_id = Set(request.inbound_product_line_id);
        }
        if request.container_detail_id.is_some() {
            active.container_detail_id = Set(request.container_detail_id);
        }
        if request.outbound_job_id.is_some() {
            active.outbound_job_id = Set(request.outbound_job_id);
        }
        if request.outbound_product_line_id.is_some() {
            active.outbound_product_line_id = Set(request.outbound_product_line_id);
        }
        match (request.allocation_status, check) {
            (Some(AllocationStatus::Available), _) => {
                active.allocation_status = Set(AllocationStatus::Available.to_string());
                active.outbound_job_id = Set(None);
                active.outbound_product_line_id = Set(None);
            }
            (Some(status), _) => active.allocation_status = Set(status.to_string()),
            (None, _) => {}
        }
        if let AllocationCheck::Allocate(job_id) | AllocationCheck::AlreadyAllocatedToJob(job_id) = check {
            active.outbound_job_id = Set(Some(job_id));
        }

        let lpn = active.update(&*self.db_pool).await?;
        touched.record(&lpn);
        self.after_write(&lpn, touched).await;

        let new_status = lpn.allocation_status();
        if new_status != old_status || lpn.outbound_job_id != old_job {
            if let Some(status) = new_status {
                self.allocation_changed(&lpn, status).await;
            }
        }
        debug!(lpn_id = %id, status = %lpn.allocation_status, "LPN updated");
        Ok(lpn)
    }

    /// Sequential per-row updates; a failed row does not undo earlier rows
    #[instrument(skip(self, ctx, request), fields(rows = request.updates.len()))]
    pub async fn batch_update(
        &self,
        ctx: &AuthContext,
        request: BatchUpdateRequest,
    ) -> Result<BatchUpdateResult, ServiceError> {
        request.validate()?;
        let mut results = Vec::with_capacity(request.updates.len());
        for row in request.updates {
            let outcome = self.update(ctx, row.id, row.changes).await;
            results.push(BatchRowResult {
                id: row.id,
                success: outcome.is_ok(),
                error: outcome.err().map(|e| e.response_message()),
            });
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        let failed = results.len() - succeeded;
        info!(succeeded, failed, "LPN batch update finished");
        Ok(BatchUpdateResult {
            succeeded,
            failed,
            results,
        })
    }

    /// The first delete marks the pallet deleted; deleting it again removes
    /// the row
    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<bool, ServiceError> {
        let lpn = self.find(ctx, id).await?;
        ensure_write(ctx, lpn.tenant_id)?;
        let tenant_id = lpn.tenant_id;

        let mut touched = TouchedRefs::default();
        touched.record(&lpn);
        let permanent = lpn.is_deleted;

        let snapshot = if permanent {
            let snapshot = lpn.clone();
            lpn.delete(&*self.db_pool).await?;
            snapshot
        } else {
            let mut active: put_away_stock::ActiveModel = lpn.into();
            active.is_deleted = Set(true);
            active.deleted_at = Set(Some(Utc::now()));
            active.update(&*self.db_pool).await?
        };

        self.after_write(&snapshot, touched).await;
        info!(lpn_id = %id, permanent, "LPN deleted");
        self.events
            .publish(Event::LpnDeleted {
                tenant_id,
                lpn_id: id,
                permanent,
            })
            .await;
        Ok(permanent)
    }

    async fn allocation_changed(&self, lpn: &put_away_stock::Model, status: AllocationStatus) {
        self.events
            .publish(Event::LpnAllocationChanged {
                tenant_id: lpn.tenant_id,
                lpn_id: lpn.id,
                outbound_job_id: lpn.outbound_job_id,
                status,
            })
            .await;
    }

    /// Rolls pallet quantities up into the job lines the pallet touched and
    /// asks for the containers it touched to be recalculated. The pallet
    /// write has already landed, so roll-up failures are only logged.
    async fn after_write(&self, lpn: &put_away_stock::Model, touched: TouchedRefs) {
        let db = &*self.db_pool;
        for line_id in &touched.inbound_lines {
            if let Err(e) = refresh_inbound_line(db, *line_id).await {
                error!(lpn_id = %lpn.id, inbound_product_line_id = %line_id, error = %e, "Inbound line roll-up failed");
                counter!("freightwms_lpn.rollup_failures", 1, "line" => "inbound");
            }
        }
        for line_id in &touched.outbound_lines {
            if let Err(e) = refresh_outbound_line(db, *line_id).await {
                error!(lpn_id = %lpn.id, outbound_product_line_id = %line_id, error = %e, "Outbound line roll-up failed");
                counter!("freightwms_lpn.rollup_failures", 1, "line" => "outbound");
            }
        }
        for container_detail_id in touched.containers {
            self.events
                .publish(Event::PutAwayRecorded {
                    tenant_id: lpn.tenant_id,
                    container_detail_id,
                    lpn_id: lpn.id,
                })
                .await;
        }
    }
}

async fn live_pallets(
    db: &DbPool,
    column: put_away_stock::Column,
    line_id: Uuid,
) -> Result<Vec<put_away_stock::Model>, ServiceError> {
    Ok(put_away_stock::Entity::find()
        .filter(column.eq(line_id))
        .filter(put_away_stock::Column::IsDeleted.eq(false))
        .all(db)
        .await?)
}

/// `put_away_qty` is the quantity on live pallets received against the line
pub(crate) async fn refresh_inbound_line(db: &DbPool, line_id: Uuid) -> Result<(), ServiceError> {
    let Some(line) = inbound_product_line::Entity::find_by_id(line_id).one(db).await? else {
        return Ok(());
    };
    let pallets = live_pallets(db, put_away_stock::Column::InboundProductLineId, line_id).await?;
    let put_away_qty: i32 = pallets.iter().map(|p| p.qty).sum();

    if line.put_away_qty != put_away_qty {
        let mut active: inbound_product_line::ActiveModel = line.into();
        active.put_away_qty = Set(put_away_qty);
        active.update(db).await?;
        debug!(inbound_product_line_id = %line_id, put_away_qty, "Inbound line quantities refreshed");
    }
    Ok(())
}

/// Allocated and picked quantities are summed over live pallets by status
pub(crate) async fn refresh_outbound_line(db: &DbPool, line_id: Uuid) -> Result<(), ServiceError> {
    let Some(line) = outbound_product_line::Entity::find_by_id(line_id).one(db).await? else {
        return Ok(());
    };
    let pallets = live_pallets(db, put_away_stock::Column::OutboundProductLineId, line_id).await?;
    let (allocated_qty, picked_qty) = outbound_totals(&pallets);

    if line.allocated_qty != allocated_qty || line.picked_qty != picked_qty {
        let mut active: outbound_product_line::ActiveModel = line.into();
        active.allocated_qty = Set(allocated_qty);
        active.picked_qty = Set(picked_qty);
        active.update(db).await?;
        debug!(
            outbound_product_line_id = %line_id,
            allocated_qty,
            picked_qty,
            "Outbound line quantities refreshed"
        );
    }
    Ok(())
}

fn outbound_totals(pallets: &[put_away_stock::Model]) -> (i32, i32) {
    pallets.iter().fold((0, 0), |(allocated, picked), pallet| {
        let Some(status) = pallet.allocation_status() else {
            return (allocated, picked);
        };
        (
            allocated + if status.counts_as_allocated() { pallet.qty } else { 0 },
            picked + if status.counts_as_picked() { pallet.qty } else { 0 },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pallet(status: AllocationStatus, qty: i32) -> put_away_stock::Model {
        put_away_stock::Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            lpn_number: format!("LPN-{}", qty),
            warehouse_id: None,
            location: None,
            sku_id: None,
            qty,
            inbound_job_id: None,
            inbound_product_line_id: None,
            container_detail_id: None,
            outbound_job_id: None,
            outbound_product_line_id: None,
            allocation_status: status.to_string(),
            is_deleted: false,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn outbound_totals_split_allocated_and_picked() {
        let pallets = vec![
            pallet(AllocationStatus::Allocated, 10),
            pallet(AllocationStatus::Picked, 5),
            pallet(AllocationStatus::Dispatched, 2),
            pallet(AllocationStatus::Reserved, 7),
            pallet(AllocationStatus::Available, 100),
        ];
        assert_eq!(outbound_totals(&pallets), (17, 7));
        assert_eq!(outbound_totals(&[]), (0, 0));
    }

    #[test]
    fn touched_refs_keep_old_and_new_lines() {
        let old_line = Uuid::new_v4();
        let new_line = Uuid::new_v4();
        let mut before = pallet(AllocationStatus::Allocated, 1);
        before.outbound_product_line_id = Some(old_line);
        let mut after = before.clone();
        after.outbound_product_line_id = Some(new_line);

        let mut touched = TouchedRefs::default();
        touched.record(&before);
        touched.record(&after);
        touched.record(&after);

        assert_eq!(touched.outbound_lines.len(), 2);
        assert!(touched.outbound_lines.contains(&old_line));
        assert!(touched.inbound_lines.is_empty());
    }
}
