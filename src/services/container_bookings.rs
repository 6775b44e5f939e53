use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set,
};
use serde::{Deserialize, Serialize};
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
    entities::{
        container_booking, container_detail, put_away_stock, BookingStatus, ChargeTo,
        ChargeToKind, ContainerStatus, JobType,
    },
    errors::ServiceError,
    events::{Event, EventBus},
    services::denormalize,
    PaginatedResponse,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ContainerRequest {
    #[validate(length(min = 1, max = 20))]
    pub container_number: String,
    pub container_size: Option<String>,
    /// Position inside the booking; appended when omitted
    pub sequence: Option<i32>,
    pub warehouse_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub tenant_id: Option<Uuid>,
    pub job_type: JobType,
    #[validate(length(min = 1, max = 64))]
    pub booking_code: String,
    pub charge_to: Option<ChargeTo>,
    pub vessel: Option<String>,
    pub voyage: Option<String>,
    pub eta: Option<DateTime<Utc>>,
    pub etd: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[serde(default)]
    #[validate]
    pub containers: Vec<ContainerRequest>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookingRequest {
    #[validate(length(min = 1, max = 64))]
    pub booking_code: Option<String>,
    pub charge_to: Option<ChargeTo>,
    pub vessel: Option<String>,
    pub voyage: Option<String>,
    pub eta: Option<DateTime<Utc>>,
    pub etd: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Only `cancelled` or `completed`; every other status is derived
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateContainerRequest {
    pub booking_id: Uuid,
    #[serde(flatten)]
    #[validate]
    pub container: ContainerRequest,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateContainerRequest {
    #[validate(length(min = 1, max = 20))]
    pub container_number: Option<String>,
    pub container_size: Option<String>,
    pub sequence: Option<i32>,
    pub warehouse_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingFilter {
    pub job_type: Option<JobType>,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContainerFilter {
    pub booking_id: Option<Uuid>,
    pub status: Option<ContainerStatus>,
}

/// A booking with its decoded charge-to party and its containers in order
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: container_booking::Model,
    pub charge_to: Option<ChargeTo>,
    pub containers: Vec<container_detail::Model>,
}

/// Customer a booking belongs to for portal visibility
fn booking_owner(booking: &container_booking::Model) -> Option<Uuid> {
    match booking.charge_to() {
        Some(ChargeTo {
            kind: ChargeToKind::Customer,
            id,
        }) => Some(id),
        _ => None,
    }
}

/// Portal users see bookings charged to their customer and bookings that
/// are not charged to any customer
fn booking_visibility(ctx: &AuthContext) -> Condition {
    if !ctx.is_customer() {
        return Condition::all();
    }
    let mut visible = Condition::any()
        .add(container_booking::Column::ChargeToKind.is_null())
        .add(container_booking::Column::ChargeToKind.ne(ChargeToKind::Customer.to_string()));
    if let Some(customer_id) = ctx.customer_id {
        visible = visible.add(container_booking::Column::ChargeToId.eq(customer_id));
    }
    visible
}

/// Container bookings and the containers they carry
#[derive(Clone)]
pub struct ContainerBookingService {
    db_pool: Arc<DbPool>,
    events: Arc<EventBus>,
}

impl ContainerBookingService {
    pub fn new(db_pool: Arc<DbPool>, events: Arc<EventBus>) -> Self {
        Self { db_pool, events }
    }

    #[instrument(skip(self, ctx, request), fields(booking_code = %request.booking_code))]
    pub async fn create_booking(
        &self,
        ctx: &AuthContext,
        request: CreateBookingRequest,
    ) -> Result<BookingDetail, ServiceError> {
        request.validate()?;
        let tenant_id = write_tenant(ctx, request.tenant_id)?;
        let db = &*self.db_pool;

        let mut active = container_booking::ActiveModel {
            tenant_id: Set(tenant_id),
            job_type: Set(request.job_type.to_string()),
            booking_code: Set(request.booking_code),
            status: Set(BookingStatus::initial(request.job_type).to_string()),
            charge_to_kind: Set(request.charge_to.map(|c| c.kind.to_string())),
            charge_to_id: Set(request.charge_to.map(|c| c.id)),
            vessel: Set(request.vessel),
            voyage: Set(request.voyage),
            eta: Set(request.eta),
            etd: Set(request.etd),
            notes: Set(request.notes),
            ..Default::default()
        };
        if let Some(charge_to) = request.charge_to {
            if let Some(snapshot) = denormalize::charge_to_snapshot(db, tenant_id, charge_to).await {
                denormalize::apply_charge_to(snapshot, &mut active);
            }
        }
        let booking = active.insert(db).await?;

        let mut containers = Vec::with_capacity(request.containers.len());
        for (index, container) in request.containers.into_iter().enumerate() {
            let sequence = container.sequence.unwrap_or(index as i32 + 1);
            containers.push(self.insert_container(&booking, container, sequence).await?);
        }

        info!(
            booking_id = %booking.id,
            job_type = %request.job_type,
            containers = containers.len(),
            "Container booking created"
        );
        Ok(BookingDetail {
            charge_to: booking.charge_to(),
            booking,
            containers,
        })
    }

    async fn insert_container(
        &self,
        booking: &container_booking::Model,
        request: ContainerRequest,
        sequence: i32,
    ) -> Result<container_detail::Model, ServiceError> {
        let job_type = booking.job_type().ok_or_else(|| {
            ServiceError::InternalError(format!("booking {} has unknown job type", booking.id))
        })?;
        Ok(container_detail::ActiveModel {
            tenant_id: Set(booking.tenant_id),
            booking_id: Set(booking.id),
            job_type: Set(job_type.to_string()),
            container_number: Set(request.container_number.trim().to_ascii_uppercase()),
            container_size: Set(request.container_size),
            sequence: Set(sequence),
            status: Set(ContainerStatus::initial(job_type).to_string()),
            warehouse_id: Set(request.warehouse_id),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?)
    }

    async fn find_booking(&self, ctx: &AuthContext, id: Uuid) -> Result<container_booking::Model, ServiceError> {
        let booking = container_booking::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("ContainerBooking", id))?;
        ensure_read(ctx, "ContainerBooking", id, booking.tenant_id, booking_owner(&booking))?;
        Ok(booking)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_booking(&self, ctx: &AuthContext, id: Uuid) -> Result<BookingDetail, ServiceError> {
        let booking = self.find_booking(ctx, id).await?;
        let containers = booking
            .find_related(container_detail::Entity)
            .order_by_asc(container_detail::Column::Sequence)
            .all(&*self.db_pool)
            .await?;
        Ok(BookingDetail {
            charge_to: booking.charge_to(),
            booking,
            containers,
        })
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_bookings(
        &self,
        ctx: &AuthContext,
        filter: BookingFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<container_booking::Model>, ServiceError> {
        let mut query = container_booking::Entity::find()
            .filter(tenant_condition(ctx, container_booking::Column::TenantId))
            .filter(booking_visibility(ctx))
            .order_by_desc(container_booking::Column::CreatedAt);
        if let Some(job_type) = filter.job_type {
            query = query.filter(container_booking::Column::JobType.eq(job_type.to_string()));
        }
        if let Some(status) = filter.status {
            query = query.filter(container_booking::Column::Status.eq(status.to_string()));
        }
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update_booking(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateBookingRequest,
    ) -> Result<container_booking::Model, ServiceError> {
        request.validate()?;
        let booking = self.find_booking(ctx, id).await?;
        ensure_write(ctx, booking.tenant_id)?;

        if let Some(status) = request.status {
            if !status.is_terminal() {
                return Err(ServiceError::InvalidStatus(format!(
                    "Booking status {} is derived from its containers and cannot be set",
                    status
                )));
            }
        }

        let db = &*self.db_pool;
        let tenant_id = booking.tenant_id;
        let mut active: container_booking::ActiveModel = booking.into();
        if let Some(code) = request.booking_code {
            active.booking_code = Set(code);
        }
        if let Some(charge_to) = request.charge_to {
            active.charge_to_kind = Set(Some(charge_to.kind.to_string()));
            active.charge_to_id = Set(Some(charge_to.id));
            if let Some(snapshot) = denormalize::charge_to_snapshot(db, tenant_id, charge_to).await {
                denormalize::apply_charge_to(snapshot, &mut active);
            }
        }
        if request.vessel.is_some() {
            active.vessel = Set(request.vessel);
        }
        if request.voyage.is_some() {
            active.voyage = Set(request.voyage);
        }
        if request.eta.is_some() {
            active.eta = Set(request.eta);
        }
        if request.etd.is_some() {
            active.etd = Set(request.etd);
        }
        if request.notes.is_some() {
            active.notes = Set(request.notes);
        }
        if let Some(status) = request.status {
            active.status = Set(status.to_string());
        }

        let booking = active.update(db).await?;
        info!(booking_id = %id, status = %booking.status, "Container booking updated");
        Ok(booking)
    }

    async fn live_pallets_in(&self, container_ids: Vec<Uuid>) -> Result<u64, ServiceError> {
        if container_ids.is_empty() {
            return Ok(0);
        }
        Ok(put_away_stock::Entity::find()
            .filter(put_away_stock::Column::ContainerDetailId.is_in(container_ids))
            .filter(put_away_stock::Column::IsDeleted.eq(false))
            .count(&*self.db_pool)
            .await?)
    }

    /// Removes the booking with its containers and their allocations
    #[instrument(skip(self, ctx))]
    pub async fn delete_booking(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let booking = self.find_booking(ctx, id).await?;
        ensure_write(ctx, booking.tenant_id)?;

        let db = &*self.db_pool;
        let container_ids = booking
            .find_related(container_detail::Entity)
            .all(db)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        let pallets = self.live_pallets_in(container_ids).await?;
        if pallets > 0 {
            return Err(ServiceError::Conflict(format!(
                "Booking {} has {} pallet(s) put away from its containers",
                booking.booking_code, pallets
            )));
        }

        booking.delete(db).await?;
        info!(booking_id = %id, "Container booking deleted");
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub async fn create_container(
        &self,
        ctx: &AuthContext,
        request: CreateContainerRequest,
    ) -> Result<container_detail::Model, ServiceError> {
        request.validate()?;
        let booking = self.find_booking(ctx, request.booking_id).await?;
        ensure_write(ctx, booking.tenant_id)?;

        let sequence = match request.container.sequence {
            Some(sequence) => sequence,
            None => {
                let existing = container_detail::Entity::find()
                    .filter(container_detail::Column::BookingId.eq(booking.id))
                    .count(&*self.db_pool)
                    .await?;
                existing as i32 + 1
            }
        };
        let container = self
            .insert_container(&booking, request.container, sequence)
            .await?;

        info!(container_detail_id = %container.id, booking_id = %booking.id, "Container added");
        self.publish_container_updated(&container).await;
        Ok(container)
    }

    async fn publish_container_updated(&self, container: &container_detail::Model) {
        self.events
            .publish(Event::ContainerUpdated {
                tenant_id: container.tenant_id,
                booking_id: container.booking_id,
                container_detail_id: container.id,
            })
            .await;
    }

    async fn find_container(
        &self,
        ctx: &AuthContext,
        id: Uuid,
    ) -> Result<(container_detail::Model, container_booking::Model), ServiceError> {
        let container = container_detail::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("ContainerDetail", id))?;
        let booking = self
            .find_booking(ctx, container.booking_id)
            .await
            .map_err(|e| match e {
                ServiceError::NotFound(_) => ServiceError::not_found("ContainerDetail", id),
                other => other,
            })?;
        Ok((container, booking))
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_container(&self, ctx: &AuthContext, id: Uuid) -> Result<container_detail::Model, ServiceError> {
        Ok(self.find_container(ctx, id).await?.0)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_containers(
        &self,
        ctx: &AuthContext,
        filter: ContainerFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<container_detail::Model>, ServiceError> {
        let mut query = container_detail::Entity::find()
            .filter(tenant_condition(ctx, container_detail::Column::TenantId))
            .order_by_asc(container_detail::Column::BookingId)
            .order_by_asc(container_detail::Column::Sequence);
        if ctx.is_customer() {
            let visible_bookings = container_booking::Entity::find()
                .select_only()
                .column(container_booking::Column::Id)
                .filter(tenant_condition(ctx, container_booking::Column::TenantId))
                .filter(booking_visibility(ctx))
                .into_query();
            query = query.filter(container_detail::Column::BookingId.in_subquery(visible_bookings));
        }
        if let Some(booking_id) = filter.booking_id {
            query = query.filter(container_detail::Column::BookingId.eq(booking_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(container_detail::Column::Status.eq(status.to_string()));
        }
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    /// Edits container attributes; the status itself is derived
    #[instrument(skip(self, ctx))]
    pub async fn update_container(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateContainerRequest,
    ) -> Result<container_detail::Model, ServiceError> {
        request.validate()?;
        let (container, booking) = self.find_container(ctx, id).await?;
        ensure_write(ctx, booking.tenant_id)?;

        let mut active: container_detail::ActiveModel = container.into();
        if let Some(number) = request.container_number {
            active.container_number = Set(number.trim().to_ascii_uppercase());
        }
        if request.container_size.is_some() {
            active.container_size = Set(request.container_size);
        }
        if let Some(sequence) = request.sequence {
            active.sequence = Set(sequence);
        }
        if request.warehouse_id.is_some() {
            active.warehouse_id = Set(request.warehouse_id);
        }
        let container = active.update(&*self.db_pool).await?;

        self.publish_container_updated(&container).await;
        Ok(container)
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_container(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let (container, booking) = self.find_container(ctx, id).await?;
        ensure_write(ctx, booking.tenant_id)?;

        let pallets = self.live_pallets_in(vec![container.id]).await?;
        if pallets > 0 {
            return Err(ServiceError::Conflict(format!(
                "Container {} has {} pallet(s) put away",
                container.container_number, pallets
            )));
        }

        let removed = container.clone();
        container.delete(&*self.db_pool).await?;
        info!(container_detail_id = %id, booking_id = %booking.id, "Container removed");
        // the booking is re-aggregated over the remaining containers
        self.publish_container_updated(&removed).await;
        Ok(())
    }

    /// Marks a picked-up export container as dispatched
    #[instrument(skip(self, ctx))]
    pub async fn dispatch_container(
        &self,
        ctx: &AuthContext,
        id: Uuid,
    ) -> Result<container_detail::Model, ServiceError> {
        let (container, booking) = self.find_container(ctx, id).await?;
        ensure_write(ctx, booking.tenant_id)?;

        if container.job_type() != Some(JobType::Export) {
            return Err(ServiceError::InvalidOperation(
                "Only export containers can be dispatched".to_string(),
            ));
        }
        let current = container.container_status();
        if current != Some(ContainerStatus::PickedUp) {
            return Err(ServiceError::InvalidStatus(format!(
                "Container {} is {} and must be picked_up before dispatch",
                container.container_number, container.status
            )));
        }

        let mut active: container_detail::ActiveModel = container.into();
        active.status = Set(ContainerStatus::Dispatched.to_string());
        let container = active.update(&*self.db_pool).await?;

        info!(container_detail_id = %id, "Container dispatched");
        self.events
            .publish(Event::ContainerStatusChanged {
                tenant_id: container.tenant_id,
                booking_id: container.booking_id,
                container_detail_id: container.id,
                old_status: ContainerStatus::PickedUp,
                new_status: ContainerStatus::Dispatched,
            })
            .await;
        Ok(container)
    }
}
