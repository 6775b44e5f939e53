use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{container_booking, container_detail, ContainerStatus},
    errors::ServiceError,
    events::{Event, EventHandler},
    services::status_rules::next_booking_status,
};

/// Rolls container statuses up into their booking's status
#[derive(Clone)]
pub struct BookingStatusAggregator {
    db_pool: Arc<DbPool>,
}

impl BookingStatusAggregator {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn recalculate(&self, booking_id: Uuid) -> Result<Option<Event>, ServiceError> {
        let db = &*self.db_pool;

        let Some(booking) = container_booking::Entity::find_by_id(booking_id)
            .one(db)
            .await?
        else {
            debug!(%booking_id, "booking no longer exists; nothing to aggregate");
            return Ok(None);
        };

        let job_type = booking.job_type().ok_or_else(|| {
            ServiceError::InternalError(format!(
                "booking {} has unknown job type {}",
                booking.id, booking.job_type
            ))
        })?;
        let current = booking.booking_status().ok_or_else(|| {
            ServiceError::InternalError(format!(
                "booking {} has unknown status {}",
                booking.id, booking.status
            ))
        })?;

        let statuses = container_detail::Entity::find()
            .filter(container_detail::Column::BookingId.eq(booking_id))
            .order_by_asc(container_detail::Column::Sequence)
            .all(db)
            .await?
            .iter()
            .map(|container| {
                container.container_status().ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "container {} has unknown status {}",
                        container.id, container.status
                    ))
                })
            })
            .collect::<Result<Vec<ContainerStatus>, _>>()?;

        let Some(next) = next_booking_status(current, job_type, &statuses) else {
            return Ok(None);
        };

        let tenant_id = booking.tenant_id;
        let mut active: container_booking::ActiveModel = booking.into();
        active.status = Set(next.to_string());
        active.update(db).await?;

        counter!("freightwms_status.booking_updates", 1, "status" => next.to_string());
        info!(
            %booking_id,
            containers = statuses.len(),
            "Booking status aggregated: {} -> {}",
            current,
            next
        );

        Ok(Some(Event::BookingStatusChanged {
            tenant_id,
            booking_id,
            old_status: current,
            new_status: next,
        }))
    }
}

#[async_trait]
impl EventHandler for BookingStatusAggregator {
    fn name(&self) -> &'static str {
        "booking_status_aggregator"
    }

    async fn handle(&self, event: &Event) -> Result<Vec<Event>, ServiceError> {
        let booking_id = match event {
            Event::ContainerStatusChanged { booking_id, .. }
            | Event::ContainerUpdated { booking_id, .. } => *booking_id,
            _ => return Ok(Vec::new()),
        };

        Ok(self.recalculate(booking_id).await?.into_iter().collect())
    }
}
