use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        allocation_line, container_detail, pickup_record, put_away_stock, stock_allocation,
        JobType, PickupStatus,
    },
    errors::ServiceError,
    events::{Event, EventHandler},
    services::status_rules::{next_container_status, LineProgress},
};

/// Recomputes a container's status from its allocation lines and the
/// put-away and pickup records that reference it.
#[derive(Clone)]
pub struct ContainerStatusRecalculator {
    db_pool: Arc<DbPool>,
}

impl ContainerStatusRecalculator {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Writes the derived status when it differs from the stored one and
    /// returns the resulting change event.
    #[instrument(skip(self))]
    pub async fn recalculate(
        &self,
        container_detail_id: Uuid,
    ) -> Result<Option<Event>, ServiceError> {
        let db = &*self.db_pool;

        let Some(container) = container_detail::Entity::find_by_id(container_detail_id)
            .one(db)
            .await?
        else {
            debug!(%container_detail_id, "container no longer exists; nothing to recalculate");
            return Ok(None);
        };

        let job_type = container.job_type().ok_or_else(|| {
            ServiceError::InternalError(format!(
                "container {} has unknown job type {}",
                container.id, container.job_type
            ))
        })?;
        let current = container.container_status().ok_or_else(|| {
            ServiceError::InternalError(format!(
                "container {} has unknown status {}",
                container.id, container.status
            ))
        })?;

        let lines = self.load_lines(container_detail_id).await?;
        let has_put_away = match job_type {
            JobType::Import => self.has_live_put_away(container_detail_id).await?,
            JobType::Export => false,
        };
        let has_completed_pickup = match job_type {
            JobType::Export => self.has_completed_pickup(container_detail_id).await?,
            JobType::Import => false,
        };

        let Some(next) =
            next_container_status(job_type, current, &lines, has_put_away, has_completed_pickup)
        else {
            return Ok(None);
        };

        let booking_id = container.booking_id;
        let tenant_id = container.tenant_id;
        let mut active: container_detail::ActiveModel = container.into();
        active.status = Set(next.to_string());
        active.update(db).await?;

        counter!("freightwms_status.container_updates", 1, "status" => next.to_string());
        info!(
            %container_detail_id,
            %booking_id,
            "Container status recalculated: {} -> {}",
            current,
            next
        );

        Ok(Some(Event::ContainerStatusChanged {
            tenant_id,
            booking_id,
            container_detail_id,
            old_status: current,
            new_status: next,
        }))
    }

    async fn load_lines(&self, container_detail_id: Uuid) -> Result<Vec<LineProgress>, ServiceError> {
        let db = &*self.db_pool;
        let allocation_ids: Vec<Uuid> = stock_allocation::Entity::find()
            .filter(stock_allocation::Column::ContainerDetailId.eq(container_detail_id))
            .all(db)
            .await?
            .into_iter()
            .map(|allocation| allocation.id)
            .collect();

        if allocation_ids.is_empty() {
            return Ok(Vec::new());
        }

        let lines = allocation_line::Entity::find()
            .filter(allocation_line::Column::StockAllocationId.is_in(allocation_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|line| LineProgress {
                received_qty: line.received_qty,
                allocated_qty: line.allocated_qty,
                picked_qty: line.picked_qty,
            })
            .collect();
        Ok(lines)
    }

    async fn has_live_put_away(&self, container_detail_id: Uuid) -> Result<bool, ServiceError> {
        let count = put_away_stock::Entity::find()
            .filter(put_away_stock::Column::ContainerDetailId.eq(container_detail_id))
            .filter(put_away_stock::Column::IsDeleted.eq(false))
            .count(&*self.db_pool)
            .await?;
        Ok(count > 0)
    }

    async fn has_completed_pickup(&self, container_detail_id: Uuid) -> Result<bool, ServiceError> {
        let count = pickup_record::Entity::find()
            .filter(pickup_record::Column::ContainerDetailId.eq(container_detail_id))
            .filter(pickup_record::Column::Status.eq(PickupStatus::Completed.to_string()))
            .count(&*self.db_pool)
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl EventHandler for ContainerStatusRecalculator {
    fn name(&self) -> &'static str {
        "container_status_recalculator"
    }

    async fn handle(&self, event: &Event) -> Result<Vec<Event>, ServiceError> {
        let container_detail_id = match event {
            Event::AllocationLinesChanged {
                container_detail_id,
                ..
            }
            | Event::PutAwayRecorded {
                container_detail_id,
                ..
            }
            | Event::PickupCompleted {
                container_detail_id,
                ..
            }
            | Event::ContainerUpdated {
                container_detail_id,
                ..
            } => *container_detail_id,
            _ => return Ok(Vec::new()),
        };

        Ok(self
            .recalculate(container_detail_id)
            .await?
            .into_iter()
            .collect())
    }
}
