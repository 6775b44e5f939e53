use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entities::{AllocationStatus, BookingStatus, ContainerStatus};
use crate::errors::ServiceError;

pub mod bus;

pub use bus::{EventBus, PublishReport};

/// Handle to the background event log channel
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends without waiting; a full or closed channel drops the event
    pub fn try_send(&self, event: Event) -> Result<(), String> {
        self.sender
            .try_send(event)
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Domain events that drive status propagation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Product lines of a stock allocation changed
    AllocationLinesChanged {
        tenant_id: Uuid,
        container_detail_id: Uuid,
    },
    /// An LPN referencing a container was written or removed
    PutAwayRecorded {
        tenant_id: Uuid,
        container_detail_id: Uuid,
        lpn_id: Uuid,
    },
    /// A pickup record for a container was written
    PickupCompleted {
        tenant_id: Uuid,
        container_detail_id: Uuid,
        pickup_record_id: Uuid,
    },
    /// A container was created, edited or removed from its booking
    ContainerUpdated {
        tenant_id: Uuid,
        booking_id: Uuid,
        container_detail_id: Uuid,
    },
    ContainerStatusChanged {
        tenant_id: Uuid,
        booking_id: Uuid,
        container_detail_id: Uuid,
        old_status: ContainerStatus,
        new_status: ContainerStatus,
    },
    BookingStatusChanged {
        tenant_id: Uuid,
        booking_id: Uuid,
        old_status: BookingStatus,
        new_status: BookingStatus,
    },
    LpnAllocationChanged {
        tenant_id: Uuid,
        lpn_id: Uuid,
        outbound_job_id: Option<Uuid>,
        status: AllocationStatus,
    },
    LpnDeleted {
        tenant_id: Uuid,
        lpn_id: Uuid,
        permanent: bool,
    },
    TenantDeactivated {
        tenant_id: Uuid,
        users_deactivated: u64,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::AllocationLinesChanged { .. } => "allocation_lines_changed",
            Event::PutAwayRecorded { .. } => "put_away_recorded",
            Event::PickupCompleted { .. } => "pickup_completed",
            Event::ContainerUpdated { .. } => "container_updated",
            Event::ContainerStatusChanged { .. } => "container_status_changed",
            Event::BookingStatusChanged { .. } => "booking_status_changed",
            Event::LpnAllocationChanged { .. } => "lpn_allocation_changed",
            Event::LpnDeleted { .. } => "lpn_deleted",
            Event::TenantDeactivated { .. } => "tenant_deactivated",
        }
    }
}

/// Synchronous consumer of events published on the [`EventBus`].
///
/// A handler returns the follow-up events its work produced; the bus
/// processes them in the same request.
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &Event) -> Result<Vec<Event>, ServiceError>;
}

/// Background consumer that records every published event in the log
pub async fn process_events(mut event_receiver: mpsc::Receiver<Event>) {
    info!("Event log consumer started");

    while let Some(event) = event_receiver.recv().await {
        match &event {
            Event::ContainerStatusChanged {
                container_detail_id,
                booking_id,
                old_status,
                new_status,
                ..
            } => {
                info!(
                    container_detail_id = %container_detail_id,
                    booking_id = %booking_id,
                    "Container status changed: {} -> {}",
                    old_status,
                    new_status
                );
            }
            Event::BookingStatusChanged {
                booking_id,
                old_status,
                new_status,
                ..
            } => {
                info!(
                    booking_id = %booking_id,
                    "Booking status changed: {} -> {}",
                    old_status,
                    new_status
                );
            }
            Event::LpnAllocationChanged {
                lpn_id,
                outbound_job_id,
                status,
                ..
            } => {
                info!(lpn_id = %lpn_id, outbound_job_id = ?outbound_job_id, "LPN is now {}", status);
            }
            Event::LpnDeleted {
                lpn_id, permanent, ..
            } => {
                if *permanent {
                    warn!(lpn_id = %lpn_id, "LPN permanently deleted");
                } else {
                    info!(lpn_id = %lpn_id, "LPN soft-deleted");
                }
            }
            Event::TenantDeactivated {
                tenant_id,
                users_deactivated,
            } => {
                warn!(
                    tenant_id = %tenant_id,
                    "Tenant deactivated; {} user(s) deactivated",
                    users_deactivated
                );
            }
            other => {
                debug!(event = other.name(), "Event: {:?}", other);
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let event = Event::TenantDeactivated {
            tenant_id: Uuid::new_v4(),
            users_deactivated: 3,
        };

        sender.send(event.clone()).await.unwrap();
        assert_eq!(rx.recv().await, Some(event));
    }

    #[test]
    fn try_send_reports_full_channel() {
        let (tx, _rx) = mpsc::channel(1);
        let sender = EventSender::new(tx);
        let event = Event::LpnDeleted {
            tenant_id: Uuid::new_v4(),
            lpn_id: Uuid::new_v4(),
            permanent: false,
        };
        assert!(sender.try_send(event.clone()).is_ok());
        assert!(sender.try_send(event).is_err());
    }
}
