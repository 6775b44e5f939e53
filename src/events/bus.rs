use std::collections::VecDeque;
use std::sync::Arc;

use metrics::counter;
use tracing::{debug, error, warn};

use super::{Event, EventHandler, EventSender};

/// Outcome of one [`EventBus::publish`] call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// Events handled, including follow-ups
    pub processed: usize,
    /// Handler invocations that returned an error
    pub failures: usize,
    /// Follow-ups were dropped after reaching the cascade limit
    pub truncated: bool,
}

/// In-process event bus.
///
/// `publish` runs every registered handler for the event and then for each
/// follow-up event the handlers return, breadth first, until the queue is
/// drained. Handler failures are logged and never propagate to the caller.
/// Every event is also forwarded to the background log consumer.
pub struct EventBus {
    handlers: Vec<Arc<dyn EventHandler>>,
    sender: Option<EventSender>,
    cascade_limit: usize,
}

impl EventBus {
    pub fn new(cascade_limit: usize) -> Self {
        Self {
            handlers: Vec::new(),
            sender: None,
            cascade_limit: cascade_limit.max(1),
        }
    }

    pub fn with_sender(mut self, sender: EventSender) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub async fn publish(&self, event: Event) -> PublishReport {
        let mut report = PublishReport::default();
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            if report.processed >= self.cascade_limit {
                warn!(
                    dropped = queue.len() + 1,
                    limit = self.cascade_limit,
                    "Event cascade limit reached; dropping remaining follow-up events"
                );
                report.truncated = true;
                break;
            }
            report.processed += 1;
            counter!("freightwms_events.published", 1, "event" => event.name());

            if let Some(sender) = &self.sender {
                if let Err(e) = sender.try_send(event.clone()) {
                    debug!(event = event.name(), "event log channel unavailable: {}", e);
                }
            }

            for handler in &self.handlers {
                match handler.handle(&event).await {
                    Ok(follow_ups) => queue.extend(follow_ups),
                    Err(e) => {
                        report.failures += 1;
                        counter!("freightwms_events.handler_failures", 1, "handler" => handler.name());
                        error!(
                            handler = handler.name(),
                            event = event.name(),
                            error = %e,
                            "Event handler failed; triggering write is kept"
                        );
                    }
                }
            }
        }

        report
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_names())
            .field("cascade_limit", &self.cascade_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ContainerStatus;
    use crate::errors::ServiceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;
    use uuid::Uuid;

    /// Turns a container update into one status change
    struct Promote;

    #[async_trait]
    impl EventHandler for Promote {
        fn name(&self) -> &'static str {
            "promote"
        }

        async fn handle(&self, event: &Event) -> Result<Vec<Event>, ServiceError> {
            match event {
                Event::ContainerUpdated {
                    tenant_id,
                    booking_id,
                    container_detail_id,
                } => Ok(vec![Event::ContainerStatusChanged {
                    tenant_id: *tenant_id,
                    booking_id: *booking_id,
                    container_detail_id: *container_detail_id,
                    old_status: ContainerStatus::Expecting,
                    new_status: ContainerStatus::Received,
                }]),
                _ => Ok(vec![]),
            }
        }
    }

    struct Failing(AtomicUsize);

    #[async_trait]
    impl EventHandler for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn handle(&self, _event: &Event) -> Result<Vec<Event>, ServiceError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(ServiceError::InternalError("lookup failed".into()))
        }
    }

    /// Re-emits whatever it receives
    struct Echo;

    #[async_trait]
    impl EventHandler for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn handle(&self, event: &Event) -> Result<Vec<Event>, ServiceError> {
            Ok(vec![event.clone()])
        }
    }

    fn container_updated() -> Event {
        Event::ContainerUpdated {
            tenant_id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            container_detail_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn follow_up_events_are_processed_and_forwarded() {
        let (tx, mut rx) = mpsc::channel(8);
        let bus = EventBus::new(16)
            .with_sender(EventSender::new(tx))
            .with_handler(Arc::new(Promote));

        let report = bus.publish(container_updated()).await;

        assert_eq!(report.processed, 2);
        assert_eq!(report.failures, 0);
        assert!(!report.truncated);
        assert!(matches!(rx.recv().await, Some(Event::ContainerUpdated { .. })));
        assert!(matches!(
            rx.recv().await,
            Some(Event::ContainerStatusChanged { .. })
        ));
    }

    #[tokio::test]
    async fn handler_failure_is_counted_not_propagated() {
        let failing = Arc::new(Failing(AtomicUsize::new(0)));
        let bus = EventBus::new(16)
            .with_handler(failing.clone())
            .with_handler(Arc::new(Promote));

        let report = bus.publish(container_updated()).await;

        // The failing handler sees both the original and the follow-up.
        assert_eq!(failing.0.load(Ordering::SeqCst), 2);
        assert_eq!(report.failures, 2);
        assert_eq!(report.processed, 2);
    }

    #[tokio::test]
    async fn runaway_cascade_is_truncated() {
        let bus = EventBus::new(5).with_handler(Arc::new(Echo));
        let report = bus.publish(container_updated()).await;
        assert_eq!(report.processed, 5);
        assert!(report.truncated);
    }
}
