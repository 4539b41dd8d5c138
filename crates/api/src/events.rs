//! Domain event dispatch.
//!
//! A single task drains the outbound queue and hands every event to each subscriber in
//! registration order.

use std::sync::Arc;

use tally_core::events::{DomainEvent, EventPayload, EventReceiver};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Receives committed domain events.
pub trait EventSubscriber: Send + Sync {
    /// Subscriber name used in logs.
    fn name(&self) -> &'static str;

    /// Handles one event.
    fn handle(&self, event: &DomainEvent);
}

/// Writes an audit record for every event.
#[derive(Debug, Default)]
pub struct AuditLogSubscriber;

impl EventSubscriber for AuditLogSubscriber {
    fn name(&self) -> &'static str {
        "audit_log"
    }

    fn handle(&self, event: &DomainEvent) {
        let subject = match &event.payload {
            EventPayload::ItemCategoryCreated { category }
            | EventPayload::ItemCategoryEdited { category, .. }
            | EventPayload::ItemCategoryDeleted { category } => category.id.to_string(),
            EventPayload::ItemCategoriesBulkDeleted { category_ids } => category_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
            EventPayload::ItemCreated { item_id, .. } => item_id.to_string(),
            EventPayload::ManualJournalCreated { journal_id, .. } => journal_id.to_string(),
        };

        info!(
            target: "tally::audit",
            event = event.name(),
            organization_id = %event.organization_id,
            user_id = %event.user_id,
            occurred_at = %event.occurred_at,
            subject = %subject,
            "audit"
        );
    }
}

/// Fans events out to subscribers.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl EventDispatcher {
    /// Creates a dispatcher without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber.
    #[must_use]
    pub fn with_subscriber(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns true if no subscriber is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Delivers one event to every subscriber.
    pub fn dispatch(&self, event: &DomainEvent) {
        for subscriber in &self.subscribers {
            debug!(event = event.name(), subscriber = subscriber.name(), "dispatching event");
            subscriber.handle(event);
        }
    }

    /// Drains the queue until every sender is dropped.
    pub fn spawn(self, mut receiver: EventReceiver) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                self.dispatch(&event);
            }
            debug!("event queue closed");
        })
    }
}
