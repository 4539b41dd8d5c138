//! Event publishing and the outbound queue.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use super::types::DomainEvent;

/// Sink for domain events produced by services.
pub trait EventPublisher: Send + Sync {
    /// Records an event.
    fn publish(&self, event: DomainEvent);
}

/// Events recorded during one request, held until the request's transaction commits.
#[derive(Debug, Default)]
pub struct PendingEvents {
    events: Mutex<Vec<DomainEvent>>,
}

impl PendingEvents {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns all buffered events in publish order.
    pub fn take(&self) -> Vec<DomainEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing was published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends every buffered event to the bus. Returns how many were accepted.
    pub fn forward_to(&self, bus: &EventBus) -> usize {
        self.take()
            .into_iter()
            .map(|event| bus.send(event))
            .filter(|accepted| *accepted)
            .count()
    }
}

impl EventPublisher for PendingEvents {
    fn publish(&self, event: DomainEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Receiving half of the outbound queue.
pub type EventReceiver = mpsc::UnboundedReceiver<DomainEvent>;

/// Sending half of the outbound queue, shared by all request handlers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: mpsc::UnboundedSender<DomainEvent>,
}

impl EventBus {
    /// Creates a bus and the receiver a dispatcher drains.
    #[must_use]
    pub fn channel() -> (Self, EventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Enqueues an event. Returns false once the dispatcher has shut down.
    pub fn send(&self, event: DomainEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, event: DomainEvent) {
        // A closed queue means the server is shutting down.
        let _ = self.send(event);
    }
}
