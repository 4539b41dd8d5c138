//! Domain events and the outbound event queue.
//!
//! Services record events on an [`EventPublisher`]. Request handlers collect them in
//! [`PendingEvents`] and forward them to the [`EventBus`] only after the surrounding database
//! transaction committed, so subscribers never observe rolled-back changes.

pub mod queue;
pub mod types;

pub use queue::{EventBus, EventPublisher, EventReceiver, PendingEvents};
pub use types::{DomainEvent, EventPayload};
