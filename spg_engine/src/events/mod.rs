//! Order lifecycle events.
//!
//! Other parts of the system (fulfilment, notification emails, analytics) can hook into these without the payment
//! flows knowing about them. See [`EventHooks`].
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
