//! Stateless publish-subscribe hooks.
//!
//! Downstream consumers (ticket PDFs, confirmation e-mails, analytics) subscribe to settlement and refund events here
//! rather than being called directly from the settlement path. A failing or slow hook can never hold up or undo a
//! settlement.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
