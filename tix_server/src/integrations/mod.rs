//! Adapters from third-party services to the engine's backend traits and event hooks.
pub mod notifications;
pub mod stripe;
