mod steps;
mod world;

pub use world::{TicketingSystem, TicketingWorld};
