//! # Ticketing settlement server
//!
//! An actix-web front end for the `tix_engine` crate. It exposes the checkout flow (estimates, payment intents,
//! payment verification and free orders), refunds, and door-side ticket check-in over a JSON HTTP API.
//!
//! The server holds no business logic of its own. Each route unpacks the request, calls one engine API, and maps the
//! result (or the error) to an HTTP response. Payments go through Stripe destination charges via
//! [`integrations::stripe::StripeGateway`].
//!
//! Configuration is read from environment variables. See [`config::ServerConfig`].
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
