//! # Ticketing engine public API
//!
//! The API is modular. Each API owns a backend that implements the traits it needs, so clients only have to supply
//! what they use.
//!
//! * [`checkout_api`] prices carts, creates charges, verifies payments and creates free orders.
//! * [`settlement_api`] records a confirmed payment as an order with tickets, exactly once per payment.
//! * [`refund_api`] issues bounded refunds and keeps the refund ledger.
//! * [`ticket_api`] lists and checks in tickets.
//!
//! # API usage
//!
//! ```rust,ignore
//! use tix_engine::{events::EventProducers, CheckoutApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = CheckoutApi::new(db, gateway, EventProducers::default());
//! let estimate = api.estimate(&request).await?;
//! ```
pub mod checkout_api;
pub mod checkout_objects;
pub mod errors;
pub mod refund_api;
pub mod settlement_api;
pub mod ticket_api;
