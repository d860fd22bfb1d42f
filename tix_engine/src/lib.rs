//! Ticketing Engine
//!
//! The ticketing engine turns an event ticket cart into a charge, settles confirmed payments into orders and tickets
//! exactly once, splits every charge between the business, the platform and the payment processor, and keeps a
//! bounded refund ledger. It is provider-agnostic: storage and the payment processor are reached through the traits
//! in [`mod@traits`].
//!
//! The library is divided into these sections:
//! 1. Pure business logic. [`mod@fees`] computes fee breakdowns, [`mod@pricing`] prices carts and applies promo codes,
//!    and [`mod@refunds`] bounds refunds. None of these perform I/O.
//! 2. Backend contracts ([`mod@traits`]) and the SQLite backend that implements them.
//! 3. The public API ([`mod@tix_api`]) that drives the business logic against a backend and a payment gateway.
//!
//! Settlement and refunds emit events that can be subscribed to through [`mod@events`]. Subscribers run off the
//! settlement path and can never block or undo it.
pub mod db_types;
pub mod events;
pub mod fees;
pub mod helpers;
pub mod pricing;
pub mod refunds;
pub mod tix_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
pub use tix_api::{
    checkout_api::{CheckoutApi, MINIMUM_CHARGE},
    checkout_objects,
    errors::{CheckoutError, RefundApiError, SettlementError, TicketApiError},
    refund_api::{RefundApi, RefundOutcome},
    settlement_api::SettlementEngine,
    ticket_api::TicketApi,
};
pub use traits::{
    CatalogManagement,
    CheckoutDatabase,
    InsertOrderResult,
    PaymentGateway,
    RefundManagement,
    SettlementDatabase,
    StoreError,
    TicketManagement,
};
