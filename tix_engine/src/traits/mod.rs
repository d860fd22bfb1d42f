//! # Backend interfaces
//!
//! This module defines the contracts that storage backends and payment processors must satisfy to be driven by the
//! engine. The engine's APIs are generic over these traits, so that the business logic never depends on a particular
//! database or payment processor.
//!
//! ## Traits
//! * [`CatalogManagement`] reads events, ticket types, businesses, promo codes and the platform fee defaults.
//! * [`TicketManagement`] reads tickets and records check-ins.
//! * [`SettlementDatabase`] turns a confirmed payment into durable orders, tickets and inventory changes. Its
//!   [`SettlementDatabase::insert_order`] method must be an atomic unique insert keyed on the payment reference, since
//!   that is the only thing standing between concurrent verification requests and a double settlement.
//! * [`RefundManagement`] keeps the refund ledger and order status.
//! * [`PaymentGateway`] is the external payment processor: charges, charge lookups and refunds.
//!
//! [`CheckoutDatabase`] bundles the traits that the checkout flow needs and is implemented automatically.
mod catalog_management;
mod data_objects;
mod payment_gateway;
mod refund_management;
mod settlement_database;
mod ticket_management;

pub use catalog_management::CatalogManagement;
pub use data_objects::{InsertOrderResult, StoreError};
pub use payment_gateway::{
    ChargeCreated,
    ChargeRecord,
    ChargeRequest,
    ChargeStatus,
    GatewayError,
    GatewayRefund,
    GatewayRefundRequest,
    GatewayRefundStatus,
    PaymentGateway,
};
pub use refund_management::RefundManagement;
pub use settlement_database::SettlementDatabase;
pub use ticket_management::TicketManagement;

/// Everything the checkout and settlement flow needs from a backend.
pub trait CheckoutDatabase: CatalogManagement + SettlementDatabase {}

impl<T> CheckoutDatabase for T where T: CatalogManagement + SettlementDatabase {}
