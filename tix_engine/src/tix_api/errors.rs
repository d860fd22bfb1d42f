use chrono::{DateTime, Utc};
use thiserror::Error;
use tix_common::Cents;

use crate::{
    db_types::OrderStatusType,
    fees::FeePolicyError,
    pricing::{PricingError, PromoError},
    refunds::RefundError,
    tix_api::checkout_objects::MetadataError,
    traits::{ChargeStatus, GatewayError, StoreError},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Invalid checkout request. {0}")]
    ValidationError(String),
    #[error("Event {0} does not exist")]
    EventNotFound(i64),
    #[error("Event {0} is not currently selling tickets")]
    EventNotActive(i64),
    #[error("The business that runs this event ({0}) does not exist")]
    BusinessNotFound(i64),
    #[error("The business that runs this event ({0}) cannot accept payments yet")]
    BusinessNotConnected(i64),
    #[error("The fee configuration is invalid. {0}")]
    FeePolicy(#[from] FeePolicyError),
    #[error("{0}")]
    Pricing(#[from] PricingError),
    #[error("{0}")]
    Promo(#[from] PromoError),
    #[error("This order is free. Use the free checkout instead")]
    UseFreeCheckout,
    #[error("This order is not free. It costs {0}")]
    NotFree(Cents),
    #[error("The total of {total} is below the minimum card charge of {minimum}")]
    BelowMinimumCharge { total: Cents, minimum: Cents },
    #[error("Payment {reference} has not been completed (status: {status:?})")]
    PaymentNotConfirmed { reference: String, status: ChargeStatus },
    #[error("This order is too large to pay for in one payment. {0}")]
    OrderTooLarge(String),
    #[error("The payment's order details are unusable. {0}")]
    InvalidChargeMetadata(#[from] MetadataError),
    #[error("The payment captured {charged}, but the order total is {expected}")]
    AmountMismatch { charged: Cents, expected: Cents },
    #[error("{0}")]
    Settlement(#[from] SettlementError),
    #[error("Payment gateway error. {0}")]
    Gateway(#[from] GatewayError),
    #[error("Database error. {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    #[error("Cannot settle an order for event {0}, because it does not exist")]
    EventNotFound(i64),
    #[error("Could not record the order. {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Error)]
pub enum RefundApiError {
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Orders with status '{0}' cannot be refunded")]
    RefundNotAllowed(OrderStatusType),
    #[error("{0}")]
    Ledger(#[from] RefundError),
    #[error("The original payment for order {0} could not be identified")]
    PaymentReferenceNotFound(String),
    #[error("The payment processor did not complete the refund. {0}")]
    RefundFailed(String),
    #[error("Payment gateway error. {0}")]
    Gateway(#[from] GatewayError),
    #[error("Database error. {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Error)]
pub enum TicketApiError {
    #[error("Ticket {0} does not exist")]
    TicketNotFound(String),
    #[error("Ticket was already checked in{}", .0.map(|t| format!(" at {t}")).unwrap_or_default())]
    AlreadyCheckedIn(Option<DateTime<Utc>>),
    #[error("Ticket {0} is no longer valid")]
    TicketInvalid(String),
    #[error("Database error. {0}")]
    Store(#[from] StoreError),
}
