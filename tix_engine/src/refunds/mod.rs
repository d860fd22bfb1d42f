//! The refund ledger.
//!
//! Refunds are bounded by what the business actually received for an order, `subtotal - discount + tax`. Platform and
//! processor fees were never part of that amount, so they are never refundable. The functions here are pure; the
//! [`crate::RefundApi`] drives them against a backend and the payment gateway.
mod ledger;
mod legacy;

pub use ledger::{
    business_transfer_amount,
    next_order_status,
    remaining_refundable,
    request_refund,
    total_refunded,
    RefundError,
    RefundIntent,
};
pub use legacy::{find_legacy_charge, LegacyChargeError, LEGACY_AMOUNT_TOLERANCE, LEGACY_SEARCH_LIMIT};
