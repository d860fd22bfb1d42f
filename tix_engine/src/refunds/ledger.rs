use serde::Serialize;
use thiserror::Error;
use tix_common::Cents;

use crate::db_types::{Order, OrderStatusType, Refund, RefundStatus};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefundError {
    #[error("Refund amounts must be positive. {remaining} is still refundable")]
    InvalidAmount { remaining: Cents },
    #[error("Cannot refund {requested}. Only {remaining} is still refundable")]
    ExceedsRemaining { requested: Cents, remaining: Cents },
}

impl RefundError {
    pub fn remaining(&self) -> Cents {
        match self {
            RefundError::InvalidAmount { remaining } | RefundError::ExceedsRemaining { remaining, .. } => *remaining,
        }
    }
}

/// A validated refund request that has not been sent to the payment gateway yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundIntent {
    pub order_id: i64,
    pub amount: Cents,
    pub reason: Option<String>,
    /// The refundable balance before this refund
    pub remaining_before: Cents,
}

impl RefundIntent {
    pub fn remaining_after(&self) -> Cents {
        self.remaining_before - self.amount
    }
}

/// The portion of the order's charge that reached the business.
pub fn business_transfer_amount(order: &Order) -> Cents {
    order.business_transfer_amount()
}

/// Sum of the succeeded refunds in `refunds`. Failed refunds moved no money and are ignored.
pub fn total_refunded(refunds: &[Refund]) -> Cents {
    refunds.iter().filter(|r| r.status == RefundStatus::Succeeded).map(|r| r.amount).sum()
}

pub fn remaining_refundable(order: &Order, refunds: &[Refund]) -> Cents {
    (business_transfer_amount(order) - total_refunded(refunds)).non_negative()
}

/// Validates a refund of `amount` against the order's refund history.
pub fn request_refund(
    order: &Order,
    amount: Cents,
    reason: Option<String>,
    refunds: &[Refund],
) -> Result<RefundIntent, RefundError> {
    let remaining = remaining_refundable(order, refunds);
    if !amount.is_positive() {
        return Err(RefundError::InvalidAmount { remaining });
    }
    if amount > remaining {
        return Err(RefundError::ExceedsRemaining { requested: amount, remaining });
    }
    Ok(RefundIntent { order_id: order.id, amount, reason, remaining_before: remaining })
}

/// The order status once `refunded_total` has been refunded in total.
pub fn next_order_status(order: &Order, refunded_total: Cents) -> OrderStatusType {
    if refunded_total >= business_transfer_amount(order) {
        OrderStatusType::Refunded
    } else if refunded_total.is_positive() {
        OrderStatusType::PartiallyRefunded
    } else {
        order.status
    }
}
