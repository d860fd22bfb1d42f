use serde::{Deserialize, Serialize};

use crate::db_types::{Order, Refund, Ticket};

/// Published once, when a payment is first settled into an order. Repeat verifications of the same payment do not
/// publish it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSettledEvent {
    pub order: Order,
    pub tickets: Vec<Ticket>,
}

impl OrderSettledEvent {
    pub fn new(order: Order, tickets: Vec<Ticket>) -> Self {
        Self { order, tickets }
    }
}

/// Published after a refund has gone through at the payment processor. `order` carries the updated status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRecordedEvent {
    pub order: Order,
    pub refund: Refund,
}

impl RefundRecordedEvent {
    pub fn new(order: Order, refund: Refund) -> Self {
        Self { order, refund }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    OrderSettled(OrderSettledEvent),
    RefundRecorded(RefundRecordedEvent),
}
