//! Event hooks for the downstream consumers of settlements and refunds.
//!
//! Ticket PDFs and confirmation e-mails are produced by separate services that follow the [`NOTIFICATION_LOG_TARGET`]
//! log target. Every record on that target is a [`Notification`] encoded as a single JSON object after the `📬️ `
//! prefix, and that JSON shape is what those services depend on. The hooks run on their own tasks and never affect
//! the request that triggered them.
use log::*;
use serde::Serialize;
use tix_common::Cents;
use tix_engine::events::{EventHandlers, EventHooks, OrderSettledEvent, RefundRecordedEvent};

pub const NOTIFICATION_LOG_TARGET: &str = "tix::notifications";
const NOTIFICATION_EVENT_BUFFER_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    OrderSettled {
        order_id: i64,
        order_number: String,
        event_id: i64,
        customer_name: String,
        customer_email: String,
        total: Cents,
        ticket_numbers: Vec<String>,
    },
    RefundRecorded {
        order_id: i64,
        order_number: String,
        customer_email: String,
        amount: Cents,
        order_status: String,
    },
}

impl From<&OrderSettledEvent> for Notification {
    fn from(ev: &OrderSettledEvent) -> Self {
        let order = &ev.order;
        Notification::OrderSettled {
            order_id: order.id,
            order_number: order.order_number.clone(),
            event_id: order.event_id,
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            total: order.total,
            ticket_numbers: ev.tickets.iter().map(|t| t.ticket_number.clone()).collect(),
        }
    }
}

impl From<&RefundRecordedEvent> for Notification {
    fn from(ev: &RefundRecordedEvent) -> Self {
        Notification::RefundRecorded {
            order_id: ev.order.id,
            order_number: ev.order.order_number.clone(),
            customer_email: ev.order.customer_email.clone(),
            amount: ev.refund.amount,
            order_status: ev.order.status.to_string(),
        }
    }
}

fn publish(notification: &Notification) {
    match serde_json::to_string(notification) {
        Ok(json) => info!(target: NOTIFICATION_LOG_TARGET, "📬️ {json}"),
        Err(e) => error!(target: NOTIFICATION_LOG_TARGET, "📬️ Could not encode notification {notification:?}. {e}"),
    }
}

pub fn create_notification_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_settled(|ev| {
        let notification = Notification::from(&ev);
        Box::pin(async move { publish(&notification) })
    });
    hooks.on_refund_recorded(|ev| {
        let notification = Notification::from(&ev);
        Box::pin(async move { publish(&notification) })
    });
    EventHandlers::new(NOTIFICATION_EVENT_BUFFER_SIZE, hooks)
}
