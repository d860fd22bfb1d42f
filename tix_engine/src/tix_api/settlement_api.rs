//! Settlement turns a confirmed payment into durable records, exactly once per payment reference.
//!
//! The order insert is the commit point. Once it succeeds the customer's money is accounted for, and everything after
//! it (inventory, tickets, promo usage) is best effort: failures are logged for operators to repair, but never undo the
//! order.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, NewTicket, Order, OrderStatusType, Ticket},
    events::{EventProducers, OrderSettledEvent},
    helpers::{new_order_number, new_ticket_number, qr_code_data},
    pricing::PricedCart,
    tix_api::{
        checkout_objects::{ChargeMetadata, SettledOrder, SettlementResult},
        errors::SettlementError,
    },
    traits::{CheckoutDatabase, InsertOrderResult, StoreError},
};

pub struct SettlementEngine<'a, B> {
    db: &'a B,
    producers: &'a EventProducers,
}

impl<B> Debug for SettlementEngine<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettlementEngine")
    }
}

impl<'a, B> SettlementEngine<'a, B>
where B: CheckoutDatabase
{
    pub fn new(db: &'a B, producers: &'a EventProducers) -> Self {
        Self { db, producers }
    }

    /// Returns the settled order for `reference`, if there is one.
    pub async fn existing_settlement(&self, reference: &str) -> Result<Option<SettledOrder>, SettlementError> {
        match self.db.fetch_order_by_payment_reference(reference).await? {
            Some(order) => Ok(Some(self.load_settled_order(order).await?)),
            None => Ok(None),
        }
    }

    /// Settles a payment described by `metadata`.
    ///
    /// `reference` is the payment reference, and is `None` for free orders. If an order already exists for the
    /// reference, it is returned unchanged as [`SettlementResult::AlreadySettled`] and nothing else happens. The same
    /// applies if a concurrent settlement of the same reference wins the race to insert the order.
    pub async fn settle(
        &self,
        reference: Option<&str>,
        metadata: &ChargeMetadata,
    ) -> Result<SettlementResult, SettlementError> {
        if let Some(reference) = reference {
            if let Some(existing) = self.existing_settlement(reference).await? {
                debug!("🧾️ Payment {reference} was already settled as {}", existing.order.order_number);
                return Ok(SettlementResult::AlreadySettled(existing));
            }
        }
        let new_order = new_order_from_metadata(reference, metadata);
        let order = match self.db.insert_order(new_order).await? {
            InsertOrderResult::Inserted(order) => order,
            InsertOrderResult::AlreadyExists(order) => {
                info!(
                    "🧾️ Payment {} was settled concurrently as {}. Returning the existing order",
                    reference.unwrap_or_default(),
                    order.order_number
                );
                let existing = self.load_settled_order(order).await?;
                return Ok(SettlementResult::AlreadySettled(existing));
            },
        };
        info!("🧾️ Order {} created for {} ({})", order.order_number, order.customer_email, order.total);
        self.decrement_inventory(&order, &metadata.cart).await;
        let tickets = self.issue_tickets(&order, &metadata.cart).await;
        if let Some(promo_id) = metadata.promo_code_id {
            match self.db.increment_promo_usage(promo_id).await {
                Ok(()) => {},
                Err(StoreError::UsageLimitReached(_)) => error!(
                    "🧾️ Promo code #{promo_id} was over-redeemed by order {}. The payment was captured, so the order \
                     stands, but the code's usage count was left at its limit.",
                    order.order_number
                ),
                Err(e) => {
                    error!("🧾️ Could not record use of promo code #{promo_id} for order {}. {e}", order.order_number)
                },
            }
        }
        let settled = SettledOrder { order, tickets, event_title: metadata.event_title.clone() };
        self.producers.publish_order_settled(OrderSettledEvent::new(settled.order.clone(), settled.tickets.clone())).await;
        Ok(SettlementResult::Settled(settled))
    }

    async fn load_settled_order(&self, order: Order) -> Result<SettledOrder, SettlementError> {
        let tickets = self.db.fetch_tickets_for_order(order.id).await?;
        let event = self.db.fetch_event(order.event_id).await?.ok_or(SettlementError::EventNotFound(order.event_id))?;
        Ok(SettledOrder { order, tickets, event_title: event.title })
    }

    async fn decrement_inventory(&self, order: &Order, cart: &PricedCart) {
        match cart {
            PricedCart::Legacy { quantity, .. } => {
                match self.db.decrement_event_inventory(order.event_id, *quantity).await {
                    Ok(0) => {},
                    Ok(shortfall) => error!(
                        "🧾️ Event #{} is oversold by {shortfall} tickets after order {}. Its inventory is now zero.",
                        order.event_id, order.order_number
                    ),
                    Err(e) => error!(
                        "🧾️ Could not reduce inventory for event #{} by {quantity} for order {}. {e}",
                        order.event_id, order.order_number
                    ),
                }
            },
            PricedCart::TicketTypes { .. } => {
                for (ticket_type_id, quantity) in cart.quantities_by_ticket_type() {
                    match self.db.decrement_ticket_type_inventory(ticket_type_id, quantity).await {
                        Ok(0) => {},
                        Ok(shortfall) => error!(
                            "🧾️ Ticket type #{ticket_type_id} is oversold by {shortfall} tickets after order {}. Its \
                             inventory is now zero.",
                            order.order_number
                        ),
                        Err(e) => error!(
                            "🧾️ Could not reduce inventory for ticket type #{ticket_type_id} by {quantity} for order \
                             {}. {e}",
                            order.order_number
                        ),
                    }
                }
            },
        }
    }

    async fn issue_tickets(&self, order: &Order, cart: &PricedCart) -> Vec<Ticket> {
        let tickets = cart
            .line_items()
            .into_iter()
            .flat_map(|line| (0..line.quantity).map(move |_| line))
            .map(|line| {
                let ticket_number = new_ticket_number();
                let qr_code_data = qr_code_data(&ticket_number, order.event_id, order.id);
                NewTicket {
                    order_id: order.id,
                    event_id: order.event_id,
                    ticket_type_id: line.ticket_type_id,
                    ticket_number,
                    price: line.unit_price,
                    qr_code_data,
                }
            })
            .collect::<Vec<_>>();
        let count = tickets.len();
        match self.db.insert_tickets(tickets).await {
            Ok(tickets) => {
                debug!("🧾️ {count} tickets issued for order {}", order.order_number);
                tickets
            },
            Err(e) => {
                error!(
                    "🧾️ Could not issue {count} tickets for order {}. The order stands and its tickets must be \
                     reissued. {e}",
                    order.order_number
                );
                Vec::new()
            },
        }
    }
}

fn new_order_from_metadata(reference: Option<&str>, metadata: &ChargeMetadata) -> NewOrder {
    let fees = &metadata.fees;
    NewOrder {
        order_number: new_order_number(),
        event_id: metadata.event_id,
        customer_name: metadata.customer.name.trim().to_string(),
        customer_email: metadata.customer.email.trim().to_string(),
        customer_phone: metadata.customer.phone.clone(),
        quantity: metadata.cart.ticket_count(),
        subtotal: fees.subtotal,
        discount_amount: fees.discount,
        promo_code: metadata.promo_code.clone(),
        promo_code_id: metadata.promo_code_id,
        tax_amount: fees.tax,
        tax_percentage: fees.tax_percentage,
        platform_fee: fees.customer_platform_fee,
        stripe_fee: fees.customer_processor_fee,
        application_fee: fees.application_fee,
        total: fees.total,
        payment_reference: reference.map(String::from),
        status: OrderStatusType::Completed,
    }
}
