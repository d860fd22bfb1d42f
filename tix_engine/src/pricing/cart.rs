use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tix_common::Cents;

use crate::db_types::{Event, TicketType};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Ticket quantities must be positive and within range. Got {0}")]
    InvalidQuantity(i64),
    #[error("Ticket prices cannot be negative. Got {0}")]
    NegativePrice(Cents),
    #[error("Ticket type {0} does not exist for this event")]
    TicketTypeNotFound(i64),
    #[error("Ticket type {0} is not on sale")]
    InactiveTicketType(i64),
    #[error("Only {available} tickets are left, but {requested} were requested")]
    OutOfStock { ticket_type_id: Option<i64>, requested: i64, available: i64 },
}

/// A single entry in a ticket-type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSelection {
    pub ticket_type_id: i64,
    pub quantity: i64,
}

impl TicketSelection {
    pub fn new(ticket_type_id: i64, quantity: i64) -> Self {
        Self { ticket_type_id, quantity }
    }
}

/// What the customer asked to buy.
///
/// Events created before ticket types existed sell a single kind of ticket at the event's price, which is the
/// `Legacy` variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartSelection {
    Legacy { quantity: i64 },
    TicketTypes { items: Vec<TicketSelection> },
}

impl CartSelection {
    pub fn legacy(quantity: i64) -> Self {
        Self::Legacy { quantity }
    }

    pub fn ticket_types<I: IntoIterator<Item = (i64, i64)>>(items: I) -> Self {
        let items = items.into_iter().map(|(id, quantity)| TicketSelection::new(id, quantity)).collect();
        Self::TicketTypes { items }
    }

    /// Merges repeated ticket types into a single entry, keeping the order in which each type first appeared.
    fn merged_items(items: &[TicketSelection]) -> Result<Vec<TicketSelection>, PricingError> {
        let mut merged: Vec<TicketSelection> = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity <= 0 {
                return Err(PricingError::InvalidQuantity(item.quantity));
            }
            match merged.iter_mut().find(|m| m.ticket_type_id == item.ticket_type_id) {
                Some(existing) => {
                    let total = existing.quantity.checked_add(item.quantity);
                    existing.quantity = total.ok_or(PricingError::InvalidQuantity(item.quantity))?;
                },
                None => merged.push(*item),
            }
        }
        if merged.is_empty() {
            return Err(PricingError::EmptyCart);
        }
        Ok(merged)
    }
}

/// A priced line in the cart. `ticket_type_id` is `None` for legacy carts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub ticket_type_id: Option<i64>,
    pub unit_price: Cents,
    pub quantity: i64,
}

impl LineItem {
    pub fn line_total(&self) -> Cents {
        self.unit_price * self.quantity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedItem {
    pub ticket_type_id: i64,
    pub unit_price: Cents,
    pub quantity: i64,
}

/// A cart whose every line has been checked against the catalog and given a price.
///
/// This is also the cart snapshot that travels with a charge, so settlement can rebuild exactly what was paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricedCart {
    Legacy { unit_price: Cents, quantity: i64 },
    TicketTypes { items: Vec<PricedItem> },
}

impl PricedCart {
    pub fn line_items(&self) -> Vec<LineItem> {
        match self {
            PricedCart::Legacy { unit_price, quantity } => {
                vec![LineItem { ticket_type_id: None, unit_price: *unit_price, quantity: *quantity }]
            },
            PricedCart::TicketTypes { items } => items
                .iter()
                .map(|i| LineItem { ticket_type_id: Some(i.ticket_type_id), unit_price: i.unit_price, quantity: i.quantity })
                .collect(),
        }
    }

    pub fn subtotal(&self) -> Cents {
        self.line_items().iter().map(LineItem::line_total).sum()
    }

    pub fn ticket_count(&self) -> i64 {
        self.line_items().iter().map(|l| l.quantity).sum()
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, PricedCart::Legacy { .. })
    }

    /// The subtotal of the lines whose ticket type is in `ticket_type_ids`. Legacy lines never match.
    pub fn subtotal_for(&self, ticket_type_ids: &[i64]) -> Cents {
        self.line_items()
            .iter()
            .filter(|l| l.ticket_type_id.map(|id| ticket_type_ids.contains(&id)).unwrap_or(false))
            .map(LineItem::line_total)
            .sum()
    }

    /// Quantities per ticket type, for inventory bookkeeping.
    pub fn quantities_by_ticket_type(&self) -> BTreeMap<i64, i64> {
        let mut result = BTreeMap::new();
        if let PricedCart::TicketTypes { items } = self {
            for item in items {
                *result.entry(item.ticket_type_id).or_insert(0) += item.quantity;
            }
        }
        result
    }

    /// Sanity checks for a cart that arrived from outside the process (e.g. charge metadata).
    pub fn validate(&self) -> Result<(), PricingError> {
        let lines = self.line_items();
        if lines.is_empty() {
            return Err(PricingError::EmptyCart);
        }
        for line in &lines {
            if line.quantity <= 0 {
                return Err(PricingError::InvalidQuantity(line.quantity));
            }
            if line.unit_price < Cents::ZERO {
                return Err(PricingError::NegativePrice(line.unit_price));
            }
        }
        Ok(())
    }
}

/// Prices `selection` against the current catalog for `event`.
///
/// `ticket_types` is the event's ticket type catalog. Every requested ticket type must exist for the event, be on sale,
/// and have at least the requested quantity available. Legacy selections are checked against the event's own price
/// and ticket counter.
pub fn price_cart(
    selection: &CartSelection,
    event: &Event,
    ticket_types: &[TicketType],
) -> Result<PricedCart, PricingError> {
    match selection {
        CartSelection::Legacy { quantity } => {
            let quantity = *quantity;
            if quantity <= 0 {
                return Err(PricingError::InvalidQuantity(quantity));
            }
            if quantity > event.available_tickets {
                return Err(PricingError::OutOfStock {
                    ticket_type_id: None,
                    requested: quantity,
                    available: event.available_tickets,
                });
            }
            Ok(PricedCart::Legacy { unit_price: event.ticket_price, quantity })
        },
        CartSelection::TicketTypes { items } => {
            let merged = CartSelection::merged_items(items)?;
            let items = merged
                .into_iter()
                .map(|sel| {
                    let tt = ticket_types
                        .iter()
                        .find(|t| t.id == sel.ticket_type_id && t.event_id == event.id)
                        .ok_or(PricingError::TicketTypeNotFound(sel.ticket_type_id))?;
                    if !tt.is_active {
                        return Err(PricingError::InactiveTicketType(tt.id));
                    }
                    if sel.quantity > tt.available_quantity {
                        return Err(PricingError::OutOfStock {
                            ticket_type_id: Some(tt.id),
                            requested: sel.quantity,
                            available: tt.available_quantity,
                        });
                    }
                    Ok(PricedItem { ticket_type_id: tt.id, unit_price: tt.price, quantity: sel.quantity })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(PricedCart::TicketTypes { items })
        },
    }
}
