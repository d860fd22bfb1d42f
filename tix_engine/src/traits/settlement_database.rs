use crate::{
    db_types::{NewOrder, NewTicket, Order, Ticket},
    traits::{InsertOrderResult, StoreError, TicketManagement},
};

/// The storage side of settlement.
///
/// Settlement converts a confirmed payment into an order, its tickets, and inventory changes, exactly once per payment
/// reference.
#[allow(async_fn_in_trait)]
pub trait SettlementDatabase: TicketManagement {
    async fn fetch_order_by_payment_reference(&self, reference: &str) -> Result<Option<Order>, StoreError>;

    /// Inserts the order in a single atomic step.
    ///
    /// If the order carries a payment reference and an order with that reference already exists, nothing is written
    /// and the existing order is returned as [`InsertOrderResult::AlreadyExists`]. Orders without a payment reference
    /// (free orders) are always inserted.
    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, StoreError>;

    /// Reduces the available quantity of a ticket type by `quantity`, never below zero. Returns the shortfall: the
    /// number of tickets sold beyond the stock that was left, which is zero unless the ticket type is oversold.
    async fn decrement_ticket_type_inventory(&self, ticket_type_id: i64, quantity: i64) -> Result<i64, StoreError>;

    /// Reduces the available ticket count of a single-price event by `quantity`, never below zero. Returns the
    /// shortfall, as for [`Self::decrement_ticket_type_inventory`].
    async fn decrement_event_inventory(&self, event_id: i64, quantity: i64) -> Result<i64, StoreError>;

    /// Inserts all the tickets in a single transaction.
    async fn insert_tickets(&self, tickets: Vec<NewTicket>) -> Result<Vec<Ticket>, StoreError>;

    /// Records one use of a promo code. Fails with [`StoreError::UsageLimitReached`], and changes nothing, if the
    /// code's `max_uses` would be exceeded.
    async fn increment_promo_usage(&self, promo_code_id: i64) -> Result<(), StoreError>;
}
