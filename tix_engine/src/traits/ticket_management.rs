use chrono::{DateTime, Utc};

use crate::{db_types::Ticket, traits::StoreError};

#[allow(async_fn_in_trait)]
pub trait TicketManagement {
    async fn fetch_ticket_by_number(&self, ticket_number: &str) -> Result<Option<Ticket>, StoreError>;

    async fn fetch_tickets_for_order(&self, order_id: i64) -> Result<Vec<Ticket>, StoreError>;

    /// Marks the ticket as `used` at time `at`, but only if it is currently `valid`.
    ///
    /// Returns the updated ticket, or `None` if the ticket was not valid (already used, or invalidated) at the time of
    /// the update. The check and the update must be a single atomic operation.
    async fn check_in_ticket(&self, ticket_id: i64, at: DateTime<Utc>) -> Result<Option<Ticket>, StoreError>;
}
