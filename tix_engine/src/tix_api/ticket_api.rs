use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{Ticket, TicketStatus},
    tix_api::errors::TicketApiError,
    traits::TicketManagement,
};

/// Door-side ticket operations.
pub struct TicketApi<B> {
    db: B,
}

impl<B> Debug for TicketApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TicketApi")
    }
}

impl<B> TicketApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> TicketApi<B>
where B: TicketManagement
{
    pub async fn tickets_for_order(&self, order_id: i64) -> Result<Vec<Ticket>, TicketApiError> {
        let tickets = self.db.fetch_tickets_for_order(order_id).await?;
        Ok(tickets)
    }

    /// Admits the holder of `ticket_number`. A ticket can only be checked in once.
    pub async fn check_in(&self, ticket_number: &str) -> Result<Ticket, TicketApiError> {
        let ticket = self.fetch_ticket(ticket_number).await?;
        check_status(&ticket)?;
        match self.db.check_in_ticket(ticket.id, Utc::now()).await? {
            Some(ticket) => {
                info!("🎟️ Ticket {ticket_number} checked in for event #{}", ticket.event_id);
                Ok(ticket)
            },
            None => {
                // Lost a race with another check-in (or a refund). Report the current state.
                let ticket = self.fetch_ticket(ticket_number).await?;
                check_status(&ticket)?;
                Err(TicketApiError::TicketInvalid(ticket_number.to_string()))
            },
        }
    }

    async fn fetch_ticket(&self, ticket_number: &str) -> Result<Ticket, TicketApiError> {
        self.db
            .fetch_ticket_by_number(ticket_number)
            .await?
            .ok_or_else(|| TicketApiError::TicketNotFound(ticket_number.to_string()))
    }
}

fn check_status(ticket: &Ticket) -> Result<(), TicketApiError> {
    match ticket.status {
        TicketStatus::Valid => Ok(()),
        TicketStatus::Used => {
            debug!("🎟️ Ticket {} was already used", ticket.ticket_number);
            Err(TicketApiError::AlreadyCheckedIn(ticket.checked_in_at))
        },
        TicketStatus::Invalid => Err(TicketApiError::TicketInvalid(ticket.ticket_number.clone())),
    }
}
