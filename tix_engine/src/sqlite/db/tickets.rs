use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{NewTicket, Ticket, TicketStatus};

/// Inserts a ticket. This is not atomic on its own; to insert a batch of tickets atomically, call it inside a
/// transaction and pass `&mut *tx` as the connection.
pub async fn insert_ticket(ticket: NewTicket, conn: &mut SqliteConnection) -> Result<Ticket, sqlx::Error> {
    let ticket = sqlx::query_as(
        r#"
            INSERT INTO tickets (order_id, event_id, ticket_type_id, ticket_number, price, qr_code_data)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(ticket.order_id)
    .bind(ticket.event_id)
    .bind(ticket.ticket_type_id)
    .bind(ticket.ticket_number)
    .bind(ticket.price)
    .bind(ticket.qr_code_data)
    .fetch_one(conn)
    .await?;
    Ok(ticket)
}

pub async fn fetch_ticket_by_number(
    ticket_number: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Ticket>, sqlx::Error> {
    let ticket = sqlx::query_as("SELECT * FROM tickets WHERE ticket_number = $1")
        .bind(ticket_number)
        .fetch_optional(conn)
        .await?;
    Ok(ticket)
}

pub async fn fetch_tickets_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Ticket>, sqlx::Error> {
    let tickets =
        sqlx::query_as("SELECT * FROM tickets WHERE order_id = $1 ORDER BY id").bind(order_id).fetch_all(conn).await?;
    Ok(tickets)
}

/// Moves a ticket from `valid` to `used`. Returns `None` if the ticket was not `valid`.
pub async fn check_in_ticket(
    ticket_id: i64,
    at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Ticket>, sqlx::Error> {
    let ticket = sqlx::query_as(
        "UPDATE tickets SET status = $1, checked_in_at = $2 WHERE id = $3 AND status = $4 RETURNING *",
    )
    .bind(TicketStatus::Used)
    .bind(at)
    .bind(ticket_id)
    .bind(TicketStatus::Valid)
    .fetch_optional(conn)
    .await?;
    Ok(ticket)
}

/// Invalidates every ticket of the order that has not been used yet.
pub async fn invalidate_tickets_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE tickets SET status = $1 WHERE order_id = $2 AND status = $3")
        .bind(TicketStatus::Invalid)
        .bind(order_id)
        .bind(TicketStatus::Valid)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
