use sqlx::SqliteConnection;

use crate::db_types::{NewRefund, Refund, RefundStatus};

pub async fn insert_refund(refund: NewRefund, conn: &mut SqliteConnection) -> Result<Refund, sqlx::Error> {
    let refund = sqlx::query_as(
        r#"
            INSERT INTO refunds (order_id, amount, reason, refund_reference, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(refund.order_id)
    .bind(refund.amount)
    .bind(refund.reason)
    .bind(refund.refund_reference)
    .bind(refund.status)
    .fetch_one(conn)
    .await?;
    Ok(refund)
}

pub async fn fetch_refunds_for_order(
    order_id: i64,
    status: Option<RefundStatus>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Refund>, sqlx::Error> {
    let refunds = match status {
        Some(status) => {
            sqlx::query_as("SELECT * FROM refunds WHERE order_id = $1 AND status = $2 ORDER BY created_at, id")
                .bind(order_id)
                .bind(status)
                .fetch_all(conn)
                .await?
        },
        None => {
            sqlx::query_as("SELECT * FROM refunds WHERE order_id = $1 ORDER BY created_at, id")
                .bind(order_id)
                .fetch_all(conn)
                .await?
        },
    };
    Ok(refunds)
}
