use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderStatusType},
    traits::{InsertOrderResult, StoreError},
};

/// Inserts the order unless an order with the same payment reference exists.
///
/// The check and the insert are one statement, so two concurrent inserts for the same reference cannot both succeed.
pub async fn idempotent_insert(order: NewOrder, conn: &mut SqliteConnection) -> Result<InsertOrderResult, StoreError> {
    let reference = order.payment_reference.clone();
    match insert_order(order, conn).await? {
        Some(order) => {
            debug!("🗃️ Order {} inserted with id {}", order.order_number, order.id);
            Ok(InsertOrderResult::Inserted(order))
        },
        None => {
            let reference = reference.unwrap_or_default();
            let existing = fetch_order_by_payment_reference(&reference, conn)
                .await?
                .ok_or_else(|| StoreError::RecordNotFound(format!("order for payment {reference}")))?;
            debug!("🗃️ Order for payment {reference} already exists as {}", existing.order_number);
            Ok(InsertOrderResult::AlreadyExists(existing))
        },
    }
}

/// Returns `None` if the payment reference is already taken.
async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                event_id,
                customer_name,
                customer_email,
                customer_phone,
                quantity,
                subtotal,
                discount_amount,
                promo_code,
                promo_code_id,
                tax_amount,
                tax_percentage,
                platform_fee,
                stripe_fee,
                application_fee,
                total,
                payment_reference,
                status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            ON CONFLICT (payment_reference) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(order.order_number)
    .bind(order.event_id)
    .bind(order.customer_name)
    .bind(order.customer_email)
    .bind(order.customer_phone)
    .bind(order.quantity)
    .bind(order.subtotal)
    .bind(order.discount_amount)
    .bind(order.promo_code)
    .bind(order.promo_code_id)
    .bind(order.tax_amount)
    .bind(order.tax_percentage)
    .bind(order.platform_fee)
    .bind(order.stripe_fee)
    .bind(order.application_fee)
    .bind(order.total)
    .bind(order.payment_reference)
    .bind(order.status)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_payment_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE payment_reference = $1")
        .bind(reference)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_orders_for_event(event_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE event_id = $1 ORDER BY created_at, id")
        .bind(event_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

pub async fn update_order_status(
    id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, StoreError> {
    let order: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(conn)
            .await?;
    order.ok_or_else(|| StoreError::RecordNotFound(format!("order #{id}")))
}
