use sqlx::{types::Json, SqliteConnection};

use crate::{
    db_types::{
        Business,
        Discount,
        DiscountType,
        Event,
        NewBusiness,
        NewEvent,
        NewPromoCode,
        NewTicketType,
        PlatformSettings,
        PromoCode,
        TicketType,
    },
    traits::StoreError,
};

pub async fn fetch_platform_settings(conn: &mut SqliteConnection) -> Result<Option<PlatformSettings>, sqlx::Error> {
    let settings = sqlx::query_as("SELECT * FROM platform_settings WHERE id = 1").fetch_optional(conn).await?;
    Ok(settings)
}

pub async fn update_platform_settings(
    settings: &PlatformSettings,
    conn: &mut SqliteConnection,
) -> Result<PlatformSettings, sqlx::Error> {
    let settings = sqlx::query_as(
        r#"
            INSERT INTO platform_settings (
                id,
                platform_fee_type,
                flat_fee_amount,
                percentage_fee,
                stripe_fee_payer,
                platform_fee_payer
            ) VALUES (1, $1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                platform_fee_type = excluded.platform_fee_type,
                flat_fee_amount = excluded.flat_fee_amount,
                percentage_fee = excluded.percentage_fee,
                stripe_fee_payer = excluded.stripe_fee_payer,
                platform_fee_payer = excluded.platform_fee_payer,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(settings.platform_fee_type)
    .bind(settings.flat_fee_amount)
    .bind(settings.percentage_fee)
    .bind(settings.stripe_fee_payer)
    .bind(settings.platform_fee_payer)
    .fetch_one(conn)
    .await?;
    Ok(settings)
}

pub async fn insert_business(business: NewBusiness, conn: &mut SqliteConnection) -> Result<Business, sqlx::Error> {
    let business = sqlx::query_as(
        r#"
            INSERT INTO businesses (
                name,
                email,
                stripe_account_id,
                use_custom_fees,
                platform_fee_type,
                flat_fee_amount,
                percentage_fee,
                stripe_fee_payer,
                platform_fee_payer,
                tax_percentage
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *;
        "#,
    )
    .bind(business.name)
    .bind(business.email)
    .bind(business.stripe_account_id)
    .bind(business.use_custom_fees)
    .bind(business.platform_fee_type)
    .bind(business.flat_fee_amount)
    .bind(business.percentage_fee)
    .bind(business.stripe_fee_payer)
    .bind(business.platform_fee_payer)
    .bind(business.tax_percentage)
    .fetch_one(conn)
    .await?;
    Ok(business)
}

pub async fn fetch_business(id: i64, conn: &mut SqliteConnection) -> Result<Option<Business>, sqlx::Error> {
    let business = sqlx::query_as("SELECT * FROM businesses WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(business)
}

pub async fn insert_event(event: NewEvent, conn: &mut SqliteConnection) -> Result<Event, sqlx::Error> {
    let event = sqlx::query_as(
        r#"
            INSERT INTO events (business_id, title, ticket_price, total_tickets, available_tickets, starts_at)
            VALUES ($1, $2, $3, $4, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(event.business_id)
    .bind(event.title)
    .bind(event.ticket_price)
    .bind(event.total_tickets)
    .bind(event.starts_at)
    .fetch_one(conn)
    .await?;
    Ok(event)
}

pub async fn fetch_event(id: i64, conn: &mut SqliteConnection) -> Result<Option<Event>, sqlx::Error> {
    let event = sqlx::query_as("SELECT * FROM events WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(event)
}

pub async fn set_event_active(id: i64, active: bool, conn: &mut SqliteConnection) -> Result<Option<Event>, sqlx::Error> {
    let event = sqlx::query_as("UPDATE events SET is_active = $1 WHERE id = $2 RETURNING *")
        .bind(active)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(event)
}

/// Reduces the event's available ticket count by `quantity`, stopping at zero.
///
/// Returns the number of tickets that were not covered by the remaining stock.
pub async fn decrement_event_inventory(
    event_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<i64, StoreError> {
    let result = sqlx::query(
        "UPDATE events SET available_tickets = available_tickets - $1 WHERE id = $2 AND available_tickets >= $1",
    )
    .bind(quantity)
    .bind(event_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        return Ok(0);
    }
    let event = fetch_event(event_id, conn).await?.ok_or(StoreError::RecordNotFound(format!("event #{event_id}")))?;
    sqlx::query("UPDATE events SET available_tickets = MAX(available_tickets - $1, 0) WHERE id = $2")
        .bind(quantity)
        .bind(event_id)
        .execute(conn)
        .await?;
    Ok(quantity - event.available_tickets.max(0))
}

pub async fn insert_ticket_type(ticket_type: NewTicketType, conn: &mut SqliteConnection) -> Result<TicketType, sqlx::Error> {
    let ticket_type = sqlx::query_as(
        r#"
            INSERT INTO ticket_types (event_id, name, price, total_quantity, available_quantity, is_active)
            VALUES ($1, $2, $3, $4, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(ticket_type.event_id)
    .bind(ticket_type.name)
    .bind(ticket_type.price)
    .bind(ticket_type.total_quantity)
    .bind(ticket_type.is_active)
    .fetch_one(conn)
    .await?;
    Ok(ticket_type)
}

pub async fn fetch_ticket_type(id: i64, conn: &mut SqliteConnection) -> Result<Option<TicketType>, sqlx::Error> {
    let ticket_type = sqlx::query_as("SELECT * FROM ticket_types WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(ticket_type)
}

pub async fn fetch_ticket_types_for_event(
    event_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<TicketType>, sqlx::Error> {
    let ticket_types = sqlx::query_as("SELECT * FROM ticket_types WHERE event_id = $1 ORDER BY id")
        .bind(event_id)
        .fetch_all(conn)
        .await?;
    Ok(ticket_types)
}

/// Reduces the ticket type's available quantity by `quantity`, stopping at zero.
///
/// Returns the number of tickets that were not covered by the remaining stock.
pub async fn decrement_ticket_type_inventory(
    ticket_type_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<i64, StoreError> {
    let result = sqlx::query(
        r#"
            UPDATE ticket_types SET available_quantity = available_quantity - $1
            WHERE id = $2 AND available_quantity >= $1
        "#,
    )
    .bind(quantity)
    .bind(ticket_type_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        return Ok(0);
    }
    let tt = fetch_ticket_type(ticket_type_id, conn)
        .await?
        .ok_or(StoreError::RecordNotFound(format!("ticket type #{ticket_type_id}")))?;
    sqlx::query("UPDATE ticket_types SET available_quantity = MAX(available_quantity - $1, 0) WHERE id = $2")
        .bind(quantity)
        .bind(ticket_type_id)
        .execute(conn)
        .await?;
    Ok(quantity - tt.available_quantity.max(0))
}

pub async fn insert_promo_code(promo: NewPromoCode, conn: &mut SqliteConnection) -> Result<PromoCode, sqlx::Error> {
    let (discount_type, discount_value) = match promo.discount {
        Discount::Percentage(pct) => (DiscountType::Percentage, pct.basis_points()),
        Discount::Fixed(amount) => (DiscountType::Fixed, amount.value()),
    };
    let promo = sqlx::query_as(
        r#"
            INSERT INTO promo_codes (
                event_id,
                code,
                discount_type,
                discount_value,
                max_uses,
                valid_from,
                valid_until,
                is_active,
                applicable_ticket_type_ids
            ) VALUES ($1, UPPER($2), $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(promo.event_id)
    .bind(promo.code)
    .bind(discount_type)
    .bind(discount_value)
    .bind(promo.max_uses)
    .bind(promo.valid_from)
    .bind(promo.valid_until)
    .bind(promo.is_active)
    .bind(promo.applicable_ticket_type_ids.map(Json))
    .fetch_one(conn)
    .await?;
    Ok(promo)
}

/// Case-insensitive promo code lookup, scoped to the event.
pub async fn fetch_promo_code(
    event_id: i64,
    code: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PromoCode>, sqlx::Error> {
    let promo = sqlx::query_as("SELECT * FROM promo_codes WHERE event_id = $1 AND code = UPPER($2)")
        .bind(event_id)
        .bind(code.trim())
        .fetch_optional(conn)
        .await?;
    Ok(promo)
}

/// Records one use of a promo code. Fails with [`StoreError::UsageLimitReached`], and changes nothing, if the code
/// has already been used `max_uses` times.
pub async fn increment_promo_usage(promo_code_id: i64, conn: &mut SqliteConnection) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
            UPDATE promo_codes SET current_uses = current_uses + 1
            WHERE id = $1 AND (max_uses IS NULL OR current_uses < max_uses)
        "#,
    )
    .bind(promo_code_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        return Ok(());
    }
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM promo_codes WHERE id = $1")
        .bind(promo_code_id)
        .fetch_optional(conn)
        .await?;
    if existing.is_some() {
        Err(StoreError::UsageLimitReached(format!("promo code #{promo_code_id}")))
    } else {
        Err(StoreError::RecordNotFound(format!("promo code #{promo_code_id}")))
    }
}
