//! `SqliteDatabase` is a concrete implementation of a ticketing engine backend.
//!
//! It uses SQLite as the backend and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{catalog, db_url, new_pool, orders, refunds, tickets};
use crate::{
    db_types::{
        Business,
        Event,
        NewBusiness,
        NewEvent,
        NewOrder,
        NewPromoCode,
        NewRefund,
        NewTicket,
        NewTicketType,
        Order,
        OrderStatusType,
        PlatformSettings,
        PromoCode,
        Refund,
        RefundStatus,
        Ticket,
        TicketType,
    },
    traits::{
        CatalogManagement,
        InsertOrderResult,
        RefundManagement,
        SettlementDatabase,
        StoreError,
        TicketManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_event(&self, event_id: i64) -> Result<Option<Event>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let event = catalog::fetch_event(event_id, &mut conn).await?;
        Ok(event)
    }

    async fn fetch_ticket_types_for_event(&self, event_id: i64) -> Result<Vec<TicketType>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let ticket_types = catalog::fetch_ticket_types_for_event(event_id, &mut conn).await?;
        Ok(ticket_types)
    }

    async fn fetch_business(&self, business_id: i64) -> Result<Option<Business>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let business = catalog::fetch_business(business_id, &mut conn).await?;
        Ok(business)
    }

    async fn fetch_platform_settings(&self) -> Result<PlatformSettings, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let settings = catalog::fetch_platform_settings(&mut conn).await?.unwrap_or_else(|| {
            warn!("🗃️ No platform settings are stored. Using the defaults.");
            PlatformSettings::default()
        });
        Ok(settings)
    }

    async fn fetch_promo_code(&self, event_id: i64, code: &str) -> Result<Option<PromoCode>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let promo = catalog::fetch_promo_code(event_id, code, &mut conn).await?;
        Ok(promo)
    }
}

impl TicketManagement for SqliteDatabase {
    async fn fetch_ticket_by_number(&self, ticket_number: &str) -> Result<Option<Ticket>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let ticket = tickets::fetch_ticket_by_number(ticket_number, &mut conn).await?;
        Ok(ticket)
    }

    async fn fetch_tickets_for_order(&self, order_id: i64) -> Result<Vec<Ticket>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let tickets = tickets::fetch_tickets_for_order(order_id, &mut conn).await?;
        Ok(tickets)
    }

    async fn check_in_ticket(&self, ticket_id: i64, at: DateTime<Utc>) -> Result<Option<Ticket>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let ticket = tickets::check_in_ticket(ticket_id, at, &mut conn).await?;
        Ok(ticket)
    }
}

impl SettlementDatabase for SqliteDatabase {
    async fn fetch_order_by_payment_reference(&self, reference: &str) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_payment_reference(reference, &mut conn).await?;
        Ok(order)
    }

    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::idempotent_insert(order, &mut conn).await
    }

    async fn decrement_ticket_type_inventory(&self, ticket_type_id: i64, quantity: i64) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let shortfall = catalog::decrement_ticket_type_inventory(ticket_type_id, quantity, &mut conn).await?;
        trace!("🗃️ Ticket type #{ticket_type_id} inventory reduced by {quantity}");
        Ok(shortfall)
    }

    async fn decrement_event_inventory(&self, event_id: i64, quantity: i64) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let shortfall = catalog::decrement_event_inventory(event_id, quantity, &mut conn).await?;
        trace!("🗃️ Event #{event_id} inventory reduced by {quantity}");
        Ok(shortfall)
    }

    async fn insert_tickets(&self, new_tickets: Vec<NewTicket>) -> Result<Vec<Ticket>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut result = Vec::with_capacity(new_tickets.len());
        for ticket in new_tickets {
            let ticket = tickets::insert_ticket(ticket, &mut tx).await?;
            result.push(ticket);
        }
        tx.commit().await?;
        debug!("🗃️ {} tickets saved", result.len());
        Ok(result)
    }

    async fn increment_promo_usage(&self, promo_code_id: i64) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        catalog::increment_promo_usage(promo_code_id, &mut conn).await
    }
}

impl RefundManagement for SqliteDatabase {
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_succeeded_refunds(&self, order_id: i64) -> Result<Vec<Refund>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let refunds = refunds::fetch_refunds_for_order(order_id, Some(RefundStatus::Succeeded), &mut conn).await?;
        Ok(refunds)
    }

    async fn insert_refund(&self, refund: NewRefund) -> Result<Refund, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let refund = refunds::insert_refund(refund, &mut conn).await?;
        debug!("🗃️ Refund #{} of {} recorded for order #{}", refund.id, refund.amount, refund.order_id);
        Ok(refund)
    }

    async fn update_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order_status(order_id, status, &mut conn).await
    }

    async fn invalidate_tickets_for_order(&self, order_id: i64) -> Result<u64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let count = tickets::invalidate_tickets_for_order(order_id, &mut conn).await?;
        Ok(count)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `TIX_DATABASE_URL`
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Migrations failed. {e}")))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    //------------------------------------ Catalog administration -----------------------------------------------------
    pub async fn update_platform_settings(&self, settings: &PlatformSettings) -> Result<PlatformSettings, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let settings = catalog::update_platform_settings(settings, &mut conn).await?;
        Ok(settings)
    }

    pub async fn insert_business(&self, business: NewBusiness) -> Result<Business, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let business = catalog::insert_business(business, &mut conn).await?;
        debug!("🗃️ Business #{} ({}) created", business.id, business.name);
        Ok(business)
    }

    pub async fn insert_event(&self, event: NewEvent) -> Result<Event, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let event = catalog::insert_event(event, &mut conn).await?;
        debug!("🗃️ Event #{} ({}) created", event.id, event.title);
        Ok(event)
    }

    pub async fn set_event_active(&self, event_id: i64, active: bool) -> Result<Event, StoreError> {
        let mut conn = self.pool.acquire().await?;
        catalog::set_event_active(event_id, active, &mut conn)
            .await?
            .ok_or_else(|| StoreError::RecordNotFound(format!("event #{event_id}")))
    }

    pub async fn insert_ticket_type(&self, ticket_type: NewTicketType) -> Result<TicketType, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let ticket_type = catalog::insert_ticket_type(ticket_type, &mut conn).await?;
        Ok(ticket_type)
    }

    pub async fn fetch_ticket_type(&self, ticket_type_id: i64) -> Result<Option<TicketType>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let ticket_type = catalog::fetch_ticket_type(ticket_type_id, &mut conn).await?;
        Ok(ticket_type)
    }

    pub async fn insert_promo_code(&self, promo: NewPromoCode) -> Result<PromoCode, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let promo = catalog::insert_promo_code(promo, &mut conn).await?;
        Ok(promo)
    }

    pub async fn fetch_orders_for_event(&self, event_id: i64) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_event(event_id, &mut conn).await?;
        Ok(orders)
    }

    pub async fn fetch_all_refunds(&self, order_id: i64) -> Result<Vec<Refund>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let refunds = refunds::fetch_refunds_for_order(order_id, None, &mut conn).await?;
        Ok(refunds)
    }
}
