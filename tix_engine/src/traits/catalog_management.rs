use crate::{
    db_types::{Business, Event, PlatformSettings, PromoCode, TicketType},
    traits::StoreError,
};

/// Read access to the catalog: events, their ticket types and promo codes, the businesses that run them, and the
/// platform's fee defaults.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_event(&self, event_id: i64) -> Result<Option<Event>, StoreError>;

    /// All ticket types for the event, including those that are not on sale.
    async fn fetch_ticket_types_for_event(&self, event_id: i64) -> Result<Vec<TicketType>, StoreError>;

    async fn fetch_business(&self, business_id: i64) -> Result<Option<Business>, StoreError>;

    /// The platform-wide fee defaults. Backends that have no stored settings return [`PlatformSettings::default`].
    async fn fetch_platform_settings(&self) -> Result<PlatformSettings, StoreError>;

    /// Looks up a promo code for an event. The lookup is case-insensitive.
    async fn fetch_promo_code(&self, event_id: i64, code: &str) -> Result<Option<PromoCode>, StoreError>;
}
