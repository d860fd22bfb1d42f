//! Cart pricing.
//!
//! [`price_cart`] turns a customer's [`CartSelection`] into a [`PricedCart`] using the current catalog, and
//! [`apply_promo_code`] works out the discount a promo code grants on that cart. Neither function performs any I/O; the
//! caller is responsible for loading the event, ticket types and promo code.
mod cart;
mod promo;

pub use cart::{price_cart, CartSelection, LineItem, PricedCart, PricedItem, PricingError, TicketSelection};
pub use promo::{apply_promo_code, check_promo_validity, AppliedPromo, PromoError, PromoRejection};
