use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tix_common::Cents;

use crate::{
    db_types::{Discount, PromoCode},
    pricing::PricedCart,
};

/// Why a promo code cannot be used. The [`Display`] form is the reason string shown to customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoRejection {
    Inactive,
    Exhausted,
    NotYetValid,
    Expired,
    WrongTicketType,
}

impl PromoRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            PromoRejection::Inactive => "inactive",
            PromoRejection::Exhausted => "exhausted",
            PromoRejection::NotYetValid => "not yet valid",
            PromoRejection::Expired => "expired",
            PromoRejection::WrongTicketType => "wrong ticket type",
        }
    }
}

impl Display for PromoRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PromoError {
    #[error("Promo code {0} does not exist for this event")]
    NotFound(String),
    #[error("Invalid promo code: {0}")]
    Invalid(PromoRejection),
}

impl From<PromoRejection> for PromoError {
    fn from(value: PromoRejection) -> Self {
        Self::Invalid(value)
    }
}

/// A promo code that has passed validation, and the discount it grants on a particular cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedPromo {
    pub promo_code_id: i64,
    pub code: String,
    pub discount: Cents,
}

/// Checks the promo code's status and validity window, in that order. Ticket type restrictions depend on the cart and
/// are checked by [`apply_promo_code`].
pub fn check_promo_validity(promo: &PromoCode, now: DateTime<Utc>) -> Result<(), PromoRejection> {
    if !promo.is_active {
        return Err(PromoRejection::Inactive);
    }
    if promo.max_uses.map(|max| promo.current_uses >= max).unwrap_or(false) {
        return Err(PromoRejection::Exhausted);
    }
    if promo.valid_from.map(|from| now < from).unwrap_or(false) {
        return Err(PromoRejection::NotYetValid);
    }
    if promo.valid_until.map(|until| now > until).unwrap_or(false) {
        return Err(PromoRejection::Expired);
    }
    Ok(())
}

/// Validates `promo` for `cart` at time `now` and calculates the discount.
///
/// A code restricted to certain ticket types discounts only the matching lines of the cart, and is rejected if no line
/// matches. Legacy carts have no ticket types, so restricted codes never apply to them.
///
/// The discount never exceeds the amount it is applied to.
pub fn apply_promo_code(cart: &PricedCart, promo: &PromoCode, now: DateTime<Utc>) -> Result<AppliedPromo, PromoError> {
    check_promo_validity(promo, now)?;
    let basis = match promo.applicable_ticket_types() {
        None => cart.subtotal(),
        Some(ids) => {
            let eligible = cart.line_items().iter().any(|l| l.ticket_type_id.map(|id| ids.contains(&id)).unwrap_or(false));
            if !eligible {
                return Err(PromoRejection::WrongTicketType.into());
            }
            cart.subtotal_for(ids)
        },
    };
    let discount = match promo.discount() {
        Discount::Percentage(pct) => basis.percent_of(pct),
        Discount::Fixed(amount) => amount,
    };
    let discount = discount.min(basis).non_negative();
    Ok(AppliedPromo { promo_code_id: promo.id, code: promo.code.clone(), discount })
}
