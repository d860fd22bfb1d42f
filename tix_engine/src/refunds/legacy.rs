use thiserror::Error;
use tix_common::Cents;

use crate::{
    db_types::Order,
    tix_api::checkout_objects::{CUSTOMER_EMAIL_KEY, EVENT_ID_KEY},
    traits::ChargeRecord,
};

/// How far a legacy charge's amount may be from the order total and still match, to absorb historical rounding.
pub const LEGACY_AMOUNT_TOLERANCE: Cents = Cents::new(1);
/// How many recent charges are searched for a legacy order's charge.
pub const LEGACY_SEARCH_LIMIT: usize = 100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LegacyChargeError {
    #[error("No charge matches order {0}")]
    NotFound(String),
    #[error("{count} charges match order {order_number}. Refusing to guess")]
    Ambiguous { order_number: String, count: usize },
}

/// Finds the charge for an order that was stored without a payment reference.
///
/// A charge matches when it succeeded, carries the order's event id and customer e-mail in its metadata, and its amount
/// is within [`LEGACY_AMOUNT_TOLERANCE`] of the order total. Exactly one charge must match.
pub fn find_legacy_charge<'a>(order: &Order, charges: &'a [ChargeRecord]) -> Result<&'a ChargeRecord, LegacyChargeError> {
    let event_id = order.event_id.to_string();
    let matches = charges
        .iter()
        .filter(|c| c.status.is_success())
        .filter(|c| c.metadata.get(EVENT_ID_KEY) == Some(&event_id))
        .filter(|c| {
            c.metadata.get(CUSTOMER_EMAIL_KEY).map(|e| e.eq_ignore_ascii_case(&order.customer_email)).unwrap_or(false)
        })
        .filter(|c| (c.amount - order.total).value().abs() <= LEGACY_AMOUNT_TOLERANCE.value())
        .collect::<Vec<_>>();
    match matches.as_slice() {
        [] => Err(LegacyChargeError::NotFound(order.order_number.clone())),
        [charge] => Ok(charge),
        _ => Err(LegacyChargeError::Ambiguous { order_number: order.order_number.clone(), count: matches.len() }),
    }
}
