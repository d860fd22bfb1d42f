use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tix_common::{Cents, Percent};

use crate::{
    db_types::{Business, Event, FeePayer, Order, Ticket},
    fees::{FeeBreakdown, FeePolicy},
    pricing::{AppliedPromo, CartSelection, LineItem, PricedCart},
};

pub const EVENT_ID_KEY: &str = "event_id";
pub const EVENT_TITLE_KEY: &str = "event_title";
pub const CUSTOMER_NAME_KEY: &str = "customer_name";
pub const CUSTOMER_EMAIL_KEY: &str = "customer_email";
pub const CUSTOMER_PHONE_KEY: &str = "customer_phone";
pub const CART_KEY: &str = "cart";
pub const PROMO_CODE_KEY: &str = "promo_code";
pub const PROMO_CODE_ID_KEY: &str = "promo_code_id";
pub const SUBTOTAL_KEY: &str = "subtotal";
pub const DISCOUNT_KEY: &str = "discount_amount";
pub const TAX_KEY: &str = "tax_amount";
pub const TAX_PERCENTAGE_KEY: &str = "tax_percentage";
pub const PLATFORM_FEE_KEY: &str = "platform_fee";
pub const PROCESSOR_FEE_KEY: &str = "stripe_fee";
pub const PLATFORM_FEE_PAYER_KEY: &str = "platform_fee_payer";
pub const STRIPE_FEE_PAYER_KEY: &str = "stripe_fee_payer";
pub const APPLICATION_FEE_KEY: &str = "application_fee";
pub const TOTAL_KEY: &str = "total";

/// Stripe accepts at most 50 metadata keys per object.
pub const MAX_METADATA_KEYS: usize = 50;
/// Stripe rejects metadata values longer than 500 characters.
pub const MAX_METADATA_VALUE_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CustomerDetails {
    pub fn new<S: Into<String>>(name: S, email: S) -> Self {
        Self { name: name.into(), email: email.into(), phone: None }
    }

    /// Name and e-mail are required. Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Customer name is required".into());
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err("Customer email is required".into());
        }
        if !email.contains('@') {
            return Err(format!("{email} is not a valid email address"));
        }
        Ok(())
    }
}

/// A checkout request from the customer's browser. The same shape is used for estimates, paid checkout and free
/// orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub event_id: i64,
    pub selection: CartSelection,
    #[serde(default)]
    pub promo_code: Option<String>,
    pub customer: CustomerDetails,
}

impl CheckoutRequest {
    /// The promo code as the customer typed it, or `None` if they left it blank.
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// The server's authoritative pricing of a checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutQuote {
    pub event: Event,
    pub business: Business,
    pub policy: FeePolicy,
    pub cart: PricedCart,
    pub promo: Option<AppliedPromo>,
    pub fees: FeeBreakdown,
}

impl CheckoutQuote {
    pub fn charge_metadata(&self, customer: &CustomerDetails) -> ChargeMetadata {
        ChargeMetadata {
            event_id: self.event.id,
            event_title: self.event.title.clone(),
            customer: customer.clone(),
            cart: self.cart.clone(),
            promo_code: self.promo.as_ref().map(|p| p.code.clone()),
            promo_code_id: self.promo.as_ref().map(|p| p.promo_code_id),
            fees: self.fees,
        }
    }

    pub fn estimate(&self) -> CheckoutEstimate {
        CheckoutEstimate {
            event_id: self.event.id,
            line_items: self.cart.line_items(),
            promo_code: self.promo.as_ref().map(|p| p.code.clone()),
            breakdown: self.fees,
        }
    }
}

/// The client-facing totals for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutEstimate {
    pub event_id: i64,
    pub line_items: Vec<LineItem>,
    pub promo_code: Option<String>,
    #[serde(flatten)]
    pub breakdown: FeeBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntentCreated {
    pub client_secret: String,
    pub payment_reference: String,
    pub amount: Cents,
    pub breakdown: FeeBreakdown,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Charge metadata is missing the '{0}' field")]
    MissingField(&'static str),
    #[error("Charge metadata field '{field}' has an invalid value '{value}'")]
    InvalidField { field: &'static str, value: String },
    #[error("Charge metadata is inconsistent. {0}")]
    Inconsistent(String),
    #[error("The order details are too large to attach to a payment. {0}")]
    TooLarge(String),
    #[error("The cart could not be encoded. {0}")]
    Encoding(String),
}

/// Everything needed to settle a charge, captured when the charge is created.
///
/// Settlement trusts only this record, never the request that triggers verification. It travels with the charge as a
/// flat string map, see [`ChargeMetadata::to_metadata`] and [`ChargeMetadata::from_metadata`]. The cart snapshot is
/// JSON, split over `cart`, `cart_1`, `cart_2`, ... so that no value exceeds [`MAX_METADATA_VALUE_LENGTH`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeMetadata {
    pub event_id: i64,
    pub event_title: String,
    pub customer: CustomerDetails,
    pub cart: PricedCart,
    pub promo_code: Option<String>,
    pub promo_code_id: Option<i64>,
    pub fees: FeeBreakdown,
}

impl ChargeMetadata {
    /// Encodes the metadata for the payment processor. Fails with [`MetadataError::TooLarge`] if the result would break
    /// the processor's metadata limits.
    pub fn to_metadata(&self) -> Result<BTreeMap<String, String>, MetadataError> {
        let cart = serde_json::to_string(&self.cart).map_err(|e| MetadataError::Encoding(e.to_string()))?;
        let mut map = BTreeMap::new();
        let mut put = |k: &str, v: String| {
            map.insert(k.to_string(), v);
        };
        put(EVENT_ID_KEY, self.event_id.to_string());
        // The title is only used for display
        put(EVENT_TITLE_KEY, self.event_title.chars().take(MAX_METADATA_VALUE_LENGTH).collect());
        put(CUSTOMER_NAME_KEY, self.customer.name.clone());
        put(CUSTOMER_EMAIL_KEY, self.customer.email.clone());
        if let Some(phone) = &self.customer.phone {
            put(CUSTOMER_PHONE_KEY, phone.clone());
        }
        for (i, part) in split_value(&cart, MAX_METADATA_VALUE_LENGTH).into_iter().enumerate() {
            put(cart_key(i).as_str(), part.to_string());
        }
        if let Some(code) = &self.promo_code {
            put(PROMO_CODE_KEY, code.clone());
        }
        if let Some(id) = self.promo_code_id {
            put(PROMO_CODE_ID_KEY, id.to_string());
        }
        let fees = &self.fees;
        put(SUBTOTAL_KEY, fees.subtotal.value().to_string());
        put(DISCOUNT_KEY, fees.discount.value().to_string());
        put(TAX_KEY, fees.tax.value().to_string());
        put(TAX_PERCENTAGE_KEY, fees.tax_percentage.basis_points().to_string());
        put(PLATFORM_FEE_KEY, fees.platform_fee.value().to_string());
        put(PROCESSOR_FEE_KEY, fees.processor_fee.value().to_string());
        put(PLATFORM_FEE_PAYER_KEY, fees.platform_fee_payer.to_string());
        put(STRIPE_FEE_PAYER_KEY, fees.stripe_fee_payer.to_string());
        put(APPLICATION_FEE_KEY, fees.application_fee.value().to_string());
        put(TOTAL_KEY, fees.total.value().to_string());
        check_metadata_limits(&map)?;
        Ok(map)
    }

    /// Decodes and validates charge metadata.
    ///
    /// The amounts must reconcile exactly, the cart must be non-empty with positive quantities, and its subtotal must
    /// match the recorded subtotal.
    pub fn from_metadata(map: &BTreeMap<String, String>) -> Result<Self, MetadataError> {
        let first = required(map, CART_KEY)?;
        let rest = (1..).map_while(|i| map.get(&cart_key(i)).map(String::as_str));
        let cart_json = std::iter::once(first).chain(rest).collect::<String>();
        let cart = serde_json::from_str::<PricedCart>(&cart_json)
            .map_err(|_| MetadataError::InvalidField { field: CART_KEY, value: cart_json.clone() })?;
        cart.validate().map_err(|e| MetadataError::Inconsistent(e.to_string()))?;
        let customer = CustomerDetails {
            name: required(map, CUSTOMER_NAME_KEY)?.to_string(),
            email: required(map, CUSTOMER_EMAIL_KEY)?.to_string(),
            phone: map.get(CUSTOMER_PHONE_KEY).cloned(),
        };
        let subtotal = cents(map, SUBTOTAL_KEY)?;
        let discount = cents(map, DISCOUNT_KEY)?;
        let tax = cents(map, TAX_KEY)?;
        let platform_fee = cents(map, PLATFORM_FEE_KEY)?;
        let processor_fee = cents(map, PROCESSOR_FEE_KEY)?;
        let platform_fee_payer = parsed::<FeePayer>(map, PLATFORM_FEE_PAYER_KEY)?;
        let stripe_fee_payer = parsed::<FeePayer>(map, STRIPE_FEE_PAYER_KEY)?;
        let customer_platform_fee = if platform_fee_payer == FeePayer::Customer { platform_fee } else { Cents::ZERO };
        let customer_processor_fee = if stripe_fee_payer == FeePayer::Customer { processor_fee } else { Cents::ZERO };
        let total = cents(map, TOTAL_KEY)?;
        let application_fee = cents(map, APPLICATION_FEE_KEY)?;
        let taxable = subtotal - discount;
        let fees = FeeBreakdown {
            subtotal,
            discount,
            taxable,
            tax,
            tax_percentage: Percent::from_basis_points(parsed::<i64>(map, TAX_PERCENTAGE_KEY)?),
            platform_fee,
            processor_fee,
            platform_fee_payer,
            stripe_fee_payer,
            customer_platform_fee,
            customer_processor_fee,
            total,
            application_fee,
            business_transfer: taxable + tax,
            business_net: total - application_fee,
        };
        let amounts = [subtotal, discount, tax, platform_fee, processor_fee, total, application_fee];
        if amounts.iter().any(|a| *a < Cents::ZERO) {
            return Err(MetadataError::Inconsistent("Amounts cannot be negative".into()));
        }
        if discount > subtotal {
            return Err(MetadataError::Inconsistent(format!("Discount {discount} exceeds subtotal {subtotal}")));
        }
        if cart.subtotal() != subtotal {
            return Err(MetadataError::Inconsistent(format!(
                "Cart subtotal {} does not match recorded subtotal {subtotal}",
                cart.subtotal()
            )));
        }
        if !fees.reconciles() {
            return Err(MetadataError::Inconsistent(format!("Total {total} does not reconcile with its components")));
        }
        let promo_code_id = match map.get(PROMO_CODE_ID_KEY) {
            Some(_) => Some(parsed::<i64>(map, PROMO_CODE_ID_KEY)?),
            None => None,
        };
        Ok(Self {
            event_id: parsed::<i64>(map, EVENT_ID_KEY)?,
            event_title: map.get(EVENT_TITLE_KEY).cloned().unwrap_or_default(),
            customer,
            cart,
            promo_code: map.get(PROMO_CODE_KEY).cloned(),
            promo_code_id,
            fees,
        })
    }
}

fn cart_key(index: usize) -> String {
    match index {
        0 => CART_KEY.to_string(),
        i => format!("{CART_KEY}_{i}"),
    }
}

/// Splits `value` into pieces of at most `max_chars` characters.
fn split_value(value: &str, max_chars: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = value;
    while let Some((at, _)) = rest.char_indices().nth(max_chars) {
        let (head, tail) = rest.split_at(at);
        parts.push(head);
        rest = tail;
    }
    parts.push(rest);
    parts
}

fn check_metadata_limits(map: &BTreeMap<String, String>) -> Result<(), MetadataError> {
    if map.len() > MAX_METADATA_KEYS {
        return Err(MetadataError::TooLarge(format!(
            "It needs {} fields, but at most {MAX_METADATA_KEYS} are allowed. Try splitting the order",
            map.len()
        )));
    }
    match map.iter().find(|(_, v)| v.chars().count() > MAX_METADATA_VALUE_LENGTH) {
        Some((k, _)) => Err(MetadataError::TooLarge(format!(
            "'{k}' is longer than {MAX_METADATA_VALUE_LENGTH} characters"
        ))),
        None => Ok(()),
    }
}

fn required<'a>(map: &'a BTreeMap<String, String>, field: &'static str) -> Result<&'a str, MetadataError> {
    map.get(field).map(String::as_str).ok_or(MetadataError::MissingField(field))
}

fn parsed<T: FromStr>(map: &BTreeMap<String, String>, field: &'static str) -> Result<T, MetadataError> {
    let value = required(map, field)?;
    value.parse::<T>().map_err(|_| MetadataError::InvalidField { field, value: value.to_string() })
}

fn cents(map: &BTreeMap<String, String>, field: &'static str) -> Result<Cents, MetadataError> {
    parsed::<i64>(map, field).map(Cents::from)
}

/// The customer-facing summary of a settled order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub order_id: i64,
    pub order_number: String,
    pub event_title: String,
    pub quantity: i64,
    pub total_amount: Cents,
    pub customer_name: String,
    pub customer_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledOrder {
    pub order: Order,
    pub tickets: Vec<Ticket>,
    pub event_title: String,
}

impl SettledOrder {
    pub fn summary(&self) -> SettlementSummary {
        SettlementSummary {
            order_id: self.order.id,
            order_number: self.order.order_number.clone(),
            event_title: self.event_title.clone(),
            quantity: self.order.quantity,
            total_amount: self.order.total,
            customer_name: self.order.customer_name.clone(),
            customer_email: self.order.customer_email.clone(),
        }
    }
}

/// The result of settling a payment. Repeat settlements of the same payment return the original order unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementResult {
    Settled(SettledOrder),
    AlreadySettled(SettledOrder),
}

impl SettlementResult {
    pub fn settled_order(&self) -> &SettledOrder {
        match self {
            SettlementResult::Settled(s) | SettlementResult::AlreadySettled(s) => s,
        }
    }

    pub fn into_settled_order(self) -> SettledOrder {
        match self {
            SettlementResult::Settled(s) | SettlementResult::AlreadySettled(s) => s,
        }
    }

    pub fn order(&self) -> &Order {
        &self.settled_order().order
    }

    pub fn is_new(&self) -> bool {
        matches!(self, SettlementResult::Settled(_))
    }

    pub fn summary(&self) -> SettlementSummary {
        self.settled_order().summary()
    }
}
