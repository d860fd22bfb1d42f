use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;
use tix_common::{Cents, Percent};

#[derive(Debug, Clone, Error)]
#[error("Invalid value for {0}: {1}")]
pub struct ConversionError(&'static str, String);

/// Implements `Display` and `FromStr` for a fieldless enum, using the same snake_case names that are stored in the
/// database and sent over the wire.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $text),)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    s => Err(ConversionError(stringify!($name), s.to_string())),
                }
            }
        }
    };
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// The order has been created but payment has not been confirmed.
    Pending,
    /// Payment has been captured (or the order was free) and tickets have been issued.
    Completed,
    /// Refunds totalling the full business transfer amount have been issued.
    Refunded,
    /// At least one refund has been issued, but the business still holds some of the transfer.
    PartiallyRefunded,
    /// The order was cancelled before settlement.
    Cancelled,
}

text_enum!(OrderStatusType {
    Pending => "pending",
    Completed => "completed",
    Refunded => "refunded",
    PartiallyRefunded => "partially_refunded",
    Cancelled => "cancelled",
});

//--------------------------------------     TicketStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Valid,
    Invalid,
    Used,
}

text_enum!(TicketStatus { Valid => "valid", Invalid => "invalid", Used => "used" });

//--------------------------------------     RefundStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Succeeded,
    Failed,
}

text_enum!(RefundStatus { Succeeded => "succeeded", Failed => "failed" });

//--------------------------------------     Fee policy enums   --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlatformFeeType {
    Flat,
    Percentage,
    HigherOfBoth,
}

text_enum!(PlatformFeeType { Flat => "flat", Percentage => "percentage", HigherOfBoth => "higher_of_both" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FeePayer {
    Customer,
    Business,
}

text_enum!(FeePayer { Customer => "customer", Business => "business" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

text_enum!(DiscountType { Percentage => "percentage", Fixed => "fixed" });

//--------------------------------------   PlatformSettings    ---------------------------------------------------------
/// The platform-wide fee defaults. Businesses inherit these unless they opt into a custom fee policy.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PlatformSettings {
    pub platform_fee_type: PlatformFeeType,
    pub flat_fee_amount: Cents,
    pub percentage_fee: Percent,
    pub stripe_fee_payer: FeePayer,
    pub platform_fee_payer: FeePayer,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            platform_fee_type: PlatformFeeType::HigherOfBoth,
            flat_fee_amount: Cents::from(200),
            percentage_fee: Percent::from_whole(3),
            stripe_fee_payer: FeePayer::Customer,
            platform_fee_payer: FeePayer::Customer,
        }
    }
}

//--------------------------------------       Business        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Business {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// The connected payment account that receives the transfer for this business's sales.
    pub stripe_account_id: Option<String>,
    pub use_custom_fees: bool,
    pub platform_fee_type: Option<PlatformFeeType>,
    pub flat_fee_amount: Option<Cents>,
    pub percentage_fee: Option<Percent>,
    pub stripe_fee_payer: Option<FeePayer>,
    pub platform_fee_payer: Option<FeePayer>,
    pub tax_percentage: Percent,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewBusiness {
    pub name: String,
    pub email: String,
    pub stripe_account_id: Option<String>,
    pub use_custom_fees: bool,
    pub platform_fee_type: Option<PlatformFeeType>,
    pub flat_fee_amount: Option<Cents>,
    pub percentage_fee: Option<Percent>,
    pub stripe_fee_payer: Option<FeePayer>,
    pub platform_fee_payer: Option<FeePayer>,
    pub tax_percentage: Percent,
}

impl NewBusiness {
    pub fn new<S: Into<String>>(name: S, email: S) -> Self {
        Self { name: name.into(), email: email.into(), ..Default::default() }
    }

    pub fn with_stripe_account<S: Into<String>>(mut self, account: S) -> Self {
        self.stripe_account_id = Some(account.into());
        self
    }

    pub fn with_tax(mut self, tax: Percent) -> Self {
        self.tax_percentage = tax;
        self
    }
}

//--------------------------------------         Event         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub business_id: i64,
    pub title: String,
    /// The single ticket price used by events that predate ticket types.
    pub ticket_price: Cents,
    pub total_tickets: i64,
    pub available_tickets: i64,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub business_id: i64,
    pub title: String,
    pub ticket_price: Cents,
    pub total_tickets: i64,
    pub starts_at: Option<DateTime<Utc>>,
}

impl NewEvent {
    pub fn new<S: Into<String>>(business_id: i64, title: S, ticket_price: Cents, total_tickets: i64) -> Self {
        Self { business_id, title: title.into(), ticket_price, total_tickets, starts_at: None }
    }
}

//--------------------------------------      TicketType       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TicketType {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    pub price: Cents,
    pub total_quantity: i64,
    pub available_quantity: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTicketType {
    pub event_id: i64,
    pub name: String,
    pub price: Cents,
    pub total_quantity: i64,
    pub is_active: bool,
}

impl NewTicketType {
    pub fn new<S: Into<String>>(event_id: i64, name: S, price: Cents, total_quantity: i64) -> Self {
        Self { event_id, name: name.into(), price, total_quantity, is_active: true }
    }
}

//--------------------------------------       PromoCode       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PromoCode {
    pub id: i64,
    pub event_id: i64,
    /// Always stored in upper case. Lookups are case-insensitive.
    pub code: String,
    pub discount_type: DiscountType,
    /// Basis points for percentage discounts, cents for fixed discounts.
    pub discount_value: i64,
    pub max_uses: Option<i64>,
    pub current_uses: i64,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub applicable_ticket_type_ids: Option<Json<Vec<i64>>>,
}

/// The discount a promo code grants, interpreted from its type and raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discount {
    Percentage(Percent),
    Fixed(Cents),
}

impl PromoCode {
    pub fn discount(&self) -> Discount {
        match self.discount_type {
            DiscountType::Percentage => Discount::Percentage(Percent::from_basis_points(self.discount_value)),
            DiscountType::Fixed => Discount::Fixed(Cents::from(self.discount_value)),
        }
    }

    /// The ticket types this code is restricted to. `None` means the code applies to every ticket type.
    pub fn applicable_ticket_types(&self) -> Option<&[i64]> {
        self.applicable_ticket_type_ids.as_ref().map(|ids| ids.0.as_slice()).filter(|ids| !ids.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct NewPromoCode {
    pub event_id: i64,
    pub code: String,
    pub discount: Discount,
    pub max_uses: Option<i64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub applicable_ticket_type_ids: Option<Vec<i64>>,
}

impl NewPromoCode {
    pub fn new<S: AsRef<str>>(event_id: i64, code: S, discount: Discount) -> Self {
        Self {
            event_id,
            code: code.as_ref().trim().to_uppercase(),
            discount,
            max_uses: None,
            valid_from: None,
            valid_until: None,
            is_active: true,
            applicable_ticket_type_ids: None,
        }
    }

    pub fn with_max_uses(mut self, max_uses: i64) -> Self {
        self.max_uses = Some(max_uses);
        self
    }

    pub fn for_ticket_types(mut self, ids: Vec<i64>) -> Self {
        self.applicable_ticket_type_ids = Some(ids);
        self
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Unique, human-shareable reference for the order
    pub order_number: String,
    pub event_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub quantity: i64,
    pub subtotal: Cents,
    pub discount_amount: Cents,
    pub promo_code: Option<String>,
    pub promo_code_id: Option<i64>,
    pub tax_amount: Cents,
    pub tax_percentage: Percent,
    /// The platform fee charged to the customer. Zero when the business pays it.
    pub platform_fee: Cents,
    /// The processor fee charged to the customer. Zero when the business pays it.
    pub stripe_fee: Cents,
    /// The amount the platform retained from the charge (platform fee plus processor fee, whoever paid them).
    pub application_fee: Cents,
    pub total: Cents,
    /// The payment processor's reference for the charge. `None` for free and legacy orders.
    pub payment_reference: Option<String>,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// The portion of the charge that reached the business: `subtotal - discount + tax`.
    pub fn business_transfer_amount(&self) -> Cents {
        self.subtotal - self.discount_amount + self.tax_amount
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_number: String,
    pub event_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub quantity: i64,
    pub subtotal: Cents,
    pub discount_amount: Cents,
    pub promo_code: Option<String>,
    pub promo_code_id: Option<i64>,
    pub tax_amount: Cents,
    pub tax_percentage: Percent,
    pub platform_fee: Cents,
    pub stripe_fee: Cents,
    pub application_fee: Cents,
    pub total: Cents,
    pub payment_reference: Option<String>,
    pub status: OrderStatusType,
}

//--------------------------------------        Ticket         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub order_id: i64,
    pub event_id: i64,
    pub ticket_type_id: Option<i64>,
    pub ticket_number: String,
    pub price: Cents,
    pub qr_code_data: String,
    pub status: TicketStatus,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub order_id: i64,
    pub event_id: i64,
    pub ticket_type_id: Option<i64>,
    pub ticket_number: String,
    pub price: Cents,
    pub qr_code_data: String,
}

//--------------------------------------        Refund         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Refund {
    pub id: i64,
    pub order_id: i64,
    pub amount: Cents,
    pub reason: Option<String>,
    /// The payment processor's reference for the refund
    pub refund_reference: Option<String>,
    pub status: RefundStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRefund {
    pub order_id: i64,
    pub amount: Cents,
    pub reason: Option<String>,
    pub refund_reference: Option<String>,
    pub status: RefundStatus,
}
