use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Smallest currency unit
    pub amount: i64,
    #[serde(default)]
    pub amount_received: i64,
    pub currency: String,
    pub status: PaymentIntentStatus,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// The charge id once the customer has paid. Refunds are made against this.
    #[serde(default)]
    pub latest_charge: Option<String>,
    #[serde(default)]
    pub application_fee_amount: Option<i64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Unix timestamp
    pub created: i64,
}

/// Request body for a destination charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentIntent {
    pub amount: i64,
    pub currency: String,
    pub application_fee_amount: i64,
    pub destination: String,
    pub metadata: BTreeMap<String, String>,
}

impl NewPaymentIntent {
    /// Stripe takes form-encoded bodies, with nested fields written as `parent[child]`.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("amount".to_string(), self.amount.to_string()),
            ("currency".to_string(), self.currency.to_lowercase()),
            ("application_fee_amount".to_string(), self.application_fee_amount.to_string()),
            ("transfer_data[destination]".to_string(), self.destination.clone()),
            ("automatic_payment_methods[enabled]".to_string(), "true".to_string()),
        ];
        fields.extend(self.metadata.iter().map(|(k, v)| (format!("metadata[{k}]"), v.clone())));
        fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    RequiresAction,
    Succeeded,
    Failed,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripeRefund {
    pub id: String,
    pub amount: i64,
    #[serde(default)]
    pub charge: Option<String>,
    pub status: RefundStatus,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRefund {
    pub charge: String,
    pub amount: i64,
    /// Pull the refunded amount back from the connected account
    pub reverse_transfer: bool,
}

impl NewRefund {
    pub fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("charge".to_string(), self.charge.clone()),
            ("amount".to_string(), self.amount.to_string()),
            ("reverse_transfer".to_string(), self.reverse_transfer.to_string()),
            // Application fees are never returned
            ("refund_application_fee".to_string(), "false".to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}
