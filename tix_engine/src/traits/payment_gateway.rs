use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tix_common::Cents;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("The payment gateway could not be reached. {0}")]
    Unreachable(String),
    #[error("The payment gateway rejected the request ({status}). {message}")]
    Rejected { status: u16, message: String },
    #[error("The payment gateway sent a response we could not understand. {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Succeeded,
    Processing,
    /// The customer has not completed payment yet (no payment method, confirmation or action outstanding).
    Incomplete,
    RequiresCapture,
    Canceled,
}

impl ChargeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ChargeStatus::Succeeded)
    }
}

/// A destination charge: the customer pays `amount`, the platform keeps `application_fee`, and the rest is transferred
/// to `destination_account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub amount: Cents,
    pub currency: String,
    pub destination_account: String,
    pub application_fee: Cents,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeCreated {
    pub reference: String,
    /// Handed to the customer's browser to complete payment.
    pub client_secret: String,
    pub amount: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRecord {
    pub reference: String,
    pub status: ChargeStatus,
    pub amount: Cents,
    /// The underlying charge that refunds are made against. Only present once the customer has paid.
    pub transaction_id: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRefundRequest {
    pub transaction_id: String,
    pub amount: Cents,
    /// Pull the refunded amount back from the connected account that received the transfer.
    pub reverse_transfer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayRefundStatus {
    Succeeded,
    Pending,
    Failed,
    Canceled,
}

impl GatewayRefundStatus {
    /// Pending refunds have been accepted by the processor and will complete without further action.
    pub fn is_success(&self) -> bool {
        matches!(self, GatewayRefundStatus::Succeeded | GatewayRefundStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRefund {
    pub reference: String,
    pub status: GatewayRefundStatus,
}

/// The external payment processor. All amounts cross this boundary in cents.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn create_charge(&self, request: ChargeRequest) -> Result<ChargeCreated, GatewayError>;

    async fn retrieve_charge(&self, reference: &str) -> Result<ChargeRecord, GatewayError>;

    async fn create_refund(&self, request: GatewayRefundRequest) -> Result<GatewayRefund, GatewayError>;

    /// The most recent charges, newest first.
    async fn recent_charges(&self, limit: usize) -> Result<Vec<ChargeRecord>, GatewayError>;
}
