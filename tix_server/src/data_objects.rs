use serde::{Deserialize, Serialize};
use tix_common::Cents;
use tix_engine::checkout_objects::SettlementResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub payment_reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeOrderResponse {
    pub order_id: i64,
    pub order_number: String,
}

impl From<&SettlementResult> for FreeOrderResponse {
    fn from(result: &SettlementResult) -> Self {
        let order = result.order();
        Self { order_id: order.id, order_number: order.order_number.clone() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    /// In cents
    pub amount: Cents,
    #[serde(default)]
    pub reason: Option<String>,
}
