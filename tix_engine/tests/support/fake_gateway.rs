use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use chrono::{Duration, Utc};
use tix_common::Cents;
use tix_engine::traits::{
    ChargeCreated,
    ChargeRecord,
    ChargeRequest,
    ChargeStatus,
    GatewayError,
    GatewayRefund,
    GatewayRefundRequest,
    GatewayRefundStatus,
    PaymentGateway,
};

#[derive(Debug, Default)]
struct GatewayState {
    charges: Vec<ChargeRecord>,
    requests: Vec<ChargeRequest>,
    refunds: Vec<GatewayRefundRequest>,
    refund_status: Option<GatewayRefundStatus>,
    fail_refunds: bool,
    retrievals: usize,
    counter: u64,
}

/// An in-memory payment processor. Clones share state, so the same gateway can back several APIs.
#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a charge as paid by the customer.
    pub fn complete_charge(&self, reference: &str) {
        let mut state = self.state.lock().unwrap();
        state.counter += 1;
        let txid = format!("ch_test_{}", state.counter);
        let charge = state.charges.iter_mut().find(|c| c.reference == reference).expect("Unknown charge");
        charge.status = ChargeStatus::Succeeded;
        charge.transaction_id = Some(txid);
    }

    /// Overrides the amount the processor reports for a charge.
    pub fn set_charge_amount(&self, reference: &str, amount: Cents) {
        let mut state = self.state.lock().unwrap();
        let charge = state.charges.iter_mut().find(|c| c.reference == reference).expect("Unknown charge");
        charge.amount = amount;
    }

    /// Adds a charge that was made outside this gateway, e.g. for an order that predates payment references.
    pub fn add_settled_charge(&self, amount: Cents, metadata: BTreeMap<String, String>) -> String {
        let mut state = self.state.lock().unwrap();
        state.counter += 1;
        let n = state.counter;
        let created = Utc::now() - Duration::minutes(n as i64);
        state.charges.push(ChargeRecord {
            reference: format!("pi_legacy_{n}"),
            status: ChargeStatus::Succeeded,
            amount,
            transaction_id: Some(format!("ch_legacy_{n}")),
            metadata,
            created,
        });
        format!("ch_legacy_{n}")
    }

    pub fn fail_refunds(&self, fail: bool) {
        self.state.lock().unwrap().fail_refunds = fail;
    }

    pub fn set_refund_status(&self, status: GatewayRefundStatus) {
        self.state.lock().unwrap().refund_status = Some(status);
    }

    pub fn charge_requests(&self) -> Vec<ChargeRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn refund_requests(&self) -> Vec<GatewayRefundRequest> {
        self.state.lock().unwrap().refunds.clone()
    }

    pub fn retrievals(&self) -> usize {
        self.state.lock().unwrap().retrievals
    }
}

impl PaymentGateway for FakeGateway {
    async fn create_charge(&self, request: ChargeRequest) -> Result<ChargeCreated, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.counter += 1;
        let reference = format!("pi_test_{}", state.counter);
        state.charges.push(ChargeRecord {
            reference: reference.clone(),
            status: ChargeStatus::Incomplete,
            amount: request.amount,
            transaction_id: None,
            metadata: request.metadata.clone(),
            created: Utc::now(),
        });
        let amount = request.amount;
        state.requests.push(request);
        Ok(ChargeCreated { client_secret: format!("{reference}_secret"), reference, amount })
    }

    async fn retrieve_charge(&self, reference: &str) -> Result<ChargeRecord, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.retrievals += 1;
        state
            .charges
            .iter()
            .find(|c| c.reference == reference)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected { status: 404, message: format!("No such payment: {reference}") })
    }

    async fn create_refund(&self, request: GatewayRefundRequest) -> Result<GatewayRefund, GatewayError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_refunds {
            return Err(GatewayError::Unreachable("connection reset".into()));
        }
        state.counter += 1;
        let reference = format!("re_test_{}", state.counter);
        let status = state.refund_status.unwrap_or(GatewayRefundStatus::Succeeded);
        state.refunds.push(request);
        Ok(GatewayRefund { reference, status })
    }

    async fn recent_charges(&self, limit: usize) -> Result<Vec<ChargeRecord>, GatewayError> {
        let state = self.state.lock().unwrap();
        let mut charges = state.charges.clone();
        charges.sort_by(|a, b| b.created.cmp(&a.created));
        charges.truncate(limit);
        Ok(charges)
    }
}
