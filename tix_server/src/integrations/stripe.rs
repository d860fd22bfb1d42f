//! [`PaymentGateway`] backed by Stripe destination charges.
use log::*;
use stripe_tools::{
    helpers::stripe_timestamp,
    NewPaymentIntent,
    NewRefund,
    PaymentIntent,
    PaymentIntentStatus,
    RefundStatus,
    StripeApi,
    StripeApiError,
    StripeConfig,
    StripeRefund,
};
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

#[derive(Debug, Clone)]
pub struct StripeGateway {
    api: StripeApi,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let api = StripeApi::new(config)?;
        Ok(Self { api })
    }
}

impl PaymentGateway for StripeGateway {
    async fn create_charge(&self, request: ChargeRequest) -> Result<ChargeCreated, GatewayError> {
        let intent = NewPaymentIntent {
            amount: request.amount.value(),
            currency: request.currency,
            application_fee_amount: request.application_fee.value(),
            destination: request.destination_account,
            metadata: request.metadata,
        };
        let created = self.api.create_payment_intent(intent).await.map_err(to_gateway_error)?;
        let client_secret = created.client_secret.clone().ok_or_else(|| {
            error!("💳️ Stripe created payment intent {} without a client secret", created.id);
            GatewayError::InvalidResponse(format!("Payment intent {} has no client secret", created.id))
        })?;
        Ok(ChargeCreated { reference: created.id, client_secret, amount: Cents::from(created.amount) })
    }

    async fn retrieve_charge(&self, reference: &str) -> Result<ChargeRecord, GatewayError> {
        let intent = self.api.get_payment_intent(reference).await.map_err(to_gateway_error)?;
        Ok(charge_record(intent))
    }

    async fn create_refund(&self, request: GatewayRefundRequest) -> Result<GatewayRefund, GatewayError> {
        let refund = NewRefund {
            charge: request.transaction_id,
            amount: request.amount.value(),
            reverse_transfer: request.reverse_transfer,
        };
        let refund = self.api.create_refund(refund).await.map_err(to_gateway_error)?;
        Ok(gateway_refund(refund))
    }

    async fn recent_charges(&self, limit: usize) -> Result<Vec<ChargeRecord>, GatewayError> {
        let intents = self.api.list_payment_intents(limit).await.map_err(to_gateway_error)?;
        Ok(intents.into_iter().map(charge_record).collect())
    }
}

fn charge_status(status: PaymentIntentStatus) -> ChargeStatus {
    match status {
        PaymentIntentStatus::Succeeded => ChargeStatus::Succeeded,
        PaymentIntentStatus::Processing => ChargeStatus::Processing,
        PaymentIntentStatus::RequiresCapture => ChargeStatus::RequiresCapture,
        PaymentIntentStatus::Canceled => ChargeStatus::Canceled,
        PaymentIntentStatus::RequiresPaymentMethod |
        PaymentIntentStatus::RequiresConfirmation |
        PaymentIntentStatus::RequiresAction => ChargeStatus::Incomplete,
    }
}

fn charge_record(intent: PaymentIntent) -> ChargeRecord {
    let status = charge_status(intent.status);
    // Once paid, the captured amount is what counts
    let amount = if status.is_success() && intent.amount_received > 0 { intent.amount_received } else { intent.amount };
    ChargeRecord {
        reference: intent.id,
        status,
        amount: Cents::from(amount),
        transaction_id: intent.latest_charge,
        metadata: intent.metadata,
        created: stripe_timestamp(intent.created),
    }
}

fn gateway_refund(refund: StripeRefund) -> GatewayRefund {
    let status = match refund.status {
        RefundStatus::Succeeded => GatewayRefundStatus::Succeeded,
        RefundStatus::Pending | RefundStatus::RequiresAction => GatewayRefundStatus::Pending,
        RefundStatus::Failed => GatewayRefundStatus::Failed,
        RefundStatus::Canceled => GatewayRefundStatus::Canceled,
    };
    if let Some(reason) = &refund.failure_reason {
        warn!("💸️ Stripe refund {} reported a failure: {reason}", refund.id);
    }
    GatewayRefund { reference: refund.id, status }
}

fn to_gateway_error(e: StripeApiError) -> GatewayError {
    match e {
        StripeApiError::QueryError { status, message } => GatewayError::Rejected { status, message },
        StripeApiError::Initialization(s) | StripeApiError::RestRequestError(s) => GatewayError::Unreachable(s),
        StripeApiError::RestResponseError(s) | StripeApiError::JsonError(s) => GatewayError::InvalidResponse(s),
    }
}
