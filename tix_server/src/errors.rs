use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use serde_json::json;
use thiserror::Error;
use tix_common::Cents;
use tix_engine::{
    pricing::{PricingError, PromoError},
    traits::{GatewayError, StoreError},
    CheckoutError,
    RefundApiError,
    SettlementError,
    TicketApiError,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    Checkout(#[from] CheckoutError),
    #[error("{0}")]
    Refund(#[from] RefundApiError),
    #[error("{0}")]
    Ticket(#[from] TicketApiError),
}

impl ServerError {
    /// The HTTP status and the machine-readable error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidRequestBody(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST_BODY"),
            Self::InitializeError(_) | Self::IOError(_) | Self::ConfigurationError(_) | Self::Unspecified(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            },
            Self::Checkout(e) => checkout_status(e),
            Self::Refund(e) => refund_status(e),
            Self::Ticket(e) => ticket_status(e),
        }
    }

    /// The refundable balance, for refund requests that were rejected because of their amount.
    pub fn remaining_refundable(&self) -> Option<Cents> {
        match self {
            Self::Refund(RefundApiError::Ledger(e)) => Some(e.remaining()),
            _ => None,
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        self.status_and_code().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!("💻️ Request failed with {status}. {self}");
        }
        let mut body = json!({ "error": self.to_string(), "code": code });
        if let Some(remaining) = self.remaining_refundable() {
            body["remaining_refundable"] = json!(remaining);
        }
        HttpResponse::build(status).insert_header(ContentType::json()).body(body.to_string())
    }
}

fn checkout_status(e: &CheckoutError) -> (StatusCode, &'static str) {
    match e {
        CheckoutError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        CheckoutError::EventNotFound(_) => (StatusCode::NOT_FOUND, "EVENT_NOT_FOUND"),
        CheckoutError::EventNotActive(_) => (StatusCode::CONFLICT, "EVENT_NOT_ACTIVE"),
        CheckoutError::BusinessNotFound(_) => (StatusCode::NOT_FOUND, "BUSINESS_NOT_FOUND"),
        CheckoutError::BusinessNotConnected(_) => (StatusCode::CONFLICT, "BUSINESS_NOT_CONNECTED"),
        CheckoutError::FeePolicy(_) => (StatusCode::INTERNAL_SERVER_ERROR, "FEE_CONFIGURATION_ERROR"),
        CheckoutError::Pricing(e) => pricing_status(e),
        CheckoutError::Promo(PromoError::NotFound(_)) => (StatusCode::UNPROCESSABLE_ENTITY, "PROMO_CODE_NOT_FOUND"),
        CheckoutError::Promo(PromoError::Invalid(_)) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_PROMO_CODE"),
        CheckoutError::UseFreeCheckout => (StatusCode::BAD_REQUEST, "USE_FREE_CHECKOUT"),
        CheckoutError::NotFree(_) => (StatusCode::BAD_REQUEST, "ORDER_NOT_FREE"),
        CheckoutError::BelowMinimumCharge { .. } => (StatusCode::BAD_REQUEST, "BELOW_MINIMUM_CHARGE"),
        CheckoutError::PaymentNotConfirmed { .. } => (StatusCode::PAYMENT_REQUIRED, "PAYMENT_NOT_CONFIRMED"),
        CheckoutError::OrderTooLarge(_) => (StatusCode::BAD_REQUEST, "ORDER_TOO_LARGE"),
        CheckoutError::InvalidChargeMetadata(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_CHARGE_METADATA"),
        CheckoutError::AmountMismatch { .. } => (StatusCode::CONFLICT, "AMOUNT_MISMATCH"),
        CheckoutError::Settlement(SettlementError::EventNotFound(_)) => (StatusCode::NOT_FOUND, "EVENT_NOT_FOUND"),
        CheckoutError::Settlement(SettlementError::Store(e)) | CheckoutError::Store(e) => store_status(e),
        CheckoutError::Gateway(e) => gateway_status(e),
    }
}

fn pricing_status(e: &PricingError) -> (StatusCode, &'static str) {
    match e {
        PricingError::EmptyCart => (StatusCode::BAD_REQUEST, "EMPTY_CART"),
        PricingError::InvalidQuantity(_) => (StatusCode::BAD_REQUEST, "INVALID_QUANTITY"),
        PricingError::NegativePrice(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_PRICE"),
        PricingError::TicketTypeNotFound(_) => (StatusCode::UNPROCESSABLE_ENTITY, "TICKET_TYPE_NOT_FOUND"),
        PricingError::InactiveTicketType(_) => (StatusCode::CONFLICT, "TICKET_TYPE_NOT_ON_SALE"),
        PricingError::OutOfStock { .. } => (StatusCode::CONFLICT, "OUT_OF_STOCK"),
    }
}

fn refund_status(e: &RefundApiError) -> (StatusCode, &'static str) {
    use tix_engine::refunds::RefundError;
    match e {
        RefundApiError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
        RefundApiError::RefundNotAllowed(_) => (StatusCode::CONFLICT, "REFUND_NOT_ALLOWED"),
        RefundApiError::Ledger(RefundError::InvalidAmount { .. }) => (StatusCode::BAD_REQUEST, "INVALID_REFUND_AMOUNT"),
        RefundApiError::Ledger(RefundError::ExceedsRemaining { .. }) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "REFUND_EXCEEDS_REMAINING")
        },
        RefundApiError::PaymentReferenceNotFound(_) => (StatusCode::NOT_FOUND, "PAYMENT_REFERENCE_NOT_FOUND"),
        RefundApiError::RefundFailed(_) => (StatusCode::BAD_GATEWAY, "REFUND_FAILED"),
        RefundApiError::Gateway(e) => gateway_status(e),
        RefundApiError::Store(e) => store_status(e),
    }
}

fn ticket_status(e: &TicketApiError) -> (StatusCode, &'static str) {
    match e {
        TicketApiError::TicketNotFound(_) => (StatusCode::NOT_FOUND, "TICKET_NOT_FOUND"),
        TicketApiError::AlreadyCheckedIn(_) => (StatusCode::CONFLICT, "ALREADY_CHECKED_IN"),
        TicketApiError::TicketInvalid(_) => (StatusCode::CONFLICT, "TICKET_INVALID"),
        TicketApiError::Store(e) => store_status(e),
    }
}

fn gateway_status(e: &GatewayError) -> (StatusCode, &'static str) {
    match e {
        GatewayError::Rejected { status: 404, .. } => (StatusCode::NOT_FOUND, "PAYMENT_NOT_FOUND"),
        _ => (StatusCode::BAD_GATEWAY, "PAYMENT_GATEWAY_ERROR"),
    }
}

fn store_status(e: &StoreError) -> (StatusCode, &'static str) {
    match e {
        StoreError::RecordNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
    }
}
