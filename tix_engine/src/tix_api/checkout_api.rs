use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use tix_common::{Cents, DEFAULT_CURRENCY_CODE};

use crate::{
    events::EventProducers,
    fees::{compute_charge, resolve_fee_policy},
    pricing::{apply_promo_code, price_cart, CartSelection, PromoError},
    tix_api::{
        checkout_objects::{
            ChargeMetadata,
            CheckoutEstimate,
            CheckoutQuote,
            CheckoutRequest,
            MetadataError,
            PaymentIntentCreated,
            SettlementResult,
        },
        errors::CheckoutError,
        settlement_api::SettlementEngine,
    },
    traits::{ChargeRequest, CheckoutDatabase, PaymentGateway},
};

/// The smallest amount the payment processor will charge a card.
pub const MINIMUM_CHARGE: Cents = Cents::new(50);

/// `CheckoutApi` handles the customer-facing purchase flow: estimates, charge creation, payment verification and free
/// orders.
///
/// Every step prices the cart through [`CheckoutApi::quote_checkout`], so the estimate the customer saw, the amount
/// charged and the amounts recorded at settlement all come from the same calculation.
pub struct CheckoutApi<B, G> {
    db: B,
    gateway: G,
    currency: String,
    producers: EventProducers,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({})", self.currency)
    }
}

impl<B, G> CheckoutApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        Self { db, gateway, currency: DEFAULT_CURRENCY_CODE.to_string(), producers }
    }

    pub fn with_currency<S: Into<String>>(mut self, currency: S) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
{
    /// Prices a checkout request against the current catalog, promo codes and fee policy.
    pub async fn quote_checkout(
        &self,
        request: &CheckoutRequest,
        now: DateTime<Utc>,
    ) -> Result<CheckoutQuote, CheckoutError> {
        let event = self.db.fetch_event(request.event_id).await?.ok_or(CheckoutError::EventNotFound(request.event_id))?;
        if !event.is_active {
            return Err(CheckoutError::EventNotActive(event.id));
        }
        let business =
            self.db.fetch_business(event.business_id).await?.ok_or(CheckoutError::BusinessNotFound(event.business_id))?;
        let defaults = self.db.fetch_platform_settings().await?;
        let policy = resolve_fee_policy(&business, &defaults)?;
        let ticket_types = match &request.selection {
            CartSelection::Legacy { .. } => Vec::new(),
            CartSelection::TicketTypes { .. } => self.db.fetch_ticket_types_for_event(event.id).await?,
        };
        let cart = price_cart(&request.selection, &event, &ticket_types)?;
        let promo = match request.promo_code() {
            Some(code) => {
                let promo = self
                    .db
                    .fetch_promo_code(event.id, code)
                    .await?
                    .ok_or_else(|| PromoError::NotFound(code.to_uppercase()))?;
                Some(apply_promo_code(&cart, &promo, now)?)
            },
            None => None,
        };
        let discount = promo.as_ref().map(|p| p.discount).unwrap_or(Cents::ZERO);
        let fees = compute_charge(cart.subtotal(), discount, cart.ticket_count(), &policy);
        trace!("💳️ Quoted {} tickets for event #{}: {fees:?}", cart.ticket_count(), event.id);
        Ok(CheckoutQuote { event, business, policy, cart, promo, fees })
    }

    /// The totals the customer will be charged, without side effects.
    pub async fn estimate(&self, request: &CheckoutRequest) -> Result<CheckoutEstimate, CheckoutError> {
        let quote = self.quote_checkout(request, Utc::now()).await?;
        Ok(quote.estimate())
    }

    /// Creates a charge for the request with the payment processor.
    ///
    /// The processor transfers the charge, less the application fee, to the business's connected account. The full
    /// order details travel with the charge as [`ChargeMetadata`], and settlement relies on them alone.
    pub async fn create_payment(&self, request: &CheckoutRequest) -> Result<PaymentIntentCreated, CheckoutError> {
        request.customer.validate().map_err(CheckoutError::ValidationError)?;
        let quote = self.quote_checkout(request, Utc::now()).await?;
        let total = quote.fees.total;
        if total.is_zero() {
            return Err(CheckoutError::UseFreeCheckout);
        }
        if total < MINIMUM_CHARGE {
            return Err(CheckoutError::BelowMinimumCharge { total, minimum: MINIMUM_CHARGE });
        }
        let destination = quote
            .business
            .stripe_account_id
            .clone()
            .filter(|a| !a.trim().is_empty())
            .ok_or(CheckoutError::BusinessNotConnected(quote.business.id))?;
        let metadata = quote.charge_metadata(&request.customer).to_metadata().map_err(|e| match e {
            MetadataError::TooLarge(reason) => CheckoutError::OrderTooLarge(reason),
            e => CheckoutError::InvalidChargeMetadata(e),
        })?;
        let charge = ChargeRequest {
            amount: total,
            currency: self.currency.clone(),
            destination_account: destination,
            application_fee: quote.fees.application_fee,
            metadata,
        };
        let created = self.gateway.create_charge(charge).await?;
        info!("💳️ Created payment {} for {total} on event #{}", created.reference, quote.event.id);
        Ok(PaymentIntentCreated {
            client_secret: created.client_secret,
            payment_reference: created.reference,
            amount: created.amount,
            breakdown: quote.fees,
        })
    }

    /// Verifies that a payment has completed and settles it.
    ///
    /// This is safe to call any number of times for the same payment. Payments that have already been settled are
    /// answered from the local store without contacting the payment processor.
    pub async fn verify_payment(&self, reference: &str) -> Result<SettlementResult, CheckoutError> {
        let engine = SettlementEngine::new(&self.db, &self.producers);
        if let Some(existing) = engine.existing_settlement(reference).await? {
            debug!("💳️ Payment {reference} is already settled");
            return Ok(SettlementResult::AlreadySettled(existing));
        }
        let charge = self.gateway.retrieve_charge(reference).await?;
        if !charge.status.is_success() {
            debug!("💳️ Payment {reference} is not complete yet. Status: {:?}", charge.status);
            return Err(CheckoutError::PaymentNotConfirmed { reference: reference.to_string(), status: charge.status });
        }
        let metadata = ChargeMetadata::from_metadata(&charge.metadata).map_err(|e| {
            error!("💳️ Payment {reference} succeeded, but its metadata is unusable. {e}");
            e
        })?;
        if charge.amount != metadata.fees.total {
            error!(
                "💳️ Payment {reference} captured {}, but its order total is {}. Refusing to settle",
                charge.amount, metadata.fees.total
            );
            return Err(CheckoutError::AmountMismatch { charged: charge.amount, expected: metadata.fees.total });
        }
        let result = engine.settle(Some(reference), &metadata).await?;
        Ok(result)
    }

    /// Settles a free order immediately.
    ///
    /// The request is priced again here, and is only accepted if the total really is zero.
    pub async fn create_free_order(&self, request: &CheckoutRequest) -> Result<SettlementResult, CheckoutError> {
        request.customer.validate().map_err(CheckoutError::ValidationError)?;
        let quote = self.quote_checkout(request, Utc::now()).await?;
        if !quote.fees.total.is_zero() {
            warn!("💳️ Free checkout was requested for event #{}, but the total is {}", quote.event.id, quote.fees.total);
            return Err(CheckoutError::NotFree(quote.fees.total));
        }
        let metadata = quote.charge_metadata(&request.customer);
        let engine = SettlementEngine::new(&self.db, &self.producers);
        let result = engine.settle(None, &metadata).await?;
        info!("💳️ Free order {} created for event #{}", result.order().order_number, quote.event.id);
        Ok(result)
    }
}
