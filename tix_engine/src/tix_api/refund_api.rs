use std::fmt::Debug;

use log::*;
use serde::Serialize;
use tix_common::Cents;

use crate::{
    db_types::{NewRefund, Order, OrderStatusType, Refund, RefundStatus},
    events::{EventProducers, RefundRecordedEvent},
    refunds::{
        find_legacy_charge,
        next_order_status,
        remaining_refundable,
        request_refund,
        total_refunded,
        RefundIntent,
        LEGACY_SEARCH_LIMIT,
    },
    tix_api::errors::RefundApiError,
    traits::{GatewayRefund, GatewayRefundRequest, PaymentGateway, RefundManagement},
};

/// The result of a refund that the payment processor accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundOutcome {
    /// The ledger entry. `None` only if the refund went through but could not be recorded locally.
    pub refund: Option<Refund>,
    pub refund_reference: String,
    pub amount: Cents,
    pub new_order_status: OrderStatusType,
    pub remaining_refundable: Cents,
}

/// `RefundApi` issues refunds through the payment processor and keeps the refund ledger.
pub struct RefundApi<B, G> {
    db: B,
    gateway: G,
    producers: EventProducers,
}

impl<B, G> Debug for RefundApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RefundApi")
    }
}

impl<B, G> RefundApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        Self { db, gateway, producers }
    }
}

impl<B, G> RefundApi<B, G>
where
    B: RefundManagement,
    G: PaymentGateway,
{
    /// How much can still be refunded on the order.
    pub async fn remaining_refundable(&self, order_id: i64) -> Result<Cents, RefundApiError> {
        let order = self.fetch_order(order_id).await?;
        let refunds = self.db.fetch_succeeded_refunds(order_id).await?;
        Ok(remaining_refundable(&order, &refunds))
    }

    /// Refunds `amount` on an order.
    ///
    /// The refund is bounded by what the business received for the order, less any earlier refunds. The transfer to
    /// the business is reversed by the refunded amount.
    ///
    /// The processor's refund and the local ledger are not updated atomically. If the processor accepts the refund
    /// but the ledger cannot be written, the refund is still reported as successful (the money has moved) and the
    /// discrepancy is logged for manual reconciliation.
    pub async fn refund_order(
        &self,
        order_id: i64,
        amount: Cents,
        reason: Option<String>,
    ) -> Result<RefundOutcome, RefundApiError> {
        let order = self.fetch_order(order_id).await?;
        if !matches!(order.status, OrderStatusType::Completed | OrderStatusType::PartiallyRefunded) {
            return Err(RefundApiError::RefundNotAllowed(order.status));
        }
        let refunds = self.db.fetch_succeeded_refunds(order_id).await?;
        let intent = request_refund(&order, amount, reason, &refunds)?;
        let transaction_id = self.resolve_transaction(&order).await?;
        let request = GatewayRefundRequest { transaction_id, amount, reverse_transfer: true };
        match self.gateway.create_refund(request).await {
            Ok(refund) if refund.status.is_success() => {
                info!("💸️ Refunded {amount} on order {} ({})", order.order_number, refund.reference);
                Ok(self.record_refund_outcome(&order, &refunds, intent, refund).await)
            },
            Ok(refund) => {
                warn!("💸️ Refund {} for order {} ended with status {:?}", refund.reference, order.order_number, refund.status);
                self.record_failed_refund(&intent, Some(refund.reference.clone())).await;
                Err(RefundApiError::RefundFailed(format!("Refund {} was {:?}", refund.reference, refund.status)))
            },
            Err(e) => {
                warn!("💸️ Refund of {amount} for order {} failed. {e}", order.order_number);
                self.record_failed_refund(&intent, None).await;
                Err(RefundApiError::RefundFailed(e.to_string()))
            },
        }
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Order, RefundApiError> {
        self.db.fetch_order(order_id).await?.ok_or(RefundApiError::OrderNotFound(order_id))
    }

    /// Finds the processor transaction to refund against.
    ///
    /// Orders from before payment references were stored are matched against the most recent charges instead.
    async fn resolve_transaction(&self, order: &Order) -> Result<String, RefundApiError> {
        let charge = match &order.payment_reference {
            Some(reference) => self.gateway.retrieve_charge(reference).await?,
            None => {
                debug!("💸️ Order {} has no payment reference. Searching recent charges", order.order_number);
                let charges = self.gateway.recent_charges(LEGACY_SEARCH_LIMIT).await?;
                find_legacy_charge(order, &charges)
                    .map_err(|e| {
                        warn!("💸️ {e}");
                        RefundApiError::PaymentReferenceNotFound(order.order_number.clone())
                    })?
                    .clone()
            },
        };
        charge.transaction_id.ok_or_else(|| {
            warn!("💸️ Charge {} for order {} has no transaction to refund", charge.reference, order.order_number);
            RefundApiError::PaymentReferenceNotFound(order.order_number.clone())
        })
    }

    async fn record_refund_outcome(
        &self,
        order: &Order,
        prior_refunds: &[Refund],
        intent: RefundIntent,
        external: GatewayRefund,
    ) -> RefundOutcome {
        let new_total = total_refunded(prior_refunds) + intent.amount;
        let new_status = next_order_status(order, new_total);
        let new_refund = NewRefund {
            order_id: order.id,
            amount: intent.amount,
            reason: intent.reason.clone(),
            refund_reference: Some(external.reference.clone()),
            status: RefundStatus::Succeeded,
        };
        let refund = match self.db.insert_refund(new_refund).await {
            Ok(refund) => Some(refund),
            Err(e) => {
                error!(
                    "💸️ LEDGER INCONSISTENCY. Refund {} of {} for order {} went through, but could not be recorded. \
                     Reconcile manually. {e}",
                    external.reference, intent.amount, order.order_number
                );
                None
            },
        };
        let updated_order = if new_status != order.status {
            match self.db.update_order_status(order.id, new_status).await {
                Ok(o) => Some(o),
                Err(e) => {
                    error!(
                        "💸️ LEDGER INCONSISTENCY. Order {} should now be '{new_status}', but its status could not be \
                         updated. {e}",
                        order.order_number
                    );
                    None
                },
            }
        } else {
            Some(order.clone())
        };
        if new_status == OrderStatusType::Refunded {
            match self.db.invalidate_tickets_for_order(order.id).await {
                Ok(n) => debug!("💸️ {n} tickets invalidated for fully refunded order {}", order.order_number),
                Err(e) => error!("💸️ Could not invalidate tickets for refunded order {}. {e}", order.order_number),
            }
        }
        if let (Some(refund), Some(order)) = (&refund, updated_order) {
            self.producers.publish_refund_recorded(RefundRecordedEvent::new(order, refund.clone())).await;
        }
        RefundOutcome {
            refund,
            refund_reference: external.reference,
            amount: intent.amount,
            new_order_status: new_status,
            remaining_refundable: intent.remaining_after(),
        }
    }

    async fn record_failed_refund(&self, intent: &RefundIntent, reference: Option<String>) {
        let failed = NewRefund {
            order_id: intent.order_id,
            amount: intent.amount,
            reason: intent.reason.clone(),
            refund_reference: reference,
            status: RefundStatus::Failed,
        };
        if let Err(e) = self.db.insert_refund(failed).await {
            warn!("💸️ Could not record failed refund for order #{}. {e}", intent.order_id);
        }
    }
}
