use serde::{Deserialize, Serialize};
use tix_common::{Cents, Percent};

use crate::{
    db_types::{FeePayer, PlatformFeeType},
    fees::FeePolicy,
};

/// The percentage component of the payment processor's transaction fee (2.9%)
pub const PROCESSOR_PERCENTAGE_FEE: Percent = Percent::from_basis_points(290);
/// The fixed component of the payment processor's transaction fee ($0.30)
pub const PROCESSOR_FIXED_FEE: Cents = Cents::new(30);

/// The platform's fee for an order.
///
/// `basis` is the post-discount ticket value of the order. Orders without tickets attract no fee.
pub fn platform_fee(basis: Cents, ticket_count: i64, policy: &FeePolicy) -> Cents {
    if ticket_count <= 0 {
        return Cents::ZERO;
    }
    let flat = policy.flat_fee_amount;
    let pct = basis.percent_of(policy.percentage_fee);
    match policy.platform_fee_type {
        PlatformFeeType::Flat => flat,
        PlatformFeeType::Percentage => pct,
        PlatformFeeType::HigherOfBoth => flat.max(pct),
    }
}

/// The processor's transaction fee on `charge_basis`: 2.9% + $0.30, rounded half-up to the cent.
pub fn processor_fee(charge_basis: Cents) -> Cents {
    charge_basis.percent_of(PROCESSOR_PERCENTAGE_FEE) + PROCESSOR_FIXED_FEE
}

/// Tax on the post-discount, pre-fee amount.
pub fn tax(taxable_amount: Cents, tax_percentage: Percent) -> Cents {
    taxable_amount.percent_of(tax_percentage)
}

/// Every amount involved in charging a customer for an order and splitting the proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub subtotal: Cents,
    pub discount: Cents,
    /// `subtotal - discount`
    pub taxable: Cents,
    pub tax: Cents,
    pub tax_percentage: Percent,
    /// The platform fee, whoever pays it
    pub platform_fee: Cents,
    /// The processor fee, whoever pays it
    pub processor_fee: Cents,
    pub platform_fee_payer: FeePayer,
    pub stripe_fee_payer: FeePayer,
    /// The part of the platform fee added to the customer's charge
    pub customer_platform_fee: Cents,
    /// The part of the processor fee added to the customer's charge
    pub customer_processor_fee: Cents,
    /// The amount charged to the customer
    pub total: Cents,
    /// The amount the platform keeps out of the charge (platform fee plus processor fee)
    pub application_fee: Cents,
    /// `subtotal - discount + tax`. The upper bound for refunds.
    pub business_transfer: Cents,
    /// What the business actually nets once every business-paid fee is deducted
    pub business_net: Cents,
}

impl FeeBreakdown {
    /// Checks that the total is exactly the sum of its parts.
    pub fn reconciles(&self) -> bool {
        self.taxable == self.subtotal - self.discount &&
            self.business_transfer == self.taxable + self.tax &&
            self.total == self.business_transfer + self.customer_platform_fee + self.customer_processor_fee &&
            self.application_fee == self.platform_fee + self.processor_fee &&
            self.business_net == self.total - self.application_fee
    }

    pub fn is_free(&self) -> bool {
        self.total.is_zero()
    }
}

/// Computes the full charge for an order.
///
/// The stages run in a fixed order, and each stage works in whole cents:
/// 1. apply the discount (capped at the subtotal),
/// 2. add tax on the discounted amount,
/// 3. add the platform fee if the customer pays it,
/// 4. add the processor fee, computed on the running total, if the customer pays it.
///
/// When the business pays the processor fee, it is computed on the final charge and deducted from the business's
/// share. A cart discounted to zero attracts no fees at all.
pub fn compute_charge(subtotal: Cents, discount: Cents, ticket_count: i64, policy: &FeePolicy) -> FeeBreakdown {
    let discount = discount.min(subtotal).non_negative();
    let taxable = subtotal - discount;
    let tax = tax(taxable, policy.tax_percentage);
    let chargeable = taxable.is_positive();
    let platform_fee = if chargeable { platform_fee(taxable, ticket_count, policy) } else { Cents::ZERO };
    let business_transfer = taxable + tax;

    let customer_platform_fee = if policy.customer_pays_platform_fee() { platform_fee } else { Cents::ZERO };
    let mut total = business_transfer + customer_platform_fee;

    let (processor_fee, customer_processor_fee) = match (chargeable, policy.customer_pays_stripe_fee()) {
        (false, _) => (Cents::ZERO, Cents::ZERO),
        (true, true) => {
            let fee = processor_fee(total);
            total = total + fee;
            (fee, fee)
        },
        (true, false) => (processor_fee(total), Cents::ZERO),
    };
    let application_fee = platform_fee + processor_fee;

    FeeBreakdown {
        subtotal,
        discount,
        taxable,
        tax,
        tax_percentage: policy.tax_percentage,
        platform_fee,
        processor_fee,
        platform_fee_payer: policy.platform_fee_payer,
        stripe_fee_payer: policy.stripe_fee_payer,
        customer_platform_fee,
        customer_processor_fee,
        total,
        application_fee,
        business_transfer,
        business_net: total - application_fee,
    }
}
