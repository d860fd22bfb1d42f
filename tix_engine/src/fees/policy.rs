use serde::{Deserialize, Serialize};
use thiserror::Error;
use tix_common::{Cents, Percent};

use crate::db_types::{Business, FeePayer, PlatformFeeType, PlatformSettings};

/// The fully resolved fee policy for a single business, computed once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    pub platform_fee_type: PlatformFeeType,
    pub flat_fee_amount: Cents,
    pub percentage_fee: Percent,
    pub stripe_fee_payer: FeePayer,
    pub platform_fee_payer: FeePayer,
    pub tax_percentage: Percent,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeePolicyError {
    #[error("Tax percentage {0} is outside the range 0% to 100%")]
    InvalidTaxPercentage(Percent),
    #[error("Platform percentage fee {0} is outside the range 0% to 100%")]
    InvalidPercentageFee(Percent),
    #[error("Flat platform fee {0} cannot be negative")]
    NegativeFlatFee(Cents),
}

/// Resolves the fee policy for `business`.
///
/// If the business has opted into custom fees, each of its fee fields overrides the matching platform default. A
/// field the business left unset inherits the platform default. Otherwise, the platform defaults apply as they are.
/// The tax rate always belongs to the business.
pub fn resolve_fee_policy(business: &Business, defaults: &PlatformSettings) -> Result<FeePolicy, FeePolicyError> {
    let policy = if business.use_custom_fees {
        FeePolicy {
            platform_fee_type: business.platform_fee_type.unwrap_or(defaults.platform_fee_type),
            flat_fee_amount: business.flat_fee_amount.unwrap_or(defaults.flat_fee_amount),
            percentage_fee: business.percentage_fee.unwrap_or(defaults.percentage_fee),
            stripe_fee_payer: business.stripe_fee_payer.unwrap_or(defaults.stripe_fee_payer),
            platform_fee_payer: business.platform_fee_payer.unwrap_or(defaults.platform_fee_payer),
            tax_percentage: business.tax_percentage,
        }
    } else {
        FeePolicy {
            platform_fee_type: defaults.platform_fee_type,
            flat_fee_amount: defaults.flat_fee_amount,
            percentage_fee: defaults.percentage_fee,
            stripe_fee_payer: defaults.stripe_fee_payer,
            platform_fee_payer: defaults.platform_fee_payer,
            tax_percentage: business.tax_percentage,
        }
    };
    policy.validate()?;
    Ok(policy)
}

impl FeePolicy {
    pub fn validate(&self) -> Result<(), FeePolicyError> {
        if !self.tax_percentage.is_proportion() {
            return Err(FeePolicyError::InvalidTaxPercentage(self.tax_percentage));
        }
        if !self.percentage_fee.is_proportion() {
            return Err(FeePolicyError::InvalidPercentageFee(self.percentage_fee));
        }
        if self.flat_fee_amount < Cents::ZERO {
            return Err(FeePolicyError::NegativeFlatFee(self.flat_fee_amount));
        }
        Ok(())
    }

    pub fn customer_pays_platform_fee(&self) -> bool {
        self.platform_fee_payer == FeePayer::Customer
    }

    pub fn customer_pays_stripe_fee(&self) -> bool {
        self.stripe_fee_payer == FeePayer::Customer
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;

    fn business(custom: bool) -> Business {
        Business {
            id: 1,
            name: "Acme Events".into(),
            email: "hello@acme.test".into(),
            stripe_account_id: Some("acct_123".into()),
            use_custom_fees: custom,
            platform_fee_type: Some(PlatformFeeType::Flat),
            flat_fee_amount: Some(Cents::from(150)),
            percentage_fee: None,
            stripe_fee_payer: Some(FeePayer::Business),
            platform_fee_payer: None,
            tax_percentage: Percent::from_basis_points(825),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn platform_defaults_apply_without_custom_flag() {
        let defaults = PlatformSettings::default();
        let policy = resolve_fee_policy(&business(false), &defaults).unwrap();
        assert_eq!(policy.platform_fee_type, PlatformFeeType::HigherOfBoth);
        assert_eq!(policy.flat_fee_amount, Cents::from(200));
        assert_eq!(policy.stripe_fee_payer, FeePayer::Customer);
        assert_eq!(policy.tax_percentage, Percent::from_basis_points(825));
    }

    #[test]
    fn custom_fields_override_individually() {
        let defaults = PlatformSettings::default();
        let policy = resolve_fee_policy(&business(true), &defaults).unwrap();
        assert_eq!(policy.platform_fee_type, PlatformFeeType::Flat);
        assert_eq!(policy.flat_fee_amount, Cents::from(150));
        // Not set on the business, so inherited
        assert_eq!(policy.percentage_fee, Percent::from_whole(3));
        assert_eq!(policy.platform_fee_payer, FeePayer::Customer);
        assert_eq!(policy.stripe_fee_payer, FeePayer::Business);
    }

    #[test]
    fn out_of_range_tax_is_rejected() {
        let mut b = business(false);
        b.tax_percentage = Percent::from_whole(120);
        let err = resolve_fee_policy(&b, &PlatformSettings::default()).unwrap_err();
        assert_eq!(err, FeePolicyError::InvalidTaxPercentage(Percent::from_whole(120)));
    }
}
