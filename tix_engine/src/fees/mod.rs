//! # Fee calculation
//!
//! Pure, deterministic fee arithmetic. Nothing in this module performs I/O.
//!
//! * [`policy`] resolves the fee policy that applies to a business, merging the business's own overrides with the
//!   platform defaults.
//! * [`calculator`] turns a post-discount cart value into the full [`FeeBreakdown`]: tax, platform fee, processor fee,
//!   the amount charged to the customer, and the amounts retained by the platform and received by the business.
//!
//! Every checkout evaluation point (estimate, charge creation and settlement) goes through
//! [`calculator::compute_charge`], so that the amounts agree to the cent.
pub mod calculator;
pub mod policy;

pub use calculator::{compute_charge, platform_fee, processor_fee, tax, FeeBreakdown};
pub use policy::{resolve_fee_policy, FeePolicy, FeePolicyError};
