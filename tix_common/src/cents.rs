use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::{helpers::parse_two_decimals, op, Percent};

pub const DEFAULT_CURRENCY_CODE: &str = "usd";

//--------------------------------------       Cents        ---------------------------------------------------------
/// An amount of money in the currency's minor unit.
///
/// All arithmetic in the settlement engine happens on `Cents`, so that the same inputs always produce the same
/// amounts, no matter where (or how often) they are computed.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Cents(i64);

op!(binary Cents, Add, add);
op!(binary Cents, Sub, sub);
op!(inplace Cents, SubAssign, sub_assign);
op!(unary Cents, Neg, neg);

impl Mul<i64> for Cents {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Cents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in cents: {0}")]
pub struct CentsConversionError(String);

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Cents {
    type Error = CentsConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        i64::try_from(value)
            .map(Self)
            .map_err(|_| CentsConversionError(format!("Value {value} is too large to convert to Cents")))
    }
}

impl FromStr for Cents {
    type Err = CentsConversionError;

    /// Parses a decimal amount in major units, e.g. `"12.34"` or `"12"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_two_decimals(s).map(Self).ok_or_else(|| CentsConversionError(s.to_string()))
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// `self * percent`, rounded half away from zero to the nearest cent.
    pub fn percent_of(&self, percent: Percent) -> Cents {
        let product = i128::from(self.0) * i128::from(percent.basis_points());
        let magnitude = (product.abs() + 5_000) / 10_000;
        let signed = if product < 0 { -magnitude } else { magnitude };
        #[allow(clippy::cast_possible_truncation)]
        Cents(signed as i64)
    }

    /// Returns the amount, floored at zero.
    pub fn non_negative(self) -> Self {
        Self(self.0.max(0))
    }
}
