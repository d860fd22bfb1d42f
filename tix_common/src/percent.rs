use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::helpers::parse_two_decimals;

/// A percentage, stored in hundredths of a percent (basis points). `Percent::from_basis_points(290)` is 2.9%.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Percent(i64);

#[derive(Debug, Clone, Error)]
#[error("Invalid percentage: {0}")]
pub struct PercentConversionError(String);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const HUNDRED: Percent = Percent(10_000);

    pub const fn from_basis_points(bps: i64) -> Self {
        Self(bps)
    }

    pub const fn from_whole(percent: i64) -> Self {
        Self(percent * 100)
    }

    pub fn basis_points(&self) -> i64 {
        self.0
    }

    /// True if the percentage lies in the closed range 0% to 100%.
    pub fn is_proportion(&self) -> bool {
        (0..=Self::HUNDRED.0).contains(&self.0)
    }
}

impl FromStr for Percent {
    type Err = PercentConversionError;

    /// Parses `"2.9"`, `"2.90"` or `"3"` (a trailing `%` is tolerated).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%');
        parse_two_decimals(trimmed).map(Self).ok_or_else(|| PercentConversionError(s.to_string()))
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}%", abs / 100, abs % 100)
    }
}
