//! Settlement tolerance (ε).
//!
//! Any balance or residual debt whose magnitude is at most ε is considered
//! settled. The same predicate decides who enters the creditor/debtor lists,
//! whether a matched transfer is worth emitting, and when a partially matched
//! entry leaves the list.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;

use crate::{EngineError, Money};

/// Non-negative threshold below which money is treated as zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tolerance(Money);

impl Tolerance {
    /// One minor unit (0.01).
    pub const DEFAULT: Tolerance = Tolerance(Money::new(Decimal::from_parts(1, 0, 0, false, 2)));

    /// Validates and wraps ε. Negative values are a configuration error.
    pub fn new(epsilon: Money) -> Result<Self, EngineError> {
        if epsilon.is_negative() {
            return Err(EngineError::InvalidTolerance(format!(
                "tolerance must be >= 0, got {epsilon}"
            )));
        }
        Ok(Self(epsilon))
    }

    #[must_use]
    pub const fn epsilon(self) -> Money {
        self.0
    }

    /// `true` when `|amount| <= ε`.
    #[must_use]
    pub fn is_settled(self, amount: Money) -> bool {
        amount.abs() <= self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_decimal())
    }
}

impl FromStr for Tolerance {
    type Err = EngineError;

    /// Parses ε from configuration. Unlike user amounts, more than two
    /// fraction digits are allowed (e.g. `0.005`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str_exact(s.trim())
            .map_err(|err| EngineError::InvalidTolerance(format!("{s:?}: {err}")))?;
        Self::new(Money::new(value))
    }
}
