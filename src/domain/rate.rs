use crate::error::PayRateError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Number of decimal places a half-day rate is stored with.
pub const RATE_SCALE: u32 = 2;

/// A half-day pay rate.
///
/// Wraps `rust_decimal::Decimal`, truncated toward zero to [`RATE_SCALE`]
/// decimal places on construction. Comparison is exact decimal equality, so
/// `1.5` and `1.50` are the same rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Rate(Decimal);

impl Rate {
    pub fn new(value: Decimal) -> Result<Self, PayRateError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(PayRateError::ValidationError(format!(
                "Rate must not be negative: {value}"
            )));
        }
        let truncated = value.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::ToZero);
        Ok(Self(truncated.normalize()))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Rate {
    type Error = PayRateError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rate> for Decimal {
    fn from(rate: Rate) -> Self {
        rate.0
    }
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Rate::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
