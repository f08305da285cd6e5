use super::rate::Rate;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ActivityId = i64;

/// Identifies a rate track independently of time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PayRateKey {
    pub incentive_level: String,
    pub pay_band: String,
}

impl PayRateKey {
    pub fn new(incentive_level: impl Into<String>, pay_band: impl Into<String>) -> Self {
        Self {
            incentive_level: incentive_level.into(),
            pay_band: pay_band.into(),
        }
    }
}

impl fmt::Display for PayRateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.incentive_level, self.pay_band)
    }
}

/// An effective-dated half-day rate for one key-prefix of an activity.
///
/// `end_date` is inclusive; `None` means the row is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRate {
    pub activity_id: ActivityId,
    pub incentive_level: String,
    pub pay_band: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub half_day_rate: Rate,
}

impl PayRate {
    /// Creates an open-ended row.
    pub fn open(
        activity_id: ActivityId,
        key: PayRateKey,
        start_date: NaiveDate,
        rate: Rate,
    ) -> Self {
        Self {
            activity_id,
            incentive_level: key.incentive_level,
            pay_band: key.pay_band,
            start_date,
            end_date: None,
            half_day_rate: rate,
        }
    }

    pub fn key(&self) -> PayRateKey {
        PayRateKey::new(&self.incentive_level, &self.pay_band)
    }

    pub fn has_key(&self, key: &PayRateKey) -> bool {
        self.incentive_level == key.incentive_level && self.pay_band == key.pay_band
    }

    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }

    /// True if the row has not yet taken effect.
    pub fn is_future(&self, today: NaiveDate) -> bool {
        self.start_date > today
    }

    /// True if the row is in effect on `today`.
    pub fn is_effective(&self, today: NaiveDate) -> bool {
        self.start_date <= today && self.end_date.is_none_or(|end| end >= today)
    }

    pub fn expired(&self, end_date: NaiveDate) -> Self {
        Self {
            end_date: Some(end_date),
            ..self.clone()
        }
    }

    pub fn reopened(&self) -> Self {
        Self {
            end_date: None,
            ..self.clone()
        }
    }

    pub fn with_rate(&self, rate: Rate) -> Self {
        Self {
            half_day_rate: rate,
            ..self.clone()
        }
    }
}

/// The desired rate for a key-prefix as of today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedPayRate {
    pub incentive_level: String,
    pub pay_band: String,
    pub rate: Rate,
}

impl RequestedPayRate {
    pub fn new(
        incentive_level: impl Into<String>,
        pay_band: impl Into<String>,
        rate: Rate,
    ) -> Self {
        Self {
            incentive_level: incentive_level.into(),
            pay_band: pay_band.into(),
            rate,
        }
    }

    pub fn key(&self) -> PayRateKey {
        PayRateKey::new(&self.incentive_level, &self.pay_band)
    }
}
