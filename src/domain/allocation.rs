use super::pay_rate::ActivityId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type AllocationId = i64;

/// One effective-dated pay band held by an allocated person.
///
/// `end_date` is inclusive; `None` means open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayBandAssignment {
    pub pay_band: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl PayBandAssignment {
    pub fn open(pay_band: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            pay_band: pay_band.into(),
            start_date,
            end_date: None,
        }
    }

    pub fn is_future(&self, today: NaiveDate) -> bool {
        self.start_date > today
    }

    pub fn is_effective(&self, today: NaiveDate) -> bool {
        self.start_date <= today && self.end_date.is_none_or(|end| end >= today)
    }
}

/// A person's place on an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: AllocationId,
    pub activity_id: ActivityId,
    pub offender_no: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub pay_bands: Vec<PayBandAssignment>,
}

impl Allocation {
    pub fn has_ended(&self, today: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end < today)
    }

    /// The pay band in effect on `today`, if any.
    pub fn current_pay_band(&self, today: NaiveDate) -> Option<&str> {
        self.pay_bands
            .iter()
            .find(|b| b.is_effective(today))
            .map(|b| b.pay_band.as_str())
    }

    /// True if the band is held today or scheduled for the future.
    pub fn references_pay_band(&self, pay_band: &str, today: NaiveDate) -> bool {
        self.pay_bands.iter().any(|b| {
            b.pay_band == pay_band && b.end_date.is_none_or(|end| end >= today)
        })
    }
}
