use super::pay_rate::{ActivityId, PayRate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An activity and its pay-rate history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    /// The prison whose reference data applies to this activity.
    pub prison_id: String,
    pub pay_rates: Vec<PayRate>,
}

impl Activity {
    pub fn new(id: ActivityId, prison_id: impl Into<String>) -> Self {
        Self {
            id,
            prison_id: prison_id.into(),
            pay_rates: Vec::new(),
        }
    }

    pub fn with_pay_rates(mut self, pay_rates: Vec<PayRate>) -> Self {
        self.pay_rates = pay_rates;
        self
    }

    /// Rows in effect on `today`.
    pub fn effective_pay_rates(&self, today: NaiveDate) -> impl Iterator<Item = &PayRate> {
        self.pay_rates.iter().filter(move |r| r.is_effective(today))
    }

    /// True if any open row (current or scheduled) uses `pay_band`.
    pub fn offers_pay_band(&self, pay_band: &str) -> bool {
        self.pay_rates
            .iter()
            .any(|r| r.is_open() && r.pay_band == pay_band)
    }
}
