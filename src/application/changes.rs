use crate::domain::pay_rate::{PayRate, PayRateKey};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Row-level difference between persisted and reconciled pay rates.
///
/// Rows are matched on key-prefix and start date, the natural key of a
/// pay-rate row within an activity.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PayRateChanges {
    pub inserted: Vec<PayRate>,
    pub updated: Vec<PayRate>,
    /// Persisted rows with no counterpart in the reconciled set.
    pub discarded: Vec<PayRate>,
}

impl PayRateChanges {
    pub fn between(persisted: &[PayRate], reconciled: &[PayRate]) -> Self {
        let mut remaining: HashMap<(PayRateKey, NaiveDate), &PayRate> = persisted
            .iter()
            .map(|r| ((r.key(), r.start_date), r))
            .collect();

        let mut changes = Self::default();
        for row in reconciled {
            match remaining.remove(&(row.key(), row.start_date)) {
                None => changes.inserted.push(row.clone()),
                Some(previous) if previous != row => changes.updated.push(row.clone()),
                Some(_) => {}
            }
        }

        changes.discarded = persisted
            .iter()
            .filter(|r| remaining.contains_key(&(r.key(), r.start_date)))
            .cloned()
            .collect();
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.discarded.is_empty()
    }
}
