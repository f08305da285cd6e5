//! Pay-band changes for a single allocation.
//!
//! Shares the effective-dating rules of [`super::reconcile`] but is a separate
//! state machine: the latest assignment (greatest start date) is the one a
//! request is compared against.

use crate::domain::allocation::PayBandAssignment;
use crate::domain::dates::successor_start;
use chrono::NaiveDate;
use tracing::debug;

/// Applies a pay-band change requested on `today` to an allocation's
/// assignments and returns the new assignment list, ordered by start date.
pub fn transition_pay_band(
    assignments: &[PayBandAssignment],
    requested: &str,
    today: NaiveDate,
) -> Vec<PayBandAssignment> {
    let mut result = assignments.to_vec();
    result.sort_by_key(|b| b.start_date);

    let Some(latest) = result.last() else {
        debug!(pay_band = requested, "first pay band for allocation");
        return vec![PayBandAssignment::open(requested, today)];
    };

    if let Some(end) = latest.end_date {
        let start = successor_start(end, today);
        debug!(pay_band = requested, %start, "pay band after closed assignment");
        result.push(PayBandAssignment::open(requested, start));
        return result;
    }

    if latest.pay_band == requested {
        return result;
    }

    if latest.is_future(today) {
        let ending_today = result
            .iter()
            .position(|b| b.end_date == Some(today) && b.pay_band == requested);
        if let Some(idx) = ending_today {
            debug!(pay_band = requested, "reinstating pay band ending today");
            result.pop();
            result[idx].end_date = None;
        } else if let Some(latest) = result.last_mut() {
            debug!(
                pay_band = requested,
                start = %latest.start_date,
                "amending pay band not yet in effect"
            );
            latest.pay_band = requested.to_string();
        }
        return result;
    }

    let expiry = today;
    let start = successor_start(expiry, today);
    if let Some(latest) = result.last_mut() {
        latest.end_date = Some(expiry);
    }
    debug!(pay_band = requested, %start, "changing pay band");
    result.push(PayBandAssignment::open(requested, start));
    result
}
