//! Temporal reconciliation of an activity's pay rates.
//!
//! Rows are never deleted once they have taken effect: a changed rate expires
//! the current row and opens a successor, and a removed key-prefix is expired
//! as of today. Only rows that never became effective are rewritten in place
//! or dropped.

use crate::domain::dates::successor_start;
use crate::domain::pay_rate::{ActivityId, PayRate, PayRateKey, RequestedPayRate};
use crate::domain::rate::Rate;
use chrono::{Days, NaiveDate};
use std::collections::HashSet;
use tracing::debug;

/// Computes the authoritative pay-rate rows for an activity as of `today`.
///
/// `requested` is the desired rate for each key-prefix; key-prefixes absent
/// from it are treated as removed. `existing` is the activity's full history.
/// Validation (unknown codes, duplicates, bands still allocated) is the
/// caller's job; this function is pure and never fails.
///
/// The result is sorted by incentive level, pay band and start date.
pub fn reconcile(
    activity_id: ActivityId,
    requested: &[RequestedPayRate],
    existing: &[PayRate],
    today: NaiveDate,
) -> Vec<PayRate> {
    let mut result = Vec::with_capacity(existing.len() + requested.len());
    // Indexes of existing rows already accounted for
    let mut handled = HashSet::new();

    for request in requested {
        let key = request.key();
        let Some(open_idx) = existing.iter().position(|r| r.has_key(&key) && r.is_open()) else {
            let start = latest_end(existing, &key)
                .map_or(today, |end| successor_start(end, today));
            debug!(%key, %start, rate = %request.rate, "creating pay rate");
            result.push(PayRate::open(activity_id, key, start, request.rate));
            continue;
        };
        handled.insert(open_idx);
        let current = &existing[open_idx];

        if current.half_day_rate == request.rate {
            result.push(current.clone());
            continue;
        }

        if let Some(prior_idx) = reinstatable(existing, current, request.rate, today) {
            debug!(%key, rate = %request.rate, "reinstating pay rate ending today");
            handled.insert(prior_idx);
            result.push(existing[prior_idx].reopened());
            continue;
        }

        if current.is_future(today) {
            debug!(%key, start = %current.start_date, rate = %request.rate, "amending pay rate not yet in effect");
            result.push(current.with_rate(request.rate));
            continue;
        }

        let expiry = today;
        let expired = current.expired(expiry);
        let start = successor_start(expiry, today);
        debug!(%key, %start, from = %current.half_day_rate, to = %request.rate, "changing pay rate");
        result.push(expired);
        result.push(PayRate::open(activity_id, key, start, request.rate));
    }

    for (idx, row) in existing.iter().enumerate() {
        if handled.contains(&idx) {
            continue;
        }
        if !row.is_open() {
            result.push(row.clone());
        } else if row.is_future(today) {
            debug!(key = %row.key(), start = %row.start_date, "dropping removed pay rate not yet in effect");
        } else {
            debug!(key = %row.key(), "expiring removed pay rate");
            result.push(row.expired(today));
        }
    }

    result.sort_by(|a, b| {
        (&a.incentive_level, &a.pay_band, a.start_date).cmp(&(
            &b.incentive_level,
            &b.pay_band,
            b.start_date,
        ))
    });
    result
}

/// Pay bands that have an open row in `existing` but none in `reconciled`.
///
/// These are the bands a reconciliation takes away from the activity.
pub fn removed_pay_bands(existing: &[PayRate], reconciled: &[PayRate]) -> Vec<String> {
    let remaining: HashSet<&str> = reconciled
        .iter()
        .filter(|r| r.is_open())
        .map(|r| r.pay_band.as_str())
        .collect();
    let mut removed: Vec<String> = existing
        .iter()
        .filter(|r| r.is_open() && !remaining.contains(r.pay_band.as_str()))
        .map(|r| r.pay_band.clone())
        .collect();
    removed.sort();
    removed.dedup();
    removed
}

fn latest_end(existing: &[PayRate], key: &PayRateKey) -> Option<NaiveDate> {
    existing
        .iter()
        .filter(|r| r.has_key(key))
        .filter_map(|r| r.end_date)
        .max()
}

/// Finds a row ending today at `rate` that `current`, a change scheduled to
/// start after today, would replace.
fn reinstatable(
    existing: &[PayRate],
    current: &PayRate,
    rate: Rate,
    today: NaiveDate,
) -> Option<usize> {
    if !current.is_future(today) {
        return None;
    }
    let tomorrow = today.checked_add_days(Days::new(1))?;
    if current.start_date != tomorrow {
        return None;
    }
    existing.iter().position(|r| {
        r.has_key(&current.key()) && r.end_date == Some(today) && r.half_day_rate == rate
    })
}
