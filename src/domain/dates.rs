use chrono::{Days, NaiveDate};

/// First day a successor may start once its predecessor has ended.
///
/// End dates are inclusive, so the successor starts the day after the
/// predecessor's end date, but never before `today`.
pub fn successor_start(predecessor_end: NaiveDate, today: NaiveDate) -> NaiveDate {
    let next = predecessor_end
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX);
    next.max(today)
}

/// Inclusive overlap test for two half-bounded date ranges.
pub fn overlaps(
    a_start: NaiveDate,
    a_end: Option<NaiveDate>,
    b_start: NaiveDate,
    b_end: Option<NaiveDate>,
) -> bool {
    let a_before_b = a_end.is_some_and(|end| end < b_start);
    let b_before_a = b_end.is_some_and(|end| end < a_start);
    !(a_before_b || b_before_a)
}
