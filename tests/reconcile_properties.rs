use chrono::{Days, NaiveDate};
use payrates::application::reconcile::reconcile;
use payrates::domain::dates::overlaps;
use payrates::domain::pay_rate::{PayRate, RequestedPayRate};
use payrates::domain::rate::Rate;
use proptest::prelude::*;
use rust_decimal::Decimal;

const KEYS: [(&str, &str); 4] = [("STD", "1"), ("STD", "2"), ("ENH", "1"), ("ENH", "2")];

/// One update: days elapsed since the previous update, and a rate per key
/// (`None` leaves the key out of the request).
fn update() -> impl Strategy<Value = (u64, Vec<Option<u32>>)> {
    (0u64..3, prop::collection::vec(prop::option::of(1u32..4), KEYS.len()))
}

fn requested(rates: &[Option<u32>]) -> Vec<RequestedPayRate> {
    KEYS.iter()
        .zip(rates)
        .filter_map(|((level, band), rate)| {
            rate.map(|r| RequestedPayRate::new(*level, *band, Rate::new(Decimal::from(r)).unwrap()))
        })
        .collect()
}

fn assert_no_overlap(rows: &[PayRate]) -> Result<(), TestCaseError> {
    for (i, a) in rows.iter().enumerate() {
        for b in &rows[i + 1..] {
            if a.key() == b.key() {
                prop_assert!(
                    !overlaps(a.start_date, a.end_date, b.start_date, b.end_date),
                    "overlapping rows: {:?} and {:?}",
                    a,
                    b
                );
            }
        }
        prop_assert!(a.end_date.is_none_or(|end| end >= a.start_date));
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_history_invariants(updates in prop::collection::vec(update(), 1..12)) {
        let mut today: NaiveDate = "2024-01-01".parse().unwrap();
        let mut rows: Vec<PayRate> = Vec::new();

        for (elapsed, rates) in updates {
            today = today.checked_add_days(Days::new(elapsed)).unwrap();
            let request = requested(&rates);
            let next = reconcile(1, &request, &rows, today);

            assert_no_overlap(&next)?;

            // Closed rows survive unchanged, or are reopened when reinstated today
            for closed in rows.iter().filter(|r| r.end_date.is_some()) {
                let kept = next.contains(closed);
                let reinstated = closed.end_date == Some(today) && next.contains(&closed.reopened());
                prop_assert!(kept || reinstated, "lost closed row {:?}", closed);
            }

            // Every requested key has exactly one open row at the requested rate
            for rate in &request {
                let open: Vec<_> = next
                    .iter()
                    .filter(|r| r.has_key(&rate.key()) && r.is_open())
                    .collect();
                prop_assert_eq!(open.len(), 1);
                prop_assert_eq!(open[0].half_day_rate, rate.rate);
            }

            // Keys left out of the request have no open row
            for row in next.iter().filter(|r| r.is_open()) {
                prop_assert!(request.iter().any(|r| r.key() == row.key()));
            }

            // Applying the same request again changes nothing
            prop_assert_eq!(reconcile(1, &request, &next, today), next.clone());

            rows = next;
        }
    }
}

#[test]
fn reinstating_today_leaves_single_open_row() {
    let today: NaiveDate = "2024-01-10".parse().unwrap();
    let five = Rate::new(Decimal::from(5)).unwrap();
    let six = Rate::new(Decimal::from(6)).unwrap();

    let original = reconcile(1, &[RequestedPayRate::new("STD", "1", five)], &[], "2024-01-01".parse().unwrap());
    let scheduled = reconcile(1, &[RequestedPayRate::new("STD", "1", six)], &original, today);
    assert_eq!(scheduled.len(), 2);

    let reverted = reconcile(1, &[RequestedPayRate::new("STD", "1", five)], &scheduled, today);
    assert_eq!(reverted, original);
}
