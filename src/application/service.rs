use super::changes::PayRateChanges;
use super::pay_band::transition_pay_band;
use super::reconcile::{reconcile, removed_pay_bands};
use crate::domain::activity::Activity;
use crate::domain::allocation::{Allocation, AllocationId};
use crate::domain::pay_rate::{ActivityId, PayRate, RequestedPayRate};
use crate::domain::ports::{ActivityStoreBox, AllocationStoreBox, ReferenceDataBox};
use crate::domain::rate::Rate;
use crate::error::{PayRateError, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// A pay rate in effect, with its codes resolved against reference data.
#[derive(Debug, Clone, PartialEq)]
pub struct PayRateDescription {
    pub incentive_level: String,
    pub incentive_level_description: String,
    pub pay_band: String,
    pub pay_band_description: String,
    pub half_day_rate: Rate,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Entry point for pay-rate and pay-band updates.
///
/// Every update validates its input against the stores and reference data
/// before computing the new rows, and then persists them with a single write,
/// so a failed update leaves nothing behind.
pub struct ActivityService {
    reference_data: ReferenceDataBox,
    activities: ActivityStoreBox,
    allocations: AllocationStoreBox,
}

impl ActivityService {
    /// Creates a new `ActivityService`.
    ///
    /// # Arguments
    ///
    /// * `reference_data` - Incentive levels and pay bands per prison.
    /// * `activities` - The store for activities and their pay rates.
    /// * `allocations` - The store for allocations and their pay bands.
    pub fn new(
        reference_data: ReferenceDataBox,
        activities: ActivityStoreBox,
        allocations: AllocationStoreBox,
    ) -> Self {
        Self {
            reference_data,
            activities,
            allocations,
        }
    }

    /// Replaces an activity's pay rates with `requested` as of `today`.
    ///
    /// Returns the activity's full pay-rate history after the update.
    pub async fn update_pay_rates(
        &self,
        activity_id: ActivityId,
        requested: &[RequestedPayRate],
        today: NaiveDate,
    ) -> Result<Vec<PayRate>> {
        let activity = self.activity(activity_id).await?;
        self.validate_requested(&activity.prison_id, requested).await?;

        let reconciled = reconcile(activity.id, requested, &activity.pay_rates, today);
        self.check_removed_pay_bands(&activity, &reconciled, today)
            .await?;

        let changes = PayRateChanges::between(&activity.pay_rates, &reconciled);
        if changes.is_empty() {
            debug!(activity_id, "pay rates unchanged");
            return Ok(reconciled);
        }

        self.activities
            .replace_pay_rates(activity.id, reconciled.clone())
            .await?;
        info!(
            activity_id,
            inserted = changes.inserted.len(),
            updated = changes.updated.len(),
            discarded = changes.discarded.len(),
            "pay rates updated"
        );
        Ok(reconciled)
    }

    /// Moves an allocated person onto `pay_band` as of `today`.
    pub async fn update_allocation_pay_band(
        &self,
        allocation_id: AllocationId,
        pay_band: &str,
        today: NaiveDate,
    ) -> Result<Allocation> {
        let mut allocation = self
            .allocations
            .get(allocation_id)
            .await?
            .ok_or_else(|| PayRateError::NotFound(format!("Allocation {allocation_id}")))?;
        if let Some(end) = allocation.end_date
            && allocation.has_ended(today)
        {
            return Err(PayRateError::BadData(format!(
                "Allocation {allocation_id} ended on {end}"
            )));
        }

        let activity = self.activity(allocation.activity_id).await?;
        if !activity.offers_pay_band(pay_band) {
            return Err(PayRateError::BadData(format!(
                "Pay band {pay_band} has no pay rate on activity {}",
                activity.id
            )));
        }

        let pay_bands = transition_pay_band(&allocation.pay_bands, pay_band, today);
        if pay_bands == allocation.pay_bands {
            debug!(allocation_id, pay_band, "pay band unchanged");
            return Ok(allocation);
        }

        let previous = allocation.current_pay_band(today).map(str::to_string);
        allocation.pay_bands = pay_bands;
        self.allocations.store(allocation.clone()).await?;
        info!(
            allocation_id,
            offender_no = %allocation.offender_no,
            from = ?previous,
            pay_band,
            "allocation pay band updated"
        );
        Ok(allocation)
    }

    /// Pay rates in effect on `today`, with reference-data descriptions.
    ///
    /// Codes that no longer resolve are described by the code itself.
    pub async fn describe_pay_rates(
        &self,
        activity_id: ActivityId,
        today: NaiveDate,
    ) -> Result<Vec<PayRateDescription>> {
        let activity = self.activity(activity_id).await?;
        let mut described = Vec::new();
        for rate in activity.effective_pay_rates(today) {
            let incentive_level_description = self
                .reference_data
                .incentive_level(&activity.prison_id, &rate.incentive_level)
                .await?
                .unwrap_or_else(|| rate.incentive_level.clone());
            let pay_band_description = self
                .reference_data
                .pay_band(&activity.prison_id, &rate.pay_band)
                .await?
                .unwrap_or_else(|| rate.pay_band.clone());
            described.push(PayRateDescription {
                incentive_level: rate.incentive_level.clone(),
                incentive_level_description,
                pay_band: rate.pay_band.clone(),
                pay_band_description,
                half_day_rate: rate.half_day_rate,
                start_date: rate.start_date,
                end_date: rate.end_date,
            });
        }
        Ok(described)
    }

    async fn activity(&self, activity_id: ActivityId) -> Result<Activity> {
        self.activities
            .get(activity_id)
            .await?
            .ok_or_else(|| PayRateError::NotFound(format!("Activity {activity_id}")))
    }

    async fn validate_requested(
        &self,
        prison_id: &str,
        requested: &[RequestedPayRate],
    ) -> Result<()> {
        let mut seen = HashSet::new();
        for rate in requested {
            if !seen.insert(rate.key()) {
                return Err(PayRateError::BadData(format!(
                    "Pay rate {} requested more than once",
                    rate.key()
                )));
            }
            if self
                .reference_data
                .incentive_level(prison_id, &rate.incentive_level)
                .await?
                .is_none()
            {
                return Err(PayRateError::BadData(format!(
                    "Incentive level {} does not exist for prison {prison_id}",
                    rate.incentive_level
                )));
            }
            if self
                .reference_data
                .pay_band(prison_id, &rate.pay_band)
                .await?
                .is_none()
            {
                return Err(PayRateError::BadData(format!(
                    "Pay band {} does not exist for prison {prison_id}",
                    rate.pay_band
                )));
            }
        }
        Ok(())
    }

    async fn check_removed_pay_bands(
        &self,
        activity: &Activity,
        reconciled: &[PayRate],
        today: NaiveDate,
    ) -> Result<()> {
        let removed = removed_pay_bands(&activity.pay_rates, reconciled);
        if removed.is_empty() {
            return Ok(());
        }

        let allocations = self
            .allocations
            .active_for_activity(activity.id, today)
            .await?;
        for pay_band in removed {
            let mut offenders: Vec<String> = allocations
                .iter()
                .filter(|a| a.references_pay_band(&pay_band, today))
                .map(|a| a.offender_no.clone())
                .collect();
            if !offenders.is_empty() {
                offenders.sort();
                warn!(activity_id = activity.id, %pay_band, ?offenders, "pay band removal blocked");
                return Err(PayRateError::InUse {
                    pay_band,
                    offenders,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allocation::PayBandAssignment;
    use crate::domain::pay_rate::PayRateKey;
    use crate::domain::ports::{ActivityStore, AllocationStore};
    use crate::infrastructure::in_memory::{
        InMemoryActivityStore, InMemoryAllocationStore, InMemoryReferenceData,
    };
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn rate(value: rust_decimal::Decimal) -> Rate {
        Rate::new(value).unwrap()
    }

    fn reference_data() -> InMemoryReferenceData {
        InMemoryReferenceData::new()
            .with_incentive_level("MDI", "BAS", "Basic")
            .with_incentive_level("MDI", "STD", "Standard")
            .with_pay_band("MDI", "1", "Pay band 1")
            .with_pay_band("MDI", "2", "Pay band 2")
    }

    fn allocation(pay_band: &str) -> Allocation {
        Allocation {
            id: 7,
            activity_id: 1,
            offender_no: "A1234BC".to_string(),
            start_date: date("2023-06-01"),
            end_date: None,
            pay_bands: vec![PayBandAssignment::open(pay_band, date("2023-06-01"))],
        }
    }

    async fn service_with(
        pay_rates: Vec<PayRate>,
        allocations: Vec<Allocation>,
    ) -> (ActivityService, InMemoryActivityStore, InMemoryAllocationStore) {
        let activities = InMemoryActivityStore::new();
        activities
            .store(Activity::new(1, "MDI").with_pay_rates(pay_rates))
            .await
            .unwrap();
        let allocation_store = InMemoryAllocationStore::new();
        for allocation in allocations {
            allocation_store.store(allocation).await.unwrap();
        }
        let service = ActivityService::new(
            Box::new(reference_data()),
            Box::new(activities.clone()),
            Box::new(allocation_store.clone()),
        );
        (service, activities, allocation_store)
    }

    #[tokio::test]
    async fn test_update_pay_rates_persists_reconciled_rows() {
        let existing = vec![PayRate::open(
            1,
            PayRateKey::new("STD", "1"),
            date("2023-06-01"),
            rate(dec!(5)),
        )];
        let (service, activities, _) = service_with(existing, vec![]).await;

        let requested = vec![RequestedPayRate::new("STD", "1", rate(dec!(6)))];
        let result = service
            .update_pay_rates(1, &requested, date("2024-01-10"))
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        let stored = activities.get(1).await.unwrap().unwrap();
        assert_eq!(stored.pay_rates, result);
        assert_eq!(stored.pay_rates[1].start_date, date("2024-01-11"));
    }

    #[tokio::test]
    async fn test_unknown_codes_are_rejected() {
        let (service, activities, _) = service_with(vec![], vec![]).await;

        let unknown_level = vec![RequestedPayRate::new("ENH", "1", rate(dec!(6)))];
        let err = service
            .update_pay_rates(1, &unknown_level, date("2024-01-10"))
            .await
            .unwrap_err();
        assert!(matches!(err, PayRateError::BadData(msg) if msg.contains("Incentive level ENH")));

        let unknown_band = vec![
            RequestedPayRate::new("STD", "1", rate(dec!(6))),
            RequestedPayRate::new("STD", "9", rate(dec!(6))),
        ];
        let err = service
            .update_pay_rates(1, &unknown_band, date("2024-01-10"))
            .await
            .unwrap_err();
        assert!(matches!(err, PayRateError::BadData(msg) if msg.contains("Pay band 9")));

        // Nothing was written
        assert!(activities.get(1).await.unwrap().unwrap().pay_rates.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_requests_are_rejected() {
        let (service, _, _) = service_with(vec![], vec![]).await;
        let requested = vec![
            RequestedPayRate::new("STD", "1", rate(dec!(6))),
            RequestedPayRate::new("STD", "1", rate(dec!(7))),
        ];
        let err = service
            .update_pay_rates(1, &requested, date("2024-01-10"))
            .await
            .unwrap_err();
        assert!(matches!(err, PayRateError::BadData(_)));
    }

    #[tokio::test]
    async fn test_missing_activity() {
        let (service, _, _) = service_with(vec![], vec![]).await;
        let err = service
            .update_pay_rates(99, &[], date("2024-01-10"))
            .await
            .unwrap_err();
        assert!(matches!(err, PayRateError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_removing_allocated_pay_band_is_blocked() {
        let existing = vec![
            PayRate::open(1, PayRateKey::new("STD", "1"), date("2023-06-01"), rate(dec!(5))),
            PayRate::open(1, PayRateKey::new("STD", "2"), date("2023-06-01"), rate(dec!(6))),
        ];
        let (service, activities, _) = service_with(existing.clone(), vec![allocation("2")]).await;

        let requested = vec![RequestedPayRate::new("STD", "1", rate(dec!(5.5)))];
        let err = service
            .update_pay_rates(1, &requested, date("2024-01-10"))
            .await
            .unwrap_err();

        match err {
            PayRateError::InUse { pay_band, offenders } => {
                assert_eq!(pay_band, "2");
                assert_eq!(offenders, vec!["A1234BC".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(activities.get(1).await.unwrap().unwrap().pay_rates, existing);
    }

    #[tokio::test]
    async fn test_removing_unallocated_pay_band_is_allowed() {
        let existing = vec![
            PayRate::open(1, PayRateKey::new("STD", "1"), date("2023-06-01"), rate(dec!(5))),
            PayRate::open(1, PayRateKey::new("STD", "2"), date("2023-06-01"), rate(dec!(6))),
        ];
        let (service, _, _) = service_with(existing, vec![allocation("1")]).await;

        let requested = vec![RequestedPayRate::new("STD", "1", rate(dec!(5)))];
        let result = service
            .update_pay_rates(1, &requested, date("2024-01-10"))
            .await
            .unwrap();
        assert_eq!(result[1].end_date, Some(date("2024-01-10")));
    }

    #[tokio::test]
    async fn test_update_allocation_pay_band() {
        let existing = vec![
            PayRate::open(1, PayRateKey::new("STD", "1"), date("2023-06-01"), rate(dec!(5))),
            PayRate::open(1, PayRateKey::new("STD", "2"), date("2023-06-01"), rate(dec!(6))),
        ];
        let (service, _, allocations) = service_with(existing, vec![allocation("1")]).await;

        let updated = service
            .update_allocation_pay_band(7, "2", date("2024-01-10"))
            .await
            .unwrap();
        assert_eq!(updated.pay_bands.len(), 2);
        assert_eq!(updated.pay_bands[1].start_date, date("2024-01-11"));
        assert_eq!(allocations.get(7).await.unwrap().unwrap(), updated);

        let err = service
            .update_allocation_pay_band(7, "9", date("2024-01-10"))
            .await
            .unwrap_err();
        assert!(matches!(err, PayRateError::BadData(_)));

        let err = service
            .update_allocation_pay_band(8, "1", date("2024-01-10"))
            .await
            .unwrap_err();
        assert!(matches!(err, PayRateError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ended_allocation_cannot_change_pay_band() {
        let existing = vec![PayRate::open(
            1,
            PayRateKey::new("STD", "2"),
            date("2023-06-01"),
            rate(dec!(6)),
        )];
        let mut ended = allocation("1");
        ended.end_date = Some(date("2023-12-31"));
        let (service, _, _) = service_with(existing, vec![ended]).await;

        let err = service
            .update_allocation_pay_band(7, "2", date("2024-01-10"))
            .await
            .unwrap_err();
        assert!(matches!(err, PayRateError::BadData(msg) if msg.contains("ended")));
    }

    #[tokio::test]
    async fn test_pay_band_change_keeps_closed_assignment_history() {
        let existing = vec![
            PayRate::open(1, PayRateKey::new("STD", "1"), date("2023-06-01"), rate(dec!(5))),
            PayRate::open(1, PayRateKey::new("STD", "2"), date("2023-06-01"), rate(dec!(6))),
        ];
        let mut lapsed = allocation("1");
        lapsed.pay_bands[0].end_date = Some(date("2024-01-05"));
        let (service, _, _) = service_with(existing, vec![lapsed]).await;

        let updated = service
            .update_allocation_pay_band(7, "2", date("2024-01-10"))
            .await
            .unwrap();
        assert_eq!(updated.pay_bands[0].end_date, Some(date("2024-01-05")));
        assert_eq!(updated.pay_bands[1].pay_band, "2");
        assert_eq!(updated.pay_bands[1].start_date, date("2024-01-10"));
        assert_eq!(updated.current_pay_band(date("2024-01-10")), Some("2"));
    }

    #[tokio::test]
    async fn test_describe_pay_rates() {
        let existing = vec![
            PayRate::open(1, PayRateKey::new("STD", "1"), date("2023-06-01"), rate(dec!(5)))
                .expired(date("2023-12-31")),
            PayRate::open(1, PayRateKey::new("STD", "1"), date("2024-01-01"), rate(dec!(5.5))),
        ];
        let (service, _, _) = service_with(existing, vec![]).await;

        let described = service.describe_pay_rates(1, date("2024-01-10")).await.unwrap();
        assert_eq!(described.len(), 1);
        assert_eq!(described[0].incentive_level_description, "Standard");
        assert_eq!(described[0].pay_band_description, "Pay band 1");
        assert_eq!(described[0].half_day_rate, rate(dec!(5.5)));
    }
}
