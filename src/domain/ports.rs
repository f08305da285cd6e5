use super::activity::Activity;
use super::allocation::{Allocation, AllocationId};
use super::pay_rate::{ActivityId, PayRate};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Prison reference data: incentive levels and pay bands.
///
/// Lookups return the code's description, or `None` if the code is not
/// valid for the prison.
#[async_trait]
pub trait ReferenceDataLookup: Send + Sync {
    async fn incentive_level(&self, prison_id: &str, code: &str) -> Result<Option<String>>;
    async fn pay_band(&self, prison_id: &str, code: &str) -> Result<Option<String>>;
}

#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn get(&self, activity_id: ActivityId) -> Result<Option<Activity>>;
    async fn store(&self, activity: Activity) -> Result<()>;
    /// Replaces the activity's pay-rate rows in one write.
    async fn replace_pay_rates(
        &self,
        activity_id: ActivityId,
        pay_rates: Vec<PayRate>,
    ) -> Result<()>;
}

#[async_trait]
pub trait AllocationStore: Send + Sync {
    async fn get(&self, allocation_id: AllocationId) -> Result<Option<Allocation>>;
    async fn store(&self, allocation: Allocation) -> Result<()>;
    /// Allocations of the activity that have not ended by `today`.
    async fn active_for_activity(
        &self,
        activity_id: ActivityId,
        today: NaiveDate,
    ) -> Result<Vec<Allocation>>;
}

pub type ReferenceDataBox = Box<dyn ReferenceDataLookup>;
pub type ActivityStoreBox = Box<dyn ActivityStore>;
pub type AllocationStoreBox = Box<dyn AllocationStore>;
