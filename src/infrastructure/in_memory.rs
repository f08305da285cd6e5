use crate::domain::activity::Activity;
use crate::domain::allocation::{Allocation, AllocationId};
use crate::domain::pay_rate::{ActivityId, PayRate};
use crate::domain::ports::{ActivityStore, AllocationStore, ReferenceDataLookup};
use crate::error::{PayRateError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for activities.
///
/// Uses `Arc<RwLock<HashMap<ActivityId, Activity>>>` to allow shared concurrent access.
/// Clones share the same map, so a test can keep a handle to inspect what was written.
#[derive(Default, Clone)]
pub struct InMemoryActivityStore {
    activities: Arc<RwLock<HashMap<ActivityId, Activity>>>,
}

impl InMemoryActivityStore {
    /// Creates a new, empty in-memory activity store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityStore for InMemoryActivityStore {
    async fn get(&self, activity_id: ActivityId) -> Result<Option<Activity>> {
        let activities = self.activities.read().await;
        Ok(activities.get(&activity_id).cloned())
    }

    async fn store(&self, activity: Activity) -> Result<()> {
        let mut activities = self.activities.write().await;
        activities.insert(activity.id, activity);
        Ok(())
    }

    async fn replace_pay_rates(
        &self,
        activity_id: ActivityId,
        pay_rates: Vec<PayRate>,
    ) -> Result<()> {
        let mut activities = self.activities.write().await;
        let activity = activities
            .get_mut(&activity_id)
            .ok_or_else(|| PayRateError::NotFound(format!("Activity {activity_id}")))?;
        activity.pay_rates = pay_rates;
        Ok(())
    }
}

/// A thread-safe in-memory store for allocations.
#[derive(Default, Clone)]
pub struct InMemoryAllocationStore {
    allocations: Arc<RwLock<HashMap<AllocationId, Allocation>>>,
}

impl InMemoryAllocationStore {
    /// Creates a new, empty in-memory allocation store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AllocationStore for InMemoryAllocationStore {
    async fn get(&self, allocation_id: AllocationId) -> Result<Option<Allocation>> {
        let allocations = self.allocations.read().await;
        Ok(allocations.get(&allocation_id).cloned())
    }

    async fn store(&self, allocation: Allocation) -> Result<()> {
        let mut allocations = self.allocations.write().await;
        allocations.insert(allocation.id, allocation);
        Ok(())
    }

    async fn active_for_activity(
        &self,
        activity_id: ActivityId,
        today: NaiveDate,
    ) -> Result<Vec<Allocation>> {
        let allocations = self.allocations.read().await;
        let mut active: Vec<Allocation> = allocations
            .values()
            .filter(|a| a.activity_id == activity_id && !a.has_ended(today))
            .cloned()
            .collect();
        active.sort_by_key(|a| a.id);
        Ok(active)
    }
}

/// Reference data held in memory, keyed by (prison, code).
#[derive(Default, Clone)]
pub struct InMemoryReferenceData {
    incentive_levels: HashMap<(String, String), String>,
    pay_bands: HashMap<(String, String), String>,
}

impl InMemoryReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_incentive_level(
        mut self,
        prison_id: impl Into<String>,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.incentive_levels
            .insert((prison_id.into(), code.into()), description.into());
        self
    }

    pub fn with_pay_band(
        mut self,
        prison_id: impl Into<String>,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.pay_bands
            .insert((prison_id.into(), code.into()), description.into());
        self
    }
}

#[async_trait]
impl ReferenceDataLookup for InMemoryReferenceData {
    async fn incentive_level(&self, prison_id: &str, code: &str) -> Result<Option<String>> {
        Ok(self
            .incentive_levels
            .get(&(prison_id.to_string(), code.to_string()))
            .cloned())
    }

    async fn pay_band(&self, prison_id: &str, code: &str) -> Result<Option<String>> {
        Ok(self
            .pay_bands
            .get(&(prison_id.to_string(), code.to_string()))
            .cloned())
    }
}
