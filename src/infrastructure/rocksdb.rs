use crate::domain::activity::Activity;
use crate::domain::allocation::{Allocation, AllocationId};
use crate::domain::pay_rate::{ActivityId, PayRate};
use crate::domain::ports::{ActivityStore, AllocationStore};
use crate::error::{PayRateError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing activities with their pay-rate history.
pub const CF_ACTIVITIES: &str = "activities";
/// Column Family for storing allocations with their pay bands.
pub const CF_ALLOCATIONS: &str = "allocations";

/// A persistent store implementation using RocksDB.
///
/// Activities and allocations live in separate Column Families, keyed by
/// their big-endian id and stored as JSON. An activity's pay rates are
/// written together with the activity, so replacing them is a single put.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("activities" and "allocations") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_activities = ColumnFamilyDescriptor::new(CF_ACTIVITIES, Options::default());
        let cf_allocations = ColumnFamilyDescriptor::new(CF_ALLOCATIONS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_activities, cf_allocations])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn put<T: serde::Serialize>(&self, cf_name: &str, key: [u8; 8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key, bytes)?;
        Ok(())
    }

    fn load<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        key: [u8; 8],
    ) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PayRateError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }
}

#[async_trait]
impl ActivityStore for RocksDBStore {
    async fn get(&self, activity_id: ActivityId) -> Result<Option<Activity>> {
        self.load(CF_ACTIVITIES, activity_id.to_be_bytes())
    }

    async fn store(&self, activity: Activity) -> Result<()> {
        self.put(CF_ACTIVITIES, activity.id.to_be_bytes(), &activity)
    }

    async fn replace_pay_rates(
        &self,
        activity_id: ActivityId,
        pay_rates: Vec<PayRate>,
    ) -> Result<()> {
        let mut activity: Activity = self
            .load(CF_ACTIVITIES, activity_id.to_be_bytes())?
            .ok_or_else(|| PayRateError::NotFound(format!("Activity {activity_id}")))?;
        activity.pay_rates = pay_rates;
        self.put(CF_ACTIVITIES, activity_id.to_be_bytes(), &activity)
    }
}

#[async_trait]
impl AllocationStore for RocksDBStore {
    async fn get(&self, allocation_id: AllocationId) -> Result<Option<Allocation>> {
        self.load(CF_ALLOCATIONS, allocation_id.to_be_bytes())
    }

    async fn store(&self, allocation: Allocation) -> Result<()> {
        self.put(CF_ALLOCATIONS, allocation.id.to_be_bytes(), &allocation)
    }

    async fn active_for_activity(
        &self,
        activity_id: ActivityId,
        today: NaiveDate,
    ) -> Result<Vec<Allocation>> {
        let cf = self.cf(CF_ALLOCATIONS)?;

        let mut allocations = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            let allocation: Allocation = serde_json::from_slice(&value)?;
            if allocation.activity_id == activity_id && !allocation.has_ended(today) {
                allocations.push(allocation);
            }
        }

        Ok(allocations)
    }
}
