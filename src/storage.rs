//! Persistent odometer storage.
//!
//! The cluster core only *requests* checkpoints; this module is the
//! collaborator that writes them. Two keys are stored, each an unsigned
//! meter count:
//!   - `odometer_total`
//!   - `trip_distance`
//!
//! On target the keys live in a `sequential-storage` map on the
//! nRF52840's internal flash (see `FlashStore`), which handles wear
//! levelling and GC. Host tests use `MemoryStore`.

use crate::error::{Error, StorageError};
use crate::persistence::CheckpointRequest;

#[cfg(feature = "embedded")]
mod flash;
#[cfg(feature = "embedded")]
pub use flash::FlashStore;

/// Persisted keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageKey {
    OdometerTotal,
    TripDistance,
}

impl StorageKey {
    /// Conceptual key name.
    pub const fn name(self) -> &'static str {
        match self {
            StorageKey::OdometerTotal => "odometer_total",
            StorageKey::TripDistance => "trip_distance",
        }
    }

    /// One-byte key used in the flash map.
    pub const fn id(self) -> u8 {
        match self {
            StorageKey::OdometerTotal => 0x01,
            StorageKey::TripDistance => 0x02,
        }
    }
}

/// Durable key-value storage consumed by the checkpoint path.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    async fn write(&mut self, key: StorageKey, value: u64) -> Result<(), Error>;
    async fn read(&mut self, key: StorageKey) -> Result<Option<u64>, Error>;
}

/// Totals loaded at boot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoredOdometer {
    pub total_m: u64,
    pub trip_m: u32,
}

/// Write a checkpoint: total first, then trip. Stops at the first failure;
/// the next checkpoint carries the then-current totals anyway.
pub async fn commit<S: KeyValueStore>(store: &mut S, request: &CheckpointRequest) -> Result<(), Error> {
    store.write(StorageKey::OdometerTotal, request.total_m).await?;
    store
        .write(StorageKey::TripDistance, u64::from(request.trip_m))
        .await?;
    crate::log_debug!(
        "Storage: committed total={} trip={}",
        request.total_m,
        request.trip_m
    );
    Ok(())
}

/// Load stored totals. Missing keys read as zero; trip is clamped to total.
pub async fn restore<S: KeyValueStore>(store: &mut S) -> Result<StoredOdometer, Error> {
    let total_m = store.read(StorageKey::OdometerTotal).await?.unwrap_or(0);
    let trip_raw = store.read(StorageKey::TripDistance).await?.unwrap_or(0);

    let trip_m = u32::try_from(trip_raw.min(total_m)).map_err(|_| StorageError::Corrupt)?;
    if trip_raw > total_m {
        crate::log_warn!("Storage: trip {} > total {}, clamped", trip_raw, total_m);
    }

    crate::log_info!("Storage: restored total={} trip={}", total_m, trip_m);
    Ok(StoredOdometer { total_m, trip_m })
}

/// RAM-backed store for host tests and simulators.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    total: Option<u64>,
    trip: Option<u64>,
    /// Number of upcoming writes that will fail.
    pub fail_writes: u32,
    /// Successful writes so far.
    pub writes: u32,
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self {
            total: None,
            trip: None,
            fail_writes: 0,
            writes: 0,
        }
    }

    pub fn get(&self, key: StorageKey) -> Option<u64> {
        match key {
            StorageKey::OdometerTotal => self.total,
            StorageKey::TripDistance => self.trip,
        }
    }

    fn slot(&mut self, key: StorageKey) -> &mut Option<u64> {
        match key {
            StorageKey::OdometerTotal => &mut self.total,
            StorageKey::TripDistance => &mut self.trip,
        }
    }
}

impl KeyValueStore for MemoryStore {
    async fn write(&mut self, key: StorageKey, value: u64) -> Result<(), Error> {
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            crate::log_error!("Storage: write {} failed", key.name());
            return Err(StorageError::Write.into());
        }
        *self.slot(key) = Some(value);
        self.writes += 1;
        Ok(())
    }

    async fn read(&mut self, key: StorageKey) -> Result<Option<u64>, Error> {
        Ok(self.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::CheckpointCause;
    use embassy_futures::block_on;

    fn request(total_m: u64, trip_m: u32) -> CheckpointRequest {
        CheckpointRequest {
            total_m,
            trip_m,
            cause: CheckpointCause::Stationary,
        }
    }

    #[test]
    fn keys_are_stable() {
        assert_eq!(StorageKey::OdometerTotal.name(), "odometer_total");
        assert_eq!(StorageKey::TripDistance.name(), "trip_distance");
        assert_ne!(StorageKey::OdometerTotal.id(), StorageKey::TripDistance.id());
    }

    #[test]
    fn commit_then_restore() {
        let mut store = MemoryStore::new();
        block_on(commit(&mut store, &request(123_456, 7_890))).unwrap();
        assert_eq!(store.writes, 2);

        let stored = block_on(restore(&mut store)).unwrap();
        assert_eq!(
            stored,
            StoredOdometer {
                total_m: 123_456,
                trip_m: 7_890
            }
        );
    }

    #[test]
    fn empty_store_restores_zero() {
        let mut store = MemoryStore::new();
        let stored = block_on(restore(&mut store)).unwrap();
        assert_eq!(stored, StoredOdometer::default());
    }

    #[test]
    fn failed_write_is_surfaced_not_retried() {
        let mut store = MemoryStore::new();
        store.fail_writes = 1;
        let err = block_on(commit(&mut store, &request(1_000, 1_000))).unwrap_err();
        assert_eq!(err, Error::Storage(StorageError::Write));
        assert_eq!(store.writes, 0);
        assert_eq!(store.get(StorageKey::TripDistance), None);

        // Next checkpoint carries the current totals.
        block_on(commit(&mut store, &request(2_000, 2_000))).unwrap();
        assert_eq!(store.get(StorageKey::OdometerTotal), Some(2_000));
    }

    #[test]
    fn restore_clamps_trip_to_total() {
        let mut store = MemoryStore::new();
        block_on(store.write(StorageKey::OdometerTotal, 500)).unwrap();
        block_on(store.write(StorageKey::TripDistance, 9_000)).unwrap();
        let stored = block_on(restore(&mut store)).unwrap();
        assert_eq!(stored.trip_m, 500);
    }
}
