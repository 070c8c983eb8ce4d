//! Fixed collection of sensor slots owned by the running service.

use super::lookup::LookupTables;
use super::slot::SensorSlot;
use super::RawSample;
use crate::error::Result;
use crate::view::{SessionOptions, Target, ViewSession};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Owns every [`SensorSlot`] and the shared lookup tables.
///
/// Created once at service start. Dropping the registry (or calling
/// [`SensorRegistry::shutdown`]) cancels every reader still parked on one of
/// its slots; those readers get [`crate::LunixError::Cancelled`].
pub struct SensorRegistry {
    slots: Vec<Arc<SensorSlot>>,
    lookup: Arc<LookupTables>,
    shutdown: CancellationToken,
}

impl SensorRegistry {
    /// Create `sensor_count` empty slots with the standard lookup tables.
    pub fn new(sensor_count: usize) -> Result<Self> {
        Self::with_tables(sensor_count, LookupTables::standard()?)
    }

    /// Create `sensor_count` empty slots converting through `lookup`.
    pub fn with_tables(sensor_count: usize, lookup: LookupTables) -> Result<Self> {
        let shutdown = CancellationToken::new();
        let mut slots = Vec::new();
        slots.try_reserve_exact(sensor_count)?;
        slots.extend(
            (0..sensor_count).map(|id| Arc::new(SensorSlot::new(id, shutdown.child_token()))),
        );

        info!("Sensor registry initialized with {} sensors", sensor_count);
        Ok(Self {
            slots,
            lookup: Arc::new(lookup),
            shutdown,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, sensor_id: usize) -> Option<&Arc<SensorSlot>> {
        self.slots.get(sensor_id)
    }

    pub fn slots(&self) -> impl Iterator<Item = &Arc<SensorSlot>> {
        self.slots.iter()
    }

    pub fn lookup(&self) -> &Arc<LookupTables> {
        &self.lookup
    }

    /// Store a new sample for `sensor_id`. Called by the acquisition path.
    ///
    /// Fire-and-forget: samples for unknown sensors are dropped.
    pub fn update(&self, sensor_id: usize, battery: u16, temperature: u16, light: u16) {
        match self.slots.get(sensor_id) {
            Some(slot) => {
                slot.update(RawSample::new(battery, temperature, light));
            }
            None => debug!("Dropping sample for unknown sensor {}", sensor_id),
        }
    }

    /// Open a view session on `target`.
    pub fn open(&self, target: Target, options: SessionOptions) -> Result<ViewSession> {
        ViewSession::open(self, target, options)
    }

    /// Open a view session addressed by device minor number.
    pub fn open_minor(&self, minor: u32, options: SessionOptions) -> Result<ViewSession> {
        ViewSession::open(self, Target::from_minor(minor)?, options)
    }

    /// Token cancelled when the registry shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Cancel every pending wait on every slot.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Shutting down sensor registry");
            self.shutdown.cancel();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for SensorRegistry {
    fn drop(&mut self) {
        let parked: usize = self.slots.iter().map(|slot| slot.waiters()).sum();
        if parked > 0 {
            warn!("Sensor registry dropped with {} parked readers", parked);
        }
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{MeasurementKind, Timestamp};

    #[test]
    fn test_new_registry_slots_are_empty() {
        let registry = SensorRegistry::new(4).unwrap();
        assert_eq!(registry.len(), 4);
        assert!(!registry.is_empty());
        for (id, slot) in registry.slots().enumerate() {
            assert_eq!(slot.id(), id);
            assert_eq!(slot.last_update(), Timestamp::NEVER);
        }
    }

    #[test]
    fn test_update_routes_to_slot() {
        let registry = SensorRegistry::new(2).unwrap();
        registry.update(1, 10, 300, 5);

        let slot = registry.slot(1).unwrap();
        assert_eq!(slot.snapshot(MeasurementKind::Temperature).0, 300);
        assert_eq!(registry.slot(0).unwrap().last_update(), Timestamp::NEVER);
    }

    #[test]
    fn test_update_unknown_sensor_is_ignored() {
        let registry = SensorRegistry::new(1).unwrap();
        registry.update(7, 1, 2, 3);
        assert_eq!(registry.slot(0).unwrap().last_update(), Timestamp::NEVER);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let registry = SensorRegistry::new(1).unwrap();
        assert!(!registry.is_shut_down());
        registry.shutdown();
        registry.shutdown();
        assert!(registry.is_shut_down());
    }

    #[tokio::test]
    async fn test_drop_cancels_parked_slot_waits() {
        let registry = SensorRegistry::new(1).unwrap();
        let slot = registry.slot(0).unwrap().clone();
        drop(registry);

        let cancel = CancellationToken::new();
        assert_eq!(
            slot.wait_for_freshness(Timestamp::NEVER, &cancel).await,
            Err(crate::LunixError::Cancelled)
        );
    }
}
