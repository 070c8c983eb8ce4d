//! Single-sample cache for one physical sensor.
//!
//! The slot is written by exactly one role (acquisition) and read by many
//! view sessions. The fast lock only ever guards a copy of the raw sample and
//! its stamp; formatting, allocation and waiting all happen outside it.

use super::notifier::UpdateNotifier;
use super::{MeasurementKind, RawSample, Timestamp};
use crate::error::{LunixError, Result};
use parking_lot::Mutex;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct SlotState {
    raw: RawSample,
    last_update: Timestamp,
}

/// Latest raw readings of one sensor plus the stamp of the update that wrote them.
///
/// # Example
/// ```ignore
/// let slot = SensorSlot::new(0, CancellationToken::new());
///
/// // Acquisition path
/// slot.update(RawSample::new(10, 300, 5));
///
/// // Reader path
/// let (raw, stamp) = slot.snapshot(MeasurementKind::Temperature);
/// ```
#[derive(Debug)]
pub struct SensorSlot {
    id: usize,
    state: Mutex<SlotState>,
    notifier: UpdateNotifier,
    epoch: Instant,
    shutdown: CancellationToken,
}

impl SensorSlot {
    /// Create an empty slot. Its stamp is [`Timestamp::NEVER`] until the first update.
    ///
    /// Waits on the slot are cancelled once `shutdown` fires.
    pub fn new(id: usize, shutdown: CancellationToken) -> Self {
        Self {
            id,
            state: Mutex::new(SlotState::default()),
            notifier: UpdateNotifier::new(),
            epoch: Instant::now(),
            shutdown,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Overwrite the sample and wake every reader parked on this slot.
    ///
    /// Never blocks beyond the O(1) critical section and never fails. The
    /// returned stamp is strictly greater than any stamp issued before.
    pub fn update(&self, sample: RawSample) -> Timestamp {
        let stamp = {
            let mut state = self.state.lock();
            let now = Timestamp::from_nanos(self.epoch.elapsed().as_nanos() as u64);
            let stamp = now.max(Timestamp::from_nanos(state.last_update.as_nanos() + 1));
            state.raw = sample;
            state.last_update = stamp;
            stamp
        };
        self.notifier.notify(stamp);
        stamp
    }

    /// Raw code for `kind` together with the stamp of the update that wrote it.
    pub fn snapshot(&self, kind: MeasurementKind) -> (u16, Timestamp) {
        let state = self.state.lock();
        (state.raw.get(kind), state.last_update)
    }

    /// The whole sample together with its stamp.
    pub fn snapshot_all(&self) -> (RawSample, Timestamp) {
        let state = self.state.lock();
        (state.raw, state.last_update)
    }

    pub fn last_update(&self) -> Timestamp {
        self.state.lock().last_update
    }

    /// Park until an update newer than `since` is published.
    ///
    /// Returns [`LunixError::Cancelled`] when `cancel` or the registry
    /// shutdown token fires first. Must not be called with a session lock held.
    pub async fn wait_for_freshness(
        &self,
        since: Timestamp,
        cancel: &CancellationToken,
    ) -> Result<()> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(LunixError::Cancelled),
            res = self.notifier.wait_past(since, cancel) => res,
        }
    }

    /// Number of readers currently parked on this slot.
    pub fn waiters(&self) -> usize {
        self.notifier.waiters()
    }
}
