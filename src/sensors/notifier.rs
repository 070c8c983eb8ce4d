//! Wake-on-update notifier for sensor slots.
//!
//! When a slot publishes a new sample, every reader parked on that slot has
//! to be woken so it can re-check freshness. The notifier broadcasts the
//! newest published [`Timestamp`]; waiters compare it against the stamp they
//! already hold, so a wake is never trusted on its own.

use super::Timestamp;
use crate::error::{LunixError, Result};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Broadcasts the latest publication stamp of one sensor slot.
///
/// `notify()` never blocks and never allocates, so it is safe to call from
/// the acquisition path right after the slot lock is released.
#[derive(Debug)]
pub struct UpdateNotifier {
    published: watch::Sender<Timestamp>,
}

impl UpdateNotifier {
    pub fn new() -> Self {
        let (published, _) = watch::channel(Timestamp::NEVER);
        Self { published }
    }

    /// Publish `stamp` and wake every waiter.
    ///
    /// Concurrent producers may call this out of order; the published stamp
    /// only ever moves forward.
    pub fn notify(&self, stamp: Timestamp) {
        self.published.send_if_modified(|current| {
            if stamp > *current {
                *current = stamp;
                true
            } else {
                false
            }
        });
    }

    /// Newest stamp published so far.
    pub fn latest(&self) -> Timestamp {
        *self.published.borrow()
    }

    /// Number of readers currently parked on this notifier.
    pub fn waiters(&self) -> usize {
        self.published.receiver_count()
    }

    /// Park until a stamp newer than `since` is published.
    ///
    /// The current stamp is checked before parking, so a publication that
    /// happened between the caller's last snapshot and this call is seen.
    pub async fn wait_past(&self, since: Timestamp, cancel: &CancellationToken) -> Result<()> {
        let mut rx = self.published.subscribe();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LunixError::Cancelled),
            res = rx.wait_for(|stamp| *stamp > since) => match res {
                Ok(_) => Ok(()),
                Err(_) => Err(LunixError::Cancelled),
            },
        }
    }
}

impl Default for UpdateNotifier {
    fn default() -> Self {
        Self::new()
    }
}
