//! View session and its refresh protocol.
//!
//! Locking follows two tiers. The slot lock is only taken inside
//! [`SensorSlot::snapshot`] for an O(1) copy. The session lock serializes this
//! session's buffer and cursor; it is released before parking on the slot and
//! re-acquired afterwards, so a parked reader never holds anything another
//! reader or the producer needs.

use super::format::{self, FormatBuffer};
use super::{DisplayMode, SessionOptions, Target};
use crate::error::{LunixError, Result};
use crate::sensors::{LookupTables, SensorRegistry, SensorSlot, Timestamp};
use log::{debug, warn};
use std::io::SeekFrom;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Mutable part of a session, guarded by the session lock.
///
/// `buffer` always holds a complete rendering of the sample stamped
/// `timestamp`. `cursor == 0` means the next read must refresh first.
#[derive(Debug)]
struct SessionState {
    buffer: FormatBuffer,
    cursor: usize,
    timestamp: Timestamp,
}

/// A reader's private view of one sensor measurement.
///
/// # Example
/// ```ignore
/// let target = Target::new(0, MeasurementKind::Temperature);
/// let session = registry.open(target, SessionOptions::cooked())?;
/// let cancel = CancellationToken::new();
/// let mut buf = [0u8; 64];
/// let n = session.read(&mut buf, &cancel).await?;
/// // buf[..n] == b"+23.456\n"
/// ```
pub struct ViewSession {
    target: Target,
    options: SessionOptions,
    slot: Arc<SensorSlot>,
    lookup: Arc<LookupTables>,
    state: Mutex<SessionState>,
}

impl ViewSession {
    /// Open a session on `target`.
    ///
    /// Fails with [`LunixError::InvalidArgument`] if the sensor id is outside
    /// the registry. The first read always refreshes.
    pub fn open(
        registry: &SensorRegistry,
        target: Target,
        options: SessionOptions,
    ) -> Result<Self> {
        let slot = registry.slot(target.sensor).cloned().ok_or_else(|| {
            warn!(
                "Rejecting open of {}: registry has {} sensors",
                target,
                registry.len()
            );
            LunixError::InvalidArgument(format!(
                "sensor {} out of range (0..{})",
                target.sensor,
                registry.len()
            ))
        })?;

        debug!("Opened view session on {} ({:?})", target, options);
        Ok(Self {
            target,
            options,
            slot,
            lookup: registry.lookup().clone(),
            state: Mutex::new(SessionState {
                buffer: FormatBuffer::new(),
                cursor: 0,
                timestamp: Timestamp::NEVER,
            }),
        })
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn mode(&self) -> DisplayMode {
        self.options.mode
    }

    pub fn is_blocking(&self) -> bool {
        self.options.blocking
    }

    /// Read up to `out.len()` bytes of the current rendering.
    ///
    /// At the start of the buffer the session first refreshes from its slot.
    /// If the slot holds nothing newer than the last rendering, a blocking
    /// session parks until an update arrives or `cancel` fires
    /// ([`LunixError::Cancelled`]); a non-blocking session returns
    /// [`LunixError::WouldBlock`]. Once the buffer is drained the cursor
    /// rewinds, so the next read waits for the next sample.
    ///
    /// An empty `out` returns `Ok(0)` without touching the session.
    pub async fn read(&self, out: &mut [u8], cancel: &CancellationToken) -> Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock().await;

        // A seek to the very end leaves nothing to drain.
        if state.cursor >= state.buffer.len() {
            state.cursor = 0;
        }

        while state.cursor == 0 {
            let (raw, stamp) = self.slot.snapshot(self.target.kind);
            if stamp > state.timestamp {
                self.refresh(&mut state, raw, stamp);
                break;
            }

            if !self.options.blocking {
                return Err(LunixError::WouldBlock);
            }

            let since = state.timestamp;
            drop(state);
            if let Err(e) = self.slot.wait_for_freshness(since, cancel).await {
                debug!("Read on {} interrupted while waiting", self.target);
                return Err(e);
            }
            state = self.state.lock().await;
        }

        let start = state.cursor;
        let len = state.buffer.len();
        let count = (len - start).min(out.len());
        out[..count].copy_from_slice(&state.buffer.as_bytes()[start..start + count]);

        state.cursor += count;
        if state.cursor == len {
            state.cursor = 0;
        }
        Ok(count)
    }

    /// Read up to `max_bytes` into a new vector.
    pub async fn read_to_vec(
        &self,
        max_bytes: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let mut out = vec![0u8; max_bytes.min(super::BUFFER_CAPACITY)];
        let count = self.read(&mut out, cancel).await?;
        out.truncate(count);
        Ok(out)
    }

    /// Move the cursor within `[0, buffer_len]`.
    ///
    /// Positions outside that range fail with [`LunixError::OutOfRange`] and
    /// leave the cursor where it was. Seeking never refreshes; seeking to 0
    /// makes the next read refresh.
    pub async fn seek(&self, pos: SeekFrom) -> Result<u64> {
        let mut state = self.state.lock().await;
        let len = state.buffer.len();

        // Wide enough that no offset or delta can overflow.
        let requested = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => state.cursor as i128 + i128::from(delta),
            SeekFrom::End(delta) => len as i128 + i128::from(delta),
        };

        if requested < 0 || requested > len as i128 {
            debug!("Rejecting seek on {} to {}", self.target, requested);
            return Err(LunixError::OutOfRange { requested, len });
        }

        state.cursor = requested as usize;
        Ok(requested as u64)
    }

    /// Blocking variant of [`ViewSession::read`] for callers outside an async runtime.
    pub fn read_blocking(&self, out: &mut [u8], cancel: &CancellationToken) -> Result<usize> {
        futures_lite::future::block_on(self.read(out, cancel))
    }

    /// Blocking variant of [`ViewSession::seek`].
    pub fn seek_blocking(&self, pos: SeekFrom) -> Result<u64> {
        futures_lite::future::block_on(self.seek(pos))
    }

    /// Current cursor position.
    pub async fn position(&self) -> usize {
        self.state.lock().await.cursor
    }

    /// Length of the current rendering.
    pub async fn buffer_len(&self) -> usize {
        self.state.lock().await.buffer.len()
    }

    /// Stamp of the sample the current rendering was derived from.
    pub async fn buffer_timestamp(&self) -> Timestamp {
        self.state.lock().await.timestamp
    }

    /// Release the session.
    pub fn close(self) {
        debug!("Closed view session on {}", self.target);
    }

    fn refresh(&self, state: &mut SessionState, raw: u16, stamp: Timestamp) {
        // Every rendering fits BUFFER_CAPACITY.
        let rendered = format::render(
            &mut state.buffer,
            self.options.mode,
            self.target.kind,
            raw,
            &self.lookup,
        );
        debug_assert!(rendered.is_ok(), "rendering of {raw} overflowed the buffer");
        if rendered.is_err() {
            warn!(
                "Rendering of raw {} for {} truncated to {} bytes",
                raw,
                self.target,
                state.buffer.len()
            );
        }
        state.timestamp = stamp;
        debug!(
            "Refreshed {} from raw {} ({} bytes)",
            self.target,
            raw,
            state.buffer.len()
        );
    }
}
