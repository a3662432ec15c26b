//! Host-facing keystroke session
//!
//! [`KeystrokeSession`] wires an input source to a [`DuplicateDetector`]. The
//! host forwards every key it captures to [`handle_key`](KeystrokeSession::handle_key);
//! the session stamps it with the milliseconds elapsed since the first key,
//! records it, and tells a [`DetectionListener`] about every duplicate so the
//! presentation layer can highlight it.
//!
//! The session owns no timers. A host that wants periodic cleanup calls
//! [`sweep`](KeystrokeSession::sweep) from its own scheduler.

pub use web_time::{Duration, Instant};

use tracing::debug;

use crate::{
    Key, Timestamp,
    engine::DuplicateDetector,
    error::Result,
    statistics::{DuplicateRecord, Statistics},
};

/// Receives a notification for every detected duplicate
pub trait DetectionListener {
    /// Called after a duplicate of `record.key` was counted
    fn on_duplicate(&mut self, record: &DuplicateRecord);
}

impl<F> DetectionListener for F
where
    F: FnMut(&DuplicateRecord),
{
    fn on_duplicate(&mut self, record: &DuplicateRecord) {
        self(record)
    }
}

/// Listener that ignores all detections
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreDetections;

impl DetectionListener for IgnoreDetections {
    fn on_duplicate(&mut self, _record: &DuplicateRecord) {}
}

/// Handles timing and notification around a detector
#[derive(Debug)]
pub struct KeystrokeSession<L = IgnoreDetections> {
    detector: DuplicateDetector,
    listener: L,
    started_at: Option<Instant>,
}

impl KeystrokeSession {
    /// Session with a default detector and no listener
    pub fn new() -> Self {
        Self::with_listener(DuplicateDetector::new(), IgnoreDetections)
    }
}

impl Default for KeystrokeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: DetectionListener> KeystrokeSession<L> {
    pub fn with_listener(detector: DuplicateDetector, listener: L) -> Self {
        Self {
            detector,
            listener,
            started_at: None,
        }
    }

    pub fn detector(&self) -> &DuplicateDetector {
        &self.detector
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Take the detector and listener back out of the session
    pub fn into_parts(self) -> (DuplicateDetector, L) {
        (self.detector, self.listener)
    }

    /// Check if timing has started
    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Milliseconds since the first key, if any key has been handled
    pub fn elapsed_ms(&self) -> Option<Timestamp> {
        self.started_at.map(|start| millis(start.elapsed()))
    }

    /// Record a key captured right now
    ///
    /// The clock starts with the first valid key. Returns whether the key
    /// repeats a recent one.
    pub fn handle_key(&mut self, key: &str) -> Result<bool> {
        let key: Key = key.parse()?;
        let start = *self.started_at.get_or_insert_with(Instant::now);
        self.handle_key_event(key, millis(start.elapsed()))
    }

    /// Record a key stamped by the host's own clock
    pub fn handle_key_at(&mut self, key: &str, timestamp: Timestamp) -> Result<bool> {
        let key: Key = key.parse()?;
        self.handle_key_event(key, timestamp)
    }

    /// Record an already parsed key
    pub fn handle_key_event(&mut self, key: Key, timestamp: Timestamp) -> Result<bool> {
        let duplicate = self.detector.record_event(key, timestamp)?;
        if duplicate && let Some(record) = self.detector.record_for(key) {
            self.listener.on_duplicate(&record);
        }
        Ok(duplicate)
    }

    /// Apply a window typed by the user
    ///
    /// Invalid input is rejected and the current window stays in place.
    /// Returns the applied window.
    pub fn set_window(&mut self, input: &str) -> Result<u64> {
        let window_ms = self.detector.configuration().parse_window(input)?;
        self.detector.reconfigure_window(window_ms)?;
        Ok(window_ms)
    }

    pub fn set_window_ms(&mut self, window_ms: u64) -> Result<()> {
        self.detector.reconfigure_window(window_ms)
    }

    /// Drop trailing keys, e.g. after the user deleted input
    pub fn truncate_to(&mut self, len: usize) -> Result<()> {
        self.detector.truncate_to(len)
    }

    /// Retention sweep at the current time
    ///
    /// Prunes everything older than `window * retention_factor` before now.
    /// Returns the number of events removed.
    pub fn sweep(&mut self) -> usize {
        match self.elapsed_ms() {
            Some(now) => self.sweep_at(now),
            None => 0,
        }
    }

    /// Retention sweep at a host-provided time
    pub fn sweep_at(&mut self, now: Timestamp) -> usize {
        let cutoff = self.detector.safe_prune_cutoff(now);
        let removed = self.detector.prune_older_than(cutoff);
        if removed > 0 {
            debug!(now, cutoff, removed, "retention sweep");
        }
        removed
    }

    /// Clear all results; the window and the clock are kept
    pub fn clear(&mut self) {
        self.detector.reset();
    }

    pub fn stats(&self) -> Statistics {
        self.detector.stats()
    }

    /// Whether `key` should currently be highlighted as a recent duplicate
    pub fn is_recent(&self, key: Key) -> bool {
        self.elapsed_ms()
            .is_some_and(|now| self.detector.is_recent(key, now))
    }
}

fn millis(duration: Duration) -> Timestamp {
    Timestamp::try_from(duration.as_millis()).unwrap_or(Timestamp::MAX)
}
