//! # Duplicate Detection Engine
//!
//! [`DuplicateDetector`] ingests a timestamped stream of keys and classifies
//! each event: an event is a *duplicate* when a strictly earlier event of the
//! same key lies within the current time window, i.e. its timestamp is in
//! `[timestamp - window, timestamp]`.
//!
//! ## Classification
//!
//! Timestamps in the log never decrease, so the most recent earlier event of a
//! key is always the closest one. The detector keeps the last timestamp seen
//! for every key and answers "is there a same-key event within the window" in
//! O(1) per event.
//!
//! ## Recomputation
//!
//! Changing the window can create or destroy duplicate relationships for any
//! event in the log, so [`reconfigure_window`](DuplicateDetector::reconfigure_window)
//! replays the whole log. Truncating the tail never affects the classification
//! of retained events, so [`truncate_to`](DuplicateDetector::truncate_to) only
//! rebuilds the aggregates from the classifications stored alongside each event.
//!
//! ## Retention
//!
//! [`prune_older_than`](DuplicateDetector::prune_older_than) drops events too
//! old to partner any future event. Duplicates found on dropped events are kept
//! in a settled baseline, so pruning never changes reported counts, and the
//! latest dropped timestamp of every key is remembered so later events and
//! replays are classified as if nothing had been dropped. The host decides
//! when to prune; the detector runs no timers.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, trace, warn};

use crate::{
    Key, Timestamp,
    config::Configuration,
    error::{DetectorError, Result},
    statistics::{DuplicateCounters, DuplicateRecord, KeyEvent, Statistics},
};

/// An event in the log together with its current classification
#[derive(Debug, Clone, Copy)]
struct LoggedEvent {
    event: KeyEvent,
    duplicate: bool,
}

/// Detects repeated keypresses of the same key within a time window
///
/// The detector is single-threaded and synchronous. Hosts that need to share
/// one between threads should wrap the whole detector in a single lock.
///
/// ```
/// use keyrepeat::{DuplicateDetector, Key};
///
/// let mut detector = DuplicateDetector::new();
/// assert!(!detector.record_event(Key::Char('a'), 0)?);
/// assert!(detector.record_event(Key::Char('a'), 50)?);
/// assert_eq!(detector.stats().count(Key::Char('a')), 1);
/// # Ok::<(), keyrepeat::DetectorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    config: Configuration,
    window_ms: u64,
    log: VecDeque<LoggedEvent>,
    /// Timestamp of the latest event for each key, pruned ones included
    last_seen: HashMap<Key, Timestamp>,
    /// Duplicates of every event ever classified, pruned ones included
    counters: DuplicateCounters,
    /// Duplicates of pruned events only
    settled: DuplicateCounters,
    /// Timestamp of the latest pruned event for each key
    pruned_last_seen: HashMap<Key, Timestamp>,
    /// Latest timestamp accepted since the last reset, truncated events included
    high_water: Option<Timestamp>,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DuplicateDetector {
    /// Create a detector with the default [`Configuration`]
    pub fn new() -> Self {
        Self::from_valid(Configuration::default())
    }

    /// Create a detector with a host-provided configuration
    ///
    /// Fails with [`DetectorError::InvalidConfiguration`] if the configuration
    /// does not validate.
    pub fn with_configuration(config: Configuration) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: Configuration) -> Self {
        Self {
            window_ms: config.default_window_ms,
            config,
            log: VecDeque::new(),
            last_seen: HashMap::new(),
            counters: DuplicateCounters::default(),
            settled: DuplicateCounters::default(),
            pruned_last_seen: HashMap::new(),
            high_water: None,
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// The current time window in milliseconds
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Number of events in the log
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// The logged events, oldest first
    pub fn events(&self) -> impl ExactSizeIterator<Item = &KeyEvent> + '_ {
        self.log.iter().map(|logged| &logged.event)
    }

    /// Timestamp of the latest logged event
    pub fn latest_timestamp(&self) -> Option<Timestamp> {
        self.log.back().map(|logged| logged.event.timestamp)
    }

    /// Record a keypress and report whether it repeats a recent one
    ///
    /// Events must arrive in non-decreasing timestamp order. An event older than
    /// any event accepted since the last reset (including events since pruned
    /// or truncated) is rejected with [`DetectorError::OrderingViolation`] and
    /// nothing is recorded. Whitespace characters are counted as their named
    /// key, so `Key::Char(' ')` and `Key::Space` are the same key.
    ///
    /// # Performance
    ///
    /// - Time complexity: O(1) amortised
    /// - Space complexity: O(1) per call (grows the log by one event)
    pub fn record_event(&mut self, key: Key, timestamp: Timestamp) -> Result<bool> {
        let key = key.normalized();
        if let Some(last) = self.high_water
            && timestamp < last
        {
            warn!(%key, timestamp, last, "rejecting out-of-order keypress");
            return Err(DetectorError::OrderingViolation { timestamp, last });
        }
        self.high_water = Some(timestamp);

        let event = KeyEvent::new(key, timestamp);
        let duplicate = classify(&mut self.last_seen, self.window_ms, &event);
        self.log.push_back(LoggedEvent { event, duplicate });

        if duplicate {
            let record = self.counters.add(key, timestamp);
            debug!(%key, timestamp, count = record.count, "duplicate keypress detected");
        } else {
            trace!(%key, timestamp, "keypress recorded");
        }
        Ok(duplicate)
    }

    /// Parse `key` and record it, see [`record_event`](Self::record_event)
    pub fn record(&mut self, key: &str, timestamp: Timestamp) -> Result<bool> {
        let key = key.parse()?;
        self.record_event(key, timestamp)
    }

    /// Replace the time window and reclassify every logged event
    ///
    /// Out-of-bounds values are rejected with [`DetectorError::InvalidWindow`]
    /// and leave the detector unchanged. On success every logged event is
    /// reclassified; duplicates settled by earlier pruning are kept.
    ///
    /// # Performance
    ///
    /// - Time complexity: O(n) where n = number of logged events
    pub fn reconfigure_window(&mut self, window_ms: u64) -> Result<()> {
        let window_ms = self.config.check_window(window_ms)?;
        let previous = self.window_ms;
        self.window_ms = window_ms;
        self.replay();
        debug!(
            previous,
            window_ms,
            events = self.log.len(),
            duplicates = self.counters.total(),
            "time window reconfigured"
        );
        Ok(())
    }

    /// Remove events from the tail until `len` remain
    ///
    /// Retained events always precede removed ones, so their classifications
    /// are unaffected; the aggregates are rebuilt from them. Asking for more
    /// events than are logged fails with [`DetectorError::InvalidLength`].
    pub fn truncate_to(&mut self, len: usize) -> Result<()> {
        let current = self.log.len();
        if len > current {
            return Err(DetectorError::InvalidLength {
                requested: len,
                len: current,
            });
        }
        if len == current {
            return Ok(());
        }

        self.log.truncate(len);
        self.rebuild();
        debug!(removed = current - len, remaining = len, "log truncated");
        Ok(())
    }

    /// Drop events older than `cutoff` from the head of the log
    ///
    /// The cutoff is clamped so that no event which could still partner a
    /// future event (one within the window of the latest accepted event) is
    /// dropped. Reported counts do not change. Returns the number of events
    /// removed.
    pub fn prune_older_than(&mut self, cutoff: Timestamp) -> usize {
        let Some(latest) = self.high_water else {
            return 0;
        };
        let cutoff = cutoff.min(latest.saturating_sub(self.window_ms));

        let removed = self
            .log
            .iter()
            .take_while(|logged| logged.event.timestamp < cutoff)
            .count();
        if removed == 0 {
            return 0;
        }

        for logged in self.log.drain(..removed) {
            let KeyEvent { key, timestamp } = logged.event;
            self.pruned_last_seen.insert(key, timestamp);
            if logged.duplicate {
                self.settled.add(key, timestamp);
            }
        }

        debug!(cutoff, removed, remaining = self.log.len(), "pruned old keypresses");
        removed
    }

    /// Cutoff a retention sweep at `now` should prune with
    ///
    /// Keeps `window * retention_factor` milliseconds of history.
    pub fn safe_prune_cutoff(&self, now: Timestamp) -> Timestamp {
        now.saturating_sub(self.window_ms.saturating_mul(self.config.retention_factor))
    }

    /// Clear all events and records, keeping the current window
    pub fn reset(&mut self) {
        self.log.clear();
        self.last_seen.clear();
        self.counters.clear();
        self.settled.clear();
        self.pruned_last_seen.clear();
        self.high_water = None;
        debug!(window_ms = self.window_ms, "detector reset");
    }

    /// Snapshot of the current aggregates
    ///
    /// # Performance
    ///
    /// - Time complexity: O(n + k log k) where n = logged events, k = keys with duplicates
    pub fn stats(&self) -> Statistics {
        let unique = self
            .log
            .iter()
            .map(|logged| logged.event.key)
            .collect::<HashSet<_>>()
            .len();
        Statistics::new(self.log.len(), unique, &self.counters)
    }

    /// Duplicate record for `key`, if it has repeated at least once
    pub fn record_for(&self, key: Key) -> Option<DuplicateRecord> {
        self.counters.get(&key.normalized()).copied()
    }

    /// Whether `key` was last detected as a duplicate within the configured
    /// highlight period before `now`
    pub fn is_recent(&self, key: Key, now: Timestamp) -> bool {
        self.counters
            .get(&key.normalized())
            .is_some_and(|record| record.is_recent(now, self.config.recent_highlight_ms))
    }

    /// Reclassify the whole log under the current window
    fn replay(&mut self) {
        let Self {
            window_ms,
            log,
            last_seen,
            counters,
            settled,
            pruned_last_seen,
            ..
        } = self;

        last_seen.clone_from(pruned_last_seen);
        let mut live = DuplicateCounters::default();

        for logged in log.iter_mut() {
            logged.duplicate = classify(last_seen, *window_ms, &logged.event);
            if logged.duplicate {
                live.add(logged.event.key, logged.event.timestamp);
            }
        }

        counters.clone_from(settled);
        counters.merge(&live);
    }

    /// Rebuild aggregates from the stored classifications
    fn rebuild(&mut self) {
        let mut live = DuplicateCounters::default();
        self.last_seen.clone_from(&self.pruned_last_seen);

        for logged in &self.log {
            self.last_seen
                .insert(logged.event.key, logged.event.timestamp);
            if logged.duplicate {
                live.add(logged.event.key, logged.event.timestamp);
            }
        }

        self.counters = self.settled.clone();
        self.counters.merge(&live);
    }
}

/// Classify `event` against the latest earlier event of the same key and
/// remember it as that key's latest event
fn classify(last_seen: &mut HashMap<Key, Timestamp>, window_ms: u64, event: &KeyEvent) -> bool {
    let duplicate = last_seen
        .get(&event.key)
        .is_some_and(|&previous| event.timestamp.saturating_sub(previous) <= window_ms);
    last_seen.insert(event.key, event.timestamp);
    duplicate
}
