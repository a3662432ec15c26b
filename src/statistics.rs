//! # Statistics Module - Duplicate Keypress Aggregates
//!
//! This module holds the data structures the detector uses to describe its
//! input and its results: the individual [`KeyEvent`]s it logs, the
//! per-key [`DuplicateRecord`]s it maintains, and the [`Statistics`]
//! snapshot handed to presentation layers.
//!
//! ## Architecture Overview
//!
#![doc = simple_mermaid::mermaid!("../diagrams/detector_architecture.mmd")]
//!
//! ## Key Components
//!
//! - **KeyEvent**: A single timestamped key
//! - **DuplicateRecord**: Running duplicate count and last detection time for one key
//! - **DuplicateCounters**: Accumulates records while events are classified
//! - **Statistics**: Read-only snapshot, sorted for display
//!
//! ## Data Flow
//!
//! 1. **Event Collection**: Each keypress becomes a `KeyEvent` in the detector's log
//! 2. **Classification**: The detector decides whether the event repeats a recent key
//! 3. **Accumulation**: Duplicates are added to `DuplicateCounters`
//! 4. **Snapshot**: `Statistics` is built on demand from the counters and the log
//!
//! ## Performance Considerations
//!
//! - Records live in a `HashMap` keyed by [`Key`], so accumulation is O(1)
//! - Sorting only happens when a snapshot is requested

use std::collections::HashMap;

use crate::{Key, Timestamp};

/// Individual keypress with its timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyEvent {
    /// The key that was pressed
    pub key: Key,
    /// Milliseconds on the host's clock
    pub timestamp: Timestamp,
}

impl KeyEvent {
    pub fn new(key: Key, timestamp: Timestamp) -> Self {
        Self { key, timestamp }
    }
}

/// Duplicate aggregate for a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DuplicateRecord {
    /// The key these duplicates belong to
    pub key: Key,
    /// Number of events of this key classified as duplicates
    pub count: usize,
    /// Timestamp of the most recent duplicate, if any
    pub last_detected_at: Option<Timestamp>,
}

impl DuplicateRecord {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            count: 0,
            last_detected_at: None,
        }
    }

    /// Whether the last detection happened within `period_ms` before `now`
    pub fn is_recent(&self, now: Timestamp, period_ms: u64) -> bool {
        self.last_detected_at
            .is_some_and(|last| now.saturating_sub(last) < period_ms)
    }
}

/// Per-key duplicate counters
///
/// Used internally by the detector to accumulate [`DuplicateRecord`]s while
/// events are classified. Only keys with at least one duplicate have an entry.
#[derive(Default, Debug, Clone)]
pub(crate) struct DuplicateCounters {
    records: HashMap<Key, DuplicateRecord>,
}

impl DuplicateCounters {
    /// Count one duplicate of `key` detected at `timestamp`
    pub(crate) fn add(&mut self, key: Key, timestamp: Timestamp) -> DuplicateRecord {
        let record = self
            .records
            .entry(key)
            .or_insert_with(|| DuplicateRecord::new(key));
        record.count += 1;
        record.last_detected_at = record.last_detected_at.max(Some(timestamp));
        *record
    }

    /// Fold another set of counters into this one
    pub(crate) fn merge(&mut self, other: &DuplicateCounters) {
        for record in other.records.values() {
            let entry = self
                .records
                .entry(record.key)
                .or_insert_with(|| DuplicateRecord::new(record.key));
            entry.count += record.count;
            entry.last_detected_at = entry.last_detected_at.max(record.last_detected_at);
        }
    }

    pub(crate) fn get(&self, key: &Key) -> Option<&DuplicateRecord> {
        self.records.get(key)
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    /// Sum of all duplicate counts
    pub(crate) fn total(&self) -> usize {
        self.records.values().map(|record| record.count).sum()
    }

    /// Number of keys with at least one duplicate
    pub(crate) fn keys(&self) -> usize {
        self.records.len()
    }

    /// All records, by count descending and then by key label ascending
    pub(crate) fn sorted(&self) -> Vec<DuplicateRecord> {
        let mut records: Vec<DuplicateRecord> = self.records.values().copied().collect();
        records.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        records
    }
}

/// Read-only snapshot of the detector's aggregates
///
/// Generated by [`DuplicateDetector::stats`](crate::DuplicateDetector::stats).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statistics {
    /// Number of events currently in the log
    pub total_events: usize,
    /// Number of distinct keys currently in the log
    pub unique_characters: usize,
    /// Sum of all duplicate counts
    pub total_duplicates: usize,
    /// Number of keys with at least one duplicate
    pub duplicate_characters: usize,
    /// Per-key records, sorted by count descending and then by key label ascending
    pub duplicates: Vec<DuplicateRecord>,
}

impl Statistics {
    pub(crate) fn new(
        total_events: usize,
        unique_characters: usize,
        counters: &DuplicateCounters,
    ) -> Self {
        Self {
            total_events,
            unique_characters,
            total_duplicates: counters.total(),
            duplicate_characters: counters.keys(),
            duplicates: counters.sorted(),
        }
    }

    /// Duplicate count for `key`, zero if it never repeated
    pub fn count(&self, key: Key) -> usize {
        let key = key.normalized();
        self.duplicates
            .iter()
            .find(|record| record.key == key)
            .map_or(0, |record| record.count)
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.total_events == 0 && self.duplicates.is_empty()
    }
}
