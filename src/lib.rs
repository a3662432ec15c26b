//! # keyrepeat
//!
//! A library for detecting repeated keypresses of the same key within a
//! configurable time window.
//!
//! Hosts feed timestamped keys into a [`DuplicateDetector`] (or a
//! [`KeystrokeSession`], which stamps keys from a monotonic clock) and read
//! back per-key duplicate counts as a [`Statistics`] snapshot. Rendering,
//! input capture and scheduling stay with the host.
//!
//! ## Example
//!
//! ```
//! use keyrepeat::{DuplicateDetector, Key};
//!
//! let mut detector = DuplicateDetector::new();
//! detector.reconfigure_window(100)?;
//!
//! detector.record("a", 0)?;
//! detector.record("a", 50)?; // 50ms after the last 'a': duplicate
//! detector.record("a", 200)?; // 150ms gap: not a duplicate
//!
//! let stats = detector.stats();
//! assert_eq!(stats.total_events, 3);
//! assert_eq!(stats.count(Key::Char('a')), 1);
//! assert_eq!(stats.duplicates[0].last_detected_at, Some(50));
//! # Ok::<(), keyrepeat::DetectorError>(())
//! ```
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for keys, events, records, snapshots
//!   and [`Configuration`]

pub mod config;
pub mod engine;
pub mod error;
pub mod key;
pub mod session;
pub mod statistics;

pub use config::Configuration;
pub use engine::DuplicateDetector;
pub use error::{DetectorError, Result};
pub use key::Key;
pub use session::{DetectionListener, IgnoreDetections, KeystrokeSession};
pub use statistics::{DuplicateRecord, KeyEvent, Statistics};

/// Milliseconds on the host's clock
pub type Timestamp = u64;

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_statistics_serialize_keys_as_labels() {
        let mut detector = DuplicateDetector::new();
        detector.record(" ", 0).unwrap();
        detector.record(" ", 10).unwrap();

        let json = serde_json::to_value(detector.stats()).unwrap();
        assert_eq!(json["duplicates"][0]["key"], "Space");
        assert_eq!(json["duplicates"][0]["count"], 1);

        let record: DuplicateRecord = serde_json::from_value(json["duplicates"][0].clone()).unwrap();
        assert_eq!(record.key, Key::Space);
    }

    #[test]
    fn test_configuration_fills_defaults() {
        let config: Configuration =
            serde_json::from_str(r#"{ "default_window_ms": 250 }"#).unwrap();
        assert_eq!(config.default_window_ms, 250);
        assert_eq!(config.max_window_ms, 5000);
        assert!(config.validate().is_ok());
    }
}
