//! Error type for detector operations.

use thiserror::Error;

use crate::Timestamp;

/// Errors returned by the detector and its configuration.
///
/// Every variant is recoverable: an operation that fails leaves the detector
/// exactly as it was before the call.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `EmptyInput` | A key string is empty |
/// | `InvalidKey` | A multi-character string is not a named special key |
/// | `InvalidWindow` | A window value is non-numeric or outside the configured bounds |
/// | `InvalidLength` | `truncate_to` asks for more events than are logged |
/// | `OrderingViolation` | An event is older than the latest logged event |
/// | `InvalidConfiguration` | `Configuration::validate` fails |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    /// The key identifier was empty.
    #[error("key identifier must not be empty")]
    EmptyInput,

    /// The key identifier is neither a single character nor a named key.
    #[error("unknown key identifier: {0:?}")]
    InvalidKey(String),

    /// The requested window is not a number within the configured bounds.
    #[error("invalid window {value:?}: expected an integer between {min} and {max} ms")]
    InvalidWindow {
        /// The rejected value, as given by the caller.
        value: String,
        /// Smallest accepted window in milliseconds.
        min: u64,
        /// Largest accepted window in milliseconds.
        max: u64,
    },

    /// The requested log length exceeds the current log length.
    #[error("cannot truncate to {requested} events: log holds {len}")]
    InvalidLength {
        /// The requested length.
        requested: usize,
        /// The current log length.
        len: usize,
    },

    /// The event timestamp precedes the latest logged event.
    #[error("event at {timestamp} ms is older than the latest event at {last} ms")]
    OrderingViolation {
        /// Timestamp of the rejected event.
        timestamp: Timestamp,
        /// Timestamp of the latest logged event.
        last: Timestamp,
    },

    /// The configuration is internally inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type alias for detector operations.
pub type Result<T> = std::result::Result<T, DetectorError>;
