//! Detector configuration
//!
//! The host picks the bounds it accepts for the time window, the window the
//! detector starts with, and how long events are retained before a sweep may
//! discard them. All values are in milliseconds.

use crate::error::{DetectorError, Result};

/// Smallest window accepted by default
pub const DEFAULT_MIN_WINDOW_MS: u64 = 1;
/// Largest window accepted by default
pub const DEFAULT_MAX_WINDOW_MS: u64 = 5000;
/// Window a new detector starts with
pub const DEFAULT_WINDOW_MS: u64 = 100;
/// How many windows of history a retention sweep keeps
pub const DEFAULT_RETENTION_FACTOR: u64 = 2;
/// How long a detection counts as "recent" for highlighting
pub const DEFAULT_RECENT_HIGHLIGHT_MS: u64 = 2000;

/// Configuration for a [`DuplicateDetector`](crate::DuplicateDetector)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Configuration {
    /// Smallest window `reconfigure_window` accepts
    pub min_window_ms: u64,
    /// Largest window `reconfigure_window` accepts
    pub max_window_ms: u64,
    /// Window used until the host reconfigures it
    pub default_window_ms: u64,
    /// Number of windows of history kept by a retention sweep (at least 1)
    pub retention_factor: u64,
    /// Period after a detection during which the key is reported as recent
    pub recent_highlight_ms: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            min_window_ms: DEFAULT_MIN_WINDOW_MS,
            max_window_ms: DEFAULT_MAX_WINDOW_MS,
            default_window_ms: DEFAULT_WINDOW_MS,
            retention_factor: DEFAULT_RETENTION_FACTOR,
            recent_highlight_ms: DEFAULT_RECENT_HIGHLIGHT_MS,
        }
    }
}

impl Configuration {
    pub fn with_window_bounds(mut self, min_window_ms: u64, max_window_ms: u64) -> Self {
        self.min_window_ms = min_window_ms;
        self.max_window_ms = max_window_ms;
        self
    }

    pub fn with_default_window(mut self, window_ms: u64) -> Self {
        self.default_window_ms = window_ms;
        self
    }

    pub fn with_retention_factor(mut self, factor: u64) -> Self {
        self.retention_factor = factor;
        self
    }

    pub fn with_recent_highlight(mut self, highlight_ms: u64) -> Self {
        self.recent_highlight_ms = highlight_ms;
        self
    }

    /// Check that the configuration is internally consistent
    ///
    /// Requires `1 <= min_window_ms <= default_window_ms <= max_window_ms`
    /// and a retention factor of at least 1.
    pub fn validate(&self) -> Result<()> {
        if self.min_window_ms == 0 {
            return Err(DetectorError::InvalidConfiguration(
                "min_window_ms must be at least 1".to_string(),
            ));
        }
        if self.min_window_ms > self.max_window_ms {
            return Err(DetectorError::InvalidConfiguration(format!(
                "min_window_ms ({}) exceeds max_window_ms ({})",
                self.min_window_ms, self.max_window_ms
            )));
        }
        if !self.accepts_window(self.default_window_ms) {
            return Err(DetectorError::InvalidConfiguration(format!(
                "default_window_ms ({}) is outside {}..={}",
                self.default_window_ms, self.min_window_ms, self.max_window_ms
            )));
        }
        if self.retention_factor == 0 {
            return Err(DetectorError::InvalidConfiguration(
                "retention_factor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `window_ms` lies within the configured bounds
    pub fn accepts_window(&self, window_ms: u64) -> bool {
        (self.min_window_ms..=self.max_window_ms).contains(&window_ms)
    }

    /// Check a window value against the bounds
    pub fn check_window(&self, window_ms: u64) -> Result<u64> {
        if self.accepts_window(window_ms) {
            Ok(window_ms)
        } else {
            Err(self.window_error(window_ms.to_string()))
        }
    }

    /// Parse a window from host text input (e.g. a number field)
    ///
    /// Surrounding whitespace is ignored. Non-numeric, negative or
    /// out-of-bounds input is rejected with [`DetectorError::InvalidWindow`].
    pub fn parse_window(&self, input: &str) -> Result<u64> {
        let window_ms = input
            .trim()
            .parse::<u64>()
            .map_err(|_| self.window_error(input.to_string()))?;
        self.check_window(window_ms)
    }

    fn window_error(&self, value: String) -> DetectorError {
        DetectorError::InvalidWindow {
            value,
            min: self.min_window_ms,
            max: self.max_window_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_is_valid() {
        let config = Configuration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_window_ms, 100);
        assert_eq!(config.max_window_ms, 5000);
    }

    #[test]
    fn test_validate_rejects_inconsistent_bounds() {
        let zero_min = Configuration::default().with_window_bounds(0, 10);
        assert!(zero_min.validate().is_err());

        let inverted = Configuration::default().with_window_bounds(50, 10);
        assert!(inverted.validate().is_err());

        let default_outside = Configuration::default().with_default_window(6000);
        assert!(default_outside.validate().is_err());

        let no_retention = Configuration::default().with_retention_factor(0);
        assert!(no_retention.validate().is_err());
    }

    #[test]
    fn test_parse_window() {
        let config = Configuration::default();
        assert_eq!(config.parse_window("250"), Ok(250));
        assert_eq!(config.parse_window(" 1 "), Ok(1));

        for input in ["", "abc", "-5", "0", "5001", "12.5"] {
            assert!(
                matches!(
                    config.parse_window(input),
                    Err(DetectorError::InvalidWindow { .. })
                ),
                "{input:?} should be rejected"
            );
        }
    }
}
