// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_OPEN_TIMEOUT, DEFAULT_RESET_TIMEOUT, MIN_MAX_ATTEMPTS};

/// Configuration of a [`Breaker`][crate::Breaker].
///
/// | Option | Default | Description |
/// |--------|---------|-------------|
/// | [`max_attempts`][Self::max_attempts] | `3` | Consecutive failures that trip the circuit |
/// | [`open_timeout`][Self::open_timeout] | `5000 ms` | Span within which those failures must occur |
/// | [`reset_timeout`][Self::reset_timeout] | `20000 ms` | Cooldown before a trial call is allowed |
///
/// Out-of-range values are clamped rather than rejected.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use tripwire::BreakerOptions;
///
/// let options = BreakerOptions::default()
///     .max_attempts(5)
///     .open_timeout(Duration::from_secs(10))
///     .reset_timeout(Duration::from_secs(60));
///
/// assert_eq!(options.get_max_attempts(), 5);
/// ```
///
/// # Serialization
///
/// With the `serde` feature enabled the options can be loaded from configuration files.
/// Durations are expressed in milliseconds and missing fields take their defaults:
///
/// ```json
/// { "max_attempts": 3, "open_timeout_ms": 5000, "reset_timeout_ms": 20000 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(feature = "serde", test), derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(any(feature = "serde", test), serde(default))]
pub struct BreakerOptions {
    max_attempts: u32,
    #[cfg_attr(any(feature = "serde", test), serde(rename = "open_timeout_ms", with = "duration_millis"))]
    open_timeout: Duration,
    #[cfg_attr(any(feature = "serde", test), serde(rename = "reset_timeout_ms", with = "duration_millis"))]
    reset_timeout: Duration,
}

impl Default for BreakerOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            open_timeout: DEFAULT_OPEN_TIMEOUT,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

impl BreakerOptions {
    /// Sets the number of consecutive failures that trips the circuit.
    ///
    /// A failure count exactly equal to this value opens the circuit. Values below `1`
    /// are clamped to `1`.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(MIN_MAX_ATTEMPTS);
        self
    }

    /// Sets the span within which `max_attempts` consecutive failures must occur.
    ///
    /// The span is measured from the first failure of the current streak. A failure
    /// observed after the span elapsed starts a new streak.
    #[must_use]
    pub fn open_timeout(mut self, open_timeout: Duration) -> Self {
        self.open_timeout = open_timeout;
        self
    }

    /// Sets how long the circuit stays open before a single trial call is allowed through.
    #[must_use]
    pub fn reset_timeout(mut self, reset_timeout: Duration) -> Self {
        self.reset_timeout = reset_timeout;
        self
    }

    /// Returns the configured failure threshold.
    #[must_use]
    pub fn get_max_attempts(&self) -> u32 {
        // deserialized values bypass the builder
        self.max_attempts.max(MIN_MAX_ATTEMPTS)
    }

    /// Returns the configured failure window.
    #[must_use]
    pub fn get_open_timeout(&self) -> Duration {
        self.open_timeout
    }

    /// Returns the configured cooldown.
    #[must_use]
    pub fn get_reset_timeout(&self) -> Duration {
        self.reset_timeout
    }
}

#[cfg(any(feature = "serde", test))]
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        u64::try_from(duration.as_millis()).unwrap_or(u64::MAX).serialize(serializer)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = BreakerOptions::default();

        assert_eq!(options.get_max_attempts(), 3);
        assert_eq!(options.get_open_timeout(), Duration::from_millis(5000));
        assert_eq!(options.get_reset_timeout(), Duration::from_millis(20000));
    }

    #[test]
    fn max_attempts_clamped_to_one() {
        let options = BreakerOptions::default().max_attempts(0);
        assert_eq!(options.get_max_attempts(), 1);

        let options = options.max_attempts(7);
        assert_eq!(options.get_max_attempts(), 7);
    }

    #[test]
    fn zero_durations_are_accepted() {
        let options = BreakerOptions::default()
            .open_timeout(Duration::ZERO)
            .reset_timeout(Duration::ZERO);

        assert_eq!(options.get_open_timeout(), Duration::ZERO);
        assert_eq!(options.get_reset_timeout(), Duration::ZERO);
    }

    #[test]
    fn deserialize_uses_milliseconds() {
        let options: BreakerOptions =
            serde_json::from_str(r#"{ "max_attempts": 4, "open_timeout_ms": 1500, "reset_timeout_ms": 250 }"#).unwrap();

        assert_eq!(
            options,
            BreakerOptions::default()
                .max_attempts(4)
                .open_timeout(Duration::from_millis(1500))
                .reset_timeout(Duration::from_millis(250))
        );
    }

    #[test]
    fn deserialize_missing_fields_take_defaults() {
        let options: BreakerOptions = serde_json::from_str(r#"{ "reset_timeout_ms": 1000 }"#).unwrap();

        assert_eq!(options.get_max_attempts(), 3);
        assert_eq!(options.get_open_timeout(), Duration::from_millis(5000));
        assert_eq!(options.get_reset_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn deserialize_zero_max_attempts_is_clamped() {
        let options: BreakerOptions = serde_json::from_str(r#"{ "max_attempts": 0 }"#).unwrap();

        assert_eq!(options.get_max_attempts(), 1);
    }

    #[test]
    fn serialize_writes_milliseconds() {
        let json = serde_json::to_value(BreakerOptions::default()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "max_attempts": 3, "open_timeout_ms": 5000, "reset_timeout_ms": 20000 })
        );
    }
}
