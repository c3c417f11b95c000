//! Link configuration.
//!
//! Configuration is read from a TOML file. Every key is optional and falls
//! back to the bus defaults, so an empty file describes a live link on
//! `/dev/ttyUSB0` at 9600 baud 8N1.
//!
//! ```toml
//! port = "/dev/ttyUSB1"
//! baud_rate = 9600
//! read_timeout_ms = 1000
//! simulate = false
//!
//! [retry]
//! max_attempts = 5
//! initial_backoff_ms = 500
//! max_backoff_ms = 8000
//! multiplier = 2.0
//! ```
//!
//! Two environment variables override the file: `LOCKERBANK_PORT` and
//! `LOCKERBANK_SIMULATE` (`1`/`true`/`yes`/`on` enable simulation).

use crate::error::{HardwareError, Result};
use crate::types::LinkMode;
use lockerbank_core::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_PORT, DEFAULT_READ_TIMEOUT_MS, DEFAULT_SIMULATED_DELAY_MS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`LinkConfig::port`].
pub const ENV_PORT: &str = "LOCKERBANK_PORT";

/// Environment variable overriding [`LinkConfig::simulate`].
pub const ENV_SIMULATE: &str = "LOCKERBANK_SIMULATE";

/// Serial link configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Serial device path.
    pub port: String,

    /// Baud rate. Framing is always 8 data bits, no parity, 1 stop bit.
    pub baud_rate: u32,

    /// Bound on the response line read after each write.
    pub read_timeout_ms: u64,

    /// Use the simulated transport instead of the serial device.
    pub simulate: bool,

    /// Delay of every simulated send.
    pub simulated_delay_ms: u64,

    /// Policy for opening the serial device.
    pub retry: RetryPolicy,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            simulate: false,
            simulated_delay_ms: DEFAULT_SIMULATED_DELAY_MS,
            retry: RetryPolicy::default(),
        }
    }
}

impl LinkConfig {
    /// Live link on the given port with default parameters.
    pub fn live(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    /// Simulated link with default parameters.
    pub fn simulated() -> Self {
        Self {
            simulate: true,
            ..Self::default()
        }
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    /// Returns `HardwareError::ConfigurationError` on malformed TOML or
    /// values rejected by [`LinkConfig::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| HardwareError::configuration(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    /// Returns `HardwareError::ConfigurationError` if the file cannot be read
    /// or does not parse.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HardwareError::configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `LOCKERBANK_PORT` / `LOCKERBANK_SIMULATE` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_PORT).ok().as_deref(),
            std::env::var(ENV_SIMULATE).ok().as_deref(),
        );
    }

    fn apply_overrides(&mut self, port: Option<&str>, simulate: Option<&str>) {
        if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
            self.port = port.trim().to_string();
        }
        if let Some(flag) = simulate {
            self.simulate = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// Returns `HardwareError::ConfigurationError` describing the first
    /// invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(HardwareError::configuration("port must not be empty"));
        }
        if self.baud_rate == 0 {
            return Err(HardwareError::configuration("baud_rate must be positive"));
        }
        if self.read_timeout_ms == 0 {
            return Err(HardwareError::configuration(
                "read_timeout_ms must be positive",
            ));
        }
        self.retry.validate()
    }

    pub fn mode(&self) -> LinkMode {
        if self.simulate {
            LinkMode::Simulated
        } else {
            LinkMode::Live
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}

/// Retry policy for opening the serial device.
///
/// The default makes a single attempt: a link that cannot be opened stays
/// disconnected until [`reconnect`](crate::controller::LinkController::reconnect)
/// is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total open attempts, including the first one.
    pub max_attempts: u32,

    /// Delay after the first failed attempt.
    pub initial_backoff_ms: u64,

    /// Cap on the delay between attempts.
    pub max_backoff_ms: u64,

    /// Growth factor applied to the delay after each failure.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff.
    pub fn once() -> Self {
        Self::default()
    }

    /// `max_attempts` attempts with the default backoff curve.
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    ///
    /// `initial * multiplier^(attempt - 1)`, capped at `max_backoff_ms`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let initial = Duration::from_millis(self.initial_backoff_ms);
        let cap = Duration::from_millis(self.max_backoff_ms);
        let factor = self.multiplier.powi(exponent);

        if !factor.is_finite() || factor < 0.0 || initial.as_secs_f64() * factor >= cap.as_secs_f64() {
            return cap;
        }
        initial.mul_f64(factor).min(cap)
    }

    /// # Errors
    /// Returns `HardwareError::ConfigurationError` for zero attempts or a
    /// multiplier below 1.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(HardwareError::configuration(
                "retry.max_attempts must be at least 1",
            ));
        }
        if self.multiplier.is_nan() || self.multiplier < 1.0 {
            return Err(HardwareError::configuration(
                "retry.multiplier must be at least 1.0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_defaults_match_bus_parameters() {
        let config = LinkConfig::default();
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.read_timeout(), Duration::from_secs(1));
        assert_eq!(config.simulated_delay(), Duration::from_millis(100));
        assert_eq!(config.mode(), LinkMode::Live);
        assert_eq!(config.retry.max_attempts, 1);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(LinkConfig::from_toml_str("").unwrap(), LinkConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = LinkConfig::from_toml_str(
            r#"
            port = "/dev/ttyS3"
            simulate = true

            [retry]
            max_attempts = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.port, "/dev/ttyS3");
        assert!(config.simulate);
        assert_eq!(config.mode(), LinkMode::Simulated);
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.initial_backoff_ms, 500);
    }

    #[test]
    fn test_invalid_toml() {
        let err = LinkConfig::from_toml_str("port = [").unwrap_err();
        assert!(matches!(err, HardwareError::ConfigurationError { .. }));
    }

    #[rstest]
    #[case("port = \"\"")]
    #[case("baud_rate = 0")]
    #[case("read_timeout_ms = 0")]
    #[case("[retry]\nmax_attempts = 0")]
    #[case("[retry]\nmultiplier = 0.5")]
    fn test_rejected_values(#[case] content: &str) {
        assert!(LinkConfig::from_toml_str(content).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"/dev/ttyAMA0\"\nbaud_rate = 19200").unwrap();

        let config = LinkConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.port, "/dev/ttyAMA0");
        assert_eq!(config.baud_rate, 19200);
    }

    #[test]
    fn test_missing_file() {
        let err = LinkConfig::from_toml_file("/nonexistent/lockerbank.toml").unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }

    #[test]
    fn test_overrides() {
        let mut config = LinkConfig::default();
        config.apply_overrides(Some("/dev/ttyUSB7"), Some("yes"));
        assert_eq!(config.port, "/dev/ttyUSB7");
        assert!(config.simulate);

        config.apply_overrides(Some("  "), Some("0"));
        assert_eq!(config.port, "/dev/ttyUSB7");
        assert!(!config.simulate);
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_backoff_ms: 100,
            max_backoff_ms: 1000,
            multiplier: 2.0,
        };

        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(4), Duration::from_millis(800));
        assert_eq!(policy.backoff(5), Duration::from_millis(1000));
        assert_eq!(policy.backoff(u32::MAX), Duration::from_millis(1000));
    }

    #[test]
    fn test_constant_backoff() {
        let policy = RetryPolicy {
            multiplier: 1.0,
            ..RetryPolicy::attempts(3)
        };
        assert_eq!(policy.backoff(1), policy.backoff(3));
    }
}
