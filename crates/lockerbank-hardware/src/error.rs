//! Error types for link operations.
//!
//! These errors never cross the controller boundary as `Err`: the
//! [`LinkController`](crate::controller::LinkController) converts them into
//! failed [`CommandResult`](crate::result::CommandResult)s. They are still
//! typed so that the conversion can tag each failure with an [`ErrorKind`].

use crate::types::ErrorKind;

/// Result type alias for link operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while driving the RS485 link.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// No transport is available, the link never came up.
    #[error("RS485 link not connected: {device}")]
    Disconnected { device: String },

    /// Operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Link configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Serial port driver error.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Failure category reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Disconnected { .. } => ErrorKind::LinkUnavailable,
            Self::ConfigurationError { .. } => ErrorKind::Configuration,
            Self::Timeout { .. }
            | Self::CommunicationError { .. }
            | Self::Serial(_)
            | Self::Io(_) => ErrorKind::TransmissionError,
        }
    }
}
