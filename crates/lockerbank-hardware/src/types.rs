//! Common types shared by the controller, transports and results.

use lockerbank_core::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How commands reach the lockers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// Real serial device.
    Live,

    /// No hardware; every send succeeds after a short delay.
    Simulated,
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Simulated => write!(f, "simulated"),
        }
    }
}

/// Lifecycle state of the link controller.
///
/// ```text
///            open ok
/// (start) ──────────► Connected
///    │
///    ├── open failed ─► Disconnected ── reconnect() ok ──► Connected
///    │
///    └── simulate ────► Simulated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Disconnected,
    Connected,
    Simulated,
}

impl LinkState {
    /// Returns `true` if sends can reach a transport.
    pub fn is_usable(self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
            Self::Simulated => write!(f, "Simulated"),
        }
    }
}

/// Snapshot of the serial connection, reported by `test_connection`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSession {
    pub mode: LinkMode,
    pub connected: bool,
    pub port: String,
    pub baud_rate: u32,
}

/// Physical state of a locker door as far as the link can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockerStatus {
    Closed,

    /// The boards have no door sensor line, so live status is not observable.
    Unknown,
}

impl fmt::Display for LockerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Operation that produced a [`CommandResult`](crate::result::CommandResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    Open,
    Close,
    Status,
    Test,
    ReservationAccess,
}

impl CommandAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Status => "status",
            Self::Test => "test",
            Self::ReservationAccess => "reservation_access",
        }
    }
}

impl fmt::Display for CommandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure category carried by failed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    InvalidAddressRange,
    InvalidLockerRange,
    InvalidLockerId,
    InvalidAccessCode,
    LinkUnavailable,
    TransmissionError,
    Configuration,
}

impl ErrorKind {
    /// Returns `true` for input errors detected before any I/O.
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            Self::InvalidAddressRange
                | Self::InvalidLockerRange
                | Self::InvalidLockerId
                | Self::InvalidAccessCode
        )
    }
}

impl From<&ValidationError> for ErrorKind {
    fn from(error: &ValidationError) -> Self {
        match error {
            ValidationError::InvalidAddressRange { .. } => Self::InvalidAddressRange,
            ValidationError::InvalidLockerRange { .. } => Self::InvalidLockerRange,
            ValidationError::InvalidLockerId { .. } | ValidationError::MalformedLockerId { .. } => {
                Self::InvalidLockerId
            }
            ValidationError::InvalidAccessCode => Self::InvalidAccessCode,
        }
    }
}
