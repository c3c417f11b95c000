use thiserror::Error;

/// Input rejected before any byte reaches the bus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Address must be 0-{max}, got {value}")]
    InvalidAddressRange { value: i64, max: u8 },

    #[error("Locker number must be 0-{max}, got {value}")]
    InvalidLockerRange { value: i64, max: u8 },

    #[error("Logical locker id must be positive, got {value}")]
    InvalidLockerId { value: i64 },

    #[error("Logical locker id must be a positive integer, got '{input}'")]
    MalformedLockerId { input: String },

    #[error("Invalid access code format")]
    InvalidAccessCode,
}

#[derive(Error, Debug)]
pub enum Error {
    // Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // Protocol errors
    #[error("Invalid frame: {message}")]
    InvalidFrame { message: String },

    #[error("Checksum mismatch: expected {expected:02X}, got {actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

impl Error {
    /// Create an invalid frame error.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: message.into(),
        }
    }

    /// Returns the validation failure if this error is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
