//! Outcome of a controller operation.

use crate::types::{CommandAction, ErrorKind, LinkSession, LockerStatus};
use chrono::{DateTime, Utc};
use lockerbank_core::PhysicalAddress;
use serde::{Deserialize, Serialize};

/// Result of a single controller operation.
///
/// Every operation produces one of these, successful or not; failures never
/// escape the controller as `Err`. Serialises to JSON with snake_case keys,
/// optional fields are omitted when absent.
///
/// ```json
/// {
///   "success": true,
///   "logical_locker_id": 1,
///   "action": "open",
///   "physical_address": { "address": 0, "locker_number": 0 },
///   "frame": "5A5A0000000400010005",
///   "timestamp": "2024-05-01T10:00:00Z",
///   "message": "Locker 1 opened"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,

    /// Locker id as supplied by the caller, also when it was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_locker_id: Option<i64>,

    pub action: CommandAction,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_address: Option<PhysicalAddress>,

    /// Uppercase hex of the bytes put on the bus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,

    pub timestamp: DateTime<Utc>,

    /// Human readable summary.
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,

    /// Door state, status queries only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LockerStatus>,

    /// Link snapshot, connection tests only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<LinkSession>,

    /// Reply line from the board, if it sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success(action: CommandAction, message: impl Into<String>) -> Self {
        Self {
            success: true,
            logical_locker_id: None,
            action,
            physical_address: None,
            frame: None,
            timestamp: Utc::now(),
            message: message.into(),
            error: None,
            error_kind: None,
            status: None,
            diagnostics: None,
            response: None,
        }
    }

    /// Create a failed result; `detail` becomes both message and error text.
    pub fn failure(action: CommandAction, kind: ErrorKind, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            success: false,
            error: Some(detail.clone()),
            error_kind: Some(kind),
            ..Self::success(action, detail)
        }
    }

    pub fn with_locker_id(mut self, id: i64) -> Self {
        self.logical_locker_id = Some(id);
        self
    }

    pub fn with_physical_address(mut self, location: PhysicalAddress) -> Self {
        self.physical_address = Some(location);
        self
    }

    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frame = Some(frame.into());
        self
    }

    pub fn with_status(mut self, status: LockerStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_diagnostics(mut self, session: LinkSession) -> Self {
        self.diagnostics = Some(session);
        self
    }

    pub fn with_response(mut self, response: Option<String>) -> Self {
        self.response = response;
        self
    }
}
