//! Access-code gated locker release.
//!
//! Reservation holders open their locker with an 8-digit code. The gate
//! only checks the code's format; whether the code belongs to a reservation
//! is decided by the caller before it gets here.

use crate::controller::LinkController;
use crate::result::CommandResult;
use crate::types::{CommandAction, ErrorKind};
use lockerbank_core::AccessCode;
use std::sync::Arc;
use tracing::{info, warn};

/// Front door for reservation-triggered openings.
///
/// # Examples
///
/// ```
/// use lockerbank_hardware::{AccessGate, LinkConfig, LinkController};
/// use std::sync::Arc;
///
/// #[tokio::main(flavor = "current_thread", start_paused = true)]
/// async fn main() {
///     let controller = Arc::new(LinkController::connect(LinkConfig::simulated()).await);
///     let gate = AccessGate::new(controller);
///
///     let result = gate.access_with_code("12345678", 3, None, None).await;
///     assert!(result.success);
///
///     let result = gate.access_with_code("1234", 3, None, None).await;
///     assert_eq!(result.error.as_deref(), Some("Invalid access code format"));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AccessGate {
    controller: Arc<LinkController>,
}

impl AccessGate {
    pub fn new(controller: Arc<LinkController>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &Arc<LinkController> {
        &self.controller
    }

    /// Open a locker for a reservation holder.
    ///
    /// A code that is not exactly eight ASCII digits is rejected without
    /// touching the link.
    pub async fn access_with_code(
        &self,
        access_code: &str,
        logical_locker_id: i64,
        address: Option<i64>,
        locker_number: Option<i64>,
    ) -> CommandResult {
        let action = CommandAction::ReservationAccess;

        if let Err(e) = AccessCode::parse(access_code) {
            warn!(logical_locker_id, "Rejected malformed access code");
            return CommandResult::failure(action, ErrorKind::from(&e), e.to_string())
                .with_locker_id(logical_locker_id);
        }

        info!(logical_locker_id, "Access code accepted");
        self.controller
            .pulse(action, logical_locker_id, address, locker_number)
            .await
    }
}
