//! RS485 link controller.
//!
//! The controller owns the bus. It turns locker ids into frames, pushes
//! them through the selected transport and wraps every outcome into a
//! [`CommandResult`]. It never returns an error: input problems, a missing
//! link and I/O failures all come back as `success = false` results tagged
//! with an [`ErrorKind`].
//!
//! # Serialisation
//!
//! The transport sits behind a `tokio::sync::Mutex` that is held for the
//! whole write-then-read exchange. Any number of tasks may share one
//! controller through an `Arc`; their commands reach the half-duplex bus one
//! after the other, never interleaved.

use crate::config::LinkConfig;
use crate::error::{HardwareError, Result};
use crate::result::CommandResult;
use crate::retry::with_retry;
use crate::serial::SerialTransport;
use crate::simulated::SimulatedTransport;
use crate::traits::{Reply, Transport};
use crate::transports::AnyTransport;
use crate::types::{CommandAction, ErrorKind, LinkMode, LinkSession, LinkState, LockerStatus};
use lockerbank_core::LogicalLockerId;
use lockerbank_protocol::{AddressResolver, CommandFrame, ControlCommand};
use std::sync::{Mutex as StdMutex, PoisonError};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Controller for one RS485 locker bus.
///
/// # Examples
///
/// ```
/// use lockerbank_hardware::{LinkConfig, LinkController, LinkState};
///
/// #[tokio::main(flavor = "current_thread", start_paused = true)]
/// async fn main() {
///     let controller = LinkController::connect(LinkConfig::simulated()).await;
///     assert_eq!(controller.state(), LinkState::Simulated);
///
///     let result = controller.open_locker(1, None, None).await;
///     assert!(result.success);
///     assert_eq!(result.frame.as_deref(), Some("5A5A0000000400010005"));
/// }
/// ```
#[derive(Debug)]
pub struct LinkController {
    config: LinkConfig,
    transport: Mutex<Option<AnyTransport>>,
    state: StdMutex<LinkState>,
}

impl LinkController {
    /// Bring up the link described by `config`.
    ///
    /// In simulation mode no device is touched. Otherwise the serial device
    /// is opened under the configured retry policy; if every attempt fails
    /// the controller is still returned, in [`LinkState::Disconnected`].
    pub async fn connect(config: LinkConfig) -> Self {
        if config.simulate {
            info!(
                delay_ms = config.simulated_delay_ms,
                "RS485 link running in simulation mode"
            );
            let transport = SimulatedTransport::new(config.simulated_delay());
            return Self::with_transport(config, transport.into());
        }

        let controller = Self {
            config,
            transport: Mutex::new(None),
            state: StdMutex::new(LinkState::Disconnected),
        };
        controller.reconnect().await;
        controller
    }

    /// Build a controller around an already constructed transport.
    pub fn with_transport(config: LinkConfig, transport: AnyTransport) -> Self {
        let state = match transport.mode() {
            LinkMode::Simulated => LinkState::Simulated,
            LinkMode::Live => LinkState::Connected,
        };

        Self {
            config,
            transport: Mutex::new(Some(transport)),
            state: StdMutex::new(state),
        }
    }

    pub fn state(&self) -> LinkState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: LinkState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Snapshot of the link parameters and connection flag.
    pub fn session(&self) -> LinkSession {
        let state = self.state();
        LinkSession {
            mode: match state {
                LinkState::Simulated => LinkMode::Simulated,
                _ => LinkMode::Live,
            },
            connected: state.is_usable(),
            port: self.config.port.clone(),
            baud_rate: self.config.baud_rate,
        }
    }

    /// Reopen the serial device.
    ///
    /// Any current serial handle is closed first. Returns `true` if the link
    /// is usable afterwards. A simulated link is always usable and is left
    /// untouched.
    ///
    /// The bus lock is only taken to drop the old handle and to install the
    /// new one. Commands issued while the retry loop runs fail at once with
    /// [`ErrorKind::LinkUnavailable`].
    pub async fn reconnect(&self) -> bool {
        if self.state() == LinkState::Simulated {
            return true;
        }

        self.transport.lock().await.take();
        self.set_state(LinkState::Disconnected);

        let config = &self.config;
        let opened = with_retry(&config.retry, "open_serial_port", |attempt| async move {
            debug!(port = %config.port, attempt, "Opening serial port");
            SerialTransport::open(config)
        })
        .await;

        match opened {
            Ok(serial) => {
                info!(
                    port = %config.port,
                    baud_rate = config.baud_rate,
                    "RS485 link connected"
                );
                *self.transport.lock().await = Some(serial.into());
                self.set_state(LinkState::Connected);
                true
            }
            Err(e) => {
                error!(
                    port = %config.port,
                    error = %e,
                    "Failed to open RS485 link, staying disconnected"
                );
                false
            }
        }
    }

    /// Send a hex encoded command frame.
    ///
    /// Returns `false` if the text is not a valid frame, the link is down or
    /// the write failed. A missing reply is not a failure.
    pub async fn send(&self, frame_hex: &str) -> bool {
        let frame = match CommandFrame::from_hex(frame_hex) {
            Ok(frame) => frame,
            Err(e) => {
                error!(frame = frame_hex, error = %e, "Refusing to send malformed frame");
                return false;
            }
        };
        self.transmit(frame.as_bytes()).await.is_ok()
    }

    /// Write `payload` while holding the bus.
    async fn transmit(&self, payload: &[u8]) -> Result<Reply> {
        let mut guard = self.transport.lock().await;
        let Some(transport) = guard.as_mut() else {
            error!(port = %self.config.port, "Cannot send, RS485 link not connected");
            return Err(HardwareError::disconnected(&self.config.port));
        };

        debug!(frame = %hex::encode_upper(payload), bytes = payload.len(), "Transmitting");
        let reply = transport.send(payload).await.inspect_err(|e| {
            error!(port = %self.config.port, error = %e, "Transmission failed");
        })?;

        if let Some(line) = &reply.line {
            debug!(response = %line, "Board replied");
        }
        Ok(reply)
    }

    /// Pulse a locker's release solenoid.
    ///
    /// `address` and `locker_number` override the computed location only
    /// when both are given.
    pub async fn open_locker(
        &self,
        logical_locker_id: i64,
        address: Option<i64>,
        locker_number: Option<i64>,
    ) -> CommandResult {
        self.pulse(CommandAction::Open, logical_locker_id, address, locker_number)
            .await
    }

    /// Close a locker.
    ///
    /// The boards drive momentary-pulse solenoids and have no separate close
    /// command: this sends exactly the frame `open_locker` sends. Only the
    /// action recorded in the result differs.
    pub async fn close_locker(
        &self,
        logical_locker_id: i64,
        address: Option<i64>,
        locker_number: Option<i64>,
    ) -> CommandResult {
        self.pulse(CommandAction::Close, logical_locker_id, address, locker_number)
            .await
    }

    /// Resolve, encode and send a release frame.
    pub(crate) async fn pulse(
        &self,
        action: CommandAction,
        logical_locker_id: i64,
        address: Option<i64>,
        locker_number: Option<i64>,
    ) -> CommandResult {
        let location = LogicalLockerId::new(logical_locker_id)
            .and_then(|id| AddressResolver::resolve(id, address, locker_number));

        let location = match location {
            Ok(location) => location,
            Err(e) => {
                warn!(logical_locker_id, action = %action, error = %e, "Rejected locker command");
                return CommandResult::failure(action, ErrorKind::from(&e), e.to_string())
                    .with_locker_id(logical_locker_id);
            }
        };

        let frame = CommandFrame::new(location);
        let frame_hex = frame.to_hex();
        info!(
            logical_locker_id,
            action = %action,
            address = location.address.as_u8(),
            locker_number = location.locker_number.as_u8(),
            frame = %frame_hex,
            "Dispatching locker command"
        );

        let result = match self.transmit(frame.as_bytes()).await {
            Ok(reply) => CommandResult::success(
                action,
                format!("Locker {} {}", logical_locker_id, done_verb(action)),
            )
            .with_response(reply.line),
            Err(e) => CommandResult::failure(
                action,
                e.kind(),
                format!(
                    "Failed to {} locker {}: {}",
                    verb(action),
                    logical_locker_id,
                    e
                ),
            ),
        };

        result
            .with_locker_id(logical_locker_id)
            .with_physical_address(location)
            .with_frame(frame_hex)
    }

    /// Query a locker's door state.
    ///
    /// The boards have no door sensors, so a live link reports
    /// [`LockerStatus::Unknown`]; the simulation reports every door closed.
    pub async fn get_status(&self, logical_locker_id: i64) -> CommandResult {
        let action = CommandAction::Status;
        let id = match LogicalLockerId::new(logical_locker_id) {
            Ok(id) => id,
            Err(e) => {
                return CommandResult::failure(action, ErrorKind::from(&e), e.to_string())
                    .with_locker_id(logical_locker_id);
            }
        };

        let command = ControlCommand::Status(id);
        let line = command.to_line();
        info!(logical_locker_id, command = %command, "Querying locker status");

        let result = match self.transmit(line.as_bytes()).await {
            Ok(reply) => {
                let status = match self.state() {
                    LinkState::Simulated => LockerStatus::Closed,
                    _ => LockerStatus::Unknown,
                };
                CommandResult::success(
                    action,
                    format!("Locker {} status: {}", logical_locker_id, status),
                )
                .with_status(status)
                .with_response(reply.line)
            }
            Err(e) => CommandResult::failure(
                action,
                e.kind(),
                format!("Failed to query locker {}: {}", logical_locker_id, e),
            ),
        };

        result
            .with_locker_id(logical_locker_id)
            .with_frame(hex::encode_upper(line.as_bytes()))
    }

    /// Probe the bus with a `TEST` line and report the link parameters.
    pub async fn test_connection(&self) -> CommandResult {
        let action = CommandAction::Test;
        let line = ControlCommand::Test.to_line();
        info!(port = %self.config.port, "Testing RS485 link");

        let result = match self.transmit(line.as_bytes()).await {
            Ok(reply) => {
                let session = self.session();
                CommandResult::success(
                    action,
                    format!("RS485 link OK ({}, {})", session.port, session.mode),
                )
                .with_response(reply.line)
            }
            Err(e) => {
                warn!(port = %self.config.port, error = %e, "RS485 link test failed");
                CommandResult::failure(action, e.kind(), format!("RS485 link test failed: {}", e))
            }
        };

        result
            .with_frame(hex::encode_upper(line.as_bytes()))
            .with_diagnostics(self.session())
    }
}

fn verb(action: CommandAction) -> &'static str {
    match action {
        CommandAction::Close => "close",
        _ => "open",
    }
}

fn done_verb(action: CommandAction) -> &'static str {
    match action {
        CommandAction::Close => "closed",
        CommandAction::ReservationAccess => "opened by reservation",
        _ => "opened",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{RecordingHandle, RecordingTransport};
    use lockerbank_core::constants::FRAME_LENGTH;

    fn recording() -> (LinkController, RecordingHandle) {
        let (transport, handle) = RecordingTransport::new();
        let controller = LinkController::with_transport(LinkConfig::default(), transport.into());
        (controller, handle)
    }

    #[tokio::test]
    async fn test_open_sends_resolved_frame() {
        let (controller, handle) = recording();

        let result = controller.open_locker(2, None, None).await;

        assert!(result.success, "{:?}", result);
        assert_eq!(result.frame.as_deref(), Some("5A5A0001000400010105"));
        assert_eq!(result.message, "Locker 2 opened");
        assert_eq!(handle.sends().len(), 1);
        assert_eq!(handle.sends()[0].len(), FRAME_LENGTH);
    }

    #[tokio::test]
    async fn test_explicit_location_wins() {
        let (controller, handle) = recording();

        let result = controller.open_locker(99, Some(0), Some(1)).await;

        assert!(result.success);
        assert_eq!(result.frame.as_deref(), Some("5A5A0000000400010104"));
        assert_eq!(hex::encode_upper(&handle.sends()[0]), "5A5A0000000400010104");
    }

    #[tokio::test]
    async fn test_out_of_range_never_sends() {
        let (controller, handle) = recording();

        let result = controller.open_locker(1, Some(32), Some(0)).await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::InvalidAddressRange));
        assert_eq!(result.frame, None);

        let result = controller.close_locker(1, Some(0), Some(25)).await;
        assert_eq!(result.error_kind, Some(ErrorKind::InvalidLockerRange));

        let result = controller.open_locker(0, None, None).await;
        assert_eq!(result.error_kind, Some(ErrorKind::InvalidLockerId));
        assert_eq!(result.logical_locker_id, Some(0));

        assert_eq!(handle.send_count(), 0);
    }

    #[tokio::test]
    async fn test_status_line_on_live_link() {
        let (controller, handle) = recording();
        handle.set_response(Some("ACK"));

        let result = controller.get_status(7).await;

        assert!(result.success);
        assert_eq!(result.status, Some(LockerStatus::Unknown));
        assert_eq!(result.response.as_deref(), Some("ACK"));
        assert_eq!(handle.sends()[0], b"STATUS:007\n");
        assert_eq!(result.frame, Some(hex::encode_upper(b"STATUS:007\n")));
    }

    #[tokio::test]
    async fn test_send_rejects_malformed_frame() {
        let (controller, handle) = recording();

        assert!(!controller.send("5A5A").await);
        assert!(!controller.send("5A5A0000000400010105").await);
        assert!(controller.send("5A5A0000000400010104").await);
        assert_eq!(handle.send_count(), 1);
    }

    #[tokio::test]
    async fn test_session_of_recording_link() {
        let (controller, _handle) = recording();
        let session = controller.session();

        assert_eq!(controller.state(), LinkState::Connected);
        assert_eq!(session.mode, LinkMode::Live);
        assert!(session.connected);
        assert_eq!(session.baud_rate, 9600);
    }
}
