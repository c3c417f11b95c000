//! RS485 link layer for the locker bank.
//!
//! This crate drives the half-duplex serial bus that connects the host to
//! the locker controller boards. It selects a transport once, at startup,
//! and exposes the locker operations on top of it.
//!
//! # Components
//!
//! - [`LinkController`] owns the link and runs open, close, status and test
//!   operations. Every operation yields a [`CommandResult`]; nothing is
//!   returned as `Err`.
//! - [`AccessGate`] checks an 8-digit access code before asking the
//!   controller to release a locker.
//! - [`Transport`](traits::Transport) is the seam between the controller and
//!   the wire, implemented by [`SerialTransport`](serial::SerialTransport),
//!   [`SimulatedTransport`](simulated::SimulatedTransport) and the
//!   [`RecordingTransport`](mock::RecordingTransport) test double, and
//!   dispatched through [`AnyTransport`](transports::AnyTransport).
//!
//! # Modes
//!
//! With `simulate = true` in the [`LinkConfig`] no device is opened and every
//! command succeeds after a short delay. Otherwise the serial device is
//! opened at 9600 baud 8N1; if that fails the controller stays
//! [`Disconnected`](LinkState::Disconnected) and every operation reports
//! [`ErrorKind::LinkUnavailable`] until [`LinkController::reconnect`]
//! succeeds.
//!
//! # Example
//!
//! ```no_run
//! use lockerbank_hardware::{LinkConfig, LinkController};
//!
//! #[tokio::main]
//! async fn main() {
//!     let controller = LinkController::connect(LinkConfig::live("/dev/ttyUSB0")).await;
//!     let result = controller.open_locker(12, None, None).await;
//!
//!     if !result.success {
//!         eprintln!("{}", result.message);
//!     }
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod mock;
pub mod result;
pub mod retry;
pub mod serial;
pub mod simulated;
pub mod traits;
pub mod transports;
pub mod types;

pub use config::{LinkConfig, RetryPolicy};
pub use controller::LinkController;
pub use error::{HardwareError, Result};
pub use gate::AccessGate;
pub use result::CommandResult;
pub use types::{CommandAction, ErrorKind, LinkMode, LinkSession, LinkState, LockerStatus};
