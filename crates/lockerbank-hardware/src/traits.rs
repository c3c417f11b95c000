//! Transport trait definition.
//!
//! A transport has exactly one capability: push a byte payload onto the bus
//! and report whether the write went through. Mode-specific behaviour (real
//! serial I/O, simulation, recording for tests) lives entirely behind this
//! trait and is selected once, when the controller is built.
//!
//! The trait uses native `async fn` (Edition 2024 RPITIT), so it is not
//! object-safe. Dynamic selection goes through the
//! [`AnyTransport`](crate::transports::AnyTransport) enum instead of
//! `Box<dyn Transport>`.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::LinkMode;

/// Outcome of a successful write.
///
/// The protocol is fire-and-forget: boards may or may not answer. A reply
/// line is informational and its absence is not a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Response line read after the write, without its terminator.
    pub line: Option<String>,
}

impl Reply {
    /// Reply with no response line.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Reply carrying a response line.
    pub fn with_line(line: impl Into<String>) -> Self {
        Self {
            line: Some(line.into()),
        }
    }
}

/// Half-duplex bus transport.
///
/// Implementations take `&mut self`: the caller must hold exclusive access
/// for the whole write-then-read exchange, which is what keeps frames from
/// interleaving on the wire.
///
/// # Examples
///
/// ```no_run
/// use lockerbank_hardware::traits::Transport;
/// use lockerbank_hardware::Result;
///
/// async fn probe<T: Transport>(transport: &mut T) -> Result<bool> {
///     let reply = transport.send(b"TEST\n").await?;
///     Ok(reply.line.is_some())
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Write `payload` to the bus and collect an optional reply line.
    ///
    /// # Errors
    ///
    /// Returns an error only if the write itself failed. A missing or
    /// unreadable reply is reported as [`Reply::silent`].
    async fn send(&mut self, payload: &[u8]) -> Result<Reply>;

    /// Mode this transport implements.
    fn mode(&self) -> LinkMode;
}
