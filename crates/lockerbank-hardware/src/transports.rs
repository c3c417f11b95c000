//! Enum wrapper for transport dispatch.
//!
//! [`Transport`] uses native `async fn`, so it cannot be boxed as a trait
//! object. The controller holds an [`AnyTransport`] and the concrete
//! implementation is chosen once, when the link is set up.

use crate::error::Result;
use crate::mock::RecordingTransport;
use crate::serial::SerialTransport;
use crate::simulated::SimulatedTransport;
use crate::traits::{Reply, Transport};
use crate::types::LinkMode;

/// Any transport the controller can drive.
///
/// # Examples
///
/// ```
/// use lockerbank_hardware::simulated::SimulatedTransport;
/// use lockerbank_hardware::traits::Transport;
/// use lockerbank_hardware::transports::AnyTransport;
/// use lockerbank_hardware::types::LinkMode;
/// use std::time::Duration;
///
/// let transport = AnyTransport::Simulated(SimulatedTransport::new(Duration::ZERO));
/// assert_eq!(transport.mode(), LinkMode::Simulated);
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyTransport {
    /// RS485 adapter on a serial device.
    Serial(SerialTransport),

    /// No hardware, every send succeeds.
    Simulated(SimulatedTransport),

    /// In-memory recorder for tests.
    Recording(RecordingTransport),
}

impl Transport for AnyTransport {
    async fn send(&mut self, payload: &[u8]) -> Result<Reply> {
        match self {
            Self::Serial(transport) => transport.send(payload).await,
            Self::Simulated(transport) => transport.send(payload).await,
            Self::Recording(transport) => transport.send(payload).await,
        }
    }

    fn mode(&self) -> LinkMode {
        match self {
            Self::Serial(transport) => transport.mode(),
            Self::Simulated(transport) => transport.mode(),
            Self::Recording(transport) => transport.mode(),
        }
    }
}

impl From<SerialTransport> for AnyTransport {
    fn from(transport: SerialTransport) -> Self {
        Self::Serial(transport)
    }
}

impl From<SimulatedTransport> for AnyTransport {
    fn from(transport: SimulatedTransport) -> Self {
        Self::Simulated(transport)
    }
}

impl From<RecordingTransport> for AnyTransport {
    fn from(transport: RecordingTransport) -> Self {
        Self::Recording(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_reaches_inner_transport() {
        let (recorder, handle) = RecordingTransport::new();
        let mut transport = AnyTransport::from(recorder);

        transport.send(b"TEST\n").await.unwrap();

        assert_eq!(transport.mode(), LinkMode::Live);
        assert_eq!(handle.send_count(), 1);
    }
}
