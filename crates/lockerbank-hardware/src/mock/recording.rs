//! Recording transport for tests.
//!
//! Captures every payload it is asked to send, plus the byte stream as it
//! would appear on the wire. The wire is written one byte at a time with a
//! yield in between, so two sends that were allowed to run concurrently
//! would visibly interleave.

use crate::error::{HardwareError, Result};
use crate::traits::{Reply, Transport};
use crate::types::LinkMode;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct State {
    wire: Vec<u8>,
    sends: Vec<Vec<u8>>,
    in_flight: bool,
    overlaps: usize,
    fail_writes: bool,
    response: Option<String>,
    delay: Duration,
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Transport that records instead of writing to a device.
///
/// # Examples
///
/// ```
/// use lockerbank_hardware::mock::RecordingTransport;
/// use lockerbank_hardware::traits::Transport;
///
/// #[tokio::main]
/// async fn main() -> lockerbank_hardware::Result<()> {
///     let (mut transport, handle) = RecordingTransport::new();
///
///     transport.send(b"TEST\n").await?;
///
///     assert_eq!(handle.send_count(), 1);
///     assert_eq!(handle.wire(), b"TEST\n");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct RecordingTransport {
    state: Arc<Mutex<State>>,
}

impl RecordingTransport {
    /// Create a transport and the handle used to inspect and steer it.
    pub fn new() -> (Self, RecordingHandle) {
        let state = Arc::new(Mutex::new(State::default()));
        let transport = Self {
            state: Arc::clone(&state),
        };
        (transport, RecordingHandle { state })
    }
}

impl Transport for RecordingTransport {
    async fn send(&mut self, payload: &[u8]) -> Result<Reply> {
        let delay = {
            let mut state = lock(&self.state);
            if state.fail_writes {
                return Err(HardwareError::communication("Simulated write failure"));
            }
            if state.in_flight {
                state.overlaps += 1;
            }
            state.in_flight = true;
            state.delay
        };

        for byte in payload {
            lock(&self.state).wire.push(*byte);
            tokio::task::yield_now().await;
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = lock(&self.state);
        state.sends.push(payload.to_vec());
        state.in_flight = false;
        Ok(Reply {
            line: state.response.clone(),
        })
    }

    fn mode(&self) -> LinkMode {
        LinkMode::Live
    }
}

/// Handle for inspecting a [`RecordingTransport`].
#[derive(Debug, Clone)]
pub struct RecordingHandle {
    state: Arc<Mutex<State>>,
}

impl RecordingHandle {
    /// Payloads in the order their sends completed.
    pub fn sends(&self) -> Vec<Vec<u8>> {
        lock(&self.state).sends.clone()
    }

    pub fn send_count(&self) -> usize {
        lock(&self.state).sends.len()
    }

    /// Every byte written, in wire order.
    pub fn wire(&self) -> Vec<u8> {
        lock(&self.state).wire.clone()
    }

    /// Number of sends that started while another was still in flight.
    pub fn overlaps(&self) -> usize {
        lock(&self.state).overlaps
    }

    /// Make subsequent sends fail before any byte is written.
    pub fn fail_writes(&self, fail: bool) {
        lock(&self.state).fail_writes = fail;
    }

    /// Reply line returned by subsequent sends.
    pub fn set_response(&self, line: Option<&str>) {
        lock(&self.state).response = line.map(str::to_string);
    }

    /// Extra time each send holds the bus after writing.
    pub fn set_delay(&self, delay: Duration) {
        lock(&self.state).delay = delay;
    }
}
