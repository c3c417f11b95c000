//! RS485 serial transport.
//!
//! The bus adapter shows up as a plain serial device (typically a USB
//! RS485 dongle on `/dev/ttyUSB0`). Framing is fixed at 8 data bits, no
//! parity, 1 stop bit, no flow control.
//!
//! The port is a `tokio_serial::SerialStream`. Every exchange runs in its
//! own task that holds the port lock from the first written byte to the end
//! of the reply read, so a caller that gives up early cannot cut a frame in
//! half.

use crate::config::LinkConfig;
use crate::error::{HardwareError, Result};
use crate::traits::{Reply, Transport};
use crate::types::LinkMode;
use lockerbank_core::constants::{LINE_TERMINATOR, MAX_RESPONSE_LENGTH};
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_serial::{DataBits, FlowControl, Parity, SerialStream, StopBits};
use tracing::{debug, trace, warn};

/// Serial transport for a live RS485 bus.
pub struct SerialTransport {
    port: Arc<Mutex<SerialStream>>,
    port_name: String,
    read_timeout: Duration,
}

impl SerialTransport {
    /// Open the configured serial device.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Serial` if the device does not exist, is busy
    /// or rejects the line settings.
    pub fn open(config: &LinkConfig) -> Result<Self> {
        debug!(
            port = %config.port,
            baud_rate = config.baud_rate,
            "Opening serial port (8N1)"
        );

        let builder = tokio_serial::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout());
        let port = SerialStream::open(&builder)?;

        Ok(Self {
            port: Arc::new(Mutex::new(port)),
            port_name: config.port.clone(),
            read_timeout: config.read_timeout(),
        })
    }
}

impl fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port_name", &self.port_name)
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

impl Transport for SerialTransport {
    async fn send(&mut self, payload: &[u8]) -> Result<Reply> {
        let port = Arc::clone(&self.port);
        let payload = payload.to_vec();
        let read_timeout = self.read_timeout;
        let port_name = self.port_name.clone();

        tokio::spawn(async move {
            let mut port = port.lock().await;
            trace!(port = %port_name, payload = %hex::encode_upper(&payload), "Writing to bus");
            let line = exchange(&mut *port, &payload, read_timeout).await?;
            Ok(Reply { line })
        })
        .await
        .map_err(|e| HardwareError::communication(format!("Serial I/O task failed: {}", e)))?
    }

    fn mode(&self) -> LinkMode {
        LinkMode::Live
    }
}

/// Write the payload, then read at most one reply line within `limit`.
///
/// Only write errors are returned; anything that goes wrong while reading
/// yields `None`.
async fn exchange<P>(port: &mut P, payload: &[u8], limit: Duration) -> Result<Option<String>>
where
    P: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let write = async {
        port.write_all(payload).await?;
        port.flush().await
    };

    match timeout(limit, write).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) if e.kind() == io::ErrorKind::TimedOut => {
            return Err(HardwareError::timeout(limit.as_millis() as u64));
        }
        Ok(Err(e)) => return Err(HardwareError::Io(e)),
        Err(_) => return Err(HardwareError::timeout(limit.as_millis() as u64)),
    }

    Ok(read_line(port, limit).await)
}

/// Collect bytes up to the line terminator. The whole read ends at `limit`
/// however slowly the board trickles bytes in.
async fn read_line<R>(port: &mut R, limit: Duration) -> Option<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut line = Vec::new();

    let collect = async {
        let mut byte = [0u8; 1];
        while line.len() < MAX_RESPONSE_LENGTH {
            match port.read(&mut byte).await {
                Ok(0) => break,
                Ok(_) if byte[0] == LINE_TERMINATOR => break,
                Ok(_) => line.push(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "Reply read failed, ignoring");
                    break;
                }
            }
        }
    };

    if timeout(limit, collect).await.is_err() {
        trace!(received = line.len(), "Reply read hit the deadline");
    }

    let text = String::from_utf8_lossy(&line).trim().to_string();
    (!text.is_empty()).then_some(text)
}
