//! Simulated transport.
//!
//! Used when no bus adapter is attached. Every send is logged, takes a fixed
//! delay and succeeds without a reply line.

use crate::error::Result;
use crate::traits::{Reply, Transport};
use crate::types::LinkMode;
use std::time::Duration;
use tracing::info;

/// Transport that pretends every write reached the bus.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    delay: Duration,
}

impl SimulatedTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Transport for SimulatedTransport {
    async fn send(&mut self, payload: &[u8]) -> Result<Reply> {
        info!(
            payload = %hex::encode_upper(payload),
            bytes = payload.len(),
            "[SIMULATED] Sending command"
        );
        tokio::time::sleep(self.delay).await;
        Ok(Reply::silent())
    }

    fn mode(&self) -> LinkMode {
        LinkMode::Simulated
    }
}
