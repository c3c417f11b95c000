//! Test doubles for the bus transport.

pub mod recording;

pub use recording::{RecordingHandle, RecordingTransport};
