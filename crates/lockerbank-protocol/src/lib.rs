//! Wire protocol of the locker bank RS485 bus.
//!
//! Two channels share the serial line:
//!
//! - the binary, checksummed [`CommandFrame`] that pulses a locker's
//!   release solenoid, built by [`generate_frame`];
//! - the plain ASCII [`ControlCommand`] lines (`STATUS:%03d\n`, `TEST\n`).
//!
//! [`AddressResolver`] maps application locker ids onto the bus.

pub mod control;
pub mod frame;
pub mod resolver;

pub use control::ControlCommand;
pub use frame::{CommandFrame, generate_frame, verify_checksum, xor_checksum};
pub use resolver::AddressResolver;
