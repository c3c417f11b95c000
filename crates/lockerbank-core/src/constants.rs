//! Core constants for the locker bank RS485 protocol.
//!
//! This module defines the protocol-level constants shared by the frame
//! encoder, the address resolver and the link controller. Keeping them in one
//! place guarantees that the encoder's accepted ranges and the resolver's
//! fallback arithmetic never drift apart.
//!
//! # Frame Structure
//!
//! Every locker command is a fixed 10-byte binary frame:
//!
//! ```text
//! 5A 5A 00 AA 00 04 00 01 LL CC
//! ^^^^^ ^^ ^^ ^^^^^^^^^^^ ^^ ^^
//! sync  |  |  reserved    |  checksum (XOR of bytes 0-8)
//!       |  address        locker number
//!       reserved
//! ```
//!
//! # Usage
//!
//! ```
//! use lockerbank_core::constants::*;
//!
//! assert_eq!(FRAME_LENGTH, 10);
//! assert_eq!(ADDRESS_SPACE, u32::from(MAX_ADDRESS) + 1);
//! assert_eq!(LOCKER_SPACE, u32::from(MAX_LOCKER_NUMBER) + 1);
//! ```
//!
//! # Hardware Compliance
//!
//! The reserved bytes are fixed by the locker controller boards. Modifying
//! these values will make every board on the bus ignore the frame.

// ============================================================================
// Frame Layout
// ============================================================================

/// Synchronisation byte. Frames start with two of them.
pub const SYNC_BYTE: u8 = 0x5A;

/// Total length of a command frame in bytes, checksum included.
pub const FRAME_LENGTH: usize = 10;

/// Number of bytes covered by the checksum (everything before it).
pub const FRAME_PAYLOAD_LENGTH: usize = FRAME_LENGTH - 1;

/// Length of the canonical hex rendering of a frame.
pub const FRAME_HEX_LENGTH: usize = FRAME_LENGTH * 2;

/// Byte offset of the board address.
pub const ADDRESS_OFFSET: usize = 3;

/// Byte offset of the locker number.
pub const LOCKER_OFFSET: usize = 8;

/// Byte offset of the checksum.
pub const CHECKSUM_OFFSET: usize = 9;

/// Fixed frame prefix up to (but excluding) the address byte.
pub const FRAME_HEADER: [u8; 3] = [SYNC_BYTE, SYNC_BYTE, 0x00];

/// Fixed bytes between the address and the locker number.
///
/// Byte 4 is reserved, byte 5 carries the constant `0x04`, bytes 6-7 the
/// constant `0x00 0x01` expected by the boards for a release pulse.
pub const FRAME_RESERVED: [u8; 4] = [0x00, 0x04, 0x00, 0x01];

// ============================================================================
// Address Space
// ============================================================================

/// Highest board address (5-bit dipswitch).
pub const MAX_ADDRESS: u8 = 31;

/// Highest locker number on a single board.
///
/// The canonical range is `0..=24` (25 slots). The fallback resolver uses
/// the same modulus so that every resolved pair is encodable.
pub const MAX_LOCKER_NUMBER: u8 = 24;

/// Number of distinct board addresses, used as the fallback modulus.
pub const ADDRESS_SPACE: u32 = MAX_ADDRESS as u32 + 1;

/// Number of distinct locker numbers, used as the fallback modulus.
pub const LOCKER_SPACE: u32 = MAX_LOCKER_NUMBER as u32 + 1;

// ============================================================================
// Access Codes
// ============================================================================

/// Exact number of ASCII digits in a reservation access code.
pub const ACCESS_CODE_LENGTH: usize = 8;

// ============================================================================
// Control Sub-protocol
// ============================================================================

/// Prefix of the ASCII status query line (`STATUS:007\n`).
pub const STATUS_COMMAND_PREFIX: &str = "STATUS:";

/// ASCII connectivity test line.
pub const TEST_COMMAND: &str = "TEST\n";

/// Line terminator of the control sub-protocol and of board responses.
pub const LINE_TERMINATOR: u8 = b'\n';

// ============================================================================
// Serial Link Defaults
// ============================================================================

/// Default serial device path.
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Default baud rate of the RS485 bus (8N1).
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default bound on the response line read, in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Delay applied by the simulated transport to every send, in milliseconds.
pub const DEFAULT_SIMULATED_DELAY_MS: u64 = 100;

/// Upper bound on a single response line, in bytes.
///
/// Boards answer with short ASCII lines; anything longer is noise on the bus.
pub const MAX_RESPONSE_LENGTH: usize = 256;
