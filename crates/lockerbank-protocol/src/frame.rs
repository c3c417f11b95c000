use lockerbank_core::{
    Error, PhysicalAddress, Result,
    constants::{
        ADDRESS_OFFSET, CHECKSUM_OFFSET, FRAME_HEADER, FRAME_LENGTH, FRAME_PAYLOAD_LENGTH,
        FRAME_RESERVED, LOCKER_OFFSET, SYNC_BYTE,
    },
};
use std::fmt;

/// CommandFrame is the byte-level command that releases one locker.
///
/// A frame is always exactly 10 bytes and immutable once built. It can only
/// be constructed from a validated [`PhysicalAddress`] or by parsing bytes
/// whose sync header and checksum check out.
///
/// # Wire Format
/// ```text
/// Byte  0    1    2    3     4    5    6    7    8       9
///       5A   5A   00   addr  00   04   00   01   locker  xor(0..=8)
/// ```
///
/// # Open and Close
/// The boards drive a momentary-pulse solenoid, not a bistable latch. A
/// "close" command therefore emits exactly the same frame as "open"; there is
/// no distinct close opcode on this hardware.
///
/// # Basic Usage
/// ```
/// use lockerbank_core::PhysicalAddress;
/// use lockerbank_protocol::CommandFrame;
///
/// let location = PhysicalAddress::new(0, 1).unwrap();
/// let frame = CommandFrame::new(location);
///
/// assert_eq!(frame.to_hex(), "5A5A0000000400010104");
/// assert_eq!(frame.checksum(), 0x04);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandFrame {
    bytes: [u8; FRAME_LENGTH],
}

impl CommandFrame {
    /// Build the release frame for a physical locker location.
    pub fn new(location: PhysicalAddress) -> Self {
        let mut bytes = [0u8; FRAME_LENGTH];
        bytes[..ADDRESS_OFFSET].copy_from_slice(&FRAME_HEADER);
        bytes[ADDRESS_OFFSET] = location.address.as_u8();
        bytes[ADDRESS_OFFSET + 1..LOCKER_OFFSET].copy_from_slice(&FRAME_RESERVED);
        bytes[LOCKER_OFFSET] = location.locker_number.as_u8();
        bytes[CHECKSUM_OFFSET] = xor_checksum(&bytes[..FRAME_PAYLOAD_LENGTH]);

        CommandFrame { bytes }
    }

    /// Parse a frame from raw bytes.
    ///
    /// # Errors
    /// - `Error::InvalidFrame` if the length is not 10 or the sync bytes,
    ///   reserved bytes or ranges are wrong
    /// - `Error::ChecksumMismatch` if byte 9 does not match the XOR of 0-8
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; FRAME_LENGTH] = bytes.try_into().map_err(|_| {
            Error::invalid_frame(format!(
                "Expected {} bytes, got {}",
                FRAME_LENGTH,
                bytes.len()
            ))
        })?;

        if bytes[..ADDRESS_OFFSET] != FRAME_HEADER {
            return Err(Error::invalid_frame(format!(
                "Expected sync header {:02X}{:02X}00",
                SYNC_BYTE, SYNC_BYTE
            )));
        }
        if bytes[ADDRESS_OFFSET + 1..LOCKER_OFFSET] != FRAME_RESERVED {
            return Err(Error::invalid_frame("Reserved bytes do not match"));
        }

        verify_checksum(&bytes)?;

        // Re-validate ranges so a parsed frame upholds the same invariant
        // as one built from a PhysicalAddress.
        PhysicalAddress::new(
            i64::from(bytes[ADDRESS_OFFSET]),
            i64::from(bytes[LOCKER_OFFSET]),
        )?;

        Ok(CommandFrame { bytes })
    }

    /// Parse a frame from its hex rendering (case-insensitive).
    ///
    /// # Errors
    /// Same as [`CommandFrame::from_bytes`], plus `Error::InvalidFrame` for
    /// malformed hex.
    pub fn from_hex(text: &str) -> Result<Self> {
        let bytes = hex::decode(text.trim())
            .map_err(|e| Error::invalid_frame(format!("Malformed hex frame: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Get the raw frame bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Canonical 20-character uppercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.bytes)
    }

    /// Board address carried by the frame.
    pub fn address(&self) -> u8 {
        self.bytes[ADDRESS_OFFSET]
    }

    /// Locker number carried by the frame.
    pub fn locker_number(&self) -> u8 {
        self.bytes[LOCKER_OFFSET]
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[CHECKSUM_OFFSET]
    }
}

impl From<PhysicalAddress> for CommandFrame {
    fn from(location: PhysicalAddress) -> Self {
        CommandFrame::new(location)
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Build the hex command frame for raw `(address, locker_number)` inputs.
///
/// Validation happens before anything else; out-of-range input never
/// produces bytes.
///
/// # Errors
/// Returns `ValidationError::InvalidAddressRange` or
/// `ValidationError::InvalidLockerRange` (wrapped in [`Error::Validation`]).
///
/// # Examples
/// ```
/// use lockerbank_protocol::generate_frame;
///
/// assert_eq!(generate_frame(31, 24).unwrap(), "5A5A001F000400011802");
/// assert!(generate_frame(32, 0).is_err());
/// ```
pub fn generate_frame(address: i64, locker_number: i64) -> Result<String> {
    let location = PhysicalAddress::new(address, locker_number)?;
    Ok(CommandFrame::new(location).to_hex())
}

/// XOR-fold of the given bytes.
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Verify that the last byte of a full frame is the XOR of the preceding nine.
///
/// # Errors
/// Returns `Error::InvalidFrame` on wrong length and `Error::ChecksumMismatch`
/// when the checksum does not match.
pub fn verify_checksum(bytes: &[u8]) -> Result<()> {
    if bytes.len() != FRAME_LENGTH {
        return Err(Error::invalid_frame(format!(
            "Expected {} bytes, got {}",
            FRAME_LENGTH,
            bytes.len()
        )));
    }

    let expected = xor_checksum(&bytes[..FRAME_PAYLOAD_LENGTH]);
    let actual = bytes[CHECKSUM_OFFSET];
    if expected != actual {
        return Err(Error::ChecksumMismatch { expected, actual });
    }
    Ok(())
}
