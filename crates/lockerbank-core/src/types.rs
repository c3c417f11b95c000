use crate::{
    constants::{ACCESS_CODE_LENGTH, ADDRESS_SPACE, LOCKER_SPACE, MAX_ADDRESS, MAX_LOCKER_NUMBER},
    error::ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board address set by the dipswitches of a locker controller (0-31).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Address(u8);

impl Address {
    /// Create a board address with validation.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidAddressRange` if the value is not in `0..=31`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u8::try_from(value) {
            Ok(v) if v <= MAX_ADDRESS => Ok(Address(v)),
            _ => Err(ValidationError::InvalidAddressRange {
                value,
                max: MAX_ADDRESS,
            }),
        }
    }

    /// Reduce any value into the address space (`value mod 32`).
    #[must_use]
    pub fn wrapping(value: u32) -> Self {
        Address((value % ADDRESS_SPACE) as u8)
    }

    /// Get the raw address byte.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Address {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Address::new(value)
    }
}

impl From<Address> for u8 {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slot position of a locker within its addressed board (0-24).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct LockerNumber(u8);

impl LockerNumber {
    /// Create a locker number with validation.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidLockerRange` if the value is not in `0..=24`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u8::try_from(value) {
            Ok(v) if v <= MAX_LOCKER_NUMBER => Ok(LockerNumber(v)),
            _ => Err(ValidationError::InvalidLockerRange {
                value,
                max: MAX_LOCKER_NUMBER,
            }),
        }
    }

    /// Reduce any value into the locker range (`value mod 25`).
    #[must_use]
    pub fn wrapping(value: u32) -> Self {
        LockerNumber((value % LOCKER_SPACE) as u8)
    }

    /// Get the raw locker number byte.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for LockerNumber {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        LockerNumber::new(value)
    }
}

impl From<LockerNumber> for u8 {
    fn from(number: LockerNumber) -> Self {
        number.0
    }
}

impl fmt::Display for LockerNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical location of a locker on the bus.
///
/// Both components are range-checked newtypes, so a `PhysicalAddress` is
/// always encodable into a command frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalAddress {
    pub address: Address,
    pub locker_number: LockerNumber,
}

impl PhysicalAddress {
    /// Create a physical address from raw integers.
    ///
    /// The address is validated first, so an input where both values are out
    /// of range reports the address error.
    ///
    /// # Errors
    /// Returns the `ValidationError` of the first component out of range.
    pub fn new(address: i64, locker_number: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            address: Address::new(address)?,
            locker_number: LockerNumber::new(locker_number)?,
        })
    }

    /// Build from already validated components.
    #[must_use]
    pub fn from_parts(address: Address, locker_number: LockerNumber) -> Self {
        Self {
            address,
            locker_number,
        }
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.locker_number)
    }
}

/// Identifier of a locker as known to the application (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct LogicalLockerId(u32);

impl LogicalLockerId {
    /// Create a logical locker id with validation.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidLockerId` if the value is zero, negative
    /// or does not fit in 32 bits.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u32::try_from(value) {
            Ok(v) if v >= 1 => Ok(LogicalLockerId(v)),
            _ => Err(ValidationError::InvalidLockerId { value }),
        }
    }

    #[must_use]
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for LogicalLockerId {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        LogicalLockerId::new(value)
    }
}

impl From<LogicalLockerId> for u32 {
    fn from(id: LogicalLockerId) -> Self {
        id.0
    }
}

impl fmt::Display for LogicalLockerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LogicalLockerId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::MalformedLockerId {
                input: s.to_string(),
            })?;
        LogicalLockerId::new(value)
    }
}

/// Reservation access code (exactly 8 ASCII digits).
///
/// Only the wire-level format is checked here. Whether the code belongs to
/// a live reservation is decided by the reservation service.
///
/// `Debug` never prints the digits.
#[derive(Clone)]
pub struct AccessCode(String);

impl AccessCode {
    /// Parse an access code.
    ///
    /// No trimming is applied: surrounding whitespace makes the code invalid.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidAccessCode` unless the input is exactly
    /// 8 ASCII digits.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        if code.len() != ACCESS_CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidAccessCode);
        }
        Ok(AccessCode(code.to_string()))
    }
}

impl fmt::Debug for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("AccessCode(********)")
    }
}

impl std::str::FromStr for AccessCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccessCode::parse(s)
    }
}
