//! Mapping of application locker ids onto board addresses.
//!
//! Lockers are normally wired so that consecutive ids walk through the
//! address and slot ranges together. When the caller knows the exact
//! wiring it passes an explicit pair, which wins over the arithmetic.

use lockerbank_core::{Address, LockerNumber, LogicalLockerId, PhysicalAddress, ValidationError};
use tracing::debug;

/// Resolves a [`LogicalLockerId`] into a [`PhysicalAddress`].
///
/// The resolver is stateless and purely arithmetic; it never consults
/// persisted configuration.
///
/// # Fallback
///
/// ```text
/// address       = (id - 1) mod 32
/// locker_number = (id - 1) mod 25
/// ```
///
/// Both moduli equal the size of the ranges accepted by the frame encoder,
/// so the fallback can never produce an unencodable pair.
///
/// # Examples
///
/// ```
/// use lockerbank_core::LogicalLockerId;
/// use lockerbank_protocol::AddressResolver;
///
/// let id = LogicalLockerId::new(1).unwrap();
/// let location = AddressResolver::resolve(id, None, None).unwrap();
/// assert_eq!(location.address.as_u8(), 0);
/// assert_eq!(location.locker_number.as_u8(), 0);
///
/// // An explicit pair is returned as given
/// let location = AddressResolver::resolve(id, Some(4), Some(9)).unwrap();
/// assert_eq!(location.address.as_u8(), 4);
/// assert_eq!(location.locker_number.as_u8(), 9);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressResolver;

impl AddressResolver {
    /// Resolve a locker location.
    ///
    /// An explicit pair is only honoured when both halves are supplied; a
    /// single override is ignored and the fallback is used for both.
    ///
    /// # Errors
    /// Returns a `ValidationError` if an explicit pair is out of range. The
    /// fallback path never fails.
    pub fn resolve(
        id: LogicalLockerId,
        address: Option<i64>,
        locker_number: Option<i64>,
    ) -> Result<PhysicalAddress, ValidationError> {
        match (address, locker_number) {
            (Some(address), Some(locker_number)) => {
                PhysicalAddress::new(address, locker_number)
            }
            (None, None) => Ok(Self::fallback(id)),
            _ => {
                debug!(
                    logical_locker_id = %id,
                    ?address,
                    ?locker_number,
                    "Partial explicit address ignored, using fallback"
                );
                Ok(Self::fallback(id))
            }
        }
    }

    /// Arithmetic location of a locker id.
    pub fn fallback(id: LogicalLockerId) -> PhysicalAddress {
        let index = id.get() - 1;
        PhysicalAddress::from_parts(Address::wrapping(index), LockerNumber::wrapping(index))
    }
}
