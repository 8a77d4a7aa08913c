//! Segmented addresses (spec.md §3.1, §4.A).

use core::cmp::Ordering;
use core::fmt;

use crate::errors::AddressError;
use crate::felt::CairoFelt;
use crate::Felt;

/// A pair `(segment_index, offset)` naming a memory cell before final relocation.
///
/// Segments with a negative index are *temporary*: they exist only until
/// [`crate::Memory::relocate`] rewrites every reference to them through a registered relocation
/// rule. Segments with a non-negative index are *real* and persist into the final relocated
/// image.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub segment_index: i64,
    pub offset: u64,
}

impl Address {
    pub const fn new(segment_index: i64, offset: u64) -> Self {
        Self { segment_index, offset }
    }

    /// `true` iff this address names a temporary segment (`segment_index < 0`).
    pub const fn is_temporary(self) -> bool {
        self.segment_index < 0
    }

    /// `true` iff this address names a real segment (`segment_index >= 0`).
    pub const fn is_real(self) -> bool {
        !self.is_temporary()
    }

    /// Adds an unsigned offset. Fails if the offset overflows `u64`.
    pub fn add_offset(self, rhs: u64) -> Result<Self, AddressError> {
        let offset = self.offset.checked_add(rhs).ok_or(AddressError::ValueTooLarge)?;
        Ok(Self { offset, ..self })
    }

    /// Subtracts an unsigned offset. Fails with [`AddressError::NegativeOffset`] if it would
    /// make the offset negative.
    pub fn sub_offset(self, rhs: u64) -> Result<Self, AddressError> {
        let offset = self
            .offset
            .checked_sub(rhs)
            .ok_or(AddressError::NegativeOffset { addr: self, subtrahend: rhs })?;
        Ok(Self { offset, ..self })
    }

    /// Adds a signed offset, routing to [`Self::add_offset`] or [`Self::sub_offset`].
    pub fn add_signed(self, rhs: i64) -> Result<Self, AddressError> {
        if rhs >= 0 {
            self.add_offset(rhs as u64)
        } else {
            self.sub_offset(rhs.unsigned_abs())
        }
    }

    /// Adds a field element to this address's offset. The field element must be small enough to
    /// be represented as a `u64` offset.
    pub fn add_felt(self, rhs: Felt) -> Result<Self, AddressError> {
        let rhs = rhs.try_into_u64().ok_or(AddressError::ValueTooLarge)?;
        self.add_offset(rhs)
    }

    /// Computes `self - other`, requiring both addresses to share a segment. Returns the
    /// (non-negative) offset difference.
    pub fn sub(self, other: Self) -> Result<u64, AddressError> {
        if self.segment_index != other.segment_index {
            return Err(AddressError::SegmentMismatch { lhs: self, rhs: other });
        }
        self.offset
            .checked_sub(other.offset)
            .ok_or(AddressError::NegativeOffset { addr: self, subtrahend: other.offset })
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.segment_index, self.offset)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.segment_index, self.offset).cmp(&(other.segment_index, other.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_round_trip() {
        let addr = Address::new(2, 4);
        let moved = addr.add_offset(10).unwrap();
        assert_eq!(moved.sub_offset(10).unwrap(), addr);
    }

    #[test]
    fn sub_uint_negative_offset_fails() {
        let addr = Address::new(2, 4);
        assert_eq!(
            addr.sub_offset(6),
            Err(AddressError::NegativeOffset { addr, subtrahend: 6 })
        );
    }

    #[test]
    fn sub_requires_same_segment() {
        let lhs = Address::new(2, 8);
        let rhs = Address::new(3, 5);
        assert_eq!(lhs.sub(rhs), Err(AddressError::SegmentMismatch { lhs, rhs }));
    }

    #[test]
    fn sub_same_segment_returns_offset_difference() {
        let lhs = Address::new(2, 8);
        let rhs = Address::new(2, 5);
        assert_eq!(lhs.sub(rhs).unwrap(), 3);
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Address::new(0, 100) < Address::new(1, 0));
        assert!(Address::new(1, 0) < Address::new(1, 1));
    }
}

#[cfg(test)]
mod proptests {
    use cairo_vm_test_utils::{small_address, small_offset};
    use proptest::prelude::*;

    use super::*;

    proptest! {
        /// spec.md §8 property 2: `(addr + u) - u == addr` for any `u` that does not overflow the
        /// offset.
        #[test]
        fn address_round_trip_holds_for_any_bounded_offset(
            addr in small_address(),
            u in small_offset(),
        ) {
            let moved = addr.add_offset(u).unwrap();
            prop_assert_eq!(moved.sub_offset(u).unwrap(), addr);
        }

        #[test]
        fn sub_of_add_offset_recovers_the_original_offset_difference(
            addr in small_address(),
            u in small_offset(),
        ) {
            let moved = addr.add_offset(u).unwrap();
            prop_assert_eq!(moved.sub(addr).unwrap(), u);
        }
    }
}
