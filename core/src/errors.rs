//! Error taxonomy for address arithmetic, value coercion/arithmetic, and the segmented memory
//! model (spec.md §7 "Address arithmetic", "Type coercion", "Value arithmetic", "Memory").

use crate::Address;

// ADDRESS ERROR
// ================================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address offset would become negative: {addr} - {subtrahend}")]
    NegativeOffset { addr: Address, subtrahend: u64 },
    #[error("addresses {lhs} and {rhs} belong to different segments")]
    SegmentMismatch { lhs: Address, rhs: Address },
    #[error("value does not fit into a u64 offset")]
    ValueTooLarge,
}

// VALUE ERROR
// ================================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("expected a field element, found an address")]
    TypeMismatchNotFelt,
    #[error("expected an address, found a field element")]
    TypeMismatchNotAddress,
    #[error("cannot add two addresses together")]
    RelocatableAdd,
    #[error("cannot subtract an address from a field element")]
    SubAddrFromFelt,
    #[error(transparent)]
    Address(#[from] AddressError),
}

// MEMORY ERROR
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "std", derive(miette::Diagnostic))]
pub enum MemoryError {
    #[error("inconsistent memory write at {addr}: already holds a different value")]
    InconsistentMemory { addr: Address },
    #[error("expected a cell holding a field element at {addr}")]
    ExpectedFelt { addr: Address },
    #[error("expected a cell holding an address at {addr}")]
    ExpectedAddress { addr: Address },
    #[error("relocation rule source {addr} is not in a temporary segment")]
    AddressNotInTemporarySegment { addr: Address },
    #[error("relocation rule source {addr} must have offset zero")]
    NonZeroOffset { addr: Address },
    #[error("temporary segment {segment_index} already has a relocation rule")]
    DuplicatedRelocation { segment_index: i64 },
    #[error("temporary segment {segment_index} is referenced but has no relocation rule")]
    MissingRelocationRule { segment_index: i64 },
    #[error("relocation rules form a cycle starting at temporary segment {segment_index}")]
    RelocationCycle { segment_index: i64 },
    #[error("segment index {segment_index} is out of range of the relocation table")]
    Relocation { segment_index: i64 },
    #[error("temporary segment {segment_index} was still present after relocation")]
    TemporarySegmentInRelocation { segment_index: i64 },
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Value(#[from] ValueError),
}

// SEGMENT MANAGER ERROR
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentError {
    #[error("segment index {segment_index} does not exist")]
    UnknownSegment { segment_index: i64 },
    #[error(
        "declared size {declared} for segment {segment_index} is smaller than its used size {used}"
    )]
    SegmentTooSmall { segment_index: i64, declared: usize, used: usize },
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error(transparent)]
    Address(#[from] AddressError),
}
