//! Per-builtin configuration records and the fixed cell-count constants every builtin publishes
//! (spec.md §4.J/§4.K).

use alloc::vec::Vec;

use crate::builtin::BuiltinName;

/// Common surface every builtin configuration exposes, regardless of its own extra fields.
pub trait BuiltinInterface {
    fn name(&self) -> BuiltinName;
    /// CPU steps between consecutive invocations of this builtin in the execution trace, or
    /// `None` for builtins without a fixed ratio (`output`, `segment_arena`, and any builtin in
    /// the `dynamic` layout).
    fn ratio(&self) -> Option<u32>;
    /// Fixed number of memory cells a single invocation occupies in the builtin's segment.
    fn cells_per_invocation(&self) -> u32;
    /// Of those cells, how many are inputs supplied by the caller rather than computed outputs.
    fn input_cells_per_invocation(&self) -> u32;
    /// Range-check units a single invocation contributes to the range-check column. Zero for
    /// every builtin except `range_check` itself.
    fn range_check_units_per_invocation(&self) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentArenaConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PedersenConfig {
    pub ratio: Option<u32>,
    pub repetitions: u32,
    pub element_height: u32,
    pub element_bits: u32,
    pub n_inputs: u32,
    pub hash_limit: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeCheckConfig {
    pub ratio: Option<u32>,
    pub n_parts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcdsaConfig {
    pub ratio: Option<u32>,
    pub repetitions: u32,
    pub height: u32,
    pub n_hash_bits: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitwiseConfig {
    pub ratio: Option<u32>,
    pub total_n_bits: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcOpConfig {
    pub ratio: Option<u32>,
    pub scalar_height: u32,
    pub scalar_bits: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeccakConfig {
    pub ratio: Option<u32>,
    pub instance_per_component: u32,
    pub state_rep: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoseidonConfig {
    pub ratio: Option<u32>,
}

/// A builtin's configuration, closed over the fixed set of builtins the core recognizes. Absence
/// from a [`crate::Layout::builtins`] map is how a layout disables a builtin entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinConfig {
    Output(OutputConfig),
    Pedersen(PedersenConfig),
    RangeCheck(RangeCheckConfig),
    Ecdsa(EcdsaConfig),
    Keccak(KeccakConfig),
    Bitwise(BitwiseConfig),
    EcOp(EcOpConfig),
    Poseidon(PoseidonConfig),
    SegmentArena(SegmentArenaConfig),
}

impl BuiltinInterface for BuiltinConfig {
    fn name(&self) -> BuiltinName {
        match self {
            BuiltinConfig::Output(_) => BuiltinName::Output,
            BuiltinConfig::Pedersen(_) => BuiltinName::Pedersen,
            BuiltinConfig::RangeCheck(_) => BuiltinName::RangeCheck,
            BuiltinConfig::Ecdsa(_) => BuiltinName::Ecdsa,
            BuiltinConfig::Keccak(_) => BuiltinName::Keccak,
            BuiltinConfig::Bitwise(_) => BuiltinName::Bitwise,
            BuiltinConfig::EcOp(_) => BuiltinName::EcOp,
            BuiltinConfig::Poseidon(_) => BuiltinName::Poseidon,
            BuiltinConfig::SegmentArena(_) => BuiltinName::SegmentArena,
        }
    }

    fn ratio(&self) -> Option<u32> {
        match self {
            BuiltinConfig::Output(_) | BuiltinConfig::SegmentArena(_) => None,
            BuiltinConfig::Pedersen(c) => c.ratio,
            BuiltinConfig::RangeCheck(c) => c.ratio,
            BuiltinConfig::Ecdsa(c) => c.ratio,
            BuiltinConfig::Keccak(c) => c.ratio,
            BuiltinConfig::Bitwise(c) => c.ratio,
            BuiltinConfig::EcOp(c) => c.ratio,
            BuiltinConfig::Poseidon(c) => c.ratio,
        }
    }

    /// Fixed constants from spec.md §4.K: Bitwise 5, EC-op 7, Pedersen 3, Keccak `2·|state_rep|`,
    /// Poseidon 6, ECDSA 2, Range-check 1. Output and segment_arena are not named in the source
    /// table; they use the single-cell / three-cell conventions of their upstream runners.
    fn cells_per_invocation(&self) -> u32 {
        match self {
            BuiltinConfig::Output(_) => 1,
            BuiltinConfig::Pedersen(_) => 3,
            BuiltinConfig::RangeCheck(_) => 1,
            BuiltinConfig::Ecdsa(_) => 2,
            BuiltinConfig::Bitwise(_) => 5,
            BuiltinConfig::EcOp(_) => 7,
            BuiltinConfig::Poseidon(_) => 6,
            BuiltinConfig::SegmentArena(_) => 3,
            BuiltinConfig::Keccak(c) => 2 * c.state_rep.len() as u32,
        }
    }

    fn input_cells_per_invocation(&self) -> u32 {
        match self {
            BuiltinConfig::Output(_) => 1,
            BuiltinConfig::Pedersen(_) => 2,
            BuiltinConfig::RangeCheck(_) => 1,
            BuiltinConfig::Ecdsa(_) => 2,
            BuiltinConfig::Bitwise(_) => 2,
            BuiltinConfig::EcOp(_) => 5,
            BuiltinConfig::Poseidon(_) => 3,
            BuiltinConfig::SegmentArena(_) => 3,
            BuiltinConfig::Keccak(c) => c.state_rep.len() as u32,
        }
    }

    fn range_check_units_per_invocation(&self) -> u32 {
        match self {
            BuiltinConfig::RangeCheck(c) => c.n_parts,
            _ => 0,
        }
    }
}
