//! Named layouts: pure functions from a layout name to a complete builtin/sizing record
//! (spec.md §4.J/§4.K).

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec;

use crate::builtin::BuiltinName;
use crate::config::{
    BitwiseConfig, BuiltinConfig, EcOpConfig, EcdsaConfig, KeccakConfig, OutputConfig,
    PedersenConfig, PoseidonConfig, RangeCheckConfig, SegmentArenaConfig,
};
use crate::errors::LayoutError;

/// Diluted-pool sizing, present only for layouts that enable a diluted-cell-consuming builtin
/// (`bitwise`, `keccak`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DilutedPoolConfig {
    pub units_per_step: u32,
    pub spacing: u32,
    pub n_bits: u32,
}

/// A complete layout: sizing parameters plus the set of builtins it enables.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub name: String,
    pub cpu_component_step: u32,
    pub rc_units: u32,
    pub public_memory_fraction: u32,
    pub memory_units_per_step: u32,
    pub n_trace_columns: u32,
    pub builtins: BTreeMap<BuiltinName, BuiltinConfig>,
    pub diluted_pool: Option<DilutedPoolConfig>,
}

impl Layout {
    /// Builds the named layout. Fails [`LayoutError::UnknownLayoutName`] for anything outside the
    /// fixed set enumerated in spec.md §4.J: `plain`, `small`, `dex`, `recursive`, `starknet`,
    /// `starknet_with_keccak`, `recursive_large_output`, `all_cairo`, `all_solidity`, `dynamic`.
    pub fn from_name(name: &str) -> Result<Layout, LayoutError> {
        let builtin_set: &[BuiltinName] = match name {
            "plain" => &[],
            "small" | "dex" => {
                &[BuiltinName::Output, BuiltinName::Pedersen, BuiltinName::RangeCheck, BuiltinName::Ecdsa]
            },
            "recursive" => {
                &[BuiltinName::Output, BuiltinName::Pedersen, BuiltinName::RangeCheck, BuiltinName::Bitwise]
            },
            "starknet" => &[
                BuiltinName::Output,
                BuiltinName::Pedersen,
                BuiltinName::RangeCheck,
                BuiltinName::Ecdsa,
                BuiltinName::Bitwise,
                BuiltinName::EcOp,
                BuiltinName::Poseidon,
                BuiltinName::SegmentArena,
            ],
            "starknet_with_keccak" => &[
                BuiltinName::Output,
                BuiltinName::Pedersen,
                BuiltinName::RangeCheck,
                BuiltinName::Ecdsa,
                BuiltinName::Bitwise,
                BuiltinName::EcOp,
                BuiltinName::Poseidon,
                BuiltinName::SegmentArena,
                BuiltinName::Keccak,
            ],
            "recursive_large_output" => &[
                BuiltinName::Output,
                BuiltinName::Pedersen,
                BuiltinName::RangeCheck,
                BuiltinName::Bitwise,
                BuiltinName::Poseidon,
            ],
            "all_cairo" => &BuiltinName::ALL,
            "all_solidity" => &[
                BuiltinName::Output,
                BuiltinName::Pedersen,
                BuiltinName::RangeCheck,
                BuiltinName::Ecdsa,
                BuiltinName::Bitwise,
                BuiltinName::EcOp,
            ],
            "dynamic" => &BuiltinName::ALL,
            _ => return Err(LayoutError::UnknownLayoutName { name: name.to_string() }),
        };

        let dynamic_ratios = name == "dynamic";
        let builtins = builtin_set
            .iter()
            .map(|b| (*b, default_config(*b, dynamic_ratios)))
            .collect::<BTreeMap<_, _>>();

        let diluted_pool = if builtin_set.contains(&BuiltinName::Bitwise)
            || builtin_set.contains(&BuiltinName::Keccak)
        {
            Some(DilutedPoolConfig { units_per_step: 16, spacing: 4, n_bits: 16 })
        } else {
            None
        };

        Ok(Layout {
            name: name.to_string(),
            cpu_component_step: 1,
            rc_units: 16,
            public_memory_fraction: 4,
            memory_units_per_step: 8,
            n_trace_columns: 8 + builtin_set.len() as u32,
            builtins,
            diluted_pool,
        })
    }
}

/// Default per-builtin configuration for a named layout. `dynamic_ratio` layouts leave `ratio` at
/// `None`, since the dynamic layout determines ratios from the compiled program rather than a
/// fixed table (spec.md §4.J "dynamic").
fn default_config(builtin: BuiltinName, dynamic_ratio: bool) -> BuiltinConfig {
    let ratio = |fixed: u32| if dynamic_ratio { None } else { Some(fixed) };
    match builtin {
        BuiltinName::Output => BuiltinConfig::Output(OutputConfig),
        BuiltinName::Pedersen => BuiltinConfig::Pedersen(PedersenConfig {
            ratio: ratio(32),
            repetitions: 4,
            element_height: 256,
            element_bits: 252,
            n_inputs: 2,
            hash_limit: 1u128 << 125,
        }),
        BuiltinName::RangeCheck => {
            BuiltinConfig::RangeCheck(RangeCheckConfig { ratio: ratio(16), n_parts: 8 })
        },
        BuiltinName::Ecdsa => BuiltinConfig::Ecdsa(EcdsaConfig {
            ratio: ratio(2048),
            repetitions: 1,
            height: 256,
            n_hash_bits: 251,
        }),
        BuiltinName::Keccak => BuiltinConfig::Keccak(KeccakConfig {
            ratio: ratio(2048),
            instance_per_component: 16,
            state_rep: vec![200; 8],
        }),
        BuiltinName::Bitwise => {
            BuiltinConfig::Bitwise(BitwiseConfig { ratio: ratio(16), total_n_bits: 251 })
        },
        BuiltinName::EcOp => BuiltinConfig::EcOp(EcOpConfig {
            ratio: ratio(1024),
            scalar_height: 256,
            scalar_bits: 252,
        }),
        BuiltinName::Poseidon => BuiltinConfig::Poseidon(PoseidonConfig { ratio: ratio(32) }),
        BuiltinName::SegmentArena => BuiltinConfig::SegmentArena(SegmentArenaConfig),
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    const NAMES: [&str; 10] = [
        "plain",
        "small",
        "dex",
        "recursive",
        "starknet",
        "starknet_with_keccak",
        "recursive_large_output",
        "all_cairo",
        "all_solidity",
        "dynamic",
    ];

    proptest! {
        /// Every named layout carries a diluted pool iff it enables `bitwise` or `keccak`, and a
        /// `dynamic`-ratio layout leaves every builtin's ratio unset, regardless of which of the
        /// ten fixed names is picked.
        #[test]
        fn diluted_pool_presence_matches_bitwise_or_keccak(name_index in 0usize..NAMES.len()) {
            let name = NAMES[name_index];
            let layout = Layout::from_name(name).unwrap();
            let expects_diluted = layout.builtins.contains_key(&BuiltinName::Bitwise)
                || layout.builtins.contains_key(&BuiltinName::Keccak);
            prop_assert_eq!(layout.diluted_pool.is_some(), expects_diluted);
        }
    }
}
