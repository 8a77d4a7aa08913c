//! The fixed set of builtin names a Cairo v0 program may declare (spec.md §6 "Program artifact",
//! §4.J/§4.K).

use strum::{Display, EnumString};

/// One of the builtins a compiled program may list in its `builtins` array.
///
/// The string form (used by the program parser and by [`crate::Layout::from_name`]'s builtin
/// tables) is the `snake_case` rendering of each variant, matching the fixed enum named in
/// spec.md §4.H/§4.I: `output`, `pedersen`, `range_check`, `ecdsa`, `keccak`, `bitwise`, `ec_op`,
/// `poseidon`, `segment_arena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum BuiltinName {
    Output,
    Pedersen,
    RangeCheck,
    Ecdsa,
    Keccak,
    Bitwise,
    EcOp,
    Poseidon,
    SegmentArena,
}

impl BuiltinName {
    pub const ALL: [BuiltinName; 9] = [
        BuiltinName::Output,
        BuiltinName::Pedersen,
        BuiltinName::RangeCheck,
        BuiltinName::Ecdsa,
        BuiltinName::Keccak,
        BuiltinName::Bitwise,
        BuiltinName::EcOp,
        BuiltinName::Poseidon,
        BuiltinName::SegmentArena,
    ];
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::*;

    #[test]
    fn round_trips_every_fixed_name() {
        for name in BuiltinName::ALL {
            let rendered = name.to_string();
            assert_eq!(BuiltinName::from_str(&rendered), Ok(name));
        }
    }

    #[test]
    fn ec_op_uses_the_documented_spelling() {
        assert_eq!(BuiltinName::EcOp.to_string(), "ec_op");
        assert_eq!(BuiltinName::from_str("ec_op"), Ok(BuiltinName::EcOp));
    }
}
