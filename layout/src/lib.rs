#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod errors;

mod builtin;
mod config;
mod layout;

pub use builtin::BuiltinName;
pub use config::{
    BitwiseConfig, BuiltinConfig, BuiltinInterface, EcOpConfig, EcdsaConfig, KeccakConfig,
    OutputConfig, PedersenConfig, PoseidonConfig, RangeCheckConfig, SegmentArenaConfig,
};
pub use layout::{DilutedPoolConfig, Layout};
