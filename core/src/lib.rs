#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod errors;
pub mod utils;

mod address;
mod felt;
mod memory;
mod segment_manager;
mod value;

pub use address::Address;
pub use felt::{
    felt_from_hex, felt_from_signed, felt_from_unsigned, CairoFelt, Felt, ParseFeltError,
    CAIRO_PRIME_HEX,
};
pub use memory::{Cell, Memory, RelocationTable, ValidationRule};
pub use segment_manager::SegmentManager;
pub use value::Value;
