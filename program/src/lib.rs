#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod errors;

mod hint;
mod hint_collection;
mod hint_reference;
mod identifier;
mod parser;
mod program;
mod reference_parser;

pub use hint::{ApTracking, FlowTrackingData, HintParams};
pub use hint_collection::{HintCollection, Range};
pub use hint_reference::{HintReference, OffsetValue, Register};
pub use identifier::{Identifier, ReferenceManagerEntry};
pub use parser::{parse_program, HintRepresentation};
pub use program::Program;
pub use reference_parser::parse_reference_expression;
