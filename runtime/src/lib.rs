#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod errors;

mod reference;
mod scopes;

pub use reference::{resolve_hint_reference, VmRegisters};
pub use scopes::{
    DictManagerHandle, DictManagerState, DictManagerWeak, DictTracker, ExecutionScopes, HintType,
};
