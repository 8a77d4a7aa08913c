//! Error taxonomy for execution scopes and hint-reference resolution (spec.md §7 "Scopes").

use alloc::string::String;

use cairo_vm_core::errors::{AddressError, ValueError};
use cairo_vm_core::Address;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "std", derive(miette::Diagnostic))]
pub enum ScopeError {
    #[error("variable '{name}' is not present in the current scope")]
    VariableNotInScope { name: String },
    #[error("cannot exit the root execution scope")]
    ExitMainScope,
    #[error("variable '{name}' does not hold the expected hint-type variant")]
    TypeMismatch { name: String },
}

/// Failure modes of [`crate::resolve_hint_reference`] (spec.md §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "std", derive(miette::Diagnostic))]
pub enum ReferenceResolutionError {
    /// The reference's capture-time AP-tracking group does not match the live group; per
    /// spec.md §4.E step 1 the reference is non-resolvable and the caller (a hint processor)
    /// must fail gracefully rather than guess.
    #[error(
        "reference captured under ap-tracking group {captured_group} cannot be resolved \
         against the live group {live_group}"
    )]
    ApTrackingGroupMismatch { captured_group: u32, live_group: u32 },
    #[error("read of an uninitialized memory cell at {addr} while resolving a hint reference")]
    UninitializedMemoryCell { addr: Address },
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Value(#[from] ValueError),
}
