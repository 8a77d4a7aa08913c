//! The symbolic, AP-tracking-aware address description attached to a hint's variables
//! (spec.md §3.5).

use alloc::string::String;

use cairo_vm_core::Felt;

use crate::hint::ApTracking;

/// The VM register a reference is expressed relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    Ap,
    Fp,
}

/// One operand of a [`HintReference`]'s address expression (spec.md §4.E).
#[derive(Debug, Clone, PartialEq)]
pub enum OffsetValue {
    /// A field-element literal substituted verbatim.
    Immediate(Felt),
    /// A small constant integer, used as an additive offset.
    Value(i64),
    /// `register + offset`, optionally dereferenced before use.
    Reference { register: Register, offset: i64, dereference: bool },
}

/// A symbolic description of where a hint variable lives, resolved against the live VM registers
/// at hint-execution time rather than a fixed address (spec.md §3.5, Glossary "Hint").
#[derive(Debug, Clone, PartialEq)]
pub struct HintReference {
    pub offset1: OffsetValue,
    pub offset2: Option<OffsetValue>,
    /// Whether the composed address (`offset1 [+ offset2]`) is itself dereferenced once more.
    pub dereference: bool,
    pub ap_tracking: ApTracking,
    pub cairo_type: Option<String>,
}
