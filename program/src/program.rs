//! The immutable, loaded representation of a compiled Cairo program (spec.md §3.8).

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use cairo_vm_core::{Felt, Value};
use cairo_vm_layout::BuiltinName;
use serde_json::Value as Json;

use crate::hint_collection::HintCollection;
use crate::hint_reference::HintReference;
use crate::identifier::Identifier;

/// A fully parsed and validated compiled Cairo program, ready to be loaded into a
/// [`cairo_vm_core::SegmentManager`] by the runner.
///
/// `Program` never changes after construction: every field is populated once by
/// [`crate::parse_program`] and the type has no mutating methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The program's instructions and embedded literals, one [`Value::Felt`] per word.
    pub data: Vec<Value>,
    /// The entrypoint's program counter, if an entrypoint name was requested.
    pub main: Option<usize>,
    /// `__main__.__start__`'s program counter, if present.
    pub start: Option<usize>,
    /// `__main__.__end__`'s program counter, if present.
    pub end: Option<usize>,
    /// Attributes named `error_message`, carried through for diagnostic formatting.
    pub error_attributes: Vec<Json>,
    /// Every identifier in the compiled artifact's `identifiers` map, keyed by its full dotted
    /// name (spec.md §3.8).
    pub identifiers: BTreeMap<String, Identifier>,
    /// Every `const`-typed identifier, reduced into the field.
    pub constants: BTreeMap<String, Felt>,
    /// The builtins this program declares, in declaration order.
    pub builtins: Vec<BuiltinName>,
    pub hints: HintCollection,
    /// Parsed `reference_manager.references`, in artifact order.
    pub references: Vec<HintReference>,
    /// Optional per-PC debug info, carried through opaquely.
    pub instruction_locations: Option<Json>,
    pub main_scope: String,
}

impl Program {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
