//! Shared property-test generators and fixtures for the Cairo VM core crates.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use cairo_vm_core::{Address, CairoFelt, Felt};
use proptest::prelude::*;

/// Convenience constructor mirroring the external `Felt::from_unsigned` binding, used throughout
/// the workspace's unit and property tests to avoid importing the `CairoFelt` trait everywhere.
pub fn felt(value: u64) -> Felt {
    Felt::from_unsigned(value)
}

/// A bounded `u64` offset, small enough that arithmetic on it never overflows a segment in a
/// single property-test case.
pub fn small_offset() -> impl Strategy<Value = u64> {
    0u64..1_000_000
}

/// A bounded segment index covering both real (non-negative) and temporary (negative) segments.
pub fn small_segment_index() -> impl Strategy<Value = i64> {
    -16i64..16
}

/// An [`Address`] with a small, property-test-friendly segment index and offset.
pub fn small_address() -> impl Strategy<Value = Address> {
    (small_segment_index(), small_offset()).prop_map(|(segment_index, offset)| Address::new(segment_index, offset))
}

/// A real (non-negative segment) [`Address`], for properties that require relocatable storage.
pub fn small_real_address() -> impl Strategy<Value = Address> {
    (0i64..16, small_offset()).prop_map(|(segment_index, offset)| Address::new(segment_index, offset))
}

/// A [`Felt`] drawn from a small range, wide enough to exercise arithmetic edge cases without the
/// astronomical full field range.
pub fn small_felt() -> impl Strategy<Value = Felt> {
    small_offset().prop_map(felt)
}

/// A minimal, syntactically valid compiled-program JSON fixture with no builtins, no hints, and a
/// single `main` entrypoint at program counter 0. Mirrors spec.md §8 scenario S4.
pub fn minimal_program_json() -> alloc::string::String {
    alloc::format!(
        r#"{{
            "prime": "{prime}",
            "data": [
                "0x480680017fff8000",
                "0x1",
                "0x480680017fff8000",
                "0x2",
                "0x208b7fff7fff7ffe",
                "0x208b7fff7fff7ffe"
            ],
            "hints": {{}},
            "identifiers": {{
                "__main__.main": {{ "pc": 0, "type": "function" }}
            }},
            "reference_manager": {{ "references": [] }},
            "attributes": [],
            "builtins": [],
            "main_scope": "__main__"
        }}"#,
        prime = cairo_vm_core::CAIRO_PRIME_HEX,
    )
}
