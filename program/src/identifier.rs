//! Typed views over the compiled artifact's `identifiers` and `reference_manager` JSON objects
//! (spec.md §6).

use alloc::string::String;
use alloc::vec::Vec;

use serde::Deserialize;
use serde_json::Value as Json;

use crate::hint::ApTracking;

/// An entry in the compiled artifact's `identifiers` map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Identifier {
    pub pc: Option<usize>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub destination: Option<String>,
    pub decorators: Option<Vec<String>>,
    pub value: Option<Json>,
    pub size: Option<usize>,
    pub full_name: Option<String>,
    pub references: Option<Vec<Json>>,
    pub members: Option<Json>,
    pub cairo_type: Option<String>,
}

/// An entry in the compiled artifact's `reference_manager.references` array.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceManagerEntry {
    pub ap_tracking_data: ApTracking,
    pub pc: usize,
    pub value: String,
}
