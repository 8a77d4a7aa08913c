//! Hint metadata attached to a program counter (spec.md §3.7, §6 `HintParams`).

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// AP-tracking metadata: the state of the AP register, relative to function entry, at the point a
/// reference or hint was captured (Glossary "AP-tracking").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApTracking {
    pub group: u32,
    pub offset: u32,
}

/// Identifies which AP-tracking group a hint or reference belongs to, and the live reference IDs
/// visible to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTrackingData {
    pub ap_tracking: ApTracking,
    pub reference_ids: BTreeMap<String, i64>,
}

/// A single hint as it appears in the compiled artifact's `hints` map (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintParams {
    pub code: String,
    pub accessible_scopes: Vec<String>,
    pub flow_tracking_data: FlowTrackingData,
}
