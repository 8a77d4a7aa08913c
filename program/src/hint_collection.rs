//! Indexes a program's hints by program counter, in either of two representations
//! (spec.md §3.7, §4.G).

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use crate::errors::ProgramParseError;
use crate::hint::HintParams;

/// A half-open window `[start, start + length)` into [`HintCollection::Extensive`]'s backing
/// vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub length: usize,
}

/// The hints attached to every program counter that has at least one.
///
/// Two physical representations are supported side by side (spec.md §9 "Extensive vs.
/// non-extensive hint storage" and the matching Open Question): a dense backing vector addressed
/// through per-PC ranges, and a PC-indexed vector of optional hint lists. Both expose the same
/// read API through [`Self::into_map`].
#[derive(Debug, Clone, PartialEq)]
pub enum HintCollection {
    Extensive { hints: Vec<HintParams>, ranges: BTreeMap<usize, Range> },
    NonExtensive { hints: Vec<Option<Vec<HintParams>>> },
}

impl HintCollection {
    /// Builds a collection from a map of program counter to its hints. `program_length` bounds
    /// the valid PC range; `extensive` selects which physical representation to build.
    pub fn new(
        hints: &BTreeMap<usize, Vec<HintParams>>,
        program_length: usize,
        extensive: bool,
    ) -> Result<Self, ProgramParseError> {
        let max_pc = hints.keys().copied().max();
        let total_hints: usize = hints.values().map(Vec::len).sum();

        if let Some(max_pc) = max_pc {
            if max_pc >= program_length {
                return Err(ProgramParseError::InvalidHintPc { pc: max_pc, program_length });
            }
        }

        if extensive {
            let mut backing = Vec::with_capacity(total_hints);
            let mut ranges = BTreeMap::new();
            for (&pc, params) in hints {
                if params.is_empty() {
                    continue;
                }
                let start = backing.len();
                backing.extend_from_slice(params);
                ranges.insert(pc, Range { start, length: params.len() });
            }
            Ok(HintCollection::Extensive { hints: backing, ranges })
        } else {
            let mut dense = vec![None; program_length.max(max_pc.map(|pc| pc + 1).unwrap_or(0))];
            for (&pc, params) in hints {
                if !params.is_empty() {
                    dense[pc] = Some(params.clone());
                }
            }
            Ok(HintCollection::NonExtensive { hints: dense })
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            HintCollection::Extensive { hints, .. } => hints.is_empty(),
            HintCollection::NonExtensive { hints } => hints.iter().all(Option::is_none),
        }
    }

    /// Flattens the collection back into a PC-to-hints map (spec.md §8 property 6).
    pub fn into_map(&self) -> BTreeMap<usize, &[HintParams]> {
        match self {
            HintCollection::Extensive { hints, ranges } => ranges
                .iter()
                .map(|(&pc, range)| (pc, &hints[range.start..range.start + range.length]))
                .collect(),
            HintCollection::NonExtensive { hints } => hints
                .iter()
                .enumerate()
                .filter_map(|(pc, params)| params.as_deref().map(|slice| (pc, slice)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hint(code: &str) -> HintParams {
        HintParams {
            code: code.into(),
            accessible_scopes: alloc::vec::Vec::new(),
            flow_tracking_data: crate::hint::FlowTrackingData {
                ap_tracking: crate::hint::ApTracking { group: 0, offset: 0 },
                reference_ids: BTreeMap::new(),
            },
        }
    }

    #[test]
    fn extensive_and_non_extensive_agree_on_into_map() {
        let mut input = BTreeMap::new();
        input.insert(0, vec![sample_hint("a"), sample_hint("b")]);
        input.insert(2, vec![sample_hint("c")]);

        let extensive = HintCollection::new(&input, 3, true).unwrap();
        let sparse = HintCollection::new(&input, 3, false).unwrap();

        assert_eq!(extensive.into_map(), sparse.into_map());
        let map = extensive.into_map();
        assert_eq!(map[&0].len(), 2);
        assert_eq!(map[&2].len(), 1);
        assert!(!map.contains_key(&1));
    }

    #[test]
    fn empty_input_produces_an_empty_collection() {
        let input = BTreeMap::new();
        let collection = HintCollection::new(&input, 0, true).unwrap();
        assert!(collection.is_empty());
        assert!(collection.into_map().is_empty());
    }

    #[test]
    fn out_of_range_pc_is_rejected() {
        let mut input = BTreeMap::new();
        input.insert(5, vec![sample_hint("a")]);
        assert_eq!(
            HintCollection::new(&input, 3, true),
            Err(ProgramParseError::InvalidHintPc { pc: 5, program_length: 3 })
        );
    }

    /// spec.md §4.G's out-of-range rule ("If max PC >= program_length, fail InvalidHintPc") has
    /// no carve-out for a PC whose hint list happens to be empty.
    #[test]
    fn out_of_range_pc_is_rejected_even_with_no_hints_at_that_pc() {
        let mut input = BTreeMap::new();
        input.insert(5, Vec::new());
        assert_eq!(
            HintCollection::new(&input, 3, true),
            Err(ProgramParseError::InvalidHintPc { pc: 5, program_length: 3 })
        );
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    /// Up to 8 program counters, each carrying 1-3 hints, all within a 16-word program.
    fn hints_by_pc() -> impl Strategy<Value = BTreeMap<usize, Vec<HintParams>>> {
        prop::collection::btree_map(
            0usize..16,
            prop::collection::vec(0u32..1000, 1..4).prop_map(|codes| {
                codes
                    .into_iter()
                    .map(|code| HintParams {
                        code: alloc::format!("hint_{code}"),
                        accessible_scopes: Vec::new(),
                        flow_tracking_data: crate::hint::FlowTrackingData {
                            ap_tracking: crate::hint::ApTracking { group: 0, offset: 0 },
                            reference_ids: BTreeMap::new(),
                        },
                    })
                    .collect(),
            }),
            0..8,
        )
    }

    proptest! {
        /// spec.md §8 property 6: the extensive and non-extensive representations agree on the
        /// set of PCs and on each slice's contents, preserving per-PC order.
        #[test]
        fn extensive_and_non_extensive_always_agree(input in hints_by_pc()) {
            let extensive = HintCollection::new(&input, 16, true).unwrap();
            let non_extensive = HintCollection::new(&input, 16, false).unwrap();
            prop_assert_eq!(extensive.into_map(), non_extensive.into_map());

            let map = extensive.into_map();
            for (pc, params) in &input {
                prop_assert_eq!(map.get(pc).copied(), Some(params.as_slice()));
            }
        }
    }
}
