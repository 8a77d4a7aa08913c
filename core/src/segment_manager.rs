//! Builtin-facing wrapper around [`Memory`] handling segment lifecycle (spec.md §4.D).

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::errors::SegmentError;
use crate::memory::RelocationTable;
use crate::{Address, Memory, Value};

/// Owns the [`Memory`] cell store and tracks segment allocation, explicit size declarations, and
/// public-memory bookkeeping on top of it.
///
/// Builtins and the runtime never touch a bare [`Memory`] directly for anything beyond single-cell
/// reads and writes; everything involving segment boundaries (growing the layout, loading the
/// program, finalizing a builtin's page) goes through here.
#[derive(Default)]
pub struct SegmentManager {
    memory: Memory,
    segment_sizes: BTreeMap<i64, usize>,
    public_memory_offsets: BTreeMap<i64, Vec<usize>>,
}

impl SegmentManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Allocates the next real segment and returns its base address.
    pub fn add_segment(&mut self) -> Address {
        self.memory.allocate_segment()
    }

    /// Allocates the next temporary segment and returns its base address.
    pub fn add_temp_segment(&mut self) -> Address {
        self.memory.allocate_temp_segment()
    }

    /// Writes `data` into consecutive cells starting at `start`, returning the address
    /// immediately past the last cell written. Writes last-to-first so that a repeated load of
    /// the same data that fails partway leaves the lowest offsets (inspected first by most
    /// callers) in a state consistent with a completed load (spec.md §4.D).
    pub fn load_data(&mut self, start: Address, data: &[Value]) -> Result<Address, SegmentError> {
        for (i, value) in data.iter().enumerate().rev() {
            let addr = start.add_offset(i as u64)?;
            self.memory.set(addr, *value)?;
        }
        Ok(start.add_offset(data.len() as u64)?)
    }

    /// Declares an explicit size for `segment_index`, for builtins whose page stride is fixed
    /// ahead of the cells actually written (spec.md §4.D). Rejects a declaration smaller than the
    /// segment's used size.
    pub fn finalize_segment(
        &mut self,
        segment_index: i64,
        size: usize,
    ) -> Result<(), SegmentError> {
        self.require_real_segment(segment_index)?;
        let used = self.memory.effective_size(segment_index);
        if size < used {
            return Err(SegmentError::SegmentTooSmall { segment_index, declared: size, used });
        }
        self.segment_sizes.insert(segment_index, size);
        Ok(())
    }

    /// The size of `segment_index`: its declared size if [`Self::finalize_segment`] was called,
    /// otherwise its used size.
    pub fn get_segment_size(&self, segment_index: i64) -> Result<usize, SegmentError> {
        self.require_real_segment(segment_index)?;
        Ok(self
            .segment_sizes
            .get(&segment_index)
            .copied()
            .unwrap_or_else(|| self.memory.effective_size(segment_index)))
    }

    /// The number of cells actually written in `segment_index`, ignoring any declared size.
    pub fn get_segment_used_size(&self, segment_index: i64) -> Result<usize, SegmentError> {
        self.require_real_segment(segment_index)?;
        Ok(self.memory.effective_size(segment_index))
    }

    /// Effective (used) size of every allocated real segment, keyed by segment index. When
    /// `include_temp` is set, still-unrelocated temporary segments are included too, keyed by
    /// their negative segment index (spec.md §4.D, §8 property 4).
    pub fn compute_effective_sizes(&self, include_temp: bool) -> BTreeMap<i64, usize> {
        let mut sizes: BTreeMap<i64, usize> = (0..self.memory.num_segments() as i64)
            .map(|seg| (seg, self.memory.effective_size(seg)))
            .collect();
        if include_temp {
            for ti in 0..self.memory.num_temp_segments() as i64 {
                let seg = -ti - 1;
                sizes.insert(seg, self.memory.effective_size(seg));
            }
        }
        sizes
    }

    /// `true` iff `value` names only segments that have actually been allocated. Builtins use this
    /// to validate an operand address before dereferencing it.
    pub fn is_valid_memory_value(&self, value: Value) -> bool {
        match value {
            Value::Felt(_) => true,
            Value::Addr(addr) if addr.is_real() => {
                (addr.segment_index as usize) < self.memory.num_segments()
            },
            Value::Addr(addr) => {
                ((-addr.segment_index - 1) as usize) < self.memory.num_temp_segments()
            },
        }
    }

    /// Records that the cells at `offsets` within `segment_index` belong to the public memory
    /// (Glossary "Public memory").
    pub fn add_public_memory_offsets(&mut self, segment_index: i64, offsets: Vec<usize>) {
        self.public_memory_offsets.entry(segment_index).or_default().extend(offsets);
    }

    pub fn public_memory_offsets(&self) -> &BTreeMap<i64, Vec<usize>> {
        &self.public_memory_offsets
    }

    /// Relocates the underlying memory, see [`Memory::relocate`].
    pub fn relocate(&mut self) -> Result<RelocationTable, SegmentError> {
        Ok(self.memory.relocate()?)
    }

    fn require_real_segment(&self, segment_index: i64) -> Result<(), SegmentError> {
        if segment_index < 0 || segment_index as usize >= self.memory.num_segments() {
            return Err(SegmentError::UnknownSegment { segment_index });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::felt::CairoFelt;
    use crate::Felt;

    #[test]
    fn load_data_advances_cursor() {
        let mut mgr = SegmentManager::new();
        let base = mgr.add_segment();
        let data = [Value::Felt(Felt::from_unsigned(1)), Value::Felt(Felt::from_unsigned(2))];
        let end = mgr.load_data(base, &data).unwrap();
        assert_eq!(end, Address::new(0, 2));
        assert_eq!(mgr.get_segment_used_size(0).unwrap(), 2);
    }

    #[test]
    fn finalize_segment_rejects_undersized_declaration() {
        let mut mgr = SegmentManager::new();
        let base = mgr.add_segment();
        let data = [Value::Felt(Felt::zero()); 3];
        mgr.load_data(base, &data).unwrap();
        assert_eq!(
            mgr.finalize_segment(0, 2),
            Err(SegmentError::SegmentTooSmall { segment_index: 0, declared: 2, used: 3 })
        );
        assert!(mgr.finalize_segment(0, 5).is_ok());
        assert_eq!(mgr.get_segment_size(0).unwrap(), 5);
    }

    #[test]
    fn unknown_segment_is_reported() {
        let mgr = SegmentManager::new();
        assert!(matches!(mgr.get_segment_size(0), Err(SegmentError::UnknownSegment { .. })));
    }

    #[test]
    fn is_valid_memory_value_checks_allocation() {
        let mut mgr = SegmentManager::new();
        mgr.add_segment();
        assert!(mgr.is_valid_memory_value(Value::Addr(Address::new(0, 0))));
        assert!(!mgr.is_valid_memory_value(Value::Addr(Address::new(1, 0))));
        assert!(!mgr.is_valid_memory_value(Value::Addr(Address::new(-1, 0))));
        mgr.add_temp_segment();
        assert!(mgr.is_valid_memory_value(Value::Addr(Address::new(-1, 0))));
    }
}
