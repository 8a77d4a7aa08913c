//! The segmented, write-once memory model (spec.md §3.3, §4.C).

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::errors::MemoryError;
use crate::felt::CairoFelt;
use crate::{Address, Felt, Value};

/// A single memory cell: the stored value plus whether it has ever been read or written through
/// [`Memory::mark_accessed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub value: Value,
    pub accessed: bool,
}

/// A callback associated with a segment that inspects an address at write time and, on
/// acceptance, returns the set of addresses it considers validated (spec.md §4.C, Glossary
/// "Validation rule").
pub type ValidationRule = Rc<dyn Fn(&Memory, Address) -> Result<Vec<Address>, MemoryError>>;

/// Maps each real segment index to the flat offset its first cell occupies in the final
/// relocated image (spec.md §4.A).
#[derive(Debug, Clone, Default)]
pub struct RelocationTable {
    prefix_sums: Vec<usize>,
}

impl RelocationTable {
    /// Flattens `addr` into the linear address space built by [`Memory::relocate`].
    pub fn relocate(&self, addr: Address) -> Result<usize, MemoryError> {
        if addr.segment_index < 0 {
            return Err(MemoryError::TemporarySegmentInRelocation {
                segment_index: addr.segment_index,
            });
        }
        let seg = addr.segment_index as usize;
        let base = *self
            .prefix_sums
            .get(seg)
            .ok_or(MemoryError::Relocation { segment_index: addr.segment_index })?;
        Ok(base + addr.offset as usize)
    }

    pub fn segment_base(&self, segment_index: usize) -> Option<usize> {
        self.prefix_sums.get(segment_index).copied()
    }
}

/// The segmented, write-once cell store.
///
/// Real segments (`segment_index >= 0`) and temporary segments (`segment_index < 0`) are kept in
/// separate dense, offset-indexed storage, each permitting holes (spec.md §9 "Dense segments with
/// indexed holes").
#[derive(Default)]
pub struct Memory {
    real: Vec<Vec<Option<Cell>>>,
    temporary: Vec<Vec<Option<Cell>>>,
    validation_rules: BTreeMap<i64, ValidationRule>,
    validated_addresses: BTreeSet<Address>,
    relocation_rules: BTreeMap<i64, Address>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_segments(&self) -> usize {
        self.real.len()
    }

    pub fn num_temp_segments(&self) -> usize {
        self.temporary.len()
    }

    /// Allocates the next real segment, used by [`crate::SegmentManager::add_segment`].
    pub(crate) fn allocate_segment(&mut self) -> Address {
        let index = self.real.len();
        self.real.push(Vec::new());
        tracing::debug!(segment_index = index, "allocated real segment");
        Address::new(index as i64, 0)
    }

    /// Allocates the next temporary segment, used by
    /// [`crate::SegmentManager::add_temp_segment`].
    pub(crate) fn allocate_temp_segment(&mut self) -> Address {
        let index = self.temporary.len();
        self.temporary.push(Vec::new());
        let segment_index = -(index as i64) - 1;
        tracing::debug!(segment_index, "allocated temporary segment");
        Address::new(segment_index, 0)
    }

    fn cell_slot_mut(&mut self, addr: Address) -> &mut Option<Cell> {
        let (segment, offset) = self.segment_storage_mut(addr);
        if offset >= segment.len() {
            segment.resize_with(offset + 1, || None);
        }
        &mut segment[offset]
    }

    fn segment_storage_mut(&mut self, addr: Address) -> (&mut Vec<Option<Cell>>, usize) {
        let offset = addr.offset as usize;
        if addr.segment_index >= 0 {
            let seg = addr.segment_index as usize;
            if seg >= self.real.len() {
                self.real.resize_with(seg + 1, Vec::new);
            }
            (&mut self.real[seg], offset)
        } else {
            let seg = (-addr.segment_index - 1) as usize;
            if seg >= self.temporary.len() {
                self.temporary.resize_with(seg + 1, Vec::new);
            }
            (&mut self.temporary[seg], offset)
        }
    }

    fn segment_storage(&self, addr: Address) -> Option<&Vec<Option<Cell>>> {
        if addr.segment_index >= 0 {
            self.real.get(addr.segment_index as usize)
        } else {
            self.temporary.get((-addr.segment_index - 1) as usize)
        }
    }

    /// Writes `value` to `addr`. Writing the same value to an already-occupied cell is a no-op;
    /// writing a different value is [`MemoryError::InconsistentMemory`] (spec.md §8 property 1).
    pub fn set(&mut self, addr: Address, value: Value) -> Result<(), MemoryError> {
        let slot = self.cell_slot_mut(addr);
        match slot {
            Some(existing) => {
                if existing.value != value {
                    tracing::warn!(%addr, "inconsistent memory write");
                    return Err(MemoryError::InconsistentMemory { addr });
                }
            },
            None => *slot = Some(Cell { value, accessed: false }),
        }
        self.maybe_validate(addr)?;
        Ok(())
    }

    fn maybe_validate(&mut self, addr: Address) -> Result<(), MemoryError> {
        if self.validated_addresses.contains(&addr) {
            return Ok(());
        }
        let Some(rule) = self.validation_rules.get(&addr.segment_index).cloned() else {
            return Ok(());
        };
        let extra = rule(&*self, addr)?;
        self.validated_addresses.insert(addr);
        self.validated_addresses.extend(extra);
        Ok(())
    }

    pub fn get(&self, addr: Address) -> Option<Value> {
        self.segment_storage(addr)?.get(addr.offset as usize)?.as_ref().map(|c| c.value)
    }

    pub fn get_felt(&self, addr: Address) -> Result<Felt, MemoryError> {
        match self.get(addr) {
            Some(Value::Felt(f)) => Ok(f),
            _ => Err(MemoryError::ExpectedFelt { addr }),
        }
    }

    /// Alias for [`Self::get_felt`] matching the naming convention of cairo-vm-family runners.
    pub fn get_integer(&self, addr: Address) -> Result<Felt, MemoryError> {
        self.get_felt(addr)
    }

    pub fn get_address(&self, addr: Address) -> Result<Address, MemoryError> {
        match self.get(addr) {
            Some(Value::Addr(a)) => Ok(a),
            _ => Err(MemoryError::ExpectedAddress { addr }),
        }
    }

    /// Reads a felt and narrows it to a `usize`, for code paths that index with a memory value
    /// (e.g. a builtin computing how many cells to validate).
    pub fn get_usize(&self, addr: Address) -> Result<usize, MemoryError> {
        let felt = self.get_felt(addr)?;
        felt.try_into_u64()
            .map(|v| v as usize)
            .ok_or_else(|| MemoryError::ExpectedFelt { addr })
    }

    /// Reads `len` consecutive cells starting at `addr`. Holes are reported as `None` rather than
    /// failing the whole read, mirroring cairo-vm-family `get_range` helpers.
    pub fn get_range(&self, addr: Address, len: usize) -> Result<Vec<Option<Value>>, MemoryError> {
        let mut out = Vec::with_capacity(len);
        for i in crate::utils::range(0, len) {
            let cell_addr = addr.add_offset(i as u64)?;
            out.push(self.get(cell_addr));
        }
        Ok(out)
    }

    pub fn is_validated(&self, addr: Address) -> bool {
        self.validated_addresses.contains(&addr)
    }

    /// Marks a cell as accessed. A no-op if the cell has never been written.
    pub fn mark_accessed(&mut self, addr: Address) {
        let (segment, offset) = self.segment_storage_mut(addr);
        if let Some(Some(cell)) = segment.get_mut(offset) {
            cell.accessed = true;
        }
    }

    pub fn add_validation_rule(&mut self, segment_index: i64, rule: ValidationRule) {
        self.validation_rules.insert(segment_index, rule);
    }

    /// Registers a relocation rule mapping every address in the temporary segment named by `src`
    /// to the real address `dst` (spec.md §4.C).
    pub fn add_relocation_rule(&mut self, src: Address, dst: Address) -> Result<(), MemoryError> {
        if src.segment_index >= 0 {
            return Err(MemoryError::AddressNotInTemporarySegment { addr: src });
        }
        if src.offset != 0 {
            return Err(MemoryError::NonZeroOffset { addr: src });
        }
        if self.relocation_rules.contains_key(&src.segment_index) {
            return Err(MemoryError::DuplicatedRelocation { segment_index: src.segment_index });
        }
        tracing::debug!(segment_index = src.segment_index, target = %dst, "registered relocation rule");
        self.relocation_rules.insert(src.segment_index, dst);
        Ok(())
    }

    /// Resolves every temporary segment through its relocation rule, splices temporary cell
    /// contents into their real targets, rewrites every remaining reference to a temporary
    /// segment, and returns the table mapping each real segment to its flat base offset
    /// (spec.md §4.C, §8 property 5).
    pub fn relocate(&mut self) -> Result<RelocationTable, MemoryError> {
        let mut resolved = BTreeMap::new();
        let mut visiting = Vec::new();
        let mut bases = BTreeMap::new();
        for ti in 0..self.temporary.len() {
            let seg = -(ti as i64) - 1;
            let base = resolve_temp_base(seg, &self.relocation_rules, &mut resolved, &mut visiting)?;
            bases.insert(seg, base);
        }

        let temp_segments = core::mem::take(&mut self.temporary);
        for (ti, segment) in temp_segments.into_iter().enumerate() {
            let seg = -(ti as i64) - 1;
            let base = bases[&seg];
            for (offset, cell) in segment.into_iter().enumerate() {
                let Some(cell) = cell else { continue };
                let target = base.add_offset(offset as u64)?;
                let value = rewrite_value(cell.value, &bases)?;
                self.merge_cell(target, Cell { value, accessed: cell.accessed })?;
            }
        }

        for segment in self.real.iter_mut() {
            for cell in segment.iter_mut().flatten() {
                cell.value = rewrite_value(cell.value, &bases)?;
            }
        }

        self.relocation_rules.clear();
        self.validated_addresses.retain(|a| a.is_real());

        let mut prefix_sums = Vec::with_capacity(self.real.len());
        let mut running = 0usize;
        for segment in &self.real {
            prefix_sums.push(running);
            running += effective_size(segment);
        }
        tracing::info!(num_segments = self.real.len(), total_cells = running, "memory relocated");

        Ok(RelocationTable { prefix_sums })
    }

    fn merge_cell(&mut self, addr: Address, cell: Cell) -> Result<(), MemoryError> {
        let slot = self.cell_slot_mut(addr);
        match slot.as_mut() {
            Some(existing) => {
                if existing.value != cell.value {
                    return Err(MemoryError::InconsistentMemory { addr });
                }
                existing.accessed |= cell.accessed;
            },
            None => *slot = Some(cell),
        }
        Ok(())
    }

    /// 1 + the highest offset ever written in `segment_index`, or 0 if untouched
    /// (spec.md §8 property 4, Glossary "Effective size").
    pub fn effective_size(&self, segment_index: i64) -> usize {
        self.segment_storage(Address::new(segment_index, 0))
            .map(|segment| effective_size(segment))
            .unwrap_or(0)
    }
}

fn effective_size(segment: &[Option<Cell>]) -> usize {
    segment.iter().rposition(Option::is_some).map(|i| i + 1).unwrap_or(0)
}

fn resolve_temp_base(
    seg: i64,
    relocation_rules: &BTreeMap<i64, Address>,
    resolved: &mut BTreeMap<i64, Address>,
    visiting: &mut Vec<i64>,
) -> Result<Address, MemoryError> {
    if seg >= 0 {
        return Ok(Address::new(seg, 0));
    }
    if let Some(addr) = resolved.get(&seg) {
        return Ok(*addr);
    }
    if visiting.contains(&seg) {
        return Err(MemoryError::RelocationCycle { segment_index: seg });
    }
    visiting.push(seg);
    let dst = *relocation_rules
        .get(&seg)
        .ok_or(MemoryError::MissingRelocationRule { segment_index: seg })?;
    let base = resolve_temp_base(dst.segment_index, relocation_rules, resolved, visiting)?;
    let result = base.add_offset(dst.offset)?;
    visiting.pop();
    resolved.insert(seg, result);
    Ok(result)
}

fn rewrite_value(value: Value, bases: &BTreeMap<i64, Address>) -> Result<Value, MemoryError> {
    match value {
        Value::Addr(a) if a.segment_index < 0 => {
            let base = *bases
                .get(&a.segment_index)
                .ok_or(MemoryError::MissingRelocationRule { segment_index: a.segment_index })?;
            Ok(Value::Addr(base.add_offset(a.offset)?))
        },
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_once_conflict() {
        let mut memory = Memory::new();
        let addr = Address::new(0, 0);
        memory.set(addr, Value::Felt(Felt::from_unsigned(5))).unwrap();
        memory.set(addr, Value::Felt(Felt::from_unsigned(5))).unwrap();
        assert_eq!(
            memory.set(addr, Value::Felt(Felt::from_unsigned(6))),
            Err(MemoryError::InconsistentMemory { addr })
        );
    }

    #[test]
    fn relocation_rule_rewrites_temp_pointer() {
        let mut memory = Memory::new();
        let _ = memory.allocate_segment(); // segment 0
        let temp = memory.allocate_temp_segment(); // (-1, 0)
        assert_eq!(temp, Address::new(-1, 0));
        memory.add_relocation_rule(temp, Address::new(4, 7)).unwrap();
        memory.set(Address::new(0, 0), Value::Addr(Address::new(-1, 2))).unwrap();

        let table = memory.relocate().unwrap();
        assert_eq!(memory.get(Address::new(0, 0)), Some(Value::Addr(Address::new(4, 9))));
        assert_eq!(memory.num_temp_segments(), 0);
        // Segment 4 never had a real write of its own, but is named by the rewritten pointer.
        assert!(table.segment_base(0).is_some());
    }

    #[test]
    fn relocation_detects_cycles() {
        let mut memory = Memory::new();
        let a = memory.allocate_temp_segment(); // -1
        let b = memory.allocate_temp_segment(); // -2
        memory.add_relocation_rule(a, b).unwrap();
        memory.add_relocation_rule(b, a).unwrap();
        assert!(matches!(memory.relocate(), Err(MemoryError::RelocationCycle { .. })));
    }

    #[test]
    fn relocation_chains_through_multiple_temp_segments() {
        let mut memory = Memory::new();
        let _ = memory.allocate_segment();
        let first = memory.allocate_temp_segment(); // -1
        let second = memory.allocate_temp_segment(); // -2
        memory.add_relocation_rule(second, first).unwrap();
        memory.add_relocation_rule(first, Address::new(4, 7)).unwrap();
        memory.set(Address::new(0, 0), Value::Addr(Address::new(-2, 3))).unwrap();

        memory.relocate().unwrap();
        assert_eq!(memory.get(Address::new(0, 0)), Some(Value::Addr(Address::new(4, 10))));
    }

    #[test]
    fn effective_size_ignores_holes() {
        let mut memory = Memory::new();
        memory.set(Address::new(0, 5), Value::Felt(Felt::zero())).unwrap();
        assert_eq!(memory.effective_size(0), 6);
        assert_eq!(memory.effective_size(1), 0);
    }

    #[test]
    fn validation_rule_runs_once_per_address() {
        let mut memory = Memory::new();
        let calls = Rc::new(core::cell::RefCell::new(0usize));
        let calls_clone = calls.clone();
        let rule: ValidationRule = Rc::new(move |_mem, _addr| {
            *calls_clone.borrow_mut() += 1;
            Ok(Vec::new())
        });
        memory.add_validation_rule(0, rule);
        let addr = Address::new(0, 0);
        memory.set(addr, Value::Felt(Felt::from_unsigned(1))).unwrap();
        memory.set(addr, Value::Felt(Felt::from_unsigned(1))).unwrap();
        assert_eq!(*calls.borrow(), 1);
    }
}
