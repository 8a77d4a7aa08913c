//! Resolves a symbolic [`HintReference`] into a live [`Value`] against the current VM registers
//! (spec.md §3.5, §4.E).

use cairo_vm_core::{Address, CairoFelt, Felt, Memory, Value};
use cairo_vm_program::{ApTracking, HintReference, OffsetValue, Register};

use crate::errors::ReferenceResolutionError;

/// The live VM register values a [`HintReference`] is resolved against: the current AP/FP
/// addresses and the AP-tracking state in effect at the current program counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmRegisters {
    pub ap: Address,
    pub fp: Address,
    pub ap_tracking: ApTracking,
}

/// Resolves `reference` into the [`Value`] it currently names (spec.md §4.E).
///
/// Resolution proceeds in three steps: translate the reference's captured AP into its live
/// address by correcting for how far AP has advanced since capture (failing if the AP-tracking
/// groups disagree), evaluate each operand, then compose and optionally dereference once more.
pub fn resolve_hint_reference(
    reference: &HintReference,
    registers: VmRegisters,
    memory: &Memory,
) -> Result<Value, ReferenceResolutionError> {
    let live_ap = translate_ap(registers.ap, registers.ap_tracking, reference.ap_tracking)?;

    let value1 = eval_offset(&reference.offset1, live_ap, registers.fp, memory)?;
    let composed = match &reference.offset2 {
        Some(offset2) => {
            let value2 = eval_offset(offset2, live_ap, registers.fp, memory)?;
            value1.checked_add(value2)?
        },
        None => value1,
    };

    if reference.dereference {
        let addr = composed.try_into_address()?;
        memory.get(addr).ok_or(ReferenceResolutionError::UninitializedMemoryCell { addr })
    } else {
        Ok(composed)
    }
}

/// `live_ap = current_ap − (current.offset − ref.offset)`, valid only when the reference's
/// capture-time AP-tracking group matches the live one (spec.md §4.E step 1).
fn translate_ap(
    current_ap: Address,
    current: ApTracking,
    captured: ApTracking,
) -> Result<Address, ReferenceResolutionError> {
    if current.group != captured.group {
        return Err(ReferenceResolutionError::ApTrackingGroupMismatch {
            captured_group: captured.group,
            live_group: current.group,
        });
    }
    let delta = current.offset as i64 - captured.offset as i64;
    Ok(current_ap.add_signed(-delta)?)
}

fn eval_offset(
    offset: &OffsetValue,
    ap: Address,
    fp: Address,
    memory: &Memory,
) -> Result<Value, ReferenceResolutionError> {
    match offset {
        OffsetValue::Immediate(f) => Ok(Value::Felt(*f)),
        OffsetValue::Value(n) => Ok(Value::Felt(Felt::from_signed(*n))),
        OffsetValue::Reference { register, offset, dereference } => {
            let base = match register {
                Register::Ap => ap,
                Register::Fp => fp,
            };
            let addr = base.add_signed(*offset)?;
            if *dereference {
                memory.get(addr).ok_or(ReferenceResolutionError::UninitializedMemoryCell { addr })
            } else {
                Ok(Value::Addr(addr))
            }
        },
    }
}


#[cfg(test)]
mod proptests {
    use cairo_vm_test_utils::{small_felt, small_real_address};
    use proptest::prelude::*;

    use super::*;

    proptest! {
        /// spec.md §4.E step 1: when the live and captured ap-tracking state agree, the live ap
        /// address is the captured one unchanged, so a bare dereferenced `ap` reference reads
        /// back whatever felt was stored there, for any real address and any felt.
        #[test]
        fn ap_relative_reference_reads_back_whatever_was_stored(
            ap in small_real_address(),
            value in small_felt(),
        ) {
            let mut memory = Memory::new();
            memory.set(ap, Value::Felt(value)).unwrap();
            let reference = HintReference {
                offset1: OffsetValue::Reference { register: Register::Ap, offset: 0, dereference: true },
                offset2: None,
                dereference: false,
                ap_tracking: ApTracking { group: 0, offset: 0 },
                cairo_type: None,
            };
            let registers =
                VmRegisters { ap, fp: ap, ap_tracking: ApTracking { group: 0, offset: 0 } };
            let resolved = resolve_hint_reference(&reference, registers, &memory).unwrap();
            prop_assert_eq!(resolved, Value::Felt(value));
        }
    }
}
