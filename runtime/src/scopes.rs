//! The nested execution-scope stack that hosts hint-local state (spec.md §3.6, §4.F).

use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use cairo_vm_core::{CairoFelt, Felt, Value};

use crate::errors::ScopeError;

/// Per-dictionary bookkeeping a `DictManager` hint variable tracks: the live key/value contents
/// of one Cairo "dict" segment plus the default value new keys read as.
///
/// The individual dict-squashing algorithm is a builtin concern out of this core's scope
/// (spec.md §1); this is only the bookkeeping a hint needs between the `dict_new`/`dict_write`/
/// `dict_read` hints that prepare its witnesses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictTracker {
    pub data: BTreeMap<Felt, Felt>,
    pub default_value: Felt,
}

/// The shared state behind a `HintType::DictManager` scope variable: every live dict, keyed by
/// the segment index its backing memory segment was allocated at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictManagerState {
    pub trackers: BTreeMap<i64, DictTracker>,
}

/// A strong, shared handle to a [`DictManagerState`] (spec.md §3.6, §4.F, §5).
///
/// This is the *only* sharing primitive the core defines: every other [`HintType`] variant is
/// exclusively owned by the scope entry holding it. Strong count controls destruction of the
/// inner state; cloning this handle (e.g. via [`ExecutionScopes::get_dict_manager`]) increments
/// it. A [`DictManagerWeak`] may be held alongside without keeping the state alive, and upgrades
/// back to a strong handle only while at least one strong handle still exists.
pub type DictManagerHandle = Rc<RefCell<DictManagerState>>;

/// A non-owning reference to a [`DictManagerHandle`]; upgrading fails once every strong handle has
/// been dropped (spec.md §4.F "Reference-counted holder semantics").
pub type DictManagerWeak = Weak<RefCell<DictManagerState>>;

/// The closed set of value types an execution-scope variable may hold (spec.md §3.6).
///
/// Every variant but [`HintType::DictManager`] is exclusively owned by the scope entry; cloning a
/// `HintType` clones the value, except `DictManager`, which clones the shared handle (incrementing
/// its strong count) rather than the dict state itself.
#[derive(Debug, Clone, PartialEq)]
pub enum HintType {
    Felt(Felt),
    U64(u64),
    List(Vec<u64>),
    FeltToListMap(BTreeMap<Felt, Vec<u64>>),
    ValueMap(BTreeMap<Value, Value>),
    DictManager(DictManagerHandle),
}

/// The non-empty stack of named-variable dictionaries hint code reads and writes
/// (spec.md §3.6, §4.F).
///
/// The root scope (index 0) can never be popped: [`Self::exit_scope`] on a single-element stack
/// fails with [`ScopeError::ExitMainScope`] rather than leaving the stack empty.
#[derive(Debug)]
pub struct ExecutionScopes {
    scopes: Vec<BTreeMap<String, HintType>>,
}

impl Default for ExecutionScopes {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionScopes {
    pub fn new() -> Self {
        Self { scopes: vec![BTreeMap::new()] }
    }

    /// How many scopes are currently on the stack, root included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Pushes a new scope, pre-populated with `initial_vars`.
    pub fn enter_scope(&mut self, initial_vars: BTreeMap<String, HintType>) {
        tracing::debug!(depth = self.scopes.len() + 1, "entering execution scope");
        self.scopes.push(initial_vars);
    }

    /// Pops the top scope. Fails [`ScopeError::ExitMainScope`] if only the root scope remains.
    pub fn exit_scope(&mut self) -> Result<(), ScopeError> {
        if self.scopes.len() <= 1 {
            return Err(ScopeError::ExitMainScope);
        }
        self.scopes.pop();
        tracing::debug!(depth = self.scopes.len(), "exited execution scope");
        Ok(())
    }

    fn top(&self) -> &BTreeMap<String, HintType> {
        self.scopes.last().expect("the root scope is never popped")
    }

    fn top_mut(&mut self) -> &mut BTreeMap<String, HintType> {
        self.scopes.last_mut().expect("the root scope is never popped")
    }

    /// Looks up `name` in the top scope only, cloning the value out.
    pub fn get(&self, name: &str) -> Result<HintType, ScopeError> {
        self.get_ref(name).map(Clone::clone)
    }

    /// Looks up `name` in the top scope only, by reference.
    pub fn get_ref(&self, name: &str) -> Result<&HintType, ScopeError> {
        self.top().get(name).ok_or_else(|| ScopeError::VariableNotInScope { name: name.into() })
    }

    /// Reads `name` as a [`Felt`]. A [`HintType::U64`] is widened to a `Felt` for compatibility
    /// with the hash-builtin layer, matching spec.md §4.F.
    pub fn get_felt(&self, name: &str) -> Result<Felt, ScopeError> {
        match self.get_ref(name)? {
            HintType::Felt(f) => Ok(*f),
            HintType::U64(v) => Ok(Felt::from_unsigned(*v)),
            _ => Err(ScopeError::TypeMismatch { name: name.into() }),
        }
    }

    /// Inserts or overwrites `name` in the top scope.
    pub fn assign_or_update(&mut self, name: &str, value: HintType) {
        self.top_mut().insert(name.into(), value);
    }

    /// Removes `name` from the top scope, if present.
    pub fn delete(&mut self, name: &str) {
        self.top_mut().remove(name);
    }

    /// Returns a cloned shared handle to the top scope's `dict_manager` variable, incrementing
    /// its strong count (spec.md §4.F).
    pub fn get_dict_manager(&self) -> Result<DictManagerHandle, ScopeError> {
        match self.get_ref("dict_manager")? {
            HintType::DictManager(handle) => Ok(Rc::clone(handle)),
            _ => Err(ScopeError::TypeMismatch { name: "dict_manager".into() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_lifecycle_matches_spec_scenario_s6() {
        let mut scopes = ExecutionScopes::new();
        scopes.assign_or_update("a", HintType::Felt(Felt::from_unsigned(2)));
        assert_eq!(scopes.get("a").unwrap(), HintType::Felt(Felt::from_unsigned(2)));

        scopes.enter_scope(BTreeMap::new());
        assert_eq!(scopes.get("a"), Err(ScopeError::VariableNotInScope { name: "a".into() }));

        scopes.exit_scope().unwrap();
        assert_eq!(scopes.get("a").unwrap(), HintType::Felt(Felt::from_unsigned(2)));

        assert_eq!(scopes.exit_scope(), Err(ScopeError::ExitMainScope));
    }

    #[test]
    fn exit_scope_restores_the_prior_stack_exactly() {
        let mut scopes = ExecutionScopes::new();
        scopes.assign_or_update("a", HintType::U64(7));
        let depth_before = scopes.depth();

        scopes.enter_scope(BTreeMap::from([("b".into(), HintType::U64(1))]));
        scopes.exit_scope().unwrap();

        assert_eq!(scopes.depth(), depth_before);
        assert_eq!(scopes.get("a").unwrap(), HintType::U64(7));
        assert_eq!(scopes.get("b"), Err(ScopeError::VariableNotInScope { name: "b".into() }));
    }

    #[test]
    fn u64_widens_to_felt_for_hash_builtin_compatibility() {
        let mut scopes = ExecutionScopes::new();
        scopes.assign_or_update("n", HintType::U64(9));
        assert_eq!(scopes.get_felt("n").unwrap(), Felt::from_unsigned(9));
    }

    #[test]
    fn dict_manager_strong_count_survives_until_the_last_holder_drops() {
        let mut scopes = ExecutionScopes::new();
        let manager: DictManagerHandle = Rc::new(RefCell::new(DictManagerState::default()));
        scopes.assign_or_update("dict_manager", HintType::DictManager(Rc::clone(&manager)));

        let handle_a = scopes.get_dict_manager().unwrap();
        let handle_b = scopes.get_dict_manager().unwrap();
        assert_eq!(Rc::strong_count(&manager), 4); // manager + scope entry + a + b

        drop(handle_a);
        drop(handle_b);
        assert_eq!(Rc::strong_count(&manager), 2); // manager + scope entry

        scopes.delete("dict_manager");
        assert_eq!(Rc::strong_count(&manager), 1);
    }

    #[test]
    fn weak_dict_manager_handle_upgrades_only_while_a_strong_handle_lives() {
        let manager: DictManagerHandle = Rc::new(RefCell::new(DictManagerState::default()));
        let weak: DictManagerWeak = Rc::downgrade(&manager);
        assert!(weak.upgrade().is_some());

        drop(manager);
        assert!(weak.upgrade().is_none());
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    fn root_vars() -> impl Strategy<Value = BTreeMap<String, HintType>> {
        prop::collection::btree_map(
            (0u32..6).prop_map(|n| alloc::format!("var_{n}")),
            (0u64..1000).prop_map(HintType::U64),
            0..6,
        )
    }

    proptest! {
        /// spec.md §8 property 7: after `enter_scope` followed by `exit_scope`, the scope stack is
        /// bit-identical to the state before entering, for any root contents and any pushed scope.
        #[test]
        fn enter_then_exit_restores_the_root_scope_exactly(
            before in root_vars(),
            pushed in root_vars(),
        ) {
            let mut scopes = ExecutionScopes::new();
            for (name, value) in &before {
                scopes.assign_or_update(name, value.clone());
            }
            let snapshot = scopes.top().clone();

            scopes.enter_scope(pushed);
            scopes.exit_scope().unwrap();

            prop_assert_eq!(scopes.depth(), 1);
            prop_assert_eq!(scopes.top().clone(), snapshot);
        }
    }
}
