//! The tagged union stored in every memory cell (spec.md §3.2).

use core::cmp::Ordering;
use core::fmt;

use crate::errors::{AddressError, ValueError};
use crate::felt::CairoFelt;
use crate::{Address, Felt};

/// A value stored in a memory cell: either a field element or a (possibly temporary) address.
///
/// `Value` is a closed sum type (spec.md §9 "Tagged unions instead of dynamic types"); builtin and
/// hint dispatch code matches on it exhaustively rather than performing runtime type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Felt(Felt),
    Addr(Address),
}

impl Value {
    /// `false` for every [`Value::Addr`]; delegates to [`CairoFelt::is_zero`] for
    /// [`Value::Felt`].
    pub fn is_zero(self) -> bool {
        match self {
            Value::Felt(f) => f.is_zero(),
            Value::Addr(_) => false,
        }
    }

    pub fn try_into_felt(self) -> Result<Felt, ValueError> {
        match self {
            Value::Felt(f) => Ok(f),
            Value::Addr(_) => Err(ValueError::TypeMismatchNotFelt),
        }
    }

    pub fn try_into_address(self) -> Result<Address, ValueError> {
        match self {
            Value::Addr(a) => Ok(a),
            Value::Felt(_) => Err(ValueError::TypeMismatchNotAddress),
        }
    }

    pub fn try_into_u64(self) -> Result<u64, ValueError> {
        let felt = self.try_into_felt()?;
        felt.try_into_u64().ok_or(ValueError::Address(AddressError::ValueTooLarge))
    }

    /// Value-level addition (spec.md §3.2 "Addition").
    ///
    /// | lhs | rhs | result |
    /// |---|---|---|
    /// | `Addr` | `Addr` | [`ValueError::RelocatableAdd`] |
    /// | `Addr` | `Felt` | `Addr` |
    /// | `Felt` | `Felt` | `Felt` |
    /// | `Felt` | `Addr` | `Addr` |
    pub fn checked_add(self, rhs: Self) -> Result<Self, ValueError> {
        match (self, rhs) {
            (Value::Addr(_), Value::Addr(_)) => Err(ValueError::RelocatableAdd),
            (Value::Addr(a), Value::Felt(f)) | (Value::Felt(f), Value::Addr(a)) => {
                Ok(Value::Addr(a.add_felt(f)?))
            },
            (Value::Felt(a), Value::Felt(b)) => Ok(Value::Felt(a + b)),
        }
    }

    /// Value-level subtraction (spec.md §3.2 "Subtraction").
    ///
    /// | lhs | rhs | result |
    /// |---|---|---|
    /// | `Addr` | `Addr` | `Felt(offset1 - offset2)`, same segment required |
    /// | `Addr` | `Felt` | `Addr` |
    /// | `Felt` | `Addr` | [`ValueError::SubAddrFromFelt`] |
    /// | `Felt` | `Felt` | `Felt` |
    pub fn checked_sub(self, rhs: Self) -> Result<Self, ValueError> {
        match (self, rhs) {
            (Value::Addr(a), Value::Addr(b)) => {
                let diff = a.sub(b)?;
                Ok(Value::Felt(Felt::from_unsigned(diff)))
            },
            (Value::Addr(a), Value::Felt(f)) => Ok(Value::Addr(a.sub_offset(
                f.try_into_u64().ok_or(ValueError::Address(AddressError::ValueTooLarge))?,
            )?)),
            (Value::Felt(_), Value::Addr(_)) => Err(ValueError::SubAddrFromFelt),
            (Value::Felt(a), Value::Felt(b)) => Ok(Value::Felt(a - b)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Felt(x) => write!(f, "{x}"),
            Value::Addr(a) => write!(f, "{a}"),
        }
    }
}

impl From<Felt> for Value {
    fn from(f: Felt) -> Self {
        Value::Felt(f)
    }
}

impl From<Address> for Value {
    fn from(a: Address) -> Self {
        Value::Addr(a)
    }
}

/// Total order used by some builtins (spec.md §3.2): every [`Value::Addr`] compares less than
/// every [`Value::Felt`]; within a variant the native order applies.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Addr(a), Value::Addr(b)) => a.cmp(b),
            (Value::Felt(a), Value::Felt(b)) => a.cmp(b),
            (Value::Addr(_), Value::Felt(_)) => Ordering::Less,
            (Value::Felt(_), Value::Addr(_)) => Ordering::Greater,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_is_symmetric_between_felt_and_address() {
        let addr = Address::new(0, 4);
        let felt = Felt::from_unsigned(3);
        let lhs = Value::Felt(felt).checked_add(Value::Addr(addr)).unwrap();
        let rhs = Value::Addr(addr).checked_add(Value::Felt(felt)).unwrap();
        assert_eq!(lhs, rhs);
        assert_eq!(lhs, Value::Addr(Address::new(0, 7)));
    }

    #[test]
    fn addr_plus_addr_is_an_error() {
        let a = Value::Addr(Address::new(0, 0));
        let b = Value::Addr(Address::new(0, 1));
        assert_eq!(a.checked_add(b), Err(ValueError::RelocatableAdd));
    }

    #[test]
    fn felt_minus_addr_is_an_error() {
        let a = Value::Felt(Felt::from_unsigned(5));
        let b = Value::Addr(Address::new(0, 1));
        assert_eq!(a.checked_sub(b), Err(ValueError::SubAddrFromFelt));
    }

    #[test]
    fn addr_ordering_precedes_felt() {
        assert!(Value::Addr(Address::new(1000, 0)) < Value::Felt(Felt::zero()));
    }
}
