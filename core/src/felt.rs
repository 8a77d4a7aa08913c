//! Binding to the external prime-field implementation.
//!
//! spec.md §1 and §6 treat the base prime field as an external collaborator: the core only
//! assumes a prime-field trait. [`CairoFelt`] is that trait; [`Felt`] is the concrete binding used
//! by the rest of the workspace, backed by `lambdaworks-math`'s Stark-252 field element (the same
//! field the compiled Cairo artifact's `prime` key names, see [`CAIRO_PRIME_HEX`]).

use alloc::string::{String, ToString};
use core::fmt;

use lambdaworks_math::{
    field::{element::FieldElement, fields::fft_friendly::stark_252_prime_field::Stark252PrimeField},
    unsigned_integer::element::UnsignedInteger,
};

/// The prime named by every compiled Cairo v0 artifact's top-level `prime` field.
pub const CAIRO_PRIME_HEX: &str =
    "0x800000000000011000000000000000000000000000000000000000000000001";

type Backend = FieldElement<Stark252PrimeField>;

/// A prime-field element in the Cairo field.
///
/// This is a thin newtype over the external field implementation so that the rest of the
/// workspace depends on the interface in [`CairoFelt`] rather than on `lambdaworks-math`
/// directly. Swapping the backend only requires re-implementing this module.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Felt(Backend);

impl fmt::Debug for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Felt(0x{})", hex_of(&self.0))
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex_of(&self.0))
    }
}

fn hex_of(fe: &Backend) -> String {
    let bytes = fe.to_bytes_be();
    let mut hex = String::with_capacity(bytes.len() * 2);
    for b in bytes.iter().skip_while(|b| **b == 0) {
        hex.push_str(&alloc::format!("{:02x}", b));
    }
    if hex.is_empty() {
        hex.push('0');
    }
    hex
}

/// The interface the Cairo VM core requires from a prime-field element (spec.md §6).
///
/// The core never reaches past this trait into field internals: no Montgomery representation,
/// modular inverse, Legendre symbol, or square root is exposed here, because the core never needs
/// them (they belong to the builtins and hints that are out of scope, spec.md §1).
pub trait CairoFelt:
    Copy
    + Clone
    + PartialEq
    + Eq
    + core::hash::Hash
    + core::ops::Add<Output = Self>
    + core::ops::Sub<Output = Self>
    + core::ops::Mul<Output = Self>
    + core::ops::Neg<Output = Self>
    + fmt::Debug
    + fmt::Display
{
    /// Additive identity.
    fn zero() -> Self;
    /// Multiplicative identity.
    fn one() -> Self;
    /// Widens an unsigned 64-bit integer into the field.
    fn from_unsigned(value: u64) -> Self;
    /// Reduces a signed 64-bit integer modulo the field's prime.
    fn from_signed(value: i64) -> Self;
    /// Attempts to narrow this element back down to a `u64`, failing if it does not fit.
    fn try_into_u64(self) -> Option<u64>;
    /// `true` iff this element is the additive identity.
    fn is_zero(self) -> bool;
    /// Canonical big-endian byte encoding (32 bytes for the Stark-252 field).
    fn to_bytes_be(self) -> [u8; 32];
    /// Parses a canonical big-endian byte encoding.
    fn from_bytes_be(bytes: &[u8; 32]) -> Self;
}

impl CairoFelt for Felt {
    fn zero() -> Self {
        Felt(Backend::zero())
    }

    fn one() -> Self {
        Felt(Backend::one())
    }

    fn from_unsigned(value: u64) -> Self {
        Felt(Backend::from(value))
    }

    fn from_signed(value: i64) -> Self {
        if value >= 0 {
            Self::from_unsigned(value as u64)
        } else {
            -Self::from_unsigned(value.unsigned_abs())
        }
    }

    fn try_into_u64(self) -> Option<u64> {
        let repr: UnsignedInteger<4> = self.0.representative();
        let bytes = repr.to_bytes_be();
        // The value fits in u64 iff every byte but the low 8 is zero.
        if bytes[..24].iter().any(|b| *b != 0) {
            return None;
        }
        let mut limb = [0u8; 8];
        limb.copy_from_slice(&bytes[24..]);
        Some(u64::from_be_bytes(limb))
    }

    fn is_zero(self) -> bool {
        self.0 == Backend::zero()
    }

    fn to_bytes_be(self) -> [u8; 32] {
        self.0.to_bytes_be()
    }

    fn from_bytes_be(bytes: &[u8; 32]) -> Self {
        Felt(Backend::from_bytes_be(bytes).unwrap_or_else(|_| Backend::zero()))
    }
}

impl core::ops::Add for Felt {
    type Output = Felt;
    fn add(self, rhs: Felt) -> Felt {
        Felt(self.0 + rhs.0)
    }
}

impl core::ops::Sub for Felt {
    type Output = Felt;
    fn sub(self, rhs: Felt) -> Felt {
        Felt(self.0 - rhs.0)
    }
}

impl core::ops::Mul for Felt {
    type Output = Felt;
    fn mul(self, rhs: Felt) -> Felt {
        Felt(self.0 * rhs.0)
    }
}

impl core::ops::Neg for Felt {
    type Output = Felt;
    fn neg(self) -> Felt {
        Felt(-self.0)
    }
}

impl PartialOrd for Felt {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Felt {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.to_bytes_be().cmp(&other.to_bytes_be())
    }
}

/// Convenience free function mirroring the external trait's `from_unsigned` (spec.md §6).
pub fn felt_from_unsigned(value: u64) -> Felt {
    Felt::from_unsigned(value)
}

/// Convenience free function mirroring the external trait's `from_signed` (spec.md §6).
pub fn felt_from_signed(value: i64) -> Felt {
    Felt::from_signed(value)
}

/// Parses a `0x`-prefixed hexadecimal literal, reducing it modulo the field's prime if it is
/// wider than the field (used by the program parser for `data` words and `const` identifiers).
pub fn felt_from_hex(hex_str: &str) -> Result<Felt, ParseFeltError> {
    let digits = hex_str.strip_prefix("0x").ok_or(ParseFeltError::MissingPrefix)?;
    let fe = Backend::from_hex(digits).map_err(|_| ParseFeltError::InvalidDigits)?;
    Ok(Felt(fe))
}

/// Error returned by [`felt_from_hex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseFeltError {
    #[error("hexadecimal felt literal must be prefixed with '0x'")]
    MissingPrefix,
    #[error("invalid hexadecimal digits in felt literal")]
    InvalidDigits,
}
