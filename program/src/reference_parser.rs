//! Hand-written recursive-descent parser for Cairo reference expressions such as
//! `[cast(fp + (-3), felt*)]` or `cast([fp + (-3)] + 2, felt)` (spec.md §4.H/§4.I, §9 "Reference
//! expression parser").
//!
//! The grammar is deliberately small: an optional outer dereference (`[...]`), a `cast(expr,
//! type)` call, additive composition of at most two operands, register-relative terms (`ap`/`fp ±
//! n`), and integer or hex-felt literals.

use alloc::format;
use alloc::string::{String, ToString};

use cairo_vm_core::felt_from_hex;

use crate::errors::ProgramParseError;
use crate::hint::ApTracking;
use crate::hint_reference::{HintReference, OffsetValue, Register};

pub fn parse_reference_expression(
    value: &str,
    ap_tracking: ApTracking,
) -> Result<HintReference, ProgramParseError> {
    let trimmed = value.trim();
    let (body, outer_dereference) = match strip_matching_brackets(trimmed) {
        Some(inner) => (inner.trim(), true),
        None => (trimmed, false),
    };

    let cast_body = body.strip_prefix("cast(").and_then(|s| s.strip_suffix(')')).ok_or_else(|| {
        malformed(value, value.find(body).unwrap_or(0), "expected a 'cast(...)' expression")
    })?;

    let (expr_part, type_part) = split_last_top_level_comma(cast_body)
        .ok_or_else(|| malformed(value, 0, "cast(...) requires an expression and a type"))?;

    let (offset1, offset2) = parse_additive_expr(value, expr_part)?;

    Ok(HintReference {
        offset1,
        offset2,
        dereference: outer_dereference,
        ap_tracking,
        cairo_type: Some(type_part.trim().to_string()),
    })
}

fn parse_additive_expr(
    original: &str,
    expr: &str,
) -> Result<(OffsetValue, Option<OffsetValue>), ProgramParseError> {
    let parts = split_top_level(expr, '+');
    match parts.as_slice() {
        [single] => Ok((parse_term(original, single.trim())?, None)),
        [first, second] if is_bare_register(first.trim()) => {
            let register = bare_register(first.trim()).expect("checked above");
            let offset = parse_signed_int(original, second.trim())?;
            Ok((OffsetValue::Reference { register, offset, dereference: false }, None))
        },
        [first, second] => {
            Ok((parse_term(original, first.trim())?, Some(parse_term(original, second.trim())?)))
        },
        _ => Err(malformed(original, 0, "expected at most two additive operands")),
    }
}

fn parse_term(original: &str, term: &str) -> Result<OffsetValue, ProgramParseError> {
    if let Some(inner) = strip_matching_brackets(term) {
        let (register, offset) = parse_register_relative(original, inner.trim())?;
        return Ok(OffsetValue::Reference { register, offset, dereference: true });
    }
    if let Some(register) = bare_register(term) {
        return Ok(OffsetValue::Reference { register, offset: 0, dereference: false });
    }
    if let Some(inner) = term.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        return Ok(OffsetValue::Value(parse_signed_int(original, inner.trim())?));
    }
    if let Some(hex) = term.strip_prefix("0x") {
        return felt_from_hex(&format!("0x{hex}"))
            .map(OffsetValue::Immediate)
            .map_err(|_| malformed(original, 0, "invalid hexadecimal felt literal"));
    }
    parse_signed_int(original, term).map(OffsetValue::Value)
}

fn parse_register_relative(
    original: &str,
    expr: &str,
) -> Result<(Register, i64), ProgramParseError> {
    let parts = split_top_level(expr, '+');
    match parts.as_slice() {
        [single] if bare_register(single.trim()).is_some() => {
            Ok((bare_register(single.trim()).expect("checked above"), 0))
        },
        [first, second] if is_bare_register(first.trim()) => {
            let register = bare_register(first.trim()).expect("checked above");
            Ok((register, parse_signed_int(original, second.trim())?))
        },
        _ => Err(malformed(original, 0, "expected 'ap'/'fp' optionally followed by '+ <offset>'")),
    }
}

fn bare_register(s: &str) -> Option<Register> {
    match s {
        "ap" => Some(Register::Ap),
        "fp" => Some(Register::Fp),
        _ => None,
    }
}

fn is_bare_register(s: &str) -> bool {
    bare_register(s).is_some()
}

/// Parses a signed integer, accepting a parenthesized form like `(-3)` in addition to a bare `-3`
/// or `3`.
fn parse_signed_int(original: &str, s: &str) -> Result<i64, ProgramParseError> {
    let s = s.trim();
    let s = s.strip_prefix('(').and_then(|s| s.strip_suffix(')')).unwrap_or(s);
    s.trim()
        .parse::<i64>()
        .map_err(|_| malformed(original, 0, "expected an integer literal"))
}

/// If `s` is wrapped in a single matching pair of brackets spanning the whole string, returns the
/// inner content. Returns `None` if `s` has no brackets, or if a leading `[` closes before the end
/// of the string (so the brackets do not wrap the whole expression).
fn strip_matching_brackets(s: &str) -> Option<&str> {
    let s = s.trim();
    if !s.starts_with('[') || !s.ends_with(']') {
        return None;
    }
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return if i == s.len() - 1 { Some(&s[1..i]) } else { None };
                }
            },
            _ => {},
        }
    }
    None
}

/// Splits `s` on occurrences of `sep` that are not nested inside `()` or `[]`.
fn split_top_level(s: &str, sep: char) -> alloc::vec::Vec<&str> {
    let mut parts = alloc::vec::Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            },
            _ => {},
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Splits on the last top-level comma, used to separate a `cast` call's expression from its
/// trailing type (the type itself may contain no commas, but the expression might, in principle,
/// via nested calls).
fn split_last_top_level_comma(s: &str) -> Option<(&str, &str)> {
    let parts = split_top_level(s, ',');
    if parts.len() < 2 {
        return None;
    }
    let split_at = s.len() - parts.last().unwrap().len() - 1;
    Some((&s[..split_at], &s[split_at + 1..]))
}

fn malformed(input: &str, position: usize, message: &str) -> ProgramParseError {
    ProgramParseError::MalformedReferenceExpression {
        input: input.to_string(),
        position,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracking() -> ApTracking {
        ApTracking { group: 0, offset: 0 }
    }

    #[test]
    fn parses_bracketed_cast_of_a_register_offset() {
        let reference = parse_reference_expression("[cast(fp + (-3), felt*)]", tracking()).unwrap();
        assert!(reference.dereference);
        assert_eq!(
            reference.offset1,
            OffsetValue::Reference { register: Register::Fp, offset: -3, dereference: false }
        );
        assert_eq!(reference.offset2, None);
        assert_eq!(reference.cairo_type.as_deref(), Some("felt*"));
    }

    #[test]
    fn parses_additive_composition_of_a_dereferenced_term_and_an_immediate() {
        let reference = parse_reference_expression("cast([fp + (-3)] + 2, felt)", tracking()).unwrap();
        assert!(!reference.dereference);
        assert_eq!(
            reference.offset1,
            OffsetValue::Reference { register: Register::Fp, offset: -3, dereference: true }
        );
        assert_eq!(reference.offset2, Some(OffsetValue::Value(2)));
        assert_eq!(reference.cairo_type.as_deref(), Some("felt"));
    }

    #[test]
    fn parses_a_bare_register_with_no_offset() {
        let reference = parse_reference_expression("cast(ap, felt)", tracking()).unwrap();
        assert_eq!(
            reference.offset1,
            OffsetValue::Reference { register: Register::Ap, offset: 0, dereference: false }
        );
    }

    #[test]
    fn rejects_input_missing_a_cast_call() {
        assert!(parse_reference_expression("fp + (-3)", tracking()).is_err());
    }
}
