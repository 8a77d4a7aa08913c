//! Parses a compiled Cairo v0 JSON artifact into an immutable [`crate::Program`]
//! (spec.md §4.H/§4.I, §6 "Program artifact").

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str::FromStr;

use cairo_vm_core::{felt_from_hex, CairoFelt, Felt, Value};
use cairo_vm_layout::BuiltinName;
use num_bigint::{BigInt, Sign};
use serde::Deserialize;
use serde_json::Value as Json;

use crate::errors::ProgramParseError;
use crate::hint::HintParams;
use crate::hint_collection::HintCollection;
use crate::identifier::{Identifier, ReferenceManagerEntry};
use crate::program::Program;
use crate::reference_parser::parse_reference_expression;

/// Which physical [`HintCollection`] representation [`parse_program`] should build (spec.md §9
/// "Extensive vs. non-extensive hint storage" and the matching Open Question: the source leaves
/// the choice of canonical representation ambiguous, so both are supported and a caller picks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HintRepresentation {
    /// Always build [`HintCollection::Extensive`] (a sparse PC-to-range map).
    Extensive,
    /// Always build [`HintCollection::NonExtensive`] (a dense PC-indexed vector).
    NonExtensive,
    /// Pick whichever representation suits the hint density: extensive when hinted PCs are a
    /// minority of the program, non-extensive when they are dense.
    #[default]
    Auto,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    prime: String,
    data: Vec<String>,
    #[serde(default)]
    builtins: Vec<String>,
    #[serde(default)]
    hints: BTreeMap<String, Vec<HintParams>>,
    #[serde(default)]
    identifiers: BTreeMap<String, Identifier>,
    #[serde(default)]
    reference_manager: ReferenceManager,
    #[serde(default)]
    attributes: Vec<Json>,
    #[serde(default)]
    debug_info: Option<DebugInfo>,
    #[serde(default)]
    main_scope: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReferenceManager {
    #[serde(default)]
    references: Vec<ReferenceManagerEntry>,
}

#[derive(Debug, Deserialize)]
struct DebugInfo {
    instruction_locations: Option<Json>,
}

/// Parses `artifact_json` into a [`Program`]. `entrypoint` names the Cairo function whose
/// `"__main__." ++ entrypoint` identifier supplies [`Program::main`]; pass `None` to leave it
/// unset (spec.md §4.H/§4.I).
pub fn parse_program(
    artifact_json: &[u8],
    entrypoint: Option<&str>,
    representation: HintRepresentation,
) -> Result<Program, ProgramParseError> {
    let artifact: Artifact = serde_json::from_slice(artifact_json)
        .map_err(|e| ProgramParseError::Malformed(e.to_string()))?;

    check_prime(&artifact.prime)?;

    let data = artifact
        .data
        .iter()
        .map(|word| felt_from_hex(word).map(Value::Felt))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ProgramParseError::Malformed("malformed 'data' hex literal".into()))?;

    let main = match entrypoint {
        Some(name) => {
            let full_name = alloc::format!("__main__.{name}");
            let pc = artifact
                .identifiers
                .get(&full_name)
                .and_then(|id| id.pc)
                .ok_or_else(|| ProgramParseError::EntrypointNotFound { name: name.to_string() })?;
            Some(pc)
        },
        None => None,
    };

    let start = artifact.identifiers.get("__main__.__start__").and_then(|id| id.pc);
    let end = artifact.identifiers.get("__main__.__end__").and_then(|id| id.pc);

    let error_attributes = artifact
        .attributes
        .iter()
        .filter(|attr| attr.get("name").and_then(Json::as_str) == Some("error_message"))
        .cloned()
        .collect();

    let mut constants = BTreeMap::new();
    for (name, identifier) in &artifact.identifiers {
        if identifier.kind.as_deref() != Some("const") {
            continue;
        }
        let value = identifier
            .value
            .as_ref()
            .ok_or_else(|| ProgramParseError::ConstWithoutValue { name: name.clone() })?;
        constants.insert(name.clone(), felt_from_json_value(value)?);
    }

    let builtins = artifact
        .builtins
        .iter()
        .map(|name| {
            BuiltinName::from_str(name)
                .map_err(|_| ProgramParseError::UnsupportedBuiltin { name: name.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let references = artifact
        .reference_manager
        .references
        .iter()
        .map(|entry| parse_reference_expression(&entry.value, entry.ap_tracking_data))
        .collect::<Result<Vec<_>, _>>()?;

    let mut hints_by_pc = BTreeMap::new();
    for (pc_str, params) in artifact.hints {
        let pc = pc_str
            .parse::<usize>()
            .map_err(|_| ProgramParseError::Malformed(alloc::format!("invalid hint pc '{pc_str}'")))?;
        hints_by_pc.insert(pc, params);
    }
    let extensive = resolve_representation(representation, &hints_by_pc, data.len());
    let hints = HintCollection::new(&hints_by_pc, data.len(), extensive)?;

    let instruction_locations = artifact.debug_info.and_then(|info| info.instruction_locations);
    let main_scope = artifact.main_scope.unwrap_or_else(|| "__main__".to_string());

    tracing::info!(
        instructions = data.len(),
        builtins = ?builtins,
        hints = hints_by_pc.len(),
        "parsed Cairo program"
    );

    Ok(Program {
        data,
        main,
        start,
        end,
        error_attributes,
        identifiers: artifact.identifiers,
        constants,
        builtins,
        hints,
        references,
        instruction_locations,
        main_scope,
    })
}

fn resolve_representation(
    representation: HintRepresentation,
    hints_by_pc: &BTreeMap<usize, Vec<HintParams>>,
    program_length: usize,
) -> bool {
    match representation {
        HintRepresentation::Extensive => true,
        HintRepresentation::NonExtensive => false,
        HintRepresentation::Auto => hints_by_pc.len() * 2 < program_length.max(1),
    }
}

fn check_prime(found: &str) -> Result<(), ProgramParseError> {
    let normalize = |s: &str| s.trim().trim_start_matches("0x").to_ascii_lowercase();
    if normalize(found) != normalize(cairo_vm_core::CAIRO_PRIME_HEX) {
        return Err(ProgramParseError::PrimeDiffers { found: found.to_string() });
    }
    Ok(())
}

/// Converts a `const` identifier's JSON `value` into a [`Felt`], reducing signed or
/// out-of-u64-range integers modulo the Cairo prime (spec.md §4.H/§4.I).
fn felt_from_json_value(value: &Json) -> Result<Felt, ProgramParseError> {
    match value {
        Json::Number(n) => {
            let text = n.to_string();
            let big = BigInt::parse_bytes(text.as_bytes(), 10).ok_or_else(|| {
                ProgramParseError::Malformed(alloc::format!("invalid const integer '{text}'"))
            })?;
            Ok(felt_from_bigint(big))
        },
        Json::String(s) if s.starts_with("0x") || s.starts_with("-0x") => {
            let (negative, digits) = match s.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, s.as_str()),
            };
            let felt = felt_from_hex(digits)
                .map_err(|_| ProgramParseError::Malformed(alloc::format!("invalid const hex '{s}'")))?;
            Ok(if negative { -felt } else { felt })
        },
        other => Err(ProgramParseError::Malformed(alloc::format!(
            "const identifier value must be numeric, found {other}"
        ))),
    }
}

fn felt_from_bigint(value: BigInt) -> Felt {
    let prime = BigInt::parse_bytes(
        cairo_vm_core::CAIRO_PRIME_HEX.trim_start_matches("0x").as_bytes(),
        16,
    )
    .expect("CAIRO_PRIME_HEX is a valid hex literal");

    let mut reduced = &value % &prime;
    if reduced.sign() == Sign::Minus {
        reduced += &prime;
    }
    let (_, bytes_be) = reduced.to_bytes_be();
    let mut buf = [0u8; 32];
    let start = 32 - bytes_be.len();
    buf[start..].copy_from_slice(&bytes_be);
    Felt::from_bytes_be(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_program_with_an_entrypoint() {
        let json = cairo_vm_test_utils::minimal_program_json();
        let program =
            parse_program(json.as_bytes(), Some("main"), HintRepresentation::Auto).unwrap();
        assert_eq!(program.data.len(), 6);
        assert_eq!(program.main, Some(0));
        assert!(program.constants.is_empty());
        assert!(program.builtins.is_empty());
        assert!(program.hints.is_empty());
    }

    #[test]
    fn rejects_a_mismatched_prime() {
        let json = r#"{
            "prime": "0x1",
            "data": [],
            "identifiers": {},
            "reference_manager": { "references": [] },
            "attributes": [],
            "builtins": []
        }"#;
        assert!(matches!(
            parse_program(json.as_bytes(), None, HintRepresentation::Auto),
            Err(ProgramParseError::PrimeDiffers { .. })
        ));
    }

    #[test]
    fn missing_entrypoint_is_reported() {
        let json = cairo_vm_test_utils::minimal_program_json();
        assert!(matches!(
            parse_program(json.as_bytes(), Some("missing"), HintRepresentation::Auto),
            Err(ProgramParseError::EntrypointNotFound { .. })
        ));
    }

    #[test]
    fn const_identifier_without_a_value_is_rejected() {
        let json = alloc::format!(
            r#"{{
                "prime": "{prime}",
                "data": [],
                "identifiers": {{
                    "__main__.FOO": {{ "type": "const" }}
                }},
                "reference_manager": {{ "references": [] }},
                "attributes": [],
                "builtins": []
            }}"#,
            prime = cairo_vm_core::CAIRO_PRIME_HEX,
        );
        assert!(matches!(
            parse_program(json.as_bytes(), None, HintRepresentation::Auto),
            Err(ProgramParseError::ConstWithoutValue { .. })
        ));
    }

    #[test]
    fn negative_const_values_are_reduced_modulo_the_prime() {
        let json = alloc::format!(
            r#"{{
                "prime": "{prime}",
                "data": [],
                "identifiers": {{
                    "__main__.NEG_ONE": {{ "type": "const", "value": -1 }}
                }},
                "reference_manager": {{ "references": [] }},
                "attributes": [],
                "builtins": []
            }}"#,
            prime = cairo_vm_core::CAIRO_PRIME_HEX,
        );
        let program = parse_program(json.as_bytes(), None, HintRepresentation::Auto).unwrap();
        let neg_one = program.constants.get("__main__.NEG_ONE").copied().unwrap();
        assert_eq!(neg_one + Felt::one(), Felt::zero());
    }

    #[test]
    fn unsupported_builtin_is_rejected() {
        let json = alloc::format!(
            r#"{{
                "prime": "{prime}",
                "data": [],
                "identifiers": {{}},
                "reference_manager": {{ "references": [] }},
                "attributes": [],
                "builtins": ["not_a_builtin"]
            }}"#,
            prime = cairo_vm_core::CAIRO_PRIME_HEX,
        );
        assert!(matches!(
            parse_program(json.as_bytes(), None, HintRepresentation::Auto),
            Err(ProgramParseError::UnsupportedBuiltin { .. })
        ));
    }
}
