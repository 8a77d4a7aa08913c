//! Error taxonomy for compiled-artifact parsing and hint-collection construction
//! (spec.md §7 "Program loading").

use alloc::string::String;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "std", derive(miette::Diagnostic))]
pub enum ProgramParseError {
    #[error("program prime '{found}' does not match the expected Cairo field prime")]
    PrimeDiffers { found: String },
    #[error("entrypoint '{name}' was not found among the program identifiers")]
    EntrypointNotFound { name: String },
    #[error("identifier '{name}' is declared as a const but carries no value")]
    ConstWithoutValue { name: String },
    #[error("unsupported builtin '{name}'")]
    UnsupportedBuiltin { name: String },
    #[error(
        "hint program counter {pc} is out of range of a program with {program_length} instructions"
    )]
    InvalidHintPc { pc: usize, program_length: usize },
    #[error("malformed reference expression at byte {position} of '{input}': {message}")]
    MalformedReferenceExpression { input: String, position: usize, message: String },
    #[error("malformed program artifact: {0}")]
    Malformed(String),
}
