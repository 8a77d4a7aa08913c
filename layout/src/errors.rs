//! Error taxonomy for layout lookups.

use alloc::string::String;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("unknown layout name '{name}'")]
    UnknownLayoutName { name: String },
}
