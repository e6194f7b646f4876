//! Errors surfaced by binding writes.
//!
//! Reads never fail: malformed URL content falls back to the binding's
//! initial value. Only writes whose value has no string encoding error out.

use crate::codec::CodecError;
use crate::search::PrimitiveKind;

#[derive(Clone, Debug, PartialEq)]
pub enum BindingError {
    /// The codec could not turn the value into a string.
    Serialize { key: String, message: String },
    /// A search-param write whose primitive kind differs from the default's.
    UnsupportedValue {
        key: String,
        expected: PrimitiveKind,
        found: PrimitiveKind,
    },
}

impl BindingError {
    pub(crate) fn from_codec(key: &str, err: CodecError) -> Self {
        match err {
            CodecError::Serialize(message) => BindingError::Serialize {
                key: key.to_string(),
                message,
            },
            CodecError::UnsupportedValue { expected, found } => BindingError::UnsupportedValue {
                key: key.to_string(),
                expected,
                found,
            },
        }
    }

    pub fn key(&self) -> &str {
        match self {
            BindingError::Serialize { key, .. } | BindingError::UnsupportedValue { key, .. } => key,
        }
    }
}

impl std::fmt::Display for BindingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingError::Serialize { key, message } => {
                write!(f, "cannot serialize value for key \"{key}\": {message}")
            }
            BindingError::UnsupportedValue {
                key,
                expected,
                found,
            } => write!(
                f,
                "unsupported value type for key \"{key}\": expected {expected}, got {found}"
            ),
        }
    }
}

impl std::error::Error for BindingError {}
