//! String encodings for bound values.

use crate::search::PrimitiveKind;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub enum CodecError {
    Serialize(String),
    UnsupportedValue {
        expected: PrimitiveKind,
        found: PrimitiveKind,
    },
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Serialize(msg) => write!(f, "serialize failed: {msg}"),
            CodecError::UnsupportedValue { expected, found } => {
                write!(f, "expected {expected}, got {found}")
            }
        }
    }
}

impl std::error::Error for CodecError {}

type SerializeFn<V> = Rc<dyn Fn(&V) -> Result<String, CodecError>>;
type DeserializeFn<V> = Rc<dyn Fn(&str) -> Option<V>>;

/// Pair of string conversions for one bound key.
///
/// `decode` answers `None` for malformed input; bindings turn that into
/// their initial value, so decoding never fails loudly.
pub struct Codec<V> {
    serialize: SerializeFn<V>,
    deserialize: DeserializeFn<V>,
}

impl<V> Clone for Codec<V> {
    fn clone(&self) -> Self {
        Self {
            serialize: self.serialize.clone(),
            deserialize: self.deserialize.clone(),
        }
    }
}

impl<V: 'static> Codec<V> {
    pub fn new(
        serialize: impl Fn(&V) -> String + 'static,
        deserialize: impl Fn(&str) -> Option<V> + 'static,
    ) -> Self {
        Self::fallible(move |v| Ok(serialize(v)), deserialize)
    }

    pub fn fallible(
        serialize: impl Fn(&V) -> Result<String, CodecError> + 'static,
        deserialize: impl Fn(&str) -> Option<V> + 'static,
    ) -> Self {
        Self {
            serialize: Rc::new(serialize),
            deserialize: Rc::new(deserialize),
        }
    }

    pub fn encode(&self, value: &V) -> Result<String, CodecError> {
        (self.serialize)(value)
    }

    pub fn decode(&self, raw: &str) -> Option<V> {
        (self.deserialize)(raw)
    }

    pub fn with_serialize(mut self, serialize: impl Fn(&V) -> String + 'static) -> Self {
        self.serialize = Rc::new(move |v| Ok(serialize(v)));
        self
    }

    pub fn with_deserialize(mut self, deserialize: impl Fn(&str) -> Option<V> + 'static) -> Self {
        self.deserialize = Rc::new(deserialize);
        self
    }
}

impl<V: Serialize + DeserializeOwned + 'static> Codec<V> {
    /// JSON text via `serde_json`.
    pub fn json() -> Self {
        Self::fallible(
            |v| serde_json::to_string(v).map_err(|e| CodecError::Serialize(e.to_string())),
            |raw| serde_json::from_str(raw).ok(),
        )
    }
}

impl<V> std::fmt::Debug for Codec<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Codec { .. }")
    }
}
