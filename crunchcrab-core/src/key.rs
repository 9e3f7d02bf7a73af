//! Composite grouping keys.
//!
//! A [`CompositeKey`] is an immutable ordered sequence of typed fields used
//! purely as a grouping/ordering token; it carries no aggregation state.
//! Two keys are equal iff all fields are equal in declared order, ordering is
//! lexicographic over the fields, and the hash is consistent with equality.
//! Those three contracts are what the partitioner and the shuffle rely on.
//!
//! Byte encoding for transport lives in separate functions
//! ([`encode`]/[`decode`]) so the wire format never couples to the
//! comparison logic.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One typed field of a composite key.
///
/// Keys within a single job share one field schema, so cross-variant
/// comparisons do not occur in practice; the derived order (text before
/// integer) keeps `Ord` total anyway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyField {
    Text(String),
    Int(i64),
}

impl KeyField {
    /// Text field.
    pub fn text(value: impl Into<String>) -> Self {
        KeyField::Text(value.into())
    }

    /// Integer field.
    pub fn int(value: i64) -> Self {
        KeyField::Int(value)
    }
}

impl std::fmt::Display for KeyField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyField::Text(s) => f.write_str(s),
            KeyField::Int(v) => write!(f, "{}", v),
        }
    }
}

/// An immutable ordered tuple of typed fields with a deterministic total
/// order: the first non-equal field decides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompositeKey(Vec<KeyField>);

impl CompositeKey {
    /// Build a key from fields in declared order.
    pub fn new(fields: Vec<KeyField>) -> Self {
        Self(fields)
    }

    /// The fields in declared order.
    pub fn fields(&self) -> &[KeyField] {
        &self.0
    }
}

impl From<Vec<KeyField>> for CompositeKey {
    fn from(fields: Vec<KeyField>) -> Self {
        Self::new(fields)
    }
}

/// Renders the fields tab-separated, the key prefix of an output line.
impl std::fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\t")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

/// Encode a key to bytes for transport between processes.
pub fn encode(key: &CompositeKey) -> Result<Vec<u8>> {
    bincode::serialize(key).map_err(|e| Error::Codec(e.to_string()))
}

/// Decode a key previously produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<CompositeKey> {
    bincode::deserialize(bytes).map_err(|e| Error::Codec(e.to_string()))
}
