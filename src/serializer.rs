//! Serialization layer. Defaults to JSON via serde_json.
//!
//! The backing file is always a single array of records; implement
//! [`Serializer`] if you need the same shape in another encoding.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Converts snapshots to/from bytes for persistence.
pub trait Serializer: Send + Sync {
    /// Encode a snapshot to bytes.
    fn serialize<T: Serialize>(&self, records: &[T]) -> Result<Vec<u8>>;

    /// Decode bytes back into a snapshot.
    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Vec<T>>;
}

/// JSON serializer with optional pretty-printing.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed JSON with indentation, easier to read by hand.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Serializer for JsonSerializer {
    fn serialize<T: Serialize>(&self, records: &[T]) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(records)
        } else {
            serde_json::to_vec(records)
        };
        bytes.map_err(|e| Error::Serialize(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Vec<T>> {
        serde_json::from_slice(bytes).map_err(Error::from)
    }
}
