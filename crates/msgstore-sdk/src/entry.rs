//! Entries and their JSON wire projection.
//!
//! JSON carries text only, so key and value travel as standard (padded) base64
//! strings. The timestamp is carried through untouched, including its offset.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Seconds between 0001-01-01T00:00:00Z and the Unix epoch.
const UNSET_TIMESTAMP_SECS: i64 = -62_135_596_800;

/// A single record in a topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub timestamp: DateTime<FixedOffset>,
}

impl Entry {
    /// Builds an entry stamped with the current UTC time.
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            timestamp: Utc::now().fixed_offset(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// JSON-safe form of an [`Entry`].
///
/// `key` and `value` are optional on the way in because stores written in Go
/// serialise an empty byte slice as `null`. Encoding always emits strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEntry {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default = "unset_timestamp")]
    pub timestamp: DateTime<FixedOffset>,
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed payload: field '{field}' is not valid base64: {source}")]
    MalformedPayload {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
}

pub fn encode_entry(entry: &Entry) -> WireEntry {
    WireEntry {
        key: Some(STANDARD.encode(&entry.key)),
        value: Some(STANDARD.encode(&entry.value)),
        timestamp: entry.timestamp,
    }
}

pub fn decode_entry(wire: WireEntry) -> Result<Entry, CodecError> {
    Ok(Entry {
        key: decode_field("key", wire.key.as_deref())?,
        value: decode_field("value", wire.value.as_deref())?,
        timestamp: wire.timestamp,
    })
}

fn decode_field(field: &'static str, text: Option<&str>) -> Result<Vec<u8>, CodecError> {
    let Some(text) = text else {
        return Ok(Vec::new());
    };
    STANDARD
        .decode(text)
        .map_err(|source| CodecError::MalformedPayload { field, source })
}

// Matches the zero time a Go store reports when no timestamp was recorded.
fn unset_timestamp() -> DateTime<FixedOffset> {
    DateTime::from_timestamp(UNSET_TIMESTAMP_SECS, 0)
        .unwrap_or_default()
        .fixed_offset()
}
