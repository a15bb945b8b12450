//! Memory record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Longest summary prefix, in characters, before the truncation marker.
pub const SUMMARY_MAX_CHARS: usize = 200;
const TRUNCATION_MARKER: &str = "...";

/// One stored interaction.
///
/// Every field is defaulted on read so files written by older builds (no
/// timestamp, no summary) still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    pub content: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl MemoryRecord {
    /// Build a record stamped with the current time.
    pub fn new(content: impl Into<String>, metadata: BTreeMap<String, String>) -> Self {
        let content = content.into();
        Self {
            summary: summarize(&content),
            content,
            metadata,
            timestamp: Utc::now(),
        }
    }

    /// Fill fields an older file may have left blank.
    pub(crate) fn repaired(mut self) -> Self {
        if self.summary.is_empty() && !self.content.is_empty() {
            self.summary = summarize(&self.content);
        }
        self
    }

    /// Case-insensitive substring test against `content`.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.content.to_lowercase().contains(needle)
    }
}

/// Accept non-string metadata values (numbers, bools) by rendering them as
/// JSON text; `null` entries are dropped.
fn lenient_metadata<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((key, text)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

/// First `SUMMARY_MAX_CHARS` characters of `content`, with `...` appended
/// when anything was cut.
pub fn summarize(content: &str) -> String {
    match content.char_indices().nth(SUMMARY_MAX_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &content[..cut]),
        None => content.to_string(),
    }
}
