//! Named stream store
//!
//! Streams are ordered line sequences that live for the whole run. A
//! missing stream reads as empty.

use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamStore {
    streams: BTreeMap<String, Vec<String>>,
}

impl StreamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines of `name`, or an empty slice if it was never written
    pub fn lines(&self, name: &str) -> &[String] {
        self.streams.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.streams.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.streams.contains_key(name)
    }

    /// Create or overwrite a stream
    pub fn store(&mut self, name: &str, lines: Vec<String>) {
        debug!(stream = name, lines = lines.len(), "stored stream");
        self.streams.insert(name.to_string(), lines);
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.streams.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// The whole store as a JSON object of string arrays
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.streams
                .iter()
                .map(|(name, lines)| {
                    let lines = lines.iter().cloned().map(serde_json::Value::String).collect();
                    (name.clone(), serde_json::Value::Array(lines))
                })
                .collect(),
        )
    }
}
