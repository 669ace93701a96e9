//! Benchmark corpora for the `jpatch` engine.
//!
//! Each [`Corpus`] generates a deterministic document together with a patch
//! that applies cleanly to it, so Criterion groups can measure parsing and
//! application without reading fixtures from disk.
//!
//! # Examples
//!
//! ```
//! let corpus = jpatch_benches::available_corpora()
//!     .iter()
//!     .find(|corpus| corpus.name() == "flat-object")
//!     .expect("registered corpus");
//! let dataset = corpus.load()?;
//! let patched = dataset.document().apply_patch(dataset.patch())?;
//! assert_ne!(&patched, dataset.document());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use jpatch_core::{CanonicalizeError, Node, PatchDocument, PatchFormatError};
use serde_json::{json, Value as JsonValue};

/// A named generator for a benchmark dataset.
#[derive(Clone, Copy, Debug)]
pub struct Corpus {
    name: &'static str,
    size: usize,
    build: fn(usize) -> (JsonValue, JsonValue),
}

impl Corpus {
    /// Returns the identifier used as the Criterion parameter.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the serialized size of the document and patch, in bytes.
    #[must_use]
    pub fn fixture_bytes(&self) -> usize {
        let (document, patch) = (self.build)(self.size);
        document.to_string().len() + patch.to_string().len()
    }

    /// Generates the raw JSON texts for the document and patch.
    #[must_use]
    pub fn texts(&self) -> (String, String) {
        let (document, patch) = (self.build)(self.size);
        (document.to_string(), patch.to_string())
    }

    /// Generates and parses the dataset.
    pub fn load(&self) -> Result<Dataset, LoadError> {
        let (document, patch) = (self.build)(self.size);
        Ok(Dataset {
            document: Node::from_json_value(document)?,
            patch: PatchDocument::from_json_value(patch)?,
        })
    }
}

/// A parsed document and the patch to apply to it.
#[derive(Clone, Debug)]
pub struct Dataset {
    document: Node,
    patch: PatchDocument,
}

impl Dataset {
    /// Returns the unpatched document.
    #[must_use]
    pub fn document(&self) -> &Node {
        &self.document
    }

    /// Returns the patch.
    #[must_use]
    pub fn patch(&self) -> &PatchDocument {
        &self.patch
    }
}

/// Failure to turn generated JSON into a dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The generated document was rejected.
    #[error(transparent)]
    Document(#[from] CanonicalizeError),
    /// The generated patch was rejected.
    #[error(transparent)]
    Patch(#[from] PatchFormatError),
}

static CORPORA: [Corpus; 3] = [
    Corpus { name: "flat-object", size: 512, build: flat_object },
    Corpus { name: "long-array", size: 2_048, build: long_array },
    Corpus { name: "nested-config", size: 6, build: nested_config },
];

/// Returns every registered corpus.
#[must_use]
pub fn available_corpora() -> &'static [Corpus] {
    &CORPORA
}

fn flat_object(size: usize) -> (JsonValue, JsonValue) {
    let document: serde_json::Map<String, JsonValue> =
        (0..size).map(|i| (format!("key{i}"), json!(i))).collect();
    let mut patch = Vec::new();
    for i in (0..size).step_by(4) {
        patch.push(json!({"op": "test", "path": format!("/key{i}"), "value": i}));
        patch.push(json!({"op": "replace", "path": format!("/key{i}"), "value": format!("v{i}")}));
    }
    for i in (1..size).step_by(8) {
        patch.push(json!({"op": "remove", "path": format!("/key{i}")}));
    }
    patch.push(json!({"op": "add", "path": "/extra~1slash", "value": {"nested": [1, 2, 3]}}));
    (JsonValue::Object(document), JsonValue::Array(patch))
}

fn long_array(size: usize) -> (JsonValue, JsonValue) {
    let document: Vec<JsonValue> = (0..size).map(|i| json!({"id": i, "tags": ["a", "b"]})).collect();
    let mut patch = Vec::new();
    for i in (0..size).step_by(64) {
        patch.push(json!({"op": "add", "path": "/-", "value": {"id": size + i}}));
        patch.push(json!({"op": "move", "from": format!("/{i}"), "path": "/0"}));
        patch.push(json!({"op": "copy", "from": "/0/tags", "path": format!("/{i}/copied")}));
    }
    (JsonValue::Array(document), JsonValue::Array(patch))
}

fn nested_config(depth: usize) -> (JsonValue, JsonValue) {
    let mut document = json!({"leaf": true, "items": [1, 2, 3]});
    let mut path = String::new();
    for level in (0..depth).rev() {
        document = json!({format!("level{level}"): document, "sibling": level});
    }
    for level in 0..depth {
        path.push_str(&format!("/level{level}"));
    }
    let patch = json!([
        {"op": "test", "path": format!("{path}/leaf"), "value": true},
        {"op": "replace", "path": format!("{path}/leaf"), "value": false},
        {"op": "add", "path": format!("{path}/items/1"), "value": 9},
        {"op": "copy", "from": format!("{path}/items"), "path": "/items"},
        {"op": "move", "from": "/sibling", "path": format!("{path}/sibling")},
    ]);
    (document, patch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_corpus_applies_cleanly() {
        for corpus in available_corpora() {
            let dataset = corpus.load().expect("corpus loads");
            dataset
                .document()
                .apply_patch(dataset.patch())
                .unwrap_or_else(|err| panic!("{} failed: {err}", corpus.name()));
        }
    }

    #[test]
    fn texts_match_fixture_bytes() {
        for corpus in available_corpora() {
            let (document, patch) = corpus.texts();
            assert_eq!(document.len() + patch.len(), corpus.fixture_bytes());
        }
    }
}
