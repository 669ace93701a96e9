//! RFC 6902 JSON Patch and RFC 6901 JSON Pointer for Rust.
//!
//! `jpatch-core` parses patch documents into validated [`Operation`]s and
//! applies them, in order, to a [`Node`] tree. Application never edits the
//! input document: the patched document is returned as a new value, or the
//! first failing operation's error is returned and nothing else is observed.
//!
//! ```
//! use jpatch_core::{Node, PatchDocument};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let doc = Node::from_json_str(r#"{"a":{"1":2},"b":{}}"#)?;
//!     let patch = PatchDocument::from_json_str(
//!         r#"[{"op":"move","from":"/a/1","path":"/b/1"},
//!             {"op":"test","path":"/b/1","value":2}]"#,
//!     )?;
//!
//!     let patched = doc.apply_patch(&patch)?;
//!     assert_eq!(patched, Node::from_json_str(r#"{"a":{},"b":{"1":2}}"#)?);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod error;
mod node;
mod number;
mod operation;
mod patch;
pub mod pointer;

pub use document::PatchDocument;
pub use error::{ApplyError, CanonicalizeError, PatchFormatError, PointerError};
pub use node::Node;
pub use number::Number;
pub use operation::{Operation, OperationKind};
pub use pointer::{escape_token, unescape_token, Pointer};

/// Applies `patch` to `document`, returning the patched document.
///
/// ```
/// # use jpatch_core::{apply, Node, PatchDocument};
/// let doc = Node::from_json_str(r#"["foo",42,"bar"]"#)?;
/// let patch = PatchDocument::from_json_str(r#"{"op":"add","path":"/2","value":"42"}"#)?;
/// assert_eq!(apply(&patch, &doc)?, Node::from_json_str(r#"["foo",42,"42","bar"]"#)?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn apply(patch: &PatchDocument, document: &Node) -> Result<Node, ApplyError> {
    patch::apply_patch(patch, document)
}

/// Returns the semantic version of the `jpatch-core` crate.
///
/// ```
/// assert!(!jpatch_core::version().is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
