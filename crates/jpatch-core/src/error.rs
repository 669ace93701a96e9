use thiserror::Error;

/// Errors that can occur while canonicalizing external data into [`Node`].
///
/// [`Node`]: crate::Node
#[derive(Debug, Error)]
pub enum CanonicalizeError {
    /// The provided JSON input was invalid.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The provided YAML input was invalid.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Encountered a number that cannot be represented as an IEEE-754 f64.
    #[error("number {value} cannot be represented as f64")]
    NumberOutOfRange {
        /// The textual representation of the offending number.
        value: String,
    },
    /// YAML maps may only contain string keys.
    #[error("unsupported YAML key type: {found}")]
    NonStringYamlKey {
        /// A description of the key that triggered the error.
        found: String,
    },
    /// YAML tags have no JSON counterpart and are rejected.
    #[error("unsupported YAML tag: {tag}")]
    UnsupportedYamlTag {
        /// The tag identifier encountered in the document.
        tag: String,
    },
    /// Attempted to construct a [`Number`] that is not finite.
    ///
    /// [`Number`]: crate::Number
    #[error("non-finite number encountered: {value}")]
    NotFinite {
        /// The offending numeric value.
        value: f64,
    },
}

/// Syntax errors raised while parsing a JSON Pointer.
///
/// ```
/// # use jpatch_core::{Pointer, PointerError};
/// let err = Pointer::parse("a/b").unwrap_err();
/// assert!(matches!(err, PointerError::MissingDelimiter { .. }));
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PointerError {
    /// A non-empty pointer did not start with `/`.
    #[error("value does not contain delimiter: {raw:?}")]
    MissingDelimiter {
        /// The rejected raw pointer.
        raw: String,
    },
    /// The pointer contains an empty reference token (`/`, `/a//b`, `/a/`).
    #[error("value contains an empty reference token: {raw:?}")]
    EmptyReferenceToken {
        /// The rejected raw pointer.
        raw: String,
    },
}

/// Errors raised while building a [`PatchDocument`] from its wire shape.
///
/// [`PatchDocument`]: crate::PatchDocument
#[derive(Debug, Error)]
pub enum PatchFormatError {
    /// The source text could not be parsed.
    #[error("Could not parse patch: {0}")]
    InvalidJsonFormat(#[from] CanonicalizeError),
    /// An operation is missing the `op` member or it is not a string.
    #[error("Could not find 'op' element.")]
    OpElementNotFound,
    /// An operation is missing the `path` member or it is not a string.
    #[error("Could not find 'path' element.")]
    PathElementNotFound,
    /// A `move` or `copy` operation is missing the `from` member.
    #[error("Could not find 'from' element.")]
    FromElementNotFound,
    /// An `add` or `replace` operation is missing the `value` member.
    #[error("Could not find 'value' element.")]
    ValueElementNotFound,
    /// The `op` member names an unknown operation.
    #[error("Operation is invalid: {op:?}")]
    InvalidOperation {
        /// The unrecognized operation name.
        op: String,
    },
    /// The patch is an empty array.
    #[error("Patch array does not contain elements.")]
    PatchWithEmpty,
    /// The root of the patch is neither an object nor an array.
    #[error("Root element is not an array of dictionaries or a single dictionary.")]
    InvalidRootElement,
    /// A `path` or `from` member is not a valid JSON Pointer.
    #[error("invalid pointer: {0}")]
    PointerSyntax(#[from] PointerError),
}

/// Errors raised while applying a [`PatchDocument`] to a document.
///
/// ```
/// # use jpatch_core::{ApplyError, Node, PatchDocument};
/// let doc = Node::from_json_str(r#"{"a":[23,42]}"#)?;
/// let patch = PatchDocument::from_json_str(r#"{"op":"add","path":"/a/42","value":"bar"}"#)?;
/// let err = doc.apply_patch(&patch).unwrap_err();
/// assert!(matches!(err, ApplyError::ArrayIndexOutOfBounds { .. }));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplyError {
    /// An array index lies outside the range permitted by the operation.
    #[error("array index {token} out of bounds at {pointer:?} (length {len})")]
    ArrayIndexOutOfBounds {
        /// The pointer being evaluated.
        pointer: String,
        /// The offending reference token.
        token: String,
        /// Length of the addressed array.
        len: usize,
    },
    /// A reference token used against an array is not a decimal index.
    #[error("invalid array index {token:?} at {pointer:?}")]
    InvalidArrayIndex {
        /// The pointer being evaluated.
        pointer: String,
        /// The offending reference token.
        token: String,
    },
    /// A `test` operation did not match.
    #[error("Could not validate JSON: {message}")]
    ValidationError {
        /// Details about the failed comparison.
        message: String,
    },
    /// The document does not have the shape the pointer requires.
    #[error("invalid JSON at {pointer:?}: {reason}")]
    InvalidJson {
        /// The pointer being evaluated.
        pointer: String,
        /// What went wrong.
        reason: String,
    },
}
