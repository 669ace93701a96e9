//! Parsing of RFC 6902 patch documents into validated [`Operation`]s.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::{ApplyError, Node, Operation, OperationKind, PatchFormatError, Pointer};

const OP: &str = "op";
const PATH: &str = "path";
const VALUE: &str = "value";
const FROM: &str = "from";

/// An ordered, non-empty list of patch operations.
///
/// ```
/// # use jpatch_core::{OperationKind, PatchDocument};
/// let patch = PatchDocument::from_json_str(r#"[
///     { "op": "remove", "path": "/foo" },
///     { "op": "add", "path": "/bar", "value": "foo" }
/// ]"#)?;
/// let kinds: Vec<_> = patch.iter().map(|op| op.kind()).collect();
/// assert_eq!(kinds, [OperationKind::Remove, OperationKind::Add]);
/// # Ok::<(), jpatch_core::PatchFormatError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PatchDocument {
    operations: Vec<Operation>,
}

impl PatchDocument {
    /// Builds a patch from already constructed operations.
    ///
    /// ```
    /// # use jpatch_core::{PatchDocument, PatchFormatError};
    /// let err = PatchDocument::from_operations(Vec::new()).unwrap_err();
    /// assert!(matches!(err, PatchFormatError::PatchWithEmpty));
    /// ```
    pub fn from_operations(operations: Vec<Operation>) -> Result<Self, PatchFormatError> {
        if operations.is_empty() {
            return Err(PatchFormatError::PatchWithEmpty);
        }
        Ok(Self { operations })
    }

    /// Parses a patch from JSON text holding one operation or an array of them.
    pub fn from_json_str(input: &str) -> Result<Self, PatchFormatError> {
        let node = Node::from_json_str(input)?;
        Self::from_node(&node)
    }

    /// Parses a patch from YAML text holding one operation or a sequence of them.
    ///
    /// ```
    /// # use jpatch_core::PatchDocument;
    /// let patch = PatchDocument::from_yaml_str("- op: remove\n  path: /foo\n")?;
    /// assert_eq!(patch.len(), 1);
    /// # Ok::<(), jpatch_core::PatchFormatError>(())
    /// ```
    pub fn from_yaml_str(input: &str) -> Result<Self, PatchFormatError> {
        let node = Node::from_yaml_str(input)?;
        Self::from_node(&node)
    }

    /// Parses a patch from a serde JSON value.
    pub fn from_json_value(value: JsonValue) -> Result<Self, PatchFormatError> {
        let node = Node::from_json_value(value)?;
        Self::from_node(&node)
    }

    /// Parses a patch from a node holding one operation or an array of them.
    pub fn from_node(node: &Node) -> Result<Self, PatchFormatError> {
        let operations = match node {
            Node::Object(members) => vec![parse_operation(members)?],
            Node::Array(items) => {
                if items.is_empty() {
                    return Err(PatchFormatError::PatchWithEmpty);
                }
                let mut operations = Vec::with_capacity(items.len());
                for item in items {
                    let Node::Object(members) = item else {
                        return Err(PatchFormatError::OpElementNotFound);
                    };
                    operations.push(parse_operation(members)?);
                }
                operations
            }
            _ => return Err(PatchFormatError::InvalidRootElement),
        };
        debug!(operations = operations.len(), "parsed patch document");
        Ok(Self { operations })
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Always `false`: a patch holds at least one operation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns the operations in application order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Iterates over the operations in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// Consumes the patch and returns the owned operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    /// Applies the patch to `document`, see [`Node::apply_patch`].
    pub fn apply(&self, document: &Node) -> Result<Node, ApplyError> {
        crate::patch::apply_patch(self, document)
    }

    /// Renders the patch as a JSON array of operations.
    #[must_use]
    pub fn to_json_value(&self) -> JsonValue {
        JsonValue::Array(self.operations.iter().map(Operation::to_json_value).collect())
    }

    /// Renders the patch as compact JSON text.
    ///
    /// ```
    /// # use jpatch_core::PatchDocument;
    /// let patch = PatchDocument::from_json_str(r#"{"path":"/a","op":"remove","extra":1}"#)?;
    /// assert_eq!(patch.to_json_string(), r#"[{"op":"remove","path":"/a"}]"#);
    /// # Ok::<(), jpatch_core::PatchFormatError>(())
    /// ```
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.to_json_value().to_string()
    }
}

impl TryFrom<Vec<Operation>> for PatchDocument {
    type Error = PatchFormatError;

    fn try_from(operations: Vec<Operation>) -> Result<Self, Self::Error> {
        Self::from_operations(operations)
    }
}

impl TryFrom<JsonValue> for PatchDocument {
    type Error = PatchFormatError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json_value(value)
    }
}

impl std::str::FromStr for PatchDocument {
    type Err = PatchFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_str(s)
    }
}

impl<'a> IntoIterator for &'a PatchDocument {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

impl IntoIterator for PatchDocument {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

fn parse_operation(members: &BTreeMap<String, Node>) -> Result<Operation, PatchFormatError> {
    let op = members.get(OP).and_then(Node::as_str).ok_or(PatchFormatError::OpElementNotFound)?;
    let kind: OperationKind = op.parse()?;

    let path =
        members.get(PATH).and_then(Node::as_str).ok_or(PatchFormatError::PathElementNotFound)?;
    let pointer = Pointer::parse(path)?;

    let from = if kind.requires_from() {
        let raw =
            members.get(FROM).and_then(Node::as_str).ok_or(PatchFormatError::FromElementNotFound)?;
        Some(Pointer::parse(raw)?)
    } else {
        None
    };

    let value = match members.get(VALUE) {
        Some(value) if kind.carries_value() => value.clone(),
        _ => Node::Null,
    };
    if kind.requires_value() && value.is_null() {
        return Err(PatchFormatError::ValueElementNotFound);
    }

    Ok(Operation::new(kind, pointer, value, from))
}
