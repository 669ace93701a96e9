use std::fmt;
use std::str::FromStr;

use serde_json::Value as JsonValue;

use crate::{Node, PatchFormatError, Pointer};

/// The six operation kinds defined by RFC 6902.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Insert or overwrite a value.
    Add,
    /// Delete a value.
    Remove,
    /// Overwrite an existing value.
    Replace,
    /// Remove a value and add it elsewhere.
    Move,
    /// Add a copy of a value elsewhere.
    Copy,
    /// Assert that a value equals the expected one.
    Test,
}

impl OperationKind {
    /// All kinds, in RFC order.
    pub const ALL: [Self; 6] =
        [Self::Add, Self::Remove, Self::Replace, Self::Move, Self::Copy, Self::Test];

    /// Returns the wire name of the kind.
    ///
    /// ```
    /// # use jpatch_core::OperationKind;
    /// assert_eq!(OperationKind::Replace.as_str(), "replace");
    /// ```
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::Move => "move",
            Self::Copy => "copy",
            Self::Test => "test",
        }
    }

    /// Indicates whether the kind reads its value from a `from` pointer.
    #[must_use]
    pub fn requires_from(self) -> bool {
        matches!(self, Self::Move | Self::Copy)
    }

    /// Indicates whether the kind must carry a non-null `value`.
    #[must_use]
    pub fn requires_value(self) -> bool {
        matches!(self, Self::Add | Self::Replace)
    }

    /// Indicates whether the kind carries a `value` member on the wire.
    #[must_use]
    pub fn carries_value(self) -> bool {
        matches!(self, Self::Add | Self::Replace | Self::Test)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = PatchFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PatchFormatError::InvalidOperation { op: s.to_owned() })
    }
}

/// A single validated patch step.
///
/// Operations are normally produced by [`PatchDocument`] parsing, but can
/// also be built directly:
///
/// ```
/// # use jpatch_core::{Node, Operation, OperationKind, Pointer};
/// let op = Operation::add(Pointer::parse("/baz")?, Node::from("qux"));
/// assert_eq!(op.kind(), OperationKind::Add);
/// assert_eq!(op.to_json_value(), serde_json::json!({"op":"add","path":"/baz","value":"qux"}));
/// # Ok::<(), jpatch_core::PointerError>(())
/// ```
///
/// [`PatchDocument`]: crate::PatchDocument
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    kind: OperationKind,
    pointer: Pointer,
    value: Node,
    from: Option<Pointer>,
}

impl Operation {
    pub(crate) fn new(
        kind: OperationKind,
        pointer: Pointer,
        value: Node,
        from: Option<Pointer>,
    ) -> Self {
        Self { kind, pointer, value, from }
    }

    /// Creates an `add` operation.
    #[must_use]
    pub fn add(pointer: Pointer, value: Node) -> Self {
        Self::new(OperationKind::Add, pointer, value, None)
    }

    /// Creates a `remove` operation.
    #[must_use]
    pub fn remove(pointer: Pointer) -> Self {
        Self::new(OperationKind::Remove, pointer, Node::Null, None)
    }

    /// Creates a `replace` operation.
    #[must_use]
    pub fn replace(pointer: Pointer, value: Node) -> Self {
        Self::new(OperationKind::Replace, pointer, value, None)
    }

    /// Creates a `move` operation taking the value at `from` to `pointer`.
    #[must_use]
    pub fn move_value(from: Pointer, pointer: Pointer) -> Self {
        Self::new(OperationKind::Move, pointer, Node::Null, Some(from))
    }

    /// Creates a `copy` operation duplicating the value at `from` to `pointer`.
    #[must_use]
    pub fn copy(from: Pointer, pointer: Pointer) -> Self {
        Self::new(OperationKind::Copy, pointer, Node::Null, Some(from))
    }

    /// Creates a `test` operation.
    #[must_use]
    pub fn test(pointer: Pointer, value: Node) -> Self {
        Self::new(OperationKind::Test, pointer, value, None)
    }

    /// Returns the operation kind.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Returns the target location (the `path` member).
    #[must_use]
    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    /// Returns the operation's value; `null` for kinds without one.
    #[must_use]
    pub fn value(&self) -> &Node {
        &self.value
    }

    /// Returns the source location for `move` and `copy`.
    #[must_use]
    pub fn from(&self) -> Option<&Pointer> {
        self.from.as_ref()
    }

    /// Renders the operation in its RFC 6902 wire shape.
    #[must_use]
    pub fn to_json_value(&self) -> JsonValue {
        let mut object = serde_json::Map::new();
        object.insert("op".into(), JsonValue::String(self.kind.as_str().into()));
        if let Some(from) = &self.from {
            object.insert("from".into(), JsonValue::String(from.raw().into()));
        }
        object.insert("path".into(), JsonValue::String(self.pointer.raw().into()));
        if self.kind.carries_value() {
            object.insert("value".into(), self.value.to_json_value());
        }
        JsonValue::Object(object)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.from {
            Some(from) => write!(f, "{} {:?} -> {:?}", self.kind, from.raw(), self.pointer.raw()),
            None => write!(f, "{} {:?}", self.kind, self.pointer.raw()),
        }
    }
}
