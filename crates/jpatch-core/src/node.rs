use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::{ApplyError, CanonicalizeError, Number, PatchDocument, Pointer};

/// The JSON data model patches are applied to.
///
/// `Node` serializes to and from plain JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number.
    Number(Number),
    /// JSON string.
    String(String),
    /// JSON array.
    Array(Vec<Node>),
    /// JSON object with deterministic key ordering.
    Object(BTreeMap<String, Node>),
}

impl Node {
    /// Parses a JSON string into a node.
    ///
    /// ```
    /// # use jpatch_core::Node;
    /// let node = Node::from_json_str("{\"hello\":\"world\"}")?;
    /// assert!(matches!(node, Node::Object(_)));
    /// # Ok::<(), jpatch_core::CanonicalizeError>(())
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self, CanonicalizeError> {
        let value: JsonValue = serde_json::from_str(input)?;
        Self::from_json_value(value)
    }

    /// Parses a YAML string into a node.
    ///
    /// ```
    /// # use jpatch_core::Node;
    /// let node = Node::from_yaml_str("---\nanswer: 42\n")?;
    /// assert!(matches!(node, Node::Object(_)));
    /// # Ok::<(), jpatch_core::CanonicalizeError>(())
    /// ```
    pub fn from_yaml_str(input: &str) -> Result<Self, CanonicalizeError> {
        let value: YamlValue = serde_yaml::from_str(input)?;
        Self::from_yaml_value(value)
    }

    /// Converts a serde JSON value into a [`Node`].
    pub fn from_json_value(value: JsonValue) -> Result<Self, CanonicalizeError> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(v) => Ok(Self::Bool(v)),
            JsonValue::Number(num) => Ok(Self::Number(Number::from_json_number(&num)?)),
            JsonValue::String(s) => Ok(Self::String(s)),
            JsonValue::Array(values) => {
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    items.push(Self::from_json_value(value)?);
                }
                Ok(Self::Array(items))
            }
            JsonValue::Object(map) => {
                let mut object = BTreeMap::new();
                for (key, value) in map {
                    object.insert(key, Self::from_json_value(value)?);
                }
                Ok(Self::Object(object))
            }
        }
    }

    fn from_yaml_value(value: YamlValue) -> Result<Self, CanonicalizeError> {
        match value {
            YamlValue::Null => Ok(Self::Null),
            YamlValue::Bool(v) => Ok(Self::Bool(v)),
            YamlValue::Number(num) => Ok(Self::Number(Number::from_yaml_number(&num)?)),
            YamlValue::String(s) => Ok(Self::String(s)),
            YamlValue::Sequence(seq) => {
                let mut items = Vec::with_capacity(seq.len());
                for value in seq {
                    items.push(Self::from_yaml_value(value)?);
                }
                Ok(Self::Array(items))
            }
            YamlValue::Mapping(map) => {
                let mut object = BTreeMap::new();
                for (key, value) in map {
                    let key = match key {
                        YamlValue::String(s) => s,
                        other => {
                            return Err(CanonicalizeError::NonStringYamlKey {
                                found: format!("{other:?}"),
                            });
                        }
                    };
                    object.insert(key, Self::from_yaml_value(value)?);
                }
                Ok(Self::Object(object))
            }
            YamlValue::Tagged(tagged) => {
                Err(CanonicalizeError::UnsupportedYamlTag { tag: tagged.tag.to_string() })
            }
        }
    }

    /// Converts the node into a serde JSON value.
    #[must_use]
    pub fn to_json_value(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(v) => JsonValue::Bool(*v),
            Self::Number(n) => JsonValue::Number(n.to_json_number()),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Array(values) => JsonValue::Array(values.iter().map(Self::to_json_value).collect()),
            Self::Object(map) => {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key.clone(), value.to_json_value());
                }
                JsonValue::Object(object)
            }
        }
    }

    /// Renders the node as compact JSON text.
    ///
    /// ```
    /// # use jpatch_core::Node;
    /// let node = Node::from_json_str("{ \"b\": [1, 2.5], \"a\": null }")?;
    /// assert_eq!(node.to_json_string(), r#"{"a":null,"b":[1,2.5]}"#);
    /// # Ok::<(), jpatch_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.to_json_value().to_string()
    }

    /// Returns a short name for the node's variant, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Indicates whether the node is JSON `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string payload, if the node is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements, if the node is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the members, if the node is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Evaluates a JSON Pointer against this node.
    ///
    /// ```
    /// # use jpatch_core::{Node, Pointer};
    /// let doc = Node::from_json_str(r#"{"foo":["bar","baz"],"a/b":1}"#)?;
    /// let found = doc.lookup(&Pointer::parse("/foo/1")?)?;
    /// assert_eq!(found, &Node::String("baz".into()));
    /// assert!(doc.lookup(&Pointer::parse("/a~1b")?).is_ok());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn lookup(&self, pointer: &Pointer) -> Result<&Node, ApplyError> {
        crate::patch::lookup(self, pointer)
    }

    /// Applies a patch to this node, returning the patched node on success.
    ///
    /// ```
    /// # use jpatch_core::{Node, PatchDocument};
    /// let base = Node::from_json_str(r#"{"foo":"bar"}"#)?;
    /// let patch = PatchDocument::from_json_str(r#"[{"op":"add","path":"/baz","value":"qux"}]"#)?;
    /// let patched = base.apply_patch(&patch)?;
    /// assert_eq!(patched, Node::from_json_str(r#"{"foo":"bar","baz":"qux"}"#)?);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn apply_patch(&self, patch: &PatchDocument) -> Result<Self, ApplyError> {
        crate::patch::apply_patch(patch, self)
    }
}

impl TryFrom<JsonValue> for Node {
    type Error = CanonicalizeError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json_value(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Self::from_json_value(value).map_err(de::Error::custom)
    }
}

impl From<&Node> for JsonValue {
    fn from(node: &Node) -> Self {
        node.to_json_value()
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Self::Number(Number::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{
        collection::{btree_map, vec},
        prelude::*,
        string::string_regex,
    };

    fn arb_json_value() -> impl Strategy<Value = JsonValue> {
        let leaf = prop_oneof![
            Just(JsonValue::Null),
            any::<bool>().prop_map(JsonValue::Bool),
            proptest::num::f64::ANY.prop_filter_map("finite", |f| {
                if f.is_finite() {
                    serde_json::Number::from_f64(f).map(JsonValue::Number)
                } else {
                    None
                }
            }),
            string_regex("[a-zA-Z0-9]{0,8}").unwrap().prop_map(JsonValue::String),
        ];
        leaf.prop_recursive(4, 8, 4, move |inner| {
            prop_oneof![
                vec(inner.clone(), 0..4).prop_map(JsonValue::Array),
                btree_map(string_regex("[a-zA-Z0-9]{1,8}").unwrap(), inner, 0..4).prop_map(|map| {
                    let mut object = serde_json::Map::new();
                    for (k, v) in map {
                        object.insert(k, v);
                    }
                    JsonValue::Object(object)
                }),
            ]
        })
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(Node::from_json_str("   \n\t"), Err(CanonicalizeError::Json(_))));
    }

    #[test]
    fn json_object_roundtrip() {
        let node = Node::from_json_str("{\"a\":1,\"b\":true}").unwrap();
        let value = node.to_json_value();
        assert_eq!(value["a"].as_f64().unwrap(), 1.0);
        assert!(value["b"].as_bool().unwrap());
    }

    #[test]
    fn json_number_to_json_value_is_minimal() {
        let node = Node::from_json_str("5").unwrap();
        assert_eq!(node.to_json_value(), serde_json::json!(5));
    }

    #[test]
    fn json_number_out_of_range_yields_error() {
        let err = Node::from_json_str("1e400").unwrap_err();
        match err {
            CanonicalizeError::NumberOutOfRange { .. } | CanonicalizeError::Json(_) => {}
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn yaml_non_string_key_errors() {
        let err = Node::from_yaml_str("? [1, 2]: 3").unwrap_err();
        let CanonicalizeError::NonStringYamlKey { .. } = err else {
            panic!("expected NonStringYamlKey error");
        };
    }

    #[test]
    fn accessors_reject_other_variants() {
        let node = Node::from_json_str("[1,\"two\"]").unwrap();
        assert_eq!(node.as_array().map(<[Node]>::len), Some(2));
        assert!(node.as_object().is_none());
        assert_eq!(node.kind_name(), "array");
        assert_eq!(Node::from("two").as_str(), Some("two"));
        assert!(Node::Null.is_null());
    }

    #[test]
    fn numbers_compare_by_value() {
        let lhs = Node::from_json_str("1").unwrap();
        let rhs = Node::from_json_str("1.0").unwrap();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn large_numbers_survive_a_round_trip() {
        let text = r#"{"id":9007199254740993,"neg":-9223372036854775808,"u":18446744073709551615}"#;
        assert_eq!(Node::from_json_str(text).unwrap().to_json_string(), text);
        let yaml = Node::from_yaml_str("id: 9007199254740993\n").unwrap();
        assert_eq!(yaml.to_json_string(), r#"{"id":9007199254740993}"#);
    }

    #[test]
    fn serde_uses_plain_json() {
        let node = Node::from_json_str(r#"{"a":[1,2.5,null],"b":"x"}"#).unwrap();
        let text = serde_json::to_string(&node).unwrap();
        assert_eq!(text, r#"{"a":[1,2.5,null],"b":"x"}"#);
        let back: Node = serde_json::from_str(&text).unwrap();
        assert_eq!(back, node);
    }

    proptest! {
        #[test]
        fn json_roundtrips_through_node(value in arb_json_value()) {
            let node = Node::from_json_value(value).unwrap();
            let reconstructed = node.to_json_value();
            let node_again = Node::from_json_value(reconstructed).unwrap();
            prop_assert_eq!(node_again, node);
        }
    }
}
