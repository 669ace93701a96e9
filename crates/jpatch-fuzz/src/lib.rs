//! Fuzzing harnesses for the `jpatch` engine.
//!
//! Each public function accepts raw bytes so it can be driven from a
//! `cargo fuzz` target as well as from ordinary unit tests. Recoverable
//! errors are swallowed; broken invariants panic so the fuzzer records them.
//!
//! ```
//! jpatch_fuzz::fuzz_pointer(b"/a~1b/~0c");
//! jpatch_fuzz::fuzz_patch_document(br#"[{"op":"remove","path":"/a"}]"#);
//! jpatch_fuzz::fuzz_apply(&[7, 1, 3, 9, 4, 2]);
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use arbitrary::Unstructured;
use jpatch_core::{Node, Operation, OperationKind, PatchDocument, Pointer};
use serde_json::{self, Map as JsonMap, Number as JsonNumber, Value as JsonValue};

const MAX_DEPTH: usize = 4;
const MAX_ARRAY_LEN: u8 = 6;
const MAX_OBJECT_LEN: u8 = 6;
const MAX_STRING_LEN: u8 = 12;
const MAX_OPERATIONS: u8 = 8;

/// Parses arbitrary bytes as a JSON Pointer and checks the encoding invariants.
///
/// A pointer that parses must survive re-encoding of its tokens, and every
/// proper prefix produced by [`Pointer::parent`] must be an ancestor of it.
///
/// ```
/// jpatch_fuzz::fuzz_pointer(b"/foo/0");
/// ```
pub fn fuzz_pointer(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(pointer) = Pointer::parse(text) else {
        return;
    };

    let rebuilt = Pointer::from_tokens(pointer.tokens().iter().cloned())
        .expect("parsed tokens are never empty");
    let reparsed = Pointer::parse(rebuilt.raw()).expect("encoded pointer must parse");
    assert_eq!(reparsed, pointer, "token encoding is not stable for {text:?}");

    if let Some(parent) = pointer.parent() {
        assert!(pointer.is_descendant_of(&parent));
        assert_eq!(parent.len() + 1, pointer.len());
    }
}

/// Parses arbitrary bytes as a JSON or YAML patch document.
///
/// Documents that parse are serialized back to JSON and parsed again; the
/// second parse must yield the same operations.
///
/// ```
/// jpatch_fuzz::fuzz_patch_document(b"op: test\npath: /a\nvalue: 1\n");
/// ```
pub fn fuzz_patch_document(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    for patch in [PatchDocument::from_json_str(text), PatchDocument::from_yaml_str(text)]
        .into_iter()
        .flatten()
    {
        let encoded = patch.to_json_string();
        let reparsed =
            PatchDocument::from_json_str(&encoded).expect("serialized patch must parse again");
        assert_eq!(reparsed, patch, "patch did not survive serialization: {encoded}");
    }
}

/// Applies a randomly generated patch to a randomly generated document.
///
/// Paths are drawn mostly from locations that exist in the document so the
/// engine's success paths get exercised alongside its error paths.
///
/// ```
/// jpatch_fuzz::fuzz_apply(b"apply fuzz");
/// ```
pub fn fuzz_apply(data: &[u8]) {
    let mut unstructured = Unstructured::new(data);
    let Some(document) = random_node(&mut unstructured) else {
        return;
    };

    let whole = PatchDocument::from_operations(vec![Operation::test(
        Pointer::root(),
        document.clone(),
    )])
    .expect("single operation patch");
    assert!(document.apply_patch(&whole).is_ok(), "document must test equal to itself");

    let Ok(operations) = random_operations(&mut unstructured, &document) else {
        return;
    };
    let Ok(patch) = PatchDocument::from_operations(operations) else {
        return;
    };
    let snapshot = document.clone();
    let _ = document.apply_patch(&patch);
    assert_eq!(document, snapshot, "apply must not modify its input");
}

fn random_operations(
    unstructured: &mut Unstructured<'_>,
    document: &Node,
) -> Result<Vec<Operation>, arbitrary::Error> {
    let mut paths = Vec::new();
    collect_paths(document, &Pointer::root(), &mut paths);

    let count = usize::from(unstructured.int_in_range::<u8>(1..=MAX_OPERATIONS)?);
    let mut operations = Vec::with_capacity(count);
    for _ in 0..count {
        let kind = *unstructured.choose(&OperationKind::ALL)?;
        let pointer = random_pointer(unstructured, &paths)?;
        let operation = match kind {
            OperationKind::Add => Operation::add(pointer, leaf_node(unstructured)?),
            OperationKind::Remove => Operation::remove(pointer),
            OperationKind::Replace => Operation::replace(pointer, leaf_node(unstructured)?),
            OperationKind::Move => {
                Operation::move_value(random_pointer(unstructured, &paths)?, pointer)
            }
            OperationKind::Copy => Operation::copy(random_pointer(unstructured, &paths)?, pointer),
            OperationKind::Test => Operation::test(pointer, leaf_node(unstructured)?),
        };
        operations.push(operation);
    }
    Ok(operations)
}

fn collect_paths(node: &Node, at: &Pointer, paths: &mut Vec<Pointer>) {
    paths.push(at.clone());
    match node {
        Node::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if let Ok(child) = at.child(&index.to_string()) {
                    collect_paths(item, &child, paths);
                }
            }
        }
        Node::Object(map) => {
            // Members under the empty key cannot be addressed.
            for (key, value) in map {
                if let Ok(child) = at.child(key) {
                    collect_paths(value, &child, paths);
                }
            }
        }
        _ => {}
    }
}

fn random_pointer(
    unstructured: &mut Unstructured<'_>,
    known: &[Pointer],
) -> Result<Pointer, arbitrary::Error> {
    if !known.is_empty() && unstructured.ratio(3, 4)? {
        let base = unstructured.choose(known)?.clone();
        let pointer = match unstructured.int_in_range::<u8>(0..=3)? {
            0 => base.child("-"),
            1 => base.child(&random_token(unstructured)?),
            _ => Ok(base),
        };
        return pointer.map_err(|_| arbitrary::Error::IncorrectFormat);
    }
    let depth = unstructured.int_in_range::<u8>(0..=3)?;
    let mut tokens = Vec::with_capacity(usize::from(depth));
    for _ in 0..depth {
        tokens.push(random_token(unstructured)?);
    }
    Pointer::from_tokens(tokens).map_err(|_| arbitrary::Error::IncorrectFormat)
}

fn leaf_node(unstructured: &mut Unstructured<'_>) -> Result<Node, arbitrary::Error> {
    let value = json_leaf(unstructured)?;
    Node::from_json_value(value).map_err(|_| arbitrary::Error::IncorrectFormat)
}

fn random_node(unstructured: &mut Unstructured<'_>) -> Option<Node> {
    let value = json_value_from_unstructured(unstructured, 0).ok()?;
    Node::from_json_value(value).ok()
}

fn json_value_from_unstructured(
    unstructured: &mut Unstructured<'_>,
    depth: usize,
) -> Result<JsonValue, arbitrary::Error> {
    if depth >= MAX_DEPTH {
        return json_leaf(unstructured);
    }

    match unstructured.int_in_range::<u8>(0..=5)? {
        0..=3 => json_leaf(unstructured),
        4 => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_ARRAY_LEN)?);
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(json_value_from_unstructured(unstructured, depth + 1)?);
            }
            Ok(JsonValue::Array(items))
        }
        _ => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_OBJECT_LEN)?);
            let mut map = JsonMap::new();
            for _ in 0..len {
                let key = random_string(unstructured)?;
                let value = json_value_from_unstructured(unstructured, depth + 1)?;
                map.insert(key, value);
            }
            Ok(JsonValue::Object(map))
        }
    }
}

fn json_leaf(unstructured: &mut Unstructured<'_>) -> Result<JsonValue, arbitrary::Error> {
    match unstructured.int_in_range::<u8>(0..=3)? {
        0 => Ok(JsonValue::Null),
        1 => Ok(JsonValue::Bool(unstructured.arbitrary()?)),
        2 => Ok(JsonValue::Number(random_number(unstructured)?)),
        _ => Ok(JsonValue::String(random_string(unstructured)?)),
    }
}

fn random_number(unstructured: &mut Unstructured<'_>) -> Result<JsonNumber, arbitrary::Error> {
    if unstructured.arbitrary()? {
        Ok(JsonNumber::from(unstructured.arbitrary::<i32>()?))
    } else {
        let numerator = f64::from(unstructured.arbitrary::<i32>()?);
        let denominator = f64::from(unstructured.int_in_range::<u16>(1..=1024)?);
        JsonNumber::from_f64(numerator / denominator).ok_or(arbitrary::Error::IncorrectFormat)
    }
}

fn random_string(unstructured: &mut Unstructured<'_>) -> Result<String, arbitrary::Error> {
    let len = unstructured.int_in_range::<u8>(0..=MAX_STRING_LEN)?;
    printable_ascii(unstructured, len)
}

fn random_token(unstructured: &mut Unstructured<'_>) -> Result<String, arbitrary::Error> {
    let len = unstructured.int_in_range::<u8>(1..=MAX_STRING_LEN)?;
    printable_ascii(unstructured, len)
}

fn printable_ascii(unstructured: &mut Unstructured<'_>, len: u8) -> Result<String, arbitrary::Error> {
    let mut string = String::with_capacity(usize::from(len));
    for _ in 0..len {
        let byte = unstructured.int_in_range::<u8>(0x20..=0x7e)?;
        string.push(char::from(byte));
    }
    Ok(string)
}
