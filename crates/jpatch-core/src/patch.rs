//! Patch application engine.
//!
//! Operations are folded left to right over an owned working copy of the
//! document. Each operation descends one container per reference token and
//! rebuilds the containers on the way back up, so the caller's document is
//! never touched and a failing patch leaves no partially patched tree behind.

use tracing::{debug, trace};

use crate::{ApplyError, Node, Operation, OperationKind, PatchDocument, Pointer};

const END_OF_ARRAY: &str = "-";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ArrayIndex {
    Position(usize),
    End,
}

pub(crate) fn apply_patch(patch: &PatchDocument, node: &Node) -> Result<Node, ApplyError> {
    let mut current = node.clone();
    for (index, operation) in patch.iter().enumerate() {
        debug!(index, operation = %operation, "applying patch operation");
        current = apply_operation(current, operation)?;
    }
    Ok(current)
}

fn apply_operation(document: Node, operation: &Operation) -> Result<Node, ApplyError> {
    let pointer = operation.pointer();
    match operation.kind() {
        OperationKind::Add => add(document, pointer, operation.value().clone()),
        OperationKind::Remove => remove(document, pointer),
        OperationKind::Replace => replace(document, pointer, operation.value().clone()),
        OperationKind::Move => move_value(document, source(operation)?, pointer),
        OperationKind::Copy => copy(document, source(operation)?, pointer),
        OperationKind::Test => test(document, pointer, operation.value()),
    }
}

fn source(operation: &Operation) -> Result<&Pointer, ApplyError> {
    operation.from().ok_or_else(|| ApplyError::InvalidJson {
        pointer: operation.pointer().raw().to_owned(),
        reason: format!("{} operation has no source location", operation.kind()),
    })
}

fn add(document: Node, pointer: &Pointer, value: Node) -> Result<Node, ApplyError> {
    if pointer.is_root() {
        return Ok(value);
    }
    navigate(document, pointer, 0, |parent, token| match parent {
        Node::Object(mut map) => {
            map.insert(token.to_owned(), value);
            Ok(Node::Object(map))
        }
        Node::Array(mut items) => {
            match parse_index(token, pointer)? {
                ArrayIndex::End => items.push(value),
                ArrayIndex::Position(index) if index <= items.len() => items.insert(index, value),
                ArrayIndex::Position(_) => return Err(out_of_bounds(pointer, token, items.len())),
            }
            Ok(Node::Array(items))
        }
        other => Err(not_a_container(pointer, &other)),
    })
}

fn remove(document: Node, pointer: &Pointer) -> Result<Node, ApplyError> {
    if pointer.is_root() {
        debug!("remove of the document root leaves the document unchanged");
        return Ok(document);
    }
    navigate(document, pointer, 0, |parent, token| match parent {
        Node::Object(mut map) => {
            if map.remove(token).is_none() {
                trace!(pointer = pointer.raw(), "remove of a missing member");
            }
            Ok(Node::Object(map))
        }
        Node::Array(mut items) => {
            let index = existing_index(token, pointer, items.len())?;
            items.remove(index);
            Ok(Node::Array(items))
        }
        other => Err(not_a_container(pointer, &other)),
    })
}

fn replace(document: Node, pointer: &Pointer, value: Node) -> Result<Node, ApplyError> {
    if pointer.is_root() {
        return Ok(value);
    }
    navigate(document, pointer, 0, |parent, token| match parent {
        Node::Object(mut map) => {
            map.insert(token.to_owned(), value);
            Ok(Node::Object(map))
        }
        Node::Array(mut items) => {
            let index = existing_index(token, pointer, items.len())?;
            items[index] = value;
            Ok(Node::Array(items))
        }
        other => Err(not_a_container(pointer, &other)),
    })
}

fn move_value(document: Node, from: &Pointer, pointer: &Pointer) -> Result<Node, ApplyError> {
    if pointer.is_descendant_of(from) {
        return Err(ApplyError::InvalidJson {
            pointer: pointer.raw().to_owned(),
            reason: format!("cannot move {:?} into one of its own children", from.raw()),
        });
    }
    let value = lookup(&document, from)?.clone();
    if from == pointer {
        return Ok(document);
    }
    let document = remove(document, from)?;
    add(document, pointer, value)
}

fn copy(document: Node, from: &Pointer, pointer: &Pointer) -> Result<Node, ApplyError> {
    let value = lookup(&document, from)?.clone();
    add(document, pointer, value)
}

fn test(document: Node, pointer: &Pointer, expected: &Node) -> Result<Node, ApplyError> {
    let found = lookup(&document, pointer).map_err(|err| ApplyError::ValidationError {
        message: format!("no value at {:?}: {err}", pointer.raw()),
    })?;
    if found != expected {
        return Err(ApplyError::ValidationError {
            message: format!(
                "expected {} at {:?}, found {}",
                expected.to_json_string(),
                pointer.raw(),
                found.to_json_string()
            ),
        });
    }
    Ok(document)
}

/// Descends to the parent of the location addressed by `pointer` and hands it
/// to `mutator` together with the final reference token. The mutator's result
/// replaces the parent, and every enclosing container is rebuilt around it.
fn navigate<F>(node: Node, pointer: &Pointer, depth: usize, mutator: F) -> Result<Node, ApplyError>
where
    F: FnOnce(Node, &str) -> Result<Node, ApplyError>,
{
    let tokens = pointer.tokens();
    let token = tokens[depth].as_str();
    if depth + 1 == tokens.len() {
        return mutator(node, token);
    }
    trace!(pointer = pointer.raw(), depth, token, "descending");

    match node {
        Node::Array(mut items) => {
            let index = existing_index(token, pointer, items.len())?;
            let child = std::mem::replace(&mut items[index], Node::Null);
            items[index] = navigate(child, pointer, depth + 1, mutator)?;
            Ok(Node::Array(items))
        }
        Node::Object(mut map) => {
            let Some(child) = map.remove(token) else {
                return Err(ApplyError::InvalidJson {
                    pointer: pointer.raw().to_owned(),
                    reason: format!("member {token:?} does not exist"),
                });
            };
            let patched = navigate(child, pointer, depth + 1, mutator)?;
            map.insert(token.to_owned(), patched);
            Ok(Node::Object(map))
        }
        other => Err(not_a_container(pointer, &other)),
    }
}

pub(crate) fn lookup<'a>(node: &'a Node, pointer: &Pointer) -> Result<&'a Node, ApplyError> {
    let mut current = node;
    for token in pointer.tokens() {
        current = match current {
            Node::Object(map) => map.get(token).ok_or_else(|| ApplyError::InvalidJson {
                pointer: pointer.raw().to_owned(),
                reason: format!("member {token:?} does not exist"),
            })?,
            Node::Array(items) => &items[existing_index(token, pointer, items.len())?],
            other => return Err(not_a_container(pointer, other)),
        };
    }
    Ok(current)
}

fn parse_index(token: &str, pointer: &Pointer) -> Result<ArrayIndex, ApplyError> {
    if token == END_OF_ARRAY {
        return Ok(ArrayIndex::End);
    }
    let decimal = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if !decimal {
        return Err(ApplyError::InvalidArrayIndex {
            pointer: pointer.raw().to_owned(),
            token: token.to_owned(),
        });
    }
    // All digits, so the only possible failure is overflow.
    token.parse().map(ArrayIndex::Position).map_err(|_| out_of_bounds(pointer, token, usize::MAX))
}

/// Resolves `token` to the index of an element that already exists.
fn existing_index(token: &str, pointer: &Pointer, len: usize) -> Result<usize, ApplyError> {
    match parse_index(token, pointer)? {
        ArrayIndex::Position(index) if index < len => Ok(index),
        _ => Err(out_of_bounds(pointer, token, len)),
    }
}

fn out_of_bounds(pointer: &Pointer, token: &str, len: usize) -> ApplyError {
    ApplyError::ArrayIndexOutOfBounds {
        pointer: pointer.raw().to_owned(),
        token: token.to_owned(),
        len,
    }
}

fn not_a_container(pointer: &Pointer, node: &Node) -> ApplyError {
    ApplyError::InvalidJson {
        pointer: pointer.raw().to_owned(),
        reason: format!("found {}: expected JSON object or array", node.kind_name()),
    }
}
