//! `$ref` and `allOf` resolution with a per-build reference library.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ReferenceError;
use crate::pointer::JsonPointer;

/// Cache of resolved schema pointers for one form-model build.
///
/// Each compiled pointer is resolved at most once; later lookups return the
/// identical `Arc`. Entries are never invalidated, so a library must not be
/// shared between builds of different schemas.
#[derive(Debug, Default)]
pub struct ReferenceLibrary {
    resolved: HashMap<String, Arc<Value>>,
    in_progress: HashSet<String>,
}

impl ReferenceLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached resolution of a compiled schema pointer.
    pub fn get(&self, pointer: &str) -> Option<&Arc<Value>> {
        self.resolved.get(pointer)
    }

    pub fn contains(&self, pointer: &str) -> bool {
        self.resolved.contains_key(pointer)
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// Resolve a schema reference against `schema`.
///
/// `reference` is either a pointer string or a single-key object
/// `{ "$ref": "<pointer>" }`; any other value is returned unchanged. The
/// empty pointer (`""` or `"#"`) yields the whole schema. A target that is
/// exactly `{ "allOf": [...] }` is flattened by resolving each element and
/// shallow-merging the results left to right, later keys winning.
///
/// # Errors
///
/// - `Unsupported` for remote or external-document references (never fetched)
/// - `InvalidPointer` for a malformed local pointer
/// - `NotFound` if the pointer addresses nothing
/// - `Circular` if resolving the pointer requires resolving itself
pub fn get_schema_reference(
    schema: &Value,
    reference: &Value,
    library: Option<&mut ReferenceLibrary>,
) -> Result<Arc<Value>, ReferenceError> {
    let mut scratch = ReferenceLibrary::new();
    let library = library.unwrap_or(&mut scratch);
    resolve_reference(schema, reference, library)
}

/// Extract the pointer string from a reference value, if it is one.
pub fn reference_target(reference: &Value) -> Option<&str> {
    match reference {
        Value::String(s) => Some(s),
        Value::Object(map) if map.len() == 1 => map.get("$ref").and_then(Value::as_str),
        _ => None,
    }
}

/// True for references that point outside the current document.
pub fn is_remote(reference: &str) -> bool {
    !(reference.is_empty() || reference.starts_with('#') || reference.starts_with('/'))
}

fn resolve_reference(
    schema: &Value,
    reference: &Value,
    library: &mut ReferenceLibrary,
) -> Result<Arc<Value>, ReferenceError> {
    let Some(target) = reference_target(reference) else {
        return Ok(Arc::new(reference.clone()));
    };

    if is_remote(target) {
        return Err(ReferenceError::Unsupported {
            reference: target.to_string(),
        });
    }
    let pointer = JsonPointer::parse(target).ok_or_else(|| ReferenceError::InvalidPointer {
        pointer: target.to_string(),
    })?;
    let compiled = pointer.compile();

    if let Some(cached) = library.get(&compiled) {
        debug!(pointer = compiled.as_str(), "reference library hit");
        return Ok(Arc::clone(cached));
    }
    if !library.in_progress.insert(compiled.clone()) {
        return Err(ReferenceError::Circular { pointer: compiled });
    }

    let result = resolve_pointer(schema, &pointer, &compiled, library);
    library.in_progress.remove(&compiled);

    let resolved = Arc::new(result?);
    library.resolved.insert(compiled, Arc::clone(&resolved));
    Ok(resolved)
}

fn resolve_pointer(
    schema: &Value,
    pointer: &JsonPointer,
    compiled: &str,
    library: &mut ReferenceLibrary,
) -> Result<Value, ReferenceError> {
    let target = pointer
        .get(schema)
        .ok_or_else(|| ReferenceError::NotFound {
            pointer: compiled.to_string(),
        })?;

    let Some(all_of) = sole_all_of(target) else {
        return Ok(target.clone());
    };

    let mut merged = Map::new();
    for part in all_of {
        let resolved = resolve_reference(schema, part, library)?;
        if let Value::Object(fields) = resolved.as_ref() {
            for (key, value) in fields {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(Value::Object(merged))
}

/// The `allOf` array of a node that consists of nothing else.
fn sole_all_of(node: &Value) -> Option<&Vec<Value>> {
    match node {
        Value::Object(map) if map.len() == 1 => map.get("allOf")?.as_array(),
        _ => None,
    }
}
