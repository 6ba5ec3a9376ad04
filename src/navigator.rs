//! Schema navigation by data pointer.
//!
//! A data pointer addresses a value in a document the schema describes, not
//! a location in the schema itself. Navigation walks both in parallel,
//! crossing `properties` and `items` boundaries as the data structure does.

use std::sync::OnceLock;

use serde_json::{Map, Value};
use tracing::warn;

use crate::pointer::{array_index, JsonPointer, APPEND};
use crate::types::SchemaType;

/// Find the sub-schema describing the value at `data_pointer`.
///
/// With `return_container`, stops one segment early and returns the schema
/// of the containing object or array instead (`None` for the root pointer).
///
/// A segment that cannot be resolved is reported through `tracing` and
/// yields `None`; callers should treat the field as having no schema.
pub fn get_from_schema<'a>(
    schema: &'a Value,
    data_pointer: &str,
    return_container: bool,
) -> Option<&'a Value> {
    let Some(pointer) = JsonPointer::parse(data_pointer) else {
        warn!(pointer = data_pointer, "invalid data pointer");
        return None;
    };

    let segments = pointer.segments();
    let depth = if return_container {
        segments.len().checked_sub(1)?
    } else {
        segments.len()
    };

    let mut sub_schema = schema;
    for key in &segments[..depth] {
        match child_schema(sub_schema, key) {
            Some(child) => sub_schema = child,
            None => {
                warn!(
                    pointer = data_pointer,
                    key = key.as_str(),
                    schema = %schema,
                    "unable to find key in schema"
                );
                return None;
            }
        }
    }
    Some(sub_schema)
}

/// Schema for one data segment below `schema`.
pub(crate) fn child_schema<'a>(schema: &'a Value, key: &str) -> Option<&'a Value> {
    let map = schema.as_object()?;
    let schema_type = SchemaType::of(schema);

    let is_array = schema_type == Some(SchemaType::Array)
        || (schema_type.is_none()
            && (map.contains_key("items") || map.contains_key("additionalItems")));
    if is_array && (key == APPEND || array_index(key).is_some()) {
        return item_schema(map, key);
    }

    let is_object = schema_type == Some(SchemaType::Object)
        || (schema_type.is_none() && map.contains_key("properties"));
    if !is_object {
        return None;
    }

    if let Some(property) = map.get("properties").and_then(|p| p.get(key)) {
        return Some(property);
    }
    match map.get("additionalProperties") {
        Some(extra @ Value::Object(_)) => Some(extra),
        _ => None,
    }
}

fn item_schema<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    match map.get("items") {
        Some(items @ Value::Object(_)) => Some(items),
        Some(Value::Array(tuple)) => array_index(key)
            .and_then(|i| tuple.get(i))
            .or_else(|| overflow_schema(map)),
        _ => overflow_schema(map),
    }
}

/// Schema for array slots beyond the declared items.
fn overflow_schema(map: &Map<String, Value>) -> Option<&Value> {
    match map.get("additionalItems") {
        Some(extra @ Value::Object(_)) => Some(extra),
        Some(Value::Bool(false)) => None,
        _ => Some(empty_schema()),
    }
}

fn empty_schema() -> &'static Value {
    static EMPTY: OnceLock<Value> = OnceLock::new();
    EMPTY.get_or_init(|| Value::Object(Map::new()))
}
