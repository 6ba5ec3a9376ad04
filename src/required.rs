//! Required-field lookup by data pointer.

use serde_json::Value;
use tracing::warn;

use crate::navigator::get_from_schema;
use crate::pointer::{JsonPointer, APPEND};

/// True if the terminal key of `pointer` is listed in the `required` array
/// of the schema that contains it.
///
/// For `/list/-/name` the containing schema is the item schema of `list`,
/// so `list.items.required` is consulted rather than the array's own
/// `required`. A non-object schema, an unparsable or root pointer, or a
/// missing or non-array `required` all yield false.
pub fn is_input_required(schema: &Value, pointer: &str) -> bool {
    if !schema.is_object() {
        warn!(pointer, "required check needs an object schema");
        return false;
    }
    let Some(parsed) = JsonPointer::parse(pointer) else {
        return false;
    };
    let segments = parsed.segments();
    let Some((key, parents)) = segments.split_last() else {
        return false;
    };

    let required = match parents {
        [] => schema.get("required"),
        [array @ .., wildcard] if wildcard == APPEND => {
            let array_pointer = JsonPointer::from_segments(array.iter().cloned()).compile();
            get_from_schema(schema, &array_pointer, false)
                .and_then(|array_schema| array_schema.get("items"))
                .and_then(|items| items.get("required"))
        }
        _ => get_from_schema(schema, pointer, true).and_then(|parent| parent.get("required")),
    };

    required
        .and_then(Value::as_array)
        .is_some_and(|list| list.iter().any(|name| name.as_str() == Some(key.as_str())))
}
