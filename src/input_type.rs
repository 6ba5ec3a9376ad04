//! Widget-type inference from schema shape.

use serde_json::Value;

use crate::pointer::get_first;
use crate::types::{SchemaType, WidgetType, FORM_EXTENSION};

/// Infer the widget a schema node renders as.
///
/// Precedence: `x-schema-form.type`, then a `ui:widget` string, then the
/// canonical schema type (see [`SchemaType::of`]). Returns `None` only for
/// arrays with neither `items` nor `additionalItems`, which cannot be
/// rendered. Any other unrecognized shape falls back to `text`.
pub fn get_input_type(schema: &Value) -> Option<WidgetType> {
    let declared = [
        get_first(&[(schema.get(FORM_EXTENSION), "/type")]),
        get_first(&[(Some(schema), "/ui:widget")]),
    ];
    if let Some(widget) = declared.into_iter().flatten().find_map(Value::as_str) {
        return Some(WidgetType::parse(widget));
    }

    let schema_type = SchemaType::of(schema);
    match schema_type {
        Some(SchemaType::Boolean) => return Some(WidgetType::Checkbox),
        Some(SchemaType::Object) => {
            return Some(if schema.get("properties").is_some() {
                WidgetType::Fieldset
            } else {
                WidgetType::Textarea
            });
        }
        Some(SchemaType::Array) => return array_widget(schema),
        Some(SchemaType::Null) => return Some(WidgetType::Hidden),
        _ => {}
    }

    if schema.get("enum").is_some() {
        return Some(WidgetType::Select);
    }

    Some(match schema_type {
        Some(SchemaType::Number) => numeric_widget(schema, WidgetType::Number),
        Some(SchemaType::Integer) => numeric_widget(schema, WidgetType::Integer),
        Some(SchemaType::String) => string_widget(schema),
        _ => WidgetType::Text,
    })
}

fn array_widget(schema: &Value) -> Option<WidgetType> {
    let item_schema = get_first(&[(Some(schema), "/items"), (Some(schema), "/additionalItems")])?;
    if item_schema.get("enum").is_some() {
        Some(WidgetType::Checkboxes)
    } else {
        Some(WidgetType::Array)
    }
}

/// `range` needs both bounds plus a step: integers always have one.
fn numeric_widget(schema: &Value, bare: WidgetType) -> WidgetType {
    let bounded = schema.get("minimum").is_some() && schema.get("maximum").is_some();
    let stepped = bare == WidgetType::Integer || schema.get("multipleOf").is_some();
    if bounded && stepped {
        WidgetType::Range
    } else {
        bare
    }
}

fn string_widget(schema: &Value) -> WidgetType {
    match schema.get("format").and_then(Value::as_str) {
        Some("color") => WidgetType::Color,
        Some("date") => WidgetType::Date,
        Some("date-time") => WidgetType::DatetimeLocal,
        Some("email") => WidgetType::Email,
        Some("uri" | "url") => WidgetType::Url,
        _ => WidgetType::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn infer(schema: Value) -> String {
        get_input_type(&schema)
            .map(|w| w.as_str().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn vendor_extension_wins() {
        let schema = json!({ "type": "string", "x-schema-form": { "type": "password" } });
        assert_eq!(
            get_input_type(&schema),
            Some(WidgetType::Other("password".into()))
        );

        let schema = json!({ "type": "string", "ui:widget": "textarea" });
        assert_eq!(get_input_type(&schema), Some(WidgetType::Textarea));

        let schema = json!({
            "type": "string",
            "x-schema-form": { "type": "color" },
            "ui:widget": "textarea"
        });
        assert_eq!(get_input_type(&schema), Some(WidgetType::Color));
    }

    #[test]
    fn non_string_extension_type_is_ignored() {
        let schema = json!({ "type": "boolean", "x-schema-form": { "type": 3 } });
        assert_eq!(get_input_type(&schema), Some(WidgetType::Checkbox));
    }

    #[test]
    fn non_string_extension_type_falls_through_to_ui_widget() {
        let schema = json!({
            "type": "string",
            "x-schema-form": { "type": 3 },
            "ui:widget": "textarea"
        });
        assert_eq!(get_input_type(&schema), Some(WidgetType::Textarea));
    }

    #[test]
    fn every_primitive_type_maps() {
        assert_eq!(infer(json!({ "type": "boolean" })), "checkbox");
        assert_eq!(infer(json!({ "type": "null" })), "hidden");
        assert_eq!(infer(json!({ "type": "string" })), "text");
        assert_eq!(infer(json!({ "type": "number" })), "number");
        assert_eq!(infer(json!({ "type": "integer" })), "integer");
        assert_eq!(
            infer(json!({ "type": "object", "properties": {} })),
            "fieldset"
        );
        assert_eq!(infer(json!({ "type": "object" })), "textarea");
        assert_eq!(
            infer(json!({ "type": "array", "items": { "type": "string" } })),
            "array"
        );
    }

    #[test]
    fn array_without_items_is_unrenderable() {
        assert_eq!(get_input_type(&json!({ "type": "array" })), None);
        assert_eq!(
            infer(json!({ "type": "array", "additionalItems": {} })),
            "array"
        );
    }

    #[test]
    fn array_of_enum_is_checkboxes() {
        let schema = json!({
            "type": "array",
            "items": { "type": "string", "enum": ["red", "green"] }
        });
        assert_eq!(get_input_type(&schema), Some(WidgetType::Checkboxes));
    }

    #[test]
    fn enum_is_select() {
        assert_eq!(
            infer(json!({ "type": "string", "enum": ["a", "b"] })),
            "select"
        );
        assert_eq!(
            infer(json!({ "type": "integer", "enum": [1, 2], "minimum": 1, "maximum": 2 })),
            "select"
        );
        // boolean is decided before enum
        assert_eq!(
            infer(json!({ "type": "boolean", "enum": [true] })),
            "checkbox"
        );
    }

    #[test]
    fn range_needs_bounds_and_step() {
        assert_eq!(
            infer(json!({ "type": "integer", "minimum": 0, "maximum": 9 })),
            "range"
        );
        assert_eq!(
            infer(json!({ "type": "number", "minimum": 0, "maximum": 9 })),
            "number"
        );
        assert_eq!(
            infer(json!({ "type": "number", "minimum": 0, "maximum": 9, "multipleOf": 0.5 })),
            "range"
        );
        assert_eq!(
            infer(json!({ "type": "integer", "minimum": 0 })),
            "integer"
        );
    }

    #[test]
    fn string_formats() {
        for (format, widget) in [
            ("color", "color"),
            ("date", "date"),
            ("date-time", "datetime-local"),
            ("email", "email"),
            ("uri", "url"),
            ("ipv4", "text"),
        ] {
            assert_eq!(
                infer(json!({ "type": "string", "format": format })),
                widget,
                "{format}"
            );
        }
    }

    #[test]
    fn multi_type_collapses() {
        assert_eq!(infer(json!({ "type": ["string", "null"] })), "text");
        assert_eq!(
            infer(json!({ "type": ["integer", "boolean"], "minimum": 1, "maximum": 3 })),
            "range"
        );
        assert_eq!(infer(json!({ "type": ["null"] })), "hidden");
    }

    #[test]
    fn unrecognized_shapes_fall_back_to_text() {
        assert_eq!(infer(json!({})), "text");
        assert_eq!(infer(json!({ "type": "mystery" })), "text");
        assert_eq!(infer(json!({ "enum": [1, 2] })), "select");
    }
}
