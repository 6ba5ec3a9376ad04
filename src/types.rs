//! Core types: schema types, widget names and form-wide options.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::layout::LayoutNode;

/// Vendor-extension namespace for per-field form configuration.
pub const FORM_EXTENSION: &str = "x-schema-form";

/// Key prefix of the competing `ui:*` vendor convention.
pub const UI_PREFIX: &str = "ui:";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A JSON Schema primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl SchemaType {
    /// Most to least inclusive; used to collapse a `type` array to one type.
    pub const PRIORITY: [SchemaType; 7] = [
        SchemaType::Object,
        SchemaType::Array,
        SchemaType::String,
        SchemaType::Number,
        SchemaType::Integer,
        SchemaType::Boolean,
        SchemaType::Null,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "object" => Some(SchemaType::Object),
            "array" => Some(SchemaType::Array),
            "string" => Some(SchemaType::String),
            "number" => Some(SchemaType::Number),
            "integer" => Some(SchemaType::Integer),
            "boolean" => Some(SchemaType::Boolean),
            "null" => Some(SchemaType::Null),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
        }
    }

    /// The single canonical type of a schema node.
    ///
    /// A `type` array collapses to its highest-priority member, where
    /// `object` only counts when `properties` is present and `array` only
    /// when `items` or `additionalItems` is.
    pub fn of(schema: &Value) -> Option<Self> {
        match schema.get("type")? {
            Value::String(s) => Self::parse(s),
            Value::Array(candidates) => {
                let listed: Vec<SchemaType> = candidates
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(Self::parse)
                    .collect();
                Self::PRIORITY
                    .into_iter()
                    .filter(|t| listed.contains(t))
                    .find(|t| t.applies_to(schema))
            }
            _ => None,
        }
    }

    fn applies_to(&self, schema: &Value) -> bool {
        match self {
            SchemaType::Object => schema.get("properties").is_some(),
            SchemaType::Array => {
                schema.get("items").is_some() || schema.get("additionalItems").is_some()
            }
            _ => true,
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical name of the input control a field renders as.
///
/// Names outside the inferred set (e.g. `password`, `radios`) arrive via
/// vendor extensions or layout overrides and are kept as [`WidgetType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum WidgetType {
    Array,
    Checkbox,
    Checkboxes,
    Color,
    Date,
    DatetimeLocal,
    Email,
    Fieldset,
    Hidden,
    Integer,
    Number,
    Range,
    Select,
    Text,
    Textarea,
    Url,
    Other(String),
}

impl WidgetType {
    pub fn parse(s: &str) -> Self {
        match s {
            "array" => WidgetType::Array,
            "checkbox" => WidgetType::Checkbox,
            "checkboxes" => WidgetType::Checkboxes,
            "color" => WidgetType::Color,
            "date" => WidgetType::Date,
            "datetime-local" => WidgetType::DatetimeLocal,
            "email" => WidgetType::Email,
            "fieldset" => WidgetType::Fieldset,
            "hidden" => WidgetType::Hidden,
            "integer" => WidgetType::Integer,
            "number" => WidgetType::Number,
            "range" => WidgetType::Range,
            "select" => WidgetType::Select,
            "text" => WidgetType::Text,
            "textarea" => WidgetType::Textarea,
            "url" => WidgetType::Url,
            other => WidgetType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WidgetType::Array => "array",
            WidgetType::Checkbox => "checkbox",
            WidgetType::Checkboxes => "checkboxes",
            WidgetType::Color => "color",
            WidgetType::Date => "date",
            WidgetType::DatetimeLocal => "datetime-local",
            WidgetType::Email => "email",
            WidgetType::Fieldset => "fieldset",
            WidgetType::Hidden => "hidden",
            WidgetType::Integer => "integer",
            WidgetType::Number => "number",
            WidgetType::Range => "range",
            WidgetType::Select => "select",
            WidgetType::Text => "text",
            WidgetType::Textarea => "textarea",
            WidgetType::Url => "url",
            WidgetType::Other(name) => name,
        }
    }

    /// Widgets that hold child controls rather than a single value.
    pub fn is_container(&self) -> bool {
        matches!(self, WidgetType::Array | WidgetType::Fieldset)
            || matches!(self.as_str(), "section" | "tabs" | "tabarray")
    }
}

impl From<String> for WidgetType {
    fn from(s: String) -> Self {
        WidgetType::parse(&s)
    }
}

impl From<WidgetType> for String {
    fn from(w: WidgetType) -> Self {
        w.as_str().to_string()
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form-wide configuration for a model build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormOptions {
    /// Default option values, the lowest-precedence layer when merging.
    pub defaults: Map<String, Value>,
    /// Layout overrides, matched to generated fields by data pointer.
    pub layout: Vec<LayoutNode>,
}

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one form-wide default option.
    pub fn default_option(mut self, name: impl Into<String>, value: Value) -> Self {
        self.defaults.insert(name.into(), value);
        self
    }

    /// Add a layout override.
    pub fn layout_node(mut self, node: LayoutNode) -> Self {
        self.layout.push(node);
        self
    }

    /// The layout override for a data pointer, if one was supplied.
    pub fn layout_for(&self, pointer: &str) -> Option<&LayoutNode> {
        self.layout
            .iter()
            .find(|node| node.pointer.as_deref() == Some(pointer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_type_single() {
        assert_eq!(
            SchemaType::of(&json!({ "type": "integer" })),
            Some(SchemaType::Integer)
        );
        assert_eq!(SchemaType::of(&json!({ "type": "widget" })), None);
        assert_eq!(SchemaType::of(&json!({})), None);
    }

    #[test]
    fn schema_type_array_uses_priority() {
        let schema = json!({ "type": ["null", "integer", "string"] });
        assert_eq!(SchemaType::of(&schema), Some(SchemaType::String));

        let schema = json!({ "type": ["boolean", "null"] });
        assert_eq!(SchemaType::of(&schema), Some(SchemaType::Boolean));
    }

    #[test]
    fn schema_type_object_needs_properties() {
        let schema = json!({ "type": ["object", "string"] });
        assert_eq!(SchemaType::of(&schema), Some(SchemaType::String));

        let schema = json!({ "type": ["object", "string"], "properties": {} });
        assert_eq!(SchemaType::of(&schema), Some(SchemaType::Object));

        let schema = json!({ "type": ["array", "null"], "additionalItems": {} });
        assert_eq!(SchemaType::of(&schema), Some(SchemaType::Array));
    }

    #[test]
    fn widget_type_names() {
        assert_eq!(WidgetType::parse("datetime-local"), WidgetType::DatetimeLocal);
        assert_eq!(
            WidgetType::parse("password"),
            WidgetType::Other("password".into())
        );
        assert_eq!(WidgetType::Range.as_str(), "range");
        assert_eq!(
            serde_json::to_value(WidgetType::Checkboxes).unwrap(),
            json!("checkboxes")
        );
    }

    #[test]
    fn widget_type_containers() {
        assert!(WidgetType::Array.is_container());
        assert!(WidgetType::Fieldset.is_container());
        assert!(WidgetType::parse("section").is_container());
        assert!(!WidgetType::Checkboxes.is_container());
        assert!(!WidgetType::Text.is_container());
    }

    #[test]
    fn form_options_from_json() {
        let options: FormOptions = serde_json::from_value(json!({
            "defaults": { "feedback": true },
            "layout": [{ "pointer": "/age", "type": "number" }]
        }))
        .unwrap();
        assert_eq!(options.defaults["feedback"], json!(true));
        assert!(options.layout_for("/age").is_some());
        assert!(options.layout_for("/name").is_none());
    }
}
