//! Control template and field map.
//!
//! The control template is a pointer-addressable skeleton of form controls
//! that parallels the data shape. Each node is one of:
//!
//! ```json
//! { "controlType": "FormGroup",   "controls": { "<key>": { ... } }, "validators": {} }
//! { "controlType": "FormArray",   "controls": [ { ... } ],          "validators": {} }
//! { "controlType": "FormControl", "value": null,                    "validators": {} }
//! ```
//!
//! Validators attach under `<node>/validators/<name>` as argument lists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::pointer::JsonPointer;
use crate::validators::ValidatorMap;

pub const FORM_GROUP: &str = "FormGroup";
pub const FORM_ARRAY: &str = "FormArray";
pub const FORM_CONTROL: &str = "FormControl";

/// A keyed group of child controls.
pub fn group_node(validators: &ValidatorMap) -> Value {
    json!({ "controlType": FORM_GROUP, "controls": {}, "validators": validators })
}

/// An ordered list of child controls.
pub fn array_node(validators: &ValidatorMap) -> Value {
    json!({ "controlType": FORM_ARRAY, "controls": [], "validators": validators })
}

/// A single value control.
pub fn control_node(value: Value, validators: &ValidatorMap) -> Value {
    json!({ "controlType": FORM_CONTROL, "value": value, "validators": validators })
}

/// The mutable control skeleton written to during a build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlTemplate {
    root: Value,
}

impl ControlTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    pub fn get(&self, pointer: &str) -> Option<&Value> {
        JsonPointer::parse(pointer)?.get(&self.root)
    }

    /// Write `value` at `pointer`; false if the pointer is malformed or blocked.
    pub fn set(&mut self, pointer: &str, value: Value) -> bool {
        debug!(pointer, "template write");
        JsonPointer::parse(pointer).is_some_and(|p| p.set(&mut self.root, value))
    }

    pub fn remove(&mut self, pointer: &str) -> Option<Value> {
        JsonPointer::parse(pointer)?.remove(&mut self.root)
    }

    /// Attach a named validator to the control at `template_pointer`.
    pub fn set_validator(&mut self, template_pointer: &str, name: &str, args: Vec<Value>) -> bool {
        let Some(node) = JsonPointer::parse(template_pointer) else {
            return false;
        };
        let pointer = node.join("validators").join(name).compile();
        self.set(&pointer, Value::Array(args))
    }

    /// The validators attached to the control at `template_pointer`.
    pub fn validators(&self, template_pointer: &str) -> ValidatorMap {
        let Some(node) = JsonPointer::parse(template_pointer) else {
            return ValidatorMap::new();
        };
        node.join("validators")
            .get(&self.root)
            .and_then(Value::as_object)
            .map(|validators| {
                validators
                    .iter()
                    .filter_map(|(name, args)| Some((name.clone(), args.as_array()?.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Per-field bookkeeping for one data pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    /// Location of the field's control inside the control template.
    pub template_pointer: String,
    #[serde(default)]
    pub required: bool,
}

/// Data pointer to field bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    fields: BTreeMap<String, FieldInfo>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, data_pointer: impl Into<String>, info: FieldInfo) {
        self.fields.insert(data_pointer.into(), info);
    }

    pub fn get(&self, data_pointer: &str) -> Option<&FieldInfo> {
        self.fields.get(data_pointer)
    }

    pub fn template_pointer(&self, data_pointer: &str) -> Option<&str> {
        self.get(data_pointer).map(|f| f.template_pointer.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldInfo)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Strip the `value` key from a copied control node and all its children.
pub fn without_values(node: &Value) -> Value {
    match node {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != "value")
                .map(|(key, child)| {
                    let child = if key == "controls" {
                        without_values(child)
                    } else {
                        child.clone()
                    };
                    (key.clone(), child)
                })
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(without_values).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_validators() {
        let mut template = ControlTemplate::from_value(json!({
            "controlType": FORM_GROUP,
            "controls": { "age": control_node(json!(null), &ValidatorMap::new()) }
        }));

        assert!(template.set_validator("/controls/age", "minimum", vec![json!(0), json!(false)]));
        assert!(template.set_validator("/controls/age", "multipleOf", vec![json!(1)]));

        let validators = template.validators("/controls/age");
        assert_eq!(validators["minimum"], vec![json!(0), json!(false)]);
        assert_eq!(validators["multipleOf"], vec![json!(1)]);
        assert_eq!(
            template.get("/controls/age/validators/minimum"),
            Some(&json!([0, false]))
        );
    }

    #[test]
    fn validators_of_missing_node_is_empty() {
        let template = ControlTemplate::new();
        assert!(template.validators("/controls/none").is_empty());
        assert!(template.validators("bad").is_empty());
    }

    #[test]
    fn wildcard_reads_last_array_control() {
        let template = ControlTemplate::from_value(json!({
            "controls": [
                control_node(json!("a"), &ValidatorMap::new()),
                control_node(json!("b"), &ValidatorMap::new())
            ]
        }));
        assert_eq!(template.get("/controls/-/value"), Some(&json!("b")));
    }

    #[test]
    fn without_values_strips_nested_values() {
        let node = json!({
            "controlType": FORM_GROUP,
            "controls": {
                "a": { "controlType": FORM_CONTROL, "value": 1, "validators": {} },
                "b": { "controlType": FORM_ARRAY, "controls": [{ "value": 2 }] }
            }
        });
        let stripped = without_values(&node);
        assert!(stripped["controls"]["a"].get("value").is_none());
        assert!(stripped["controls"]["b"]["controls"][0].get("value").is_none());
        assert_eq!(stripped["controls"]["a"]["controlType"], FORM_CONTROL);
    }

    #[test]
    fn field_map_lookup() {
        let mut fields = FieldMap::new();
        fields.insert(
            "/age",
            FieldInfo {
                template_pointer: "/controls/age".into(),
                required: true,
            },
        );
        assert_eq!(fields.template_pointer("/age"), Some("/controls/age"));
        assert_eq!(fields.template_pointer("/name"), None);
        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({ "/age": { "templatePointer": "/controls/age", "required": true } })
        );
    }
}
