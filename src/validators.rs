//! Per-field validator derivation from schema keywords.

use std::collections::BTreeMap;

use serde_json::{json, Value};

/// Validator name to constructor argument list,
/// e.g. `{ "minLength": [3], "maximum": [100, false] }`.
pub type ValidatorMap = BTreeMap<String, Vec<Value>>;

const STRING_KEYWORDS: &[&str] = &["pattern", "format", "minLength", "maxLength"];
const OBJECT_KEYWORDS: &[&str] = &["minProperties", "maxProperties", "dependencies"];
const ARRAY_KEYWORDS: &[&str] = &["minItems", "maxItems", "uniqueItems"];

/// Derive the validators a schema node implies for its control.
///
/// Dispatches on a string `type`; an unknown or absent type contributes
/// nothing. An `enum` keyword always adds an `enum` validator.
pub fn get_control_validators(schema: &Value) -> ValidatorMap {
    let mut validators = ValidatorMap::new();
    let Some(map) = schema.as_object() else {
        return validators;
    };

    let copy_keywords = |validators: &mut ValidatorMap, keywords: &[&str]| {
        for keyword in keywords {
            if let Some(value) = map.get(*keyword) {
                validators.insert(keyword.to_string(), vec![value.clone()]);
            }
        }
    };

    match map.get("type").and_then(Value::as_str) {
        Some("string") => copy_keywords(&mut validators, STRING_KEYWORDS),
        Some(numeric @ ("number" | "integer")) => {
            if let Some(bound) = bound(schema, "minimum", "exclusiveMinimum") {
                validators.insert("minimum".to_string(), bound);
            }
            if let Some(bound) = bound(schema, "maximum", "exclusiveMaximum") {
                validators.insert("maximum".to_string(), bound);
            }
            if let Some(step) = map.get("multipleOf") {
                validators.insert("multipleOf".to_string(), vec![step.clone()]);
            }
            validators.insert("type".to_string(), vec![json!(numeric)]);
        }
        Some("object") => copy_keywords(&mut validators, OBJECT_KEYWORDS),
        Some("array") => copy_keywords(&mut validators, ARRAY_KEYWORDS),
        _ => {}
    }

    if let Some(options) = map.get("enum") {
        validators.insert("enum".to_string(), vec![options.clone()]);
    }
    validators
}

/// `[limit, exclusive]` for a numeric bound.
///
/// Exclusivity is only set by a literal `true` flag. A numeric exclusive
/// keyword with no plain bound beside it is taken as an exclusive limit.
fn bound(schema: &Value, keyword: &str, exclusive_keyword: &str) -> Option<Vec<Value>> {
    let exclusive = schema.get(exclusive_keyword);
    match (schema.get(keyword), exclusive) {
        (Some(limit), _) => Some(vec![
            limit.clone(),
            Value::Bool(exclusive == Some(&Value::Bool(true))),
        ]),
        (None, Some(limit @ Value::Number(_))) => Some(vec![limit.clone(), Value::Bool(true)]),
        _ => None,
    }
}
