//! Validator constructors by name.
//!
//! The option merger only needs to know whether a validator of a given name
//! exists; hosts that want to run validators compile a [`ValidatorMap`] into
//! closures with [`ValidatorRegistry::compile`]. Empty values (`null` or
//! `""`) pass every standard validator except `required`.

use std::collections::BTreeMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveTime};
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::error::ValidatorError;
use crate::types::json_type_name;
use crate::validators::ValidatorMap;

/// A constructed validator: returns an error message when `value` fails.
pub type JsonValidator = Box<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Builds a validator from its argument list.
pub type ValidatorConstructor = fn(&[Value]) -> Result<JsonValidator, ValidatorError>;

/// Explicit mapping from validator name to constructor.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    constructors: BTreeMap<String, ValidatorConstructor>,
}

impl ValidatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every standard validator.
    pub fn standard() -> Self {
        Self::new()
            .register("required", required)
            .register("minLength", min_length)
            .register("maxLength", max_length)
            .register("pattern", pattern)
            .register("format", format)
            .register("minimum", minimum)
            .register("maximum", maximum)
            .register("multipleOf", multiple_of)
            .register("type", type_of)
            .register("enum", one_of)
            .register("minItems", min_items)
            .register("maxItems", max_items)
            .register("uniqueItems", unique_items)
            .register("minProperties", min_properties)
            .register("maxProperties", max_properties)
            .register("dependencies", dependencies)
    }

    /// Add or replace a constructor.
    pub fn register(mut self, name: impl Into<String>, constructor: ValidatorConstructor) -> Self {
        self.constructors.insert(name.into(), constructor);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Construct one validator.
    ///
    /// # Errors
    ///
    /// `Unknown` if nothing is registered under `name`, or the constructor's
    /// own `InvalidArguments` error.
    pub fn construct(&self, name: &str, args: &[Value]) -> Result<JsonValidator, ValidatorError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| ValidatorError::Unknown {
                name: name.to_string(),
            })?;
        constructor(args)
    }

    /// Construct every validator in a map.
    pub fn compile(&self, validators: &ValidatorMap) -> Result<CompiledValidators, ValidatorError> {
        let validators = validators
            .iter()
            .map(|(name, args)| Ok((name.clone(), self.construct(name, args)?)))
            .collect::<Result<Vec<_>, ValidatorError>>()?;
        Ok(CompiledValidators { validators })
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// One validator's rejection of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub validator: String,
    pub message: String,
}

/// The validators of one control, ready to run.
#[derive(Default)]
pub struct CompiledValidators {
    validators: Vec<(String, JsonValidator)>,
}

impl CompiledValidators {
    /// Run every validator, collecting failures in name order.
    pub fn check(&self, value: &Value) -> Vec<ValidationFailure> {
        self.validators
            .iter()
            .filter_map(|(name, validator)| {
                validator(value).map(|message| ValidationFailure {
                    validator: name.clone(),
                    message,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl fmt::Debug for CompiledValidators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.validators.iter().map(|(name, _)| name))
            .finish()
    }
}

// --- Standard validators ---

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn invalid(name: &str, message: impl Into<String>) -> ValidatorError {
    ValidatorError::InvalidArguments {
        name: name.to_string(),
        message: message.into(),
    }
}

fn first_arg<'a>(name: &str, args: &'a [Value]) -> Result<&'a Value, ValidatorError> {
    args.first().ok_or_else(|| invalid(name, "missing argument"))
}

fn count_arg(name: &str, args: &[Value]) -> Result<usize, ValidatorError> {
    first_arg(name, args)?
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| invalid(name, "expected a non-negative integer"))
}

fn number_arg(name: &str, args: &[Value]) -> Result<f64, ValidatorError> {
    first_arg(name, args)?
        .as_f64()
        .ok_or_else(|| invalid(name, "expected a number"))
}

fn flag_arg(args: &[Value], index: usize) -> bool {
    args.get(index).and_then(Value::as_bool).unwrap_or(false)
}

fn required(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    if args.first() == Some(&Value::Bool(false)) {
        return Ok(Box::new(|_| None));
    }
    Ok(Box::new(|value| {
        let missing = is_empty_value(value) || value.as_array().is_some_and(Vec::is_empty);
        missing.then(|| "is required".to_string())
    }))
}

fn min_length(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let limit = count_arg("minLength", args)?;
    Ok(Box::new(move |value| match value.as_str() {
        Some(s) if !s.is_empty() && s.chars().count() < limit => {
            Some(format!("must be at least {limit} characters"))
        }
        _ => None,
    }))
}

fn max_length(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let limit = count_arg("maxLength", args)?;
    Ok(Box::new(move |value| match value.as_str() {
        Some(s) if s.chars().count() > limit => {
            Some(format!("must be at most {limit} characters"))
        }
        _ => None,
    }))
}

fn pattern(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let source = first_arg("pattern", args)?
        .as_str()
        .ok_or_else(|| invalid("pattern", "expected a string"))?;
    let regex = Regex::new(source).map_err(|e| invalid("pattern", e.to_string()))?;
    Ok(Box::new(move |value| match value.as_str() {
        Some(s) if !s.is_empty() && !regex.is_match(s) => {
            Some(format!("must match pattern {}", regex.as_str()))
        }
        _ => None,
    }))
}

fn format(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let format = first_arg("format", args)?
        .as_str()
        .ok_or_else(|| invalid("format", "expected a string"))?
        .to_string();
    Ok(Box::new(move |value| match value.as_str() {
        Some(s) if !s.is_empty() && !format_matches(&format, s) => {
            Some(format!("must be a valid {format}"))
        }
        _ => None,
    }))
}

/// Unknown formats always match.
fn format_matches(format: &str, s: &str) -> bool {
    match format {
        "date" => NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
        "time" => {
            NaiveTime::parse_from_str(s, "%H:%M:%S").is_ok()
                || NaiveTime::parse_from_str(s, "%H:%M").is_ok()
        }
        "date-time" => DateTime::parse_from_rfc3339(s).is_ok(),
        "email" => email_regex().is_match(s),
        "color" => color_regex().is_match(s),
        "uri" | "url" => Url::parse(s).is_ok(),
        "ipv4" => s.parse::<Ipv4Addr>().is_ok(),
        "ipv6" => s.parse::<Ipv6Addr>().is_ok(),
        _ => true,
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"))
}

fn color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid regex"))
}

fn minimum(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let limit = number_arg("minimum", args)?;
    let exclusive = flag_arg(args, 1);
    Ok(Box::new(move |value| {
        let n = value.as_f64()?;
        if exclusive && n <= limit {
            Some(format!("must be greater than {limit}"))
        } else if n < limit {
            Some(format!("must be at least {limit}"))
        } else {
            None
        }
    }))
}

fn maximum(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let limit = number_arg("maximum", args)?;
    let exclusive = flag_arg(args, 1);
    Ok(Box::new(move |value| {
        let n = value.as_f64()?;
        if exclusive && n >= limit {
            Some(format!("must be less than {limit}"))
        } else if n > limit {
            Some(format!("must be at most {limit}"))
        } else {
            None
        }
    }))
}

fn multiple_of(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let step = number_arg("multipleOf", args)?;
    if step <= 0.0 {
        return Err(invalid("multipleOf", "must be greater than 0"));
    }
    Ok(Box::new(move |value| {
        let quotient = value.as_f64()? / step;
        ((quotient - quotient.round()).abs() > 1e-9).then(|| format!("must be a multiple of {step}"))
    }))
}

fn type_of(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let types: Vec<String> = match first_arg("type", args)? {
        Value::String(t) => vec![t.clone()],
        Value::Array(ts) => ts
            .iter()
            .map(|t| t.as_str().map(String::from))
            .collect::<Option<_>>()
            .ok_or_else(|| invalid("type", "expected type names"))?,
        _ => return Err(invalid("type", "expected a string or array")),
    };
    Ok(Box::new(move |value| {
        if is_empty_value(value) || types.iter().any(|t| has_type(value, t)) {
            None
        } else {
            Some(format!("must be of type {}", types.join(" or ")))
        }
    }))
}

fn has_type(value: &Value, type_name: &str) -> bool {
    match type_name {
        "integer" => value
            .as_f64()
            .is_some_and(|n| n.fract() == 0.0),
        other => json_type_name(value) == other,
    }
}

fn one_of(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let options = first_arg("enum", args)?
        .as_array()
        .ok_or_else(|| invalid("enum", "expected an array"))?
        .clone();
    Ok(Box::new(move |value| {
        let allowed = match value {
            v if is_empty_value(v) => true,
            // multi-select controls hold a list of choices
            Value::Array(chosen) => chosen.iter().all(|c| options.contains(c)),
            v => options.contains(v),
        };
        (!allowed).then(|| "must be one of the allowed values".to_string())
    }))
}

fn min_items(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let limit = count_arg("minItems", args)?;
    Ok(Box::new(move |value| match value.as_array() {
        Some(items) if items.len() < limit => Some(format!("must have at least {limit} items")),
        _ => None,
    }))
}

fn max_items(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let limit = count_arg("maxItems", args)?;
    Ok(Box::new(move |value| match value.as_array() {
        Some(items) if items.len() > limit => Some(format!("must have at most {limit} items")),
        _ => None,
    }))
}

fn unique_items(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    if !flag_arg(args, 0) {
        return Ok(Box::new(|_| None));
    }
    Ok(Box::new(|value| {
        let items = value.as_array()?;
        let duplicate = items
            .iter()
            .enumerate()
            .any(|(i, item)| items[i + 1..].contains(item));
        duplicate.then(|| "must not contain duplicate items".to_string())
    }))
}

fn min_properties(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let limit = count_arg("minProperties", args)?;
    Ok(Box::new(move |value| match value.as_object() {
        Some(map) if map.len() < limit => Some(format!("must have at least {limit} properties")),
        _ => None,
    }))
}

fn max_properties(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let limit = count_arg("maxProperties", args)?;
    Ok(Box::new(move |value| match value.as_object() {
        Some(map) if map.len() > limit => Some(format!("must have at most {limit} properties")),
        _ => None,
    }))
}

/// Property dependencies: a present key requires the listed keys (or the
/// `required` list of a schema dependency).
fn dependencies(args: &[Value]) -> Result<JsonValidator, ValidatorError> {
    let rules = first_arg("dependencies", args)?
        .as_object()
        .ok_or_else(|| invalid("dependencies", "expected an object"))?;
    let rules: Vec<(String, Vec<String>)> = rules
        .iter()
        .map(|(key, rule)| {
            let needed: &[Value] = match rule {
                Value::Array(names) => names.as_slice(),
                Value::Object(schema) => schema
                    .get("required")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default(),
                _ => &[],
            };
            let needed = needed
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect();
            (key.clone(), needed)
        })
        .collect();

    Ok(Box::new(move |value| {
        let map = value.as_object()?;
        let missing: Vec<String> = rules
            .iter()
            .filter(|(key, _)| map.contains_key(key))
            .flat_map(|(key, needed)| {
                needed
                    .iter()
                    .filter(|name| !map.contains_key(name.as_str()))
                    .map(move |name| format!("{name} (required by {key})"))
            })
            .collect();
        (!missing.is_empty()).then(|| format!("missing {}", missing.join(", ")))
    }))
}
