//! Data validation: whole documents against the schema, and individual
//! fields against the validators attached to their controls.

use serde_json::Value;
use tracing::debug;

use crate::builder::FormModel;
use crate::error::{FieldError, ValidateError, ValidatorError};
use crate::pointer::JsonPointer;
use crate::registry::ValidatorRegistry;

/// Validate a data document against a JSON Schema.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` if the schema cannot be compiled,
/// or `ValidateError::Invalid` with every failure if the data doesn't match.
pub fn validate(schema: &Value, data: &Value) -> Result<(), ValidateError> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
            message: e.to_string(),
        })?;

    let errors: Vec<FieldError> = validator
        .iter_errors(data)
        .map(|e| FieldError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

/// Run every field's template validators against the value at its data
/// pointer.
///
/// Array prototypes (pointers containing `-`) are skipped, as are fields
/// whose parent value is absent from `data`. A missing field is checked as
/// `null`, which only a `required` validator rejects.
///
/// # Errors
///
/// Returns `ValidatorError` if a validator attached to the template cannot
/// be constructed from `registry`.
pub fn validate_controls(
    model: &FormModel,
    data: &Value,
    registry: &ValidatorRegistry,
) -> Result<Vec<FieldError>, ValidatorError> {
    let mut errors = Vec::new();

    for (data_pointer, field) in model.field_map.iter() {
        let Some(pointer) = JsonPointer::parse(data_pointer) else {
            continue;
        };
        if pointer.has_wildcard() {
            continue;
        }

        let value = match pointer.get(data) {
            Some(value) => value,
            None if parent_present(&pointer, data) => &NULL,
            None => continue,
        };

        let compiled = registry.compile(&model.template.validators(&field.template_pointer))?;
        for failure in compiled.check(value) {
            debug!(
                pointer = data_pointer,
                validator = failure.validator.as_str(),
                "control validation failed"
            );
            errors.push(FieldError {
                path: data_pointer.to_string(),
                message: failure.message,
            });
        }
    }
    Ok(errors)
}

static NULL: Value = Value::Null;

fn parent_present(pointer: &JsonPointer, data: &Value) -> bool {
    pointer
        .parent()
        .is_some_and(|parent| parent.get(data).is_some_and(|v| !v.is_null()))
}
