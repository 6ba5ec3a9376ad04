//! Schema Form
//!
//! Derives a form-control model from a JSON Schema: widget types, per-field
//! validators, initial values and merged presentation options.
//!
//! The engine is a set of small components over `serde_json::Value` trees:
//! pointer resolution, schema navigation by data pointer, `$ref`/`allOf`
//! resolution with a per-build cache, widget-type inference, required-field
//! lookup, validator derivation, and option merging into a control template.
//! [`build_form`] ties them together.
//!
//! # Example
//!
//! ```
//! use schema_form::{build_form, FormOptions, WidgetType};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "age": { "type": "integer", "minimum": 0, "maximum": 120 }
//!     },
//!     "required": ["age"]
//! });
//!
//! let model = build_form(&schema, &json!({}), &FormOptions::new()).unwrap();
//!
//! let age = model.layout_node("/age").unwrap();
//! assert_eq!(age.primary_type(), Some(&WidgetType::Range));
//! assert!(model.field("/age").unwrap().required);
//! assert_eq!(model.validators("/age")["multipleOf"], vec![json!(1)]);
//! ```
//!
//! # Widget inference
//!
//! | Schema | Widget |
//! |--------|--------|
//! | `x-schema-form.type` / `ui:widget` | as given |
//! | `boolean` | `checkbox` |
//! | `object` with `properties` | `fieldset` (else `textarea`) |
//! | `array` of `enum` items | `checkboxes` (else `array`) |
//! | `null` | `hidden` |
//! | any `enum` | `select` |
//! | `integer`, or `number` with `multipleOf`, bounded both ways | `range` |
//! | `string` with `format` | `color`, `date`, `datetime-local`, `email`, `url` |
//! | anything else | `text` |

mod builder;
mod error;
mod input_type;
mod layout;
mod loader;
mod navigator;
mod options;
mod pointer;
mod reference;
mod registry;
mod required;
mod template;
mod types;
mod validate;
mod validators;

pub use builder::{build_form, build_form_with_registry, FormModel};
pub use error::{BuildError, FieldError, LoadError, ReferenceError, ValidateError, ValidatorError};
pub use input_type::get_input_type;
pub use layout::LayoutNode;
pub use loader::{load_options, load_options_str, load_schema, load_schema_str};
pub use navigator::get_from_schema;
pub use options::{options_for, update_input_options, MergeContext};
pub use pointer::{compile, get_first, is_index, JsonPointer, APPEND};
pub use reference::{get_schema_reference, is_remote, reference_target, ReferenceLibrary};
pub use registry::{
    CompiledValidators, JsonValidator, ValidationFailure, ValidatorConstructor, ValidatorRegistry,
};
pub use required::is_input_required;
pub use template::{
    array_node, control_node, group_node, without_values, ControlTemplate, FieldInfo, FieldMap,
    FORM_ARRAY, FORM_CONTROL, FORM_GROUP,
};
pub use types::{json_type_name, FormOptions, SchemaType, WidgetType, FORM_EXTENSION, UI_PREFIX};
pub use validate::{validate, validate_controls};
pub use validators::{get_control_validators, ValidatorMap};
