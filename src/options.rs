//! Option and validator merging for one layout node.
//!
//! Options are resolved through four layers, first present value wins:
//! the layout node itself, the schema's `x-schema-form` extension, the schema,
//! and the form-wide defaults. Layout options that tighten a schema
//! constraint are also written into the control template as validators.

use serde_json::{Map, Value};
use tracing::debug;

use crate::layout::LayoutNode;
use crate::pointer::{get_first, JsonPointer};
use crate::registry::ValidatorRegistry;
use crate::template::{without_values, ControlTemplate, FieldMap};
use crate::types::{SchemaType, FORM_EXTENSION, UI_PREFIX};

/// Options every field synchronizes.
const BASE_OPTIONS: &[&str] = &[
    "title",
    "notitle",
    "disabled",
    "description",
    "validationMessage",
    "onChange",
    "feedback",
    "disableSuccessState",
    "disableErrorState",
    "placeholder",
    "readonly",
    "copyValueTo",
    "condition",
    "destroyStrategy",
    "htmlClass",
    "fieldHtmlClass",
    "labelHtmlClass",
    "enum",
    "ui:autofocus",
    "ui:disabled",
    "ui:help",
    "ui:placeholder",
    "ui:readonly",
    "ui:options",
    "ui:rootFieldId",
];

/// Widget types paired with the extra options they carry.
const TYPED_OPTIONS: &[(&[&str], &[&str])] = &[
    (
        &["text", "textarea", "search"],
        &["minLength", "maxLength", "pattern"],
    ),
    (
        &["text", "textarea", "search", "email", "password", "tel", "url"],
        &["format"],
    ),
    (
        &["date", "datetime", "datetime-local", "month", "time", "week"],
        &["format", "minimum", "maximum"],
    ),
    (
        &["number", "integer", "range"],
        &[
            "minimum",
            "maximum",
            "exclusiveMinimum",
            "exclusiveMaximum",
            "multipleOf",
        ],
    ),
    (
        &["fieldset"],
        &["minProperties", "maxProperties", "dependencies"],
    ),
    (&["array", "checkboxes"], &["minItems", "maxItems", "uniqueItems"]),
];

/// Read-only inputs shared by every merge in one build.
#[derive(Debug, Clone, Copy)]
pub struct MergeContext<'a> {
    /// Initial data document.
    pub data: &'a Value,
    /// Form-wide default options (an object).
    pub form_defaults: &'a Value,
    pub field_map: &'a FieldMap,
    /// Validator constructors, consulted only for existence.
    pub registry: &'a ValidatorRegistry,
}

/// The option names to synchronize for a node with the given widget types.
pub fn options_for(layout: &LayoutNode) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BASE_OPTIONS.to_vec();
    for (types, extra) in TYPED_OPTIONS {
        if types.iter().any(|t| layout.has_type(t)) {
            for &name in *extra {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }
    names
}

/// Merge options into `layout` and write derived validators and the
/// initial value into `template`.
///
/// The node's `templatePointer` is looked up in the field map by the node's
/// data pointer. A node without a field map entry still has its options
/// merged, but nothing is written to the template.
pub fn update_input_options(
    layout: &mut LayoutNode,
    schema: &Value,
    ctx: &MergeContext<'_>,
    template: &mut ControlTemplate,
) {
    let template_pointer = layout
        .pointer
        .as_deref()
        .and_then(|pointer| ctx.field_map.template_pointer(pointer))
        .map(str::to_string);
    let snapshot = Value::Object(layout.options.clone());
    let extension = schema.get(FORM_EXTENSION);

    for option in options_for(layout) {
        let option_pointer = JsonPointer::root().join(option).compile();

        if let (Some(tp), Some(own)) = (&template_pointer, layout.options.get(option)) {
            if ctx.registry.contains(option) && overrides_schema(option, own, schema.get(option)) {
                debug!(template_pointer = tp.as_str(), option, "layout validator override");
                template.set_validator(tp, option, vec![own.clone()]);
            }
        }

        let mut merged = get_first(&[
            (Some(&snapshot), option_pointer.as_str()),
            (extension, option_pointer.as_str()),
            (Some(schema), option_pointer.as_str()),
            (Some(ctx.form_defaults), option_pointer.as_str()),
        ]);
        if merged.is_none() && option == "enum" {
            merged = schema
                .get("items")
                .and_then(|items| items.get("enum"))
                .filter(|value| !value.is_null());
        }
        if let Some(value) = merged {
            let name = option.strip_prefix(UI_PREFIX).unwrap_or(option);
            layout.options.insert(name.to_string(), value.clone());
        }
    }

    if SchemaType::of(schema) == Some(SchemaType::Integer)
        && layout.options.get("multipleOf").map_or(true, Value::is_null)
    {
        layout.options.insert("multipleOf".to_string(), Value::from(1));
        if let Some(tp) = &template_pointer {
            template.set_validator(tp, "multipleOf", vec![Value::from(1)]);
        }
    }

    let Some(tp) = template_pointer else {
        debug!(pointer = ?layout.pointer, "no template slot for layout node");
        if !layout.is_container() {
            strip_transient(&mut layout.options);
        }
        return;
    };

    if SchemaType::of(schema) == Some(SchemaType::Array) {
        if let Some(prototype) = template.get(&format!("{tp}/controls/-")) {
            layout.control_template = Some(without_values(prototype));
        }
    }

    if !layout.is_container() {
        let data_pointer = layout
            .pointer
            .as_deref()
            .filter(|p| JsonPointer::parse(p).is_some_and(|p| !p.has_wildcard()))
            .unwrap_or("");
        let data = (!data_pointer.is_empty()).then_some(ctx.data);
        let value = get_first(&[
            (data, data_pointer),
            (Some(&snapshot), "/value"),
            (Some(&snapshot), "/default"),
        ])
        .cloned();

        let value_pointer = format!("{tp}/value");
        if let Some(value) = value {
            if template.get(&value_pointer) != Some(&value) {
                template.set(&value_pointer, value);
            }
        }
        strip_transient(&mut layout.options);
    }
}

fn strip_transient(options: &mut Map<String, Value>) {
    options.remove("value");
    options.remove("default");
}

/// True if the layout's own value for `option` should replace the schema's
/// validator.
///
/// A missing or different schema value triggers an override, except that a
/// `min*` option whose schema value is greater, or a `max*` option whose
/// schema value is greater, keeps the schema's own validator.
fn overrides_schema(option: &str, layout_value: &Value, schema_value: Option<&Value>) -> bool {
    let Some(schema_value) = schema_value else {
        return true;
    };
    if schema_value == layout_value {
        return false;
    }
    let schema_greater = match (schema_value.as_f64(), layout_value.as_f64()) {
        (Some(s), Some(l)) => s > l,
        _ => false,
    };
    !((option.starts_with("min") || option.starts_with("max")) && schema_greater)
}
