//! Form-model builder - walks a schema and derives layout, control template
//! and field map in one pass.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{BuildError, ReferenceError};
use crate::input_type::get_input_type;
use crate::layout::LayoutNode;
use crate::navigator::child_schema;
use crate::options::{update_input_options, MergeContext};
use crate::pointer::{compile, JsonPointer, APPEND};
use crate::reference::{get_schema_reference, ReferenceLibrary};
use crate::registry::ValidatorRegistry;
use crate::required::is_input_required;
use crate::template::{array_node, control_node, group_node, ControlTemplate, FieldInfo, FieldMap};
use crate::types::{json_type_name, FormOptions, SchemaType, WidgetType};
use crate::validators::{get_control_validators, ValidatorMap};

/// The derived form model: what a rendering layer needs to paint and bind
/// a form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormModel {
    /// Root layout node; children mirror the schema's fields.
    pub layout: LayoutNode,
    pub template: ControlTemplate,
    pub field_map: FieldMap,
}

impl FormModel {
    /// Bookkeeping for the field at `data_pointer`.
    pub fn field(&self, data_pointer: &str) -> Option<&FieldInfo> {
        self.field_map.get(data_pointer)
    }

    /// Validators attached to the field at `data_pointer`.
    pub fn validators(&self, data_pointer: &str) -> ValidatorMap {
        self.field_map
            .template_pointer(data_pointer)
            .map(|tp| self.template.validators(tp))
            .unwrap_or_default()
    }

    /// Layout node for `data_pointer`, searched depth-first.
    pub fn layout_node(&self, data_pointer: &str) -> Option<&LayoutNode> {
        fn find<'a>(node: &'a LayoutNode, pointer: &str) -> Option<&'a LayoutNode> {
            if node.pointer.as_deref() == Some(pointer) {
                return Some(node);
            }
            node.items.iter().find_map(|child| find(child, pointer))
        }
        find(&self.layout, data_pointer)
    }
}

/// Build a form model with the standard validator set.
///
/// # Errors
///
/// Returns `BuildError` if the root schema is not an object, its root
/// reference cannot be resolved, or a field's validators cannot be
/// constructed. Unresolvable fields below the root are logged and omitted.
pub fn build_form(
    schema: &Value,
    data: &Value,
    options: &FormOptions,
) -> Result<FormModel, BuildError> {
    build_form_with_registry(schema, data, options, &ValidatorRegistry::standard())
}

/// Build a form model against a caller-supplied validator registry.
pub fn build_form_with_registry(
    schema: &Value,
    data: &Value,
    options: &FormOptions,
    registry: &ValidatorRegistry,
) -> Result<FormModel, BuildError> {
    if !schema.is_object() {
        return Err(BuildError::InvalidRoot {
            actual: json_type_name(schema).to_string(),
        });
    }

    let mut builder = Builder {
        root: schema,
        data,
        options,
        registry,
        defaults: Value::Object(options.defaults.clone()),
        library: ReferenceLibrary::new(),
        template: ControlTemplate::new(),
        field_map: FieldMap::new(),
        ref_chain: Vec::new(),
    };

    let resolved;
    let root_schema: &Value = if is_indirect(schema) {
        resolved = builder.resolve(schema)?;
        &resolved
    } else {
        schema
    };
    let layout = builder
        .build_field(
            root_schema,
            None,
            &JsonPointer::root(),
            &JsonPointer::root(),
        )?
        .unwrap_or_else(|| LayoutNode::new("").with_type(WidgetType::Fieldset));

    debug!(
        fields = builder.field_map.len(),
        references = builder.library.len(),
        "form model built"
    );

    Ok(FormModel {
        layout,
        template: builder.template,
        field_map: builder.field_map,
    })
}

struct Builder<'a> {
    root: &'a Value,
    data: &'a Value,
    options: &'a FormOptions,
    registry: &'a ValidatorRegistry,
    defaults: Value,
    library: ReferenceLibrary,
    template: ControlTemplate,
    field_map: FieldMap,
    /// `$ref` pointers on the current descent path.
    ref_chain: Vec<String>,
}

/// Where a field sits relative to its parent.
enum Slot<'s> {
    Property { parent: &'s Value, key: &'s str },
    Item,
}

impl<'a> Builder<'a> {
    /// Resolve `$ref` (with sibling keys overlaid) and bare `allOf` nodes.
    fn resolve(&mut self, node: &Value) -> Result<Arc<Value>, ReferenceError> {
        self.resolve_hops(node, &mut Vec::new())
    }

    /// `hops` holds the pointers already followed for this node, so alias
    /// chains are followed to the end but never around a loop.
    fn resolve_hops(
        &mut self,
        node: &Value,
        hops: &mut Vec<String>,
    ) -> Result<Arc<Value>, ReferenceError> {
        let Some(map) = node.as_object() else {
            return Ok(Arc::new(node.clone()));
        };

        if let Some(target) = map.get("$ref") {
            let reference = ref_string(target);
            let compiled = compile(&reference).unwrap_or_else(|| reference.clone());
            if hops.contains(&compiled) {
                return Err(ReferenceError::Circular { pointer: compiled });
            }
            hops.push(compiled);

            let mut resolved = get_schema_reference(
                self.root,
                &Value::String(reference),
                Some(&mut self.library),
            )?;
            if is_indirect(&resolved) {
                let next = self.resolve_hops(&resolved, hops)?;
                resolved = next;
            }
            if map.len() == 1 {
                return Ok(resolved);
            }
            let mut merged = match resolved.as_ref() {
                Value::Object(fields) => fields.clone(),
                _ => Map::new(),
            };
            for (key, value) in map.iter().filter(|(key, _)| key.as_str() != "$ref") {
                merged.insert(key.clone(), value.clone());
            }
            return Ok(Arc::new(Value::Object(merged)));
        }

        if let (1, Some(Value::Array(parts))) = (map.len(), map.get("allOf")) {
            let mut merged = Map::new();
            for part in parts {
                let resolved = self.resolve_hops(part, &mut hops.clone())?;
                if let Value::Object(fields) = resolved.as_ref() {
                    merged.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
            return Ok(Arc::new(Value::Object(merged)));
        }

        Ok(Arc::new(node.clone()))
    }

    /// Resolve a child schema, logging and skipping it on failure.
    fn resolve_child(
        &mut self,
        node: &Value,
        pointer: &JsonPointer,
    ) -> Option<(Arc<Value>, Option<String>)> {
        let reference = node.get("$ref").map(ref_string);
        if let Some(reference) = &reference {
            let compiled = compile(reference).unwrap_or_else(|| reference.clone());
            if self.ref_chain.contains(&compiled) {
                warn!(
                    pointer = %pointer,
                    reference = compiled.as_str(),
                    "recursive reference, field omitted"
                );
                return None;
            }
        }
        match self.resolve(node) {
            Ok(resolved) => Some((resolved, reference.and_then(|r| compile(&r)))),
            Err(e) => {
                warn!(pointer = %pointer, error = %e, "cannot resolve field schema, field omitted");
                None
            }
        }
    }

    fn build_child(
        &mut self,
        raw: &Value,
        slot: Slot<'_>,
        data_pointer: &JsonPointer,
        template_pointer: &JsonPointer,
    ) -> Result<Option<LayoutNode>, BuildError> {
        if !is_indirect(raw) {
            return self.build_field(raw, Some(slot), data_pointer, template_pointer);
        }
        let Some((schema, reference)) = self.resolve_child(raw, data_pointer) else {
            return Ok(None);
        };
        if let Some(reference) = &reference {
            self.ref_chain.push(reference.clone());
        }
        let node = self.build_field(&schema, Some(slot), data_pointer, template_pointer);
        if reference.is_some() {
            self.ref_chain.pop();
        }
        node
    }

    /// Build one field: template node, field map entry, layout node and
    /// children, then merge the node's options.
    fn build_field(
        &mut self,
        schema: &Value,
        slot: Option<Slot<'_>>,
        data_pointer: &JsonPointer,
        template_pointer: &JsonPointer,
    ) -> Result<Option<LayoutNode>, BuildError> {
        let pointer = data_pointer.compile();
        let options = self.options;
        let over = options.layout_for(&pointer);

        let widget = match over.and_then(LayoutNode::primary_type) {
            Some(widget) => widget.clone(),
            None => match get_input_type(schema) {
                Some(widget) => widget,
                None => {
                    warn!(pointer = pointer.as_str(), "array schema has no items, field omitted");
                    return Ok(None);
                }
            },
        };

        let required = match slot {
            Some(Slot::Property { parent, key }) => {
                is_input_required(parent, &JsonPointer::root().join(key).compile())
            }
            _ => false,
        };

        let mut validators = get_control_validators(schema);
        if required {
            validators.insert("required".to_string(), vec![Value::Bool(true)]);
        }

        let mut layout = over.cloned().unwrap_or_default();
        layout.pointer = Some(pointer.clone());
        layout.items.clear();
        if layout.types.is_empty() {
            layout.types.push(widget.clone());
        }

        let tp = template_pointer.compile();
        self.field_map.insert(
            pointer.as_str(),
            FieldInfo {
                template_pointer: tp.clone(),
                required,
            },
        );

        let schema_type = SchemaType::of(schema);
        let properties = schema.get("properties").and_then(Value::as_object);
        match (schema_type, properties) {
            (Some(SchemaType::Object), Some(properties)) => {
                self.template.set(&tp, group_node(&validators));
                for (key, child) in properties {
                    let child_pointer = data_pointer.join(key.as_str());
                    let child_template = template_pointer.join("controls").join(key.as_str());
                    let slot = Slot::Property {
                        parent: schema,
                        key: key.as_str(),
                    };
                    if let Some(node) = self.build_child(child, slot, &child_pointer, &child_template)? {
                        layout.items.push(node);
                    }
                }
            }
            (Some(SchemaType::Array), _) if widget != WidgetType::Checkboxes => {
                self.template.set(&tp, array_node(&validators));
                let controls = template_pointer.join("controls");
                for segment in self.item_segments(data_pointer) {
                    let Some(item) = child_schema(schema, &segment) else {
                        debug!(
                            pointer = pointer.as_str(),
                            segment = segment.as_str(),
                            "no schema for array slot"
                        );
                        continue;
                    };
                    let child_pointer = data_pointer.join(segment);
                    let next = controls
                        .get(self.template.as_value())
                        .and_then(Value::as_array)
                        .map_or(0, Vec::len);
                    let child_template = controls.join(next.to_string());
                    if let Some(node) = self.build_child(item, Slot::Item, &child_pointer, &child_template)? {
                        layout.items.push(node);
                    }
                }
            }
            _ => {
                let value = schema.get("default").cloned().unwrap_or(Value::Null);
                self.template.set(&tp, control_node(value, &validators));
            }
        }

        let ctx = MergeContext {
            data: self.data,
            form_defaults: &self.defaults,
            field_map: &self.field_map,
            registry: self.registry,
        };
        update_input_options(&mut layout, schema, &ctx, &mut self.template);

        self.registry.compile(&self.template.validators(&tp))?;
        Ok(Some(layout))
    }

    /// Data segments for an array's item controls: one per data element,
    /// or a single `-` prototype when there is no data.
    fn item_segments(&self, data_pointer: &JsonPointer) -> Vec<String> {
        let count = if data_pointer.has_wildcard() {
            0
        } else {
            data_pointer
                .get(self.data)
                .and_then(Value::as_array)
                .map_or(0, Vec::len)
        };
        if count == 0 {
            vec![APPEND.to_string()]
        } else {
            (0..count).map(|i| i.to_string()).collect()
        }
    }
}

/// True for nodes that stand in for another schema.
fn is_indirect(node: &Value) -> bool {
    match node {
        Value::Object(map) => {
            map.contains_key("$ref") || (map.len() == 1 && map.contains_key("allOf"))
        }
        _ => false,
    }
}

fn ref_string(target: &Value) -> String {
    match target {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
