//! Layout nodes: one form field or container, enriched during a build.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::pointer::JsonPointer;
use crate::types::WidgetType;

/// One field or container in the form layout.
///
/// `options` accumulates the merged presentation and validation options the
/// rendering layer reads. While a build is running it may also hold the
/// transient `value`/`default` keys, which are consumed into the control
/// template for non-container fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    /// Data pointer of the value this node controls.
    #[serde(
        default,
        deserialize_with = "deserialize_pointer",
        skip_serializing_if = "Option::is_none"
    )]
    pub pointer: Option<String>,

    /// Widget type(s); a single type serializes as a plain string.
    #[serde(
        rename = "type",
        default,
        with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub types: Vec<WidgetType>,

    #[serde(default)]
    pub options: Map<String, Value>,

    /// Item control prototype for dynamically added array elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_template: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<LayoutNode>,
}

impl LayoutNode {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self {
            pointer: Some(pointer.into()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, widget: WidgetType) -> Self {
        self.types.push(widget);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: Value) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    pub fn primary_type(&self) -> Option<&WidgetType> {
        self.types.first()
    }

    /// True if any of the node's widget types is named `name`.
    pub fn has_type(&self, name: &str) -> bool {
        self.types.iter().any(|t| t.as_str() == name)
    }

    pub fn is_container(&self) -> bool {
        self.types.iter().any(WidgetType::is_container)
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }
}

fn deserialize_pointer<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => JsonPointer::from_value(&value)
            .map(|p| Some(p.compile()))
            .ok_or_else(|| de::Error::custom(format!("invalid data pointer: {value}"))),
    }
}

mod one_or_many {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::types::WidgetType;

    pub fn serialize<S: Serializer>(types: &[WidgetType], serializer: S) -> Result<S::Ok, S::Error> {
        match types {
            [single] => single.serialize(serializer),
            many => many.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<WidgetType>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(WidgetType),
            Many(Vec<WidgetType>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(widget) => vec![widget],
            OneOrMany::Many(widgets) => widgets,
        })
    }
}
