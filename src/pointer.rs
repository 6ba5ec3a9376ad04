//! JSON Pointer (RFC 6901) parsing, compilation and tree access.
//!
//! Pointers are accepted as compiled strings (`/a/b/0`), URI fragments
//! (`#/a/b/0`) or arrays of segments. The `-` segment addresses the next
//! appended array element: [`JsonPointer::set`] appends there, while
//! [`JsonPointer::get`] resolves it to the last existing element.

use std::fmt;

use serde_json::{Map, Value};

/// Reserved segment meaning "the next appended array element".
pub const APPEND: &str = "-";

/// A parsed JSON Pointer: an ordered sequence of unescaped segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    /// The empty pointer, addressing the whole document.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a compiled pointer or URI fragment.
    ///
    /// Returns `None` if the input is neither empty, `/`-prefixed, nor a
    /// `#`-prefixed fragment of one of those.
    pub fn parse(pointer: &str) -> Option<Self> {
        let pointer = pointer.strip_prefix('#').unwrap_or(pointer);
        if pointer.is_empty() {
            return Some(Self::root());
        }
        let rest = pointer.strip_prefix('/')?;
        Some(Self {
            segments: rest.split('/').map(unescape).collect(),
        })
    }

    /// Parse a pointer given as a JSON value: a pointer string, or an array
    /// of string/integer segments.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) if n.is_u64() => Some(n.to_string()),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(|segments| Self { segments }),
            _ => None,
        }
    }

    /// Build a pointer from already-unescaped segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The terminal segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The pointer with its terminal segment removed; `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, parents) = self.segments.split_last()?;
        Some(Self {
            segments: parents.to_vec(),
        })
    }

    /// A new pointer with `segment` appended.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// True if any segment is the append wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(|s| s == APPEND)
    }

    /// Canonical string form, with `~` and `/` escaped.
    pub fn compile(&self) -> String {
        self.segments
            .iter()
            .map(|segment| format!("/{}", escape(segment)))
            .collect()
    }

    /// Look up the value this pointer addresses.
    ///
    /// Returns `None` if any intermediate segment is absent.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(existing_index(items.len(), segment)?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Mutable variant of [`JsonPointer::get`].
    pub fn get_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get_mut(segment)?,
                Value::Array(items) => {
                    let index = existing_index(items.len(), segment)?;
                    items.get_mut(index)?
                }
                _ => return None,
            };
        }
        Some(current)
    }

    /// Write `value` at this pointer, creating missing containers on the way.
    ///
    /// Missing intermediates become arrays when the following segment is an
    /// index or `-`, objects otherwise. Returns false if an existing
    /// primitive blocks the path or an array index is out of range.
    pub fn set(&self, root: &mut Value, value: Value) -> bool {
        let Some((last, parents)) = self.segments.split_last() else {
            *root = value;
            return true;
        };

        let mut current = root;
        for segment in parents {
            initialize_container(current, segment);
            let Some(next) = child_or_insert(current, segment) else {
                return false;
            };
            current = next;
        }

        initialize_container(current, last);
        match current {
            Value::Object(map) => {
                map.insert(last.clone(), value);
                true
            }
            Value::Array(items) => {
                if last == APPEND {
                    items.push(value);
                    return true;
                }
                match array_index(last) {
                    Some(i) if i < items.len() => {
                        items[i] = value;
                        true
                    }
                    Some(i) if i == items.len() => {
                        items.push(value);
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Remove and return the value at this pointer.
    pub fn remove(&self, root: &mut Value) -> Option<Value> {
        let (last, parents) = self.segments.split_last()?;
        let parent = Self::from_segments(parents.iter().cloned()).get_mut(root)?;
        match parent {
            Value::Object(map) => map.remove(last),
            Value::Array(items) => {
                let index = existing_index(items.len(), last)?;
                Some(items.remove(index))
            }
            _ => None,
        }
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compile())
    }
}

/// Normalize a pointer string (or fragment) to its compiled form.
///
/// `compile("#/a/b")` is `Some("/a/b")`; malformed input yields `None`.
pub fn compile(pointer: &str) -> Option<String> {
    JsonPointer::parse(pointer).map(|p| p.compile())
}

/// Return the first present value among `(container, pointer)` candidates.
///
/// A candidate is skipped when its container is absent, its pointer is
/// malformed, or the addressed value is missing or `null`.
pub fn get_first<'a>(candidates: &[(Option<&'a Value>, &str)]) -> Option<&'a Value> {
    candidates.iter().find_map(|(container, pointer)| {
        let value = JsonPointer::parse(pointer)?.get((*container)?)?;
        (!value.is_null()).then_some(value)
    })
}

/// True for a canonical array index (`0`, `7`, `42`; not `07` or `+1`).
pub fn is_index(segment: &str) -> bool {
    array_index(segment).is_some()
}

pub(crate) fn array_index(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}

fn existing_index(len: usize, segment: &str) -> Option<usize> {
    if segment == APPEND {
        len.checked_sub(1)
    } else {
        array_index(segment)
    }
}

fn initialize_container(value: &mut Value, segment: &str) {
    if value.is_null() {
        *value = if segment == APPEND || is_index(segment) {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }
}

fn child_or_insert<'a>(parent: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match parent {
        Value::Object(map) => Some(map.entry(segment.to_string()).or_insert(Value::Null)),
        Value::Array(items) => {
            let index = if segment == APPEND {
                items.len()
            } else {
                array_index(segment)?
            };
            if index == items.len() {
                items.push(Value::Null);
            }
            items.get_mut(index)
        }
        _ => None,
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
