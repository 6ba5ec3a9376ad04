//! Document loading from files and strings.
//!
//! Schemas, data documents and form options are all plain JSON. Remote
//! sources are not supported.

use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;
use crate::types::FormOptions;

/// Load a JSON document (schema or data) from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_schema(path: &Path) -> Result<Value, LoadError> {
    let content = read(path)?;
    load_schema_str(&content)
}

/// Load a JSON document from a string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON.
pub fn load_schema_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load form options (defaults and layout overrides) from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound`/`ReadError` for I/O failures and
/// `LoadError::InvalidOptions` if the file is not a valid options document.
pub fn load_options(path: &Path) -> Result<FormOptions, LoadError> {
    let content = read(path)?;
    load_options_str(&content)
}

/// Load form options from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidOptions` if the string is not a valid options
/// document.
pub fn load_options_str(content: &str) -> Result<FormOptions, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidOptions { source })
}

fn read(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WidgetType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_schema_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "object"}}"#).unwrap();

        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn load_schema_file_not_found() {
        let result = load_schema(Path::new("/nonexistent/path.json"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_schema_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let result = load_schema(file.path());
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_schema_str_invalid() {
        let result = load_schema_str("not json");
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_options_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "defaults": {{ "htmlClass": "wide" }},
                "layout": [{{ "pointer": "/bio", "type": "textarea", "options": {{ "title": "Bio" }} }}]
            }}"#
        )
        .unwrap();

        let options = load_options(file.path()).unwrap();
        assert_eq!(options.defaults["htmlClass"], "wide");
        let bio = options.layout_for("/bio").unwrap();
        assert_eq!(bio.primary_type(), Some(&WidgetType::Textarea));
    }

    #[test]
    fn load_options_array_pointer() {
        let options = load_options_str(r#"{ "layout": [{ "pointer": ["a/b", "c"] }] }"#).unwrap();
        assert!(options.layout_for("/a~1b/c").is_some());
    }

    #[test]
    fn load_options_wrong_shape() {
        let result = load_options_str(r#"{ "layout": { "pointer": "/a" } }"#);
        assert!(matches!(result, Err(LoadError::InvalidOptions { .. })));

        let result = load_options_str(r#"{ "layout": [{ "pointer": 7 }] }"#);
        assert!(matches!(result, Err(LoadError::InvalidOptions { .. })));
    }

    #[test]
    fn load_options_empty_object() {
        let options = load_options_str("{}").unwrap();
        assert!(options.defaults.is_empty());
        assert!(options.layout.is_empty());
    }
}
