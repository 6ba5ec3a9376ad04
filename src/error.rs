//! Error types for schema loading, reference resolution and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading schema, data or options documents.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid form options: {source}")]
    InvalidOptions {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors while resolving a `$ref` or schema pointer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// Remote or external-document references are never fetched.
    #[error("unsupported reference \"{reference}\": only local schema pointers can be resolved")]
    Unsupported { reference: String },

    #[error("invalid schema pointer \"{pointer}\"")]
    InvalidPointer { pointer: String },

    #[error("reference target not found: {pointer}")]
    NotFound { pointer: String },

    #[error("circular reference detected: {pointer}")]
    Circular { pointer: String },
}

/// Errors while constructing a validator from its name and arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorError {
    #[error("no validator registered under \"{name}\"")]
    Unknown { name: String },

    #[error("invalid arguments for validator \"{name}\": {message}")]
    InvalidArguments { name: String, message: String },
}

/// Errors that abort a whole form-model build.
///
/// Failures below the root (unresolvable fields, bad references) are logged
/// and the affected field is omitted instead.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("root schema must be an object, got {actual}")]
    InvalidRoot { actual: String },

    #[error("cannot resolve root schema: {0}")]
    RootReference(#[from] ReferenceError),

    #[error(transparent)]
    Validator(#[from] ValidatorError),
}

impl BuildError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors during validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<FieldError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Load(e) => e.exit_code(),
            ValidateError::InvalidSchema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// Single validation failure with path context.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldError {
    /// JSON Pointer (RFC 6901) to the invalid value in the data document.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
