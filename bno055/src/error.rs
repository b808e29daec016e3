//! Error types for parameter declaration, retrieval and loading

use std::path::PathBuf;

use crate::parameter::ParameterType;

pub type Result<T> = std::result::Result<T, ParameterError>;

/// Errors raised by the parameter registry and its configuration sources.
#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    #[error("parameter '{0}' already declared")]
    AlreadyDeclared(String),

    #[error("parameter '{0}' not declared")]
    NotDeclared(String),

    #[error("parameter '{0}' is read-only")]
    ReadOnly(String),

    #[error("parameter '{name}': expected type {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: ParameterType,
        actual: ParameterType,
    },

    #[error("parameter '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("failed to read parameter file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("malformed parameter file: {0}")]
    MalformedFile(String),

    #[error("invalid ROS argument: {0}")]
    InvalidArgument(String),
}

impl ParameterError {
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// A declared parameter could not be read back into its typed field.
///
/// The loader catches this and falls back to the default parameter set.
#[derive(Debug, thiserror::Error)]
#[error("could not get parameter '{name}': {source}")]
pub struct ParameterRetrievalError {
    pub name: String,
    #[source]
    pub source: ParameterError,
}

impl ParameterRetrievalError {
    pub fn new(name: impl Into<String>, source: ParameterError) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}
