//! JSON object model for source values, with each value associated with its origin.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::source::FileFormat;

/// Origin of a [`Value`] in configuration input.
#[derive(Debug, Default, Clone, PartialEq)]
#[non_exhaustive]
pub enum ValueOrigin {
    /// Unknown / synthetic origin.
    #[default]
    Unknown,
    /// Env variable with the enclosed name.
    EnvVar(String),
    /// Configuration file.
    File {
        /// Name of the file.
        filename: Arc<str>,
        /// Format of the file.
        format: FileFormat,
        /// Dot-separated path in the file, like `api.http.port`.
        path: String,
    },
    /// Default value from a `default=...` rule on the specified field.
    Default {
        /// Name of the field in Rust code.
        field: &'static str,
    },
}

impl fmt::Display for ValueOrigin {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => formatter.write_str("unknown"),
            Self::EnvVar(name) => write!(formatter, "env variable '{name}'"),
            Self::File {
                filename,
                format,
                path,
            } => {
                write!(formatter, "variable at '{path}' in {format} file '{filename}'")
            }
            Self::Default { field } => write!(formatter, "default value for field '{field}'"),
        }
    }
}

/// JSON value with additional origin information.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// `null`.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(serde_json::Number),
    /// String value.
    String(String),
    /// Array of values.
    Array(Vec<WithOrigin>),
    /// Object / map of values.
    Object(Map),
}

impl Value {
    /// Returns a human-readable name of the value type, e.g. for use in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "Boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Attempts to convert this value to an object.
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// JSON object.
pub type Map<V = Value> = HashMap<String, WithOrigin<V>>;

/// Looks up a key in a map, matching it case-insensitively if there's no exact match.
pub(crate) fn get_ignore_case<'a, V>(map: &'a Map<V>, key: &str) -> Option<&'a WithOrigin<V>> {
    map.get(key).or_else(|| {
        map.iter()
            .find_map(|(name, value)| name.eq_ignore_ascii_case(key).then_some(value))
    })
}

/// JSON value together with its origin.
#[derive(Debug, Clone, Default)]
pub struct WithOrigin<T = Value> {
    /// Inner value.
    pub inner: T,
    /// Origin of the value.
    pub origin: Arc<ValueOrigin>,
}

impl PartialEq for WithOrigin {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> WithOrigin<T> {
    /// Wraps a value.
    pub fn new(inner: T, origin: Arc<ValueOrigin>) -> Self {
        Self { inner, origin }
    }

    /// Maps the inner value, keeping the origin.
    pub fn map<U>(self, map_fn: impl FnOnce(T) -> U) -> WithOrigin<U> {
        WithOrigin {
            inner: map_fn(self.inner),
            origin: self.origin,
        }
    }
}

pub(crate) fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_owned()
    } else {
        format!("{parent}.{segment}")
    }
}
