//! Config population and validation errors.

use std::{fmt, io, path::PathBuf, sync::Arc};

use crate::{
    metadata::FieldKind,
    value::{ValueOrigin, WithOrigin},
};

/// Error converting a source value to the field type.
#[derive(Debug, Clone)]
pub struct ValueError {
    message: String,
    origin: Arc<ValueOrigin>,
}

impl fmt::Display for ValueError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if matches!(self.origin.as_ref(), ValueOrigin::Unknown) {
            formatter.write_str(&self.message)
        } else {
            write!(formatter, "{} [origin: {}]", self.message, self.origin)
        }
    }
}

impl std::error::Error for ValueError {}

impl ValueError {
    pub(crate) fn new(message: String, value: &WithOrigin) -> Self {
        Self {
            message,
            origin: value.origin.clone(),
        }
    }

    pub(crate) fn invalid_type(expected: &str, value: &WithOrigin) -> Self {
        let message = format!("invalid type: expected {expected}, got {}", value.inner.type_name());
        Self::new(message, value)
    }

    pub(crate) fn in_context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }

    /// Returns the error message without the origin.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the origin of the value that failed conversion.
    pub fn origin(&self) -> &ValueOrigin {
        &self.origin
    }
}

/// Error assigning a source value to a record field.
#[derive(Debug, Clone)]
pub struct PopulateError {
    /// Name of the field in Rust code.
    pub field: &'static str,
    /// Binding key of the field.
    pub key: &'static str,
    /// Conversion error.
    pub source: ValueError,
}

impl fmt::Display for PopulateError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "cannot set field '{}' from key '{}': {}",
            self.field, self.key, self.source
        )
    }
}

impl std::error::Error for PopulateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Error related to the shape of a traversed value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShapeError {
    /// Value marked as a nested record is not a record.
    NotRecord {
        /// Actual kind of the value.
        kind: FieldKind,
    },
    /// Nested record is absent (e.g., an `Option` set to `None`).
    Null,
    /// Record descriptor refers to a field that is not accessible.
    MissingField {
        /// Name of the record type.
        ty: &'static str,
        /// Index of the field.
        index: usize,
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRecord { kind } => write!(formatter, "expected a record, got {kind}"),
            Self::Null => formatter.write_str("expected a record, got an absent value"),
            Self::MissingField { ty, index } => {
                write!(formatter, "record `{ty}` has no accessible field #{index}")
            }
        }
    }
}

impl std::error::Error for ShapeError {}

/// Operation that has produced an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Operation {
    /// Binding keys and populating a record from a source.
    Bind,
    /// Checking required fields and applying defaults.
    Validate,
    /// Reading a config file.
    ReadFile,
    /// Setting up a config file.
    Setup,
}

impl fmt::Display for Operation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Bind => "bind",
            Self::Validate => "validate",
            Self::ReadFile => "read file",
            Self::Setup => "setup",
        })
    }
}

/// Kind of an [`Error`].
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Traversed value has an unexpected shape.
    Shape(ShapeError),
    /// Required field has a zero value.
    MissingRequired {
        /// Name of the field in Rust code.
        field: &'static str,
        /// Namespace prefix of the engine.
        prefix: String,
        /// Binding key of the field, if any.
        key: Option<&'static str>,
    },
    /// Default value cannot be parsed according to the field kind.
    InvalidDefault {
        /// Name of the field in Rust code.
        field: &'static str,
        /// Kind of the field.
        kind: FieldKind,
        /// Offending literal.
        literal: String,
        /// Reason of the failure.
        reason: String,
    },
    /// Default values are not supported for the field kind.
    UnsupportedDefault {
        /// Name of the field in Rust code.
        field: &'static str,
        /// Kind of the field.
        kind: FieldKind,
    },
    /// Error in a nested record.
    Nested {
        /// Name of the field containing the nested record.
        field: &'static str,
        /// Error in the nested record.
        source: Box<Error>,
    },
    /// Source value cannot be assigned to a field.
    Populate(PopulateError),
    /// Invalid arguments.
    Setup(String),
    /// I/O error.
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// Config file is missing.
    FileNotFound {
        /// Expected path to the file.
        path: PathBuf,
    },
    /// Config file cannot be parsed.
    FileParse {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        source: anyhow::Error,
    },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape(err) => fmt::Display::fmt(err, formatter),
            Self::MissingRequired { field, prefix, key } => {
                if let Some(key) = key {
                    let var_name = crate::source::env_var_name(prefix, key);
                    write!(formatter, "missing required '{var_name}' for field '{field}'")
                } else {
                    write!(
                        formatter,
                        "missing required field '{field}' without a binding key (prefix '{prefix}')"
                    )
                }
            }
            Self::InvalidDefault {
                field,
                kind,
                literal,
                reason,
            } => write!(
                formatter,
                "invalid {kind} default {literal:?} for field '{field}': {reason}"
            ),
            Self::UnsupportedDefault { field, kind } => write!(
                formatter,
                "default values are not supported for {kind} field '{field}'"
            ),
            Self::Nested { field, source } => {
                write!(formatter, "nested record '{field}' → {source}")
            }
            Self::Populate(err) => fmt::Display::fmt(err, formatter),
            Self::Setup(message) => formatter.write_str(message),
            Self::Io { path, source } => write!(formatter, "I/O error on '{}': {source}", path.display()),
            Self::FileNotFound { path } => write!(formatter, "missing config file '{}'", path.display()),
            Self::FileParse { path, source } => {
                write!(formatter, "error parsing config file '{}': {source:#}", path.display())
            }
        }
    }
}

/// Error returned by public operations of the [`ConfigEngine`](crate::ConfigEngine).
#[derive(Debug)]
pub struct Error {
    operation: Operation,
    kind: ErrorKind,
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.operation, self.kind)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Shape(err) => Some(err),
            ErrorKind::Nested { source, .. } => Some(&**source),
            ErrorKind::Populate(err) => Some(err),
            ErrorKind::Io { source, .. } => Some(source),
            ErrorKind::FileParse { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

impl Error {
    pub(crate) fn new(operation: Operation, kind: ErrorKind) -> Self {
        Self { operation, kind }
    }

    pub(crate) fn shape(operation: Operation, err: ShapeError) -> Self {
        Self::new(operation, ErrorKind::Shape(err))
    }

    pub(crate) fn nested(self, field: &'static str) -> Self {
        Self {
            operation: self.operation,
            kind: ErrorKind::Nested {
                field,
                source: Box::new(self),
            },
        }
    }

    /// Returns the operation that has failed.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the innermost error, skipping [nested record](ErrorKind::Nested) wrappers.
    pub fn root(&self) -> &Self {
        let mut current = self;
        while let ErrorKind::Nested { source, .. } = &current.kind {
            current = source;
        }
        current
    }

    /// Returns the path to the field that caused the error, e.g. `["database", "port"]`.
    /// The path is empty if the error doesn't concern a specific field.
    pub fn field_path(&self) -> Vec<&'static str> {
        let mut path = vec![];
        let mut current = self;
        loop {
            match &current.kind {
                ErrorKind::Nested { field, source } => {
                    path.push(*field);
                    current = source;
                }
                ErrorKind::MissingRequired { field, .. }
                | ErrorKind::InvalidDefault { field, .. }
                | ErrorKind::UnsupportedDefault { field, .. }
                | ErrorKind::Populate(PopulateError { field, .. }) => {
                    path.push(*field);
                    break;
                }
                _ => break,
            }
        }
        path
    }
}
