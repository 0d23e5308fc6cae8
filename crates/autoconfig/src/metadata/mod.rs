//! Configuration metadata.
//!
//! Metadata comes in two layers:
//!
//! - [`RecordDescriptor`] / [`FieldDescriptor`] are static and emitted by the [`Configurable`](macro@crate::Configurable)
//!   derive macro. They contain raw annotations exactly as written in code.
//! - [`FieldMetadata`] is derived from descriptors by parsing the `rules` annotation (see [`FieldRules`]).
//!   It is built lazily and cached per record type by [`MetadataCache`].

use std::{any, fmt};

pub use self::{cache::MetadataCache, rules::FieldRules};

mod cache;
mod rules;

/// Annotation value excluding a field from key binding (for `key`) or from metadata (for `rules`).
pub const SKIP_SENTINEL: &str = "-";

/// Representation of a Rust type.
#[derive(Clone, Copy)]
pub struct RustType {
    id: fn() -> any::TypeId,
    name_in_code: &'static str,
}

impl fmt::Debug for RustType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name_in_code)
    }
}

impl PartialEq for RustType {
    fn eq(&self, other: &Self) -> bool {
        (self.id)() == (other.id)()
    }
}

impl RustType {
    /// Creates a new type.
    pub const fn of<T: 'static>(name_in_code: &'static str) -> Self {
        Self {
            id: any::TypeId::of::<T>,
            name_in_code,
        }
    }

    /// Returns the unique ID of this type.
    pub fn id(&self) -> any::TypeId {
        (self.id)()
    }

    /// Returns the name of this type as specified in code.
    pub const fn name_in_code(&self) -> &'static str {
        self.name_in_code
    }
}

/// Semantic kind of a config field. This is a closed set; defaults and source values are converted
/// according to the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FieldKind {
    /// Boolean value.
    Bool,
    /// Signed integer.
    Integer,
    /// Unsigned integer.
    Unsigned,
    /// Floating-point number.
    Float,
    /// String.
    String,
    /// Sequence of values, e.g. `Vec<String>`.
    Sequence,
    /// Nested record implementing [`Configurable`](crate::Configurable).
    Record,
    /// Any other type.
    Other,
}

impl FieldKind {
    /// Returns a human-readable name of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "Boolean",
            Self::Integer => "integer",
            Self::Unsigned => "unsigned integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Record => "record",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Static description of a single field in a [`Configurable`](crate::Configurable) record.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Name of the field in Rust code.
    pub name: &'static str,
    /// Raw binding key, i.e. the contents of `#[config(key = "...")]`.
    pub key: Option<&'static str>,
    /// Raw rules annotation, i.e. the contents of `#[config(rules = "...")]`.
    pub rules: Option<&'static str>,
    /// Semantic kind of the field.
    pub kind: FieldKind,
    /// Rust type of the field.
    pub rust_type: RustType,
    /// Human-readable help parsed from the doc comment.
    pub help: &'static str,
    /// Getter for the descriptor of the nested record type, if the field is a record.
    pub describe_nested: Option<fn() -> &'static RecordDescriptor>,
}

impl FieldDescriptor {
    /// Returns the descriptor of the nested record type, if the field is a record.
    pub fn nested_record(&self) -> Option<&'static RecordDescriptor> {
        self.describe_nested.map(|describe| describe())
    }

    /// Returns the binding key unless the field is excluded from binding.
    pub fn binding_key(&self) -> Option<&'static str> {
        self.key.filter(|key| !key.is_empty() && *key != SKIP_SENTINEL)
    }

    /// Checks whether the rules annotation marks the field as a nested record to bind into.
    /// Unlike [`FieldRules::parse()`], this requires the *entire* annotation to be `struct`.
    pub fn is_bound_nested(&self) -> bool {
        self.rules
            .is_some_and(|rules| rules.eq_ignore_ascii_case(FieldRules::NESTED_TOKEN))
    }
}

/// Static description of a [`Configurable`](crate::Configurable) record type.
#[derive(Debug, Clone, Copy)]
pub struct RecordDescriptor {
    /// Type of the record.
    pub ty: RustType,
    /// Help regarding the record itself.
    pub help: &'static str,
    /// Visible fields in the declaration order. The position of a field in this slice is its index
    /// for [`Configurable::field()`](crate::Configurable::field()).
    pub fields: &'static [FieldDescriptor],
}

/// Parsed per-field metadata. Derived once per record type and cached; contains no per-instance state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMetadata {
    /// Name of the field in Rust code.
    pub name: &'static str,
    /// Index of the field in the record (see [`RecordDescriptor::fields`]).
    pub index: usize,
    /// Source key of the field, if it is bound.
    pub key: Option<&'static str>,
    /// Whether the field must have a non-zero value after population.
    pub required: bool,
    /// Unparsed default value.
    pub default_value: Option<String>,
    /// Whether the field is a nested record that should be validated recursively.
    pub is_nested: bool,
    /// Semantic kind of the field.
    pub kind: FieldKind,
}

impl FieldMetadata {
    /// Derives metadata from a field descriptor. Returns `None` if the field has no rules annotation,
    /// or if it is excluded with the `-` sentinel.
    pub fn from_descriptor(index: usize, descriptor: &FieldDescriptor) -> Option<Self> {
        let rules = FieldRules::parse(descriptor.rules?)?;
        Some(Self {
            name: descriptor.name,
            index,
            key: descriptor.binding_key(),
            required: rules.required,
            default_value: rules.default_value,
            is_nested: rules.is_nested,
            kind: descriptor.kind,
        })
    }
}
