//! Typed access to config fields.
//!
//! Each field of a [`Configurable`] record is exposed as a [`ConfigValue`] trait object. The trait is implemented
//! for a closed set of types:
//!
//! | Rust type | [`FieldKind`] |
//! |:----------|:--------------|
//! | `bool` | [`Bool`](FieldKind::Bool) |
//! | `i8`..`i64`, `isize` | [`Integer`](FieldKind::Integer) |
//! | `u8`..`u64`, `usize` | [`Unsigned`](FieldKind::Unsigned) |
//! | `f32`, `f64` | [`Float`](FieldKind::Float) |
//! | `String` | [`String`](FieldKind::String) |
//! | `Vec<T>` for `T: ConfigValue` | [`Sequence`](FieldKind::Sequence) |
//! | types deriving [`Configurable`](macro@crate::Configurable), `Option<_>` of such types | [`Record`](FieldKind::Record) |
//!
//! # Conversions
//!
//! Source values are converted weakly: env variables are always strings, so strings are coerced to
//! Booleans and numbers, and a string is split on `,` into a sequence, with each item trimmed.
//! Boolean literals accepted in strings are `1`, `t`, `T`, `TRUE`, `true`, `True`, and
//! `0`, `f`, `F`, `FALSE`, `false`, `False`.

use std::{fmt, str::FromStr};

use crate::{
    Configurable,
    error::{ShapeError, ValueError},
    metadata::{FieldKind, RecordDescriptor},
    value::{Value, WithOrigin},
};

#[doc(hidden)] // used in the derive macro
pub mod _private;
#[cfg(test)]
mod tests;

/// Dynamically typed access to a single config field.
pub trait ConfigValue {
    /// Returns the semantic kind of this value.
    fn kind(&self) -> FieldKind;

    /// Checks whether this is the zero value for its type (e.g., `false`, `0`, an empty string or sequence).
    fn is_zero(&self) -> bool;

    /// Assigns a source value to this field, converting it to the field type.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be converted.
    fn assign(&mut self, value: &WithOrigin) -> Result<(), ValueError>;

    /// Converts the current value to the JSON object model.
    fn to_value(&self) -> Value;

    /// Accesses this value as a nested record.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a record, or is an absent optional record.
    fn as_record_mut(&mut self) -> Result<&mut dyn Configurable, ShapeError> {
        Err(ShapeError::NotRecord { kind: self.kind() })
    }
}

/// Statically known [`FieldKind`] of a type. Used by the derive macro to describe fields.
pub trait WellKnown: ConfigValue {
    /// Kind of values of this type.
    const KIND: FieldKind;
    /// Getter for the record descriptor if this type is a record.
    const DESCRIBE_NESTED: Option<fn() -> &'static RecordDescriptor> = None;
}

/// Parses a Boolean literal.
///
/// # Errors
///
/// Returns an error if `s` is not one of recognized literals.
pub fn parse_bool(s: &str) -> Result<bool, ParseBoolError> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseBoolError(())),
    }
}

/// Error returned by [`parse_bool()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBoolError(());

impl fmt::Display for ParseBoolError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("expected one of `1`, `t`, `true`, `0`, `f`, `false` (in any of the common cases)")
    }
}

impl std::error::Error for ParseBoolError {}

impl WellKnown for bool {
    const KIND: FieldKind = FieldKind::Bool;
}

impl ConfigValue for bool {
    fn kind(&self) -> FieldKind {
        FieldKind::Bool
    }

    fn is_zero(&self) -> bool {
        !*self
    }

    fn assign(&mut self, value: &WithOrigin) -> Result<(), ValueError> {
        *self = match &value.inner {
            Value::Bool(flag) => *flag,
            Value::String(s) => parse_bool(s)
                .map_err(|err| ValueError::new(format!("invalid Boolean {s:?}: {err}"), value))?,
            _ => return Err(ValueError::invalid_type("Boolean", value)),
        };
        Ok(())
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

fn parse_integer<T>(value: &WithOrigin) -> Result<T, ValueError>
where
    T: TryFrom<i64> + TryFrom<u64> + FromStr,
    <T as FromStr>::Err: fmt::Display,
{
    match &value.inner {
        Value::Number(number) => {
            let converted = if let Some(number) = number.as_u64() {
                <T as TryFrom<u64>>::try_from(number).ok()
            } else if let Some(number) = number.as_i64() {
                <T as TryFrom<i64>>::try_from(number).ok()
            } else {
                None
            };
            converted.ok_or_else(|| {
                ValueError::new(
                    format!("number {number} is not an integer in the expected range"),
                    value,
                )
            })
        }
        Value::String(s) => s
            .parse()
            .map_err(|err| ValueError::new(format!("invalid integer {s:?}: {err}"), value)),
        _ => Err(ValueError::invalid_type("integer", value)),
    }
}

macro_rules! impl_integer_value {
    ($kind:ident => $($ty:ty),+) => {
        $(
        impl WellKnown for $ty {
            const KIND: FieldKind = FieldKind::$kind;
        }

        impl ConfigValue for $ty {
            fn kind(&self) -> FieldKind {
                FieldKind::$kind
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }

            fn assign(&mut self, value: &WithOrigin) -> Result<(), ValueError> {
                *self = parse_integer(value)?;
                Ok(())
            }

            fn to_value(&self) -> Value {
                Value::Number((*self).into())
            }
        }
        )+
    };
}

impl_integer_value!(Integer => i8, i16, i32, i64, isize);
impl_integer_value!(Unsigned => u8, u16, u32, u64, usize);

fn parse_float(value: &WithOrigin) -> Result<f64, ValueError> {
    match &value.inner {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| ValueError::new(format!("number {number} is not a float"), value)),
        Value::String(s) => s
            .parse()
            .map_err(|err| ValueError::new(format!("invalid float {s:?}: {err}"), value)),
        _ => Err(ValueError::invalid_type("float", value)),
    }
}

impl WellKnown for f64 {
    const KIND: FieldKind = FieldKind::Float;
}

impl ConfigValue for f64 {
    fn kind(&self) -> FieldKind {
        FieldKind::Float
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn assign(&mut self, value: &WithOrigin) -> Result<(), ValueError> {
        *self = parse_float(value)?;
        Ok(())
    }

    fn to_value(&self) -> Value {
        serde_json::Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }
}

impl WellKnown for f32 {
    const KIND: FieldKind = FieldKind::Float;
}

impl ConfigValue for f32 {
    fn kind(&self) -> FieldKind {
        FieldKind::Float
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    #[allow(clippy::cast_possible_truncation)] // intentional; same as parsing `f32` from a wider literal
    fn assign(&mut self, value: &WithOrigin) -> Result<(), ValueError> {
        *self = match &value.inner {
            Value::String(s) => s
                .parse()
                .map_err(|err| ValueError::new(format!("invalid float {s:?}: {err}"), value))?,
            _ => parse_float(value)? as f32,
        };
        Ok(())
    }

    fn to_value(&self) -> Value {
        serde_json::Number::from_f64((*self).into()).map_or(Value::Null, Value::Number)
    }
}

impl WellKnown for String {
    const KIND: FieldKind = FieldKind::String;
}

impl ConfigValue for String {
    fn kind(&self) -> FieldKind {
        FieldKind::String
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn assign(&mut self, value: &WithOrigin) -> Result<(), ValueError> {
        *self = match &value.inner {
            Value::String(s) => s.clone(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            _ => return Err(ValueError::invalid_type("string", value)),
        };
        Ok(())
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl<T: ConfigValue + Default> WellKnown for Vec<T> {
    const KIND: FieldKind = FieldKind::Sequence;
}

impl<T: ConfigValue + Default> ConfigValue for Vec<T> {
    fn kind(&self) -> FieldKind {
        FieldKind::Sequence
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn assign(&mut self, value: &WithOrigin) -> Result<(), ValueError> {
        let items = match &value.inner {
            Value::Array(items) => items.clone(),
            Value::String(s) if s.is_empty() => vec![],
            Value::String(s) => s
                .split(',')
                .map(|item| WithOrigin::new(Value::from(item.trim()), value.origin.clone()))
                .collect(),
            _ => return Err(ValueError::invalid_type("sequence", value)),
        };

        let mut converted = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let mut element = T::default();
            element
                .assign(item)
                .map_err(|err| err.in_context(format_args!("item #{i}")))?;
            converted.push(element);
        }
        *self = converted;
        Ok(())
    }

    fn to_value(&self) -> Value {
        let items = self.iter().map(|item| WithOrigin {
            inner: item.to_value(),
            origin: Default::default(),
        });
        Value::Array(items.collect())
    }
}

impl<T: Configurable + ConfigValue + Default> WellKnown for Option<T> {
    const KIND: FieldKind = FieldKind::Record;
    const DESCRIBE_NESTED: Option<fn() -> &'static RecordDescriptor> = Some(T::describe);
}

impl<T: Configurable + ConfigValue + Default> ConfigValue for Option<T> {
    fn kind(&self) -> FieldKind {
        FieldKind::Record
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn assign(&mut self, value: &WithOrigin) -> Result<(), ValueError> {
        if matches!(value.inner, Value::Null) {
            *self = None;
            Ok(())
        } else {
            self.get_or_insert_with(T::default).assign(value)
        }
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ConfigValue::to_value)
    }

    fn as_record_mut(&mut self) -> Result<&mut dyn Configurable, ShapeError> {
        match self {
            Some(record) => Ok(record),
            None => Err(ShapeError::Null),
        }
    }
}
