//! Record-level implementations of [`ConfigValue`] methods, shared by all derived records.

use crate::{
    Configurable,
    error::ValueError,
    value::{self, Map, Value, WithOrigin},
};

/// A record is zero if all its visible fields are zero.
pub fn record_is_zero(record: &dyn Configurable) -> bool {
    let fields = record.descriptor().fields;
    (0..fields.len()).all(|i| record.field(i).is_none_or(|field| field.is_zero()))
}

/// Assigns an object to a record, matching object keys against binding keys of the record fields.
/// Fields without a matching key are left intact.
pub fn assign_record(record: &mut dyn Configurable, value: &WithOrigin) -> Result<(), ValueError> {
    let map = match &value.inner {
        Value::Object(map) => map,
        Value::Null => return Ok(()),
        _ => return Err(ValueError::invalid_type("object", value)),
    };

    let descriptor = record.descriptor();
    for (i, field) in descriptor.fields.iter().enumerate() {
        let Some(key) = field.binding_key() else {
            continue;
        };
        let Some(field_value) = value::get_ignore_case(map, key) else {
            continue;
        };
        let Some(target) = record.field_mut(i) else {
            continue;
        };
        target
            .assign(field_value)
            .map_err(|err| err.in_context(format_args!("field `{}`", field.name)))?;
    }
    Ok(())
}

/// Converts a record to an object keyed by binding keys (or field names for unbound fields).
pub fn record_to_value(record: &dyn Configurable) -> Value {
    let descriptor = record.descriptor();
    let entries = descriptor.fields.iter().enumerate().filter_map(|(i, field)| {
        let value = record.field(i)?.to_value();
        let key = field.binding_key().unwrap_or(field.name);
        Some((key.to_owned(), WithOrigin::new(value, Default::default())))
    });
    Value::Object(entries.collect::<Map>())
}
