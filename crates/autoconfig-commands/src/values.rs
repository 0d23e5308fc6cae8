use std::{fmt, io, io::Write as _};

use anstream::stream::{AsLockedWrite, RawStream};
use anstyle::{AnsiColor, Color, Style};
use autoconfig::{
    ConfigEngine, Configurable,
    de::ConfigValue,
    metadata::RecordDescriptor,
    source::env_var_name,
    value::{Map, Value},
};

use crate::Printer;

const SECTION: Style = Style::new().bold();
const VAR_NAME: Style = Style::new().bold();
const PATH: Style = Style::new().dimmed();
const ORIGIN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
const UNSET: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));

impl<W: RawStream + AsLockedWrite> Printer<W> {
    /// Prints current values of the `config` fields, recursing into nested records. For bound fields,
    /// the origin of the value in the `engine` source is printed as well.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors.
    pub fn print_values<C: Configurable + ConfigValue>(
        self,
        engine: &ConfigEngine,
        config: &C,
    ) -> io::Result<()> {
        let mut writer = self.writer;
        let descriptor = config.descriptor();
        writeln!(
            &mut writer,
            "{SECTION}Values of {}:{SECTION:#}",
            descriptor.ty.name_in_code()
        )?;

        let Value::Object(values) = config.to_value() else {
            return Ok(());
        };
        write_record(&mut writer, engine, descriptor, &values, "")
    }
}

fn write_record(
    writer: &mut impl io::Write,
    engine: &ConfigEngine,
    record: &'static RecordDescriptor,
    values: &Map,
    parent_path: &str,
) -> io::Result<()> {
    for field in record.fields {
        let path = if parent_path.is_empty() {
            field.name.to_owned()
        } else {
            format!("{parent_path}.{}", field.name)
        };
        let key = field.binding_key();
        let Some(value) = values.get(key.unwrap_or(field.name)) else {
            continue;
        };

        let nested = field.nested_record().filter(|_| field.is_bound_nested());
        if let (Some(nested), Value::Object(nested_values)) = (nested, &value.inner) {
            write_record(writer, engine, nested, nested_values, &path)?;
            continue;
        }

        let value = ValueDisplay(&value.inner);
        if let Some(key) = key {
            let var_name = env_var_name(engine.prefix(), key);
            write!(
                writer,
                "{VAR_NAME}{var_name}{VAR_NAME:#} {PATH}({path}){PATH:#} = {value}"
            )?;
            if let Some(source_value) = engine.source().lookup(key) {
                writeln!(writer, " {ORIGIN}[{}]{ORIGIN:#}", source_value.origin)?;
            } else {
                writeln!(writer, " {UNSET}[not set]{UNSET:#}")?;
            }
        } else {
            writeln!(writer, "{PATH}{path}{PATH:#} = {value}")?;
        }
    }
    Ok(())
}

/// Compact single-line representation of a value.
struct ValueDisplay<'a>(&'a Value);

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Null => formatter.write_str("null"),
            Value::Bool(flag) => write!(formatter, "{flag}"),
            Value::Number(number) => write!(formatter, "{number}"),
            Value::String(s) => write!(formatter, "{s:?}"),
            Value::Array(items) => {
                formatter.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        formatter.write_str(", ")?;
                    }
                    write!(formatter, "{}", ValueDisplay(&item.inner))?;
                }
                formatter.write_str("]")
            }
            Value::Object(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_unstable_by_key(|(key, _)| key.as_str());
                formatter.write_str("{")?;
                for (i, (key, item)) in entries.into_iter().enumerate() {
                    if i > 0 {
                        formatter.write_str(", ")?;
                    }
                    write!(formatter, "{key:?}: {}", ValueDisplay(&item.inner))?;
                }
                formatter.write_str("}")
            }
        }
    }
}
