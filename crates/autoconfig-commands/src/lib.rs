//! Command-line extensions for `autoconfig` library.
//!
//! The extensions are as follows:
//!
//! - [Printing help](Printer::print_help()) for config fields with optional filtering.
//! - [Printing values](Printer::print_values()) of bound fields together with their origins.
//!
//! All extensions are encapsulated in [`Printer`].
//!
//! # Examples
//!
//! ## Printing help
//!
//! ```
//! use autoconfig::{ConfigEngine, Configurable};
//! use autoconfig_commands::Printer;
//!
//! #[derive(Default, Configurable)]
//! struct TestConfig {
//!     /// Port to listen on.
//!     #[config(key = "port", rules = "default=8000")]
//!     port: u16,
//! }
//!
//! let engine = ConfigEngine::new("app");
//! Printer::stderr().print_help::<TestConfig, _>(&engine, |_| true)?;
//! # std::io::Result::Ok(())
//! ```
//!
//! ## Printing values
//!
//! ```
//! # use autoconfig::{ConfigEngine, Configurable};
//! # use autoconfig_commands::Printer;
//! # #[derive(Default, Configurable)]
//! # struct TestConfig {
//! #     #[config(key = "port", rules = "default=8000")]
//! #     port: u16,
//! # }
//! let mut engine = ConfigEngine::new("app");
//! let mut config = TestConfig::default();
//! engine.load(&mut config)?;
//! Printer::stderr().print_values(&engine, &config)?;
//! # anyhow::Ok(())
//! ```

// Linter settings
#![warn(missing_docs)]

use std::{
    io,
    io::{StderrLock, StdoutLock},
};

use anstream::{AutoStream, stream::RawStream};
use autoconfig::{
    ConfigEngine,
    metadata::{FieldDescriptor, FieldMetadata, RecordDescriptor},
    source::{KeyValueSource, env_var_name},
};

mod help;
mod values;

/// Wrapper around an I/O writer. Will style the output with ANSI sequences if appropriate.
///
/// Internally, the printer is based on [`anstream`] / [`anstyle`]; see their docs to find out how styling support
/// is detected by default. (TL;DR: based on `NO_COLOR`, `CLICOLOR_FORCE` and `CLICOLOR` env vars, and whether
/// the output is a terminal.) If this detection doesn't work for you, you can always [create](Self::custom()) a fully custom `Printer`.
///
/// [`anstream`]: https://docs.rs/anstream/
/// [`anstyle`]: https://docs.rs/anstyle/
#[derive(Debug)]
pub struct Printer<W: RawStream> {
    writer: AutoStream<W>,
}

impl Printer<StdoutLock<'static>> {
    /// Creates a printer to stdout. The stdout is locked while the printer is alive!
    pub fn stdout() -> Self {
        Self {
            writer: AutoStream::auto(io::stdout()).lock(),
        }
    }
}

impl Printer<StderrLock<'static>> {
    /// Creates a printer to stderr. The stderr is locked while the printer is alive!
    pub fn stderr() -> Self {
        Self {
            writer: AutoStream::auto(io::stderr()).lock(),
        }
    }
}

impl<W: RawStream> Printer<W> {
    /// Creates a custom printer.
    pub fn custom(writer: AutoStream<W>) -> Self {
        Self { writer }
    }
}

/// Reference to a config field together with its location in the config.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct FieldRef<'a> {
    /// Dot-separated path to the field in Rust code, e.g. `database.host`.
    pub path: &'a str,
    /// Env variable corresponding to the field, if the field is bound to a key.
    pub var_name: Option<&'a str>,
    /// Static field descriptor.
    pub descriptor: &'static FieldDescriptor,
    /// Parsed field rules, if the field has any.
    pub metadata: Option<&'a FieldMetadata>,
}

#[derive(Debug)]
struct FieldEntry {
    path: String,
    var_name: Option<String>,
    descriptor: &'static FieldDescriptor,
    metadata: Option<FieldMetadata>,
}

impl FieldEntry {
    fn field_ref(&self) -> FieldRef<'_> {
        FieldRef {
            path: &self.path,
            var_name: self.var_name.as_deref(),
            descriptor: self.descriptor,
            metadata: self.metadata.as_ref(),
        }
    }
}

/// Collects fields of the record recursively. Only records with the exact `struct` rules are descended into,
/// since the engine doesn't bind other nested records. A descended record is only listed itself if it's bound to a key.
fn collect_fields<S: KeyValueSource>(
    engine: &ConfigEngine<S>,
    record: &'static RecordDescriptor,
    parent_path: &str,
    entries: &mut Vec<FieldEntry>,
) {
    let metadata = engine.metadata(record);
    for (i, field) in record.fields.iter().enumerate() {
        let path = if parent_path.is_empty() {
            field.name.to_owned()
        } else {
            format!("{parent_path}.{}", field.name)
        };
        let key = field.binding_key();
        let nested = field.nested_record().filter(|_| field.is_bound_nested());

        if nested.is_none() || key.is_some() {
            entries.push(FieldEntry {
                path: path.clone(),
                var_name: key.map(|key| env_var_name(engine.prefix(), key)),
                descriptor: field,
                metadata: metadata.iter().find(|meta| meta.index == i).cloned(),
            });
        }
        if let Some(nested) = nested {
            collect_fields(engine, nested, &path, entries);
        }
    }
}
