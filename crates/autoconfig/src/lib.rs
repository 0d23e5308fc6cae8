//! `autoconfig` – tag-driven configuration population from env variables and config files.
//!
//! # Overview
//!
//! The library fills a config struct from environment variables or a config file, applies defaults
//! and enforces the presence of required fields. Config structs derive the [`Configurable`](macro@Configurable)
//! trait; each field is annotated with two cooperating attributes:
//!
//! - `#[config(key = "...")]` specifies the **binding key** of the field. The key is resolved in
//!   a [source](source::KeyValueSource); for the default [`ConfigRepository`] source, key `port` under
//!   prefix `app` resolves to the `APP_PORT` env variable or the `port` entry of the config file.
//!   The `-` key excludes the field from binding.
//! - `#[config(rules = "...")]` specifies comma-separated **rules** for the field: `required`, `default=<value>`
//!   and `struct` (the field is a nested record). The `-` rules exclude the field from validation.
//!
//! Processing is split into two independent passes, both performed by [`ConfigEngine`]:
//!
//! 1. [Binding](ConfigEngine::bind()) registers keys with the source and populates fields from it.
//!    Fields with rules exactly equal to `struct` are bound recursively.
//! 2. [Validation](ConfigEngine::validate()) checks required fields and applies defaults to zero fields.
//!    Per-field metadata used in this pass is parsed once per config type and [cached](metadata::MetadataCache).
//!
//! Source values follow the JSON object model (see [`Value`](value::Value)), with each value enriched with
//! its [origin](value::ValueOrigin), so that errors can point to a specific env variable or a path in a file.
//! Values are converted to field types weakly, e.g. the `"a, b, c"` string is converted to a 3-element
//! `Vec<String>`; see the [`de`] module for details.
//!
//! # Examples
//!
//! ## Basic workflow
//!
//! ```
//! use autoconfig::{ConfigEngine, ConfigRepository, Configurable, Environment};
//!
//! #[derive(Debug, Default, Configurable)]
//! pub struct TestConfig {
//!     /// Port to listen on.
//!     #[config(key = "port", rules = "default=8000")]
//!     pub port: u16,
//!     #[config(key = "address", rules = "required")]
//!     pub address: String,
//!     #[config(key = "origins")]
//!     pub origins: Vec<String>,
//! }
//!
//! // Assume the following env variables are set.
//! let env = Environment::from_iter([
//!     ("APP_ADDRESS", "0.0.0.0"),
//!     ("APP_ORIGINS", "localhost, example.com"),
//! ]);
//! let mut engine = ConfigEngine::with_source(ConfigRepository::new("app").with_env(env));
//!
//! let mut config = TestConfig::default();
//! engine.load(&mut config)?;
//! assert_eq!(config.port, 8000);
//! assert_eq!(config.address, "0.0.0.0");
//! assert_eq!(config.origins, ["localhost", "example.com"]);
//! # anyhow::Ok(())
//! ```
//!
//! ## Nested configs
//!
//! ```
//! use autoconfig::{testing, Configurable, ErrorKind};
//!
//! #[derive(Debug, Default, Configurable)]
//! pub struct DatabaseConfig {
//!     #[config(key = "db_host", rules = "required")]
//!     pub host: String,
//!     #[config(key = "db_port", rules = "default=5432")]
//!     pub port: u16,
//! }
//!
//! #[derive(Debug, Default, Configurable)]
//! pub struct AppConfig {
//!     #[config(rules = "struct")]
//!     pub database: DatabaseConfig,
//! }
//!
//! let config: AppConfig = testing::load("app", [("APP_DB_HOST", "db.local")])?;
//! assert_eq!(config.database.port, 5432);
//!
//! let err = testing::load::<AppConfig, 0>("app", []).unwrap_err();
//! assert_eq!(err.field_path(), ["database", "host"]);
//! assert!(matches!(err.root().kind(), ErrorKind::MissingRequired { .. }));
//! assert!(err.to_string().contains("APP_DB_HOST"));
//! # anyhow::Ok(())
//! ```
//!
//! ## Config files
//!
//! ```
//! # use std::fs;
//! use autoconfig::{ConfigEngine, ConfigFile, Configurable, FileFormat};
//!
//! #[derive(Debug, Default, Configurable)]
//! pub struct TestConfig {
//!     #[config(key = "port")]
//!     pub port: u16,
//! }
//!
//! let dir = tempfile::tempdir()?;
//! let file = ConfigFile::create("My App", "config", Some(dir.path()), FileFormat::Json)?;
//! assert!(file.path().ends_with("config.json"));
//! fs::write(file.path(), r#"{ "port": 3000 }"#)?;
//!
//! let mut engine = ConfigEngine::new("my_app").with_file(file);
//! let mut config = TestConfig::default();
//! engine.read_file(&mut config)?;
//! assert_eq!(config.port, 3000);
//! # anyhow::Ok(())
//! ```

// Linter settings
#![warn(missing_docs)]

/// Derives the [`Configurable`](trait@Configurable) trait for a struct.
///
/// # Container attributes
///
/// ## `crate`
///
/// **Type:** path
///
/// Path to the `autoconfig` crate, e.g. `#[config(crate = crate)]` when used inside the crate itself.
///
/// # Field attributes
///
/// ## `key`
///
/// **Type:** string
///
/// Binding key of the field. `-` excludes the field from binding.
///
/// ## `rules`
///
/// **Type:** string
///
/// Comma-separated list of rules: `required`, `default=<value>`, `struct`. Unknown rules are ignored.
/// `-` excludes the field from validation.
///
/// ## `skip`
///
/// **Type:** flag
///
/// Hides the field from the engine entirely. The field type doesn't need to implement [`ConfigValue`](de::ConfigValue).
///
/// # Restrictions
///
/// - Only structs with named fields are supported.
/// - Generic structs are not supported.
/// - Field types must implement [`WellKnown`](de::WellKnown).
///
/// # Examples
///
/// ```
/// use autoconfig::{Configurable, metadata::FieldKind};
///
/// /// Test config.
/// #[derive(Debug, Default, Configurable)]
/// pub struct TestConfig {
///     /// Port to listen on.
///     #[config(key = "port", rules = "required")]
///     pub port: u16,
///     #[config(skip)]
///     pub cache: std::collections::HashMap<String, u64>,
/// }
///
/// let descriptor = TestConfig::describe();
/// assert_eq!(descriptor.help, "Test config.");
/// let [port] = descriptor.fields else { unreachable!() };
/// assert_eq!(port.key, Some("port"));
/// assert_eq!(port.kind, FieldKind::Unsigned);
/// assert_eq!(port.help, "Port to listen on.");
/// ```
pub use autoconfig_derive::Configurable;

pub use self::{
    engine::ConfigEngine,
    error::{Error, ErrorKind, Operation, PopulateError, ShapeError, ValueError},
    source::{ConfigFile, ConfigRepository, Environment, FileFormat},
};
use self::{de::ConfigValue, metadata::RecordDescriptor};

pub mod de;
mod engine;
mod error;
pub mod metadata;
pub mod source;
pub mod testing;
#[cfg(test)]
mod testonly;
pub mod value;

/// Record type with fields accessible by index. Should be derived using the [derive macro](macro@Configurable).
pub trait Configurable: 'static {
    /// Returns the static description of this record type.
    fn describe() -> &'static RecordDescriptor
    where
        Self: Sized;

    /// Returns the static description of the record type. Usable with trait objects.
    fn descriptor(&self) -> &'static RecordDescriptor;

    /// Returns a visible field by its index in [`RecordDescriptor::fields`].
    fn field(&self, index: usize) -> Option<&dyn ConfigValue>;

    /// Returns a visible field by its index in [`RecordDescriptor::fields`].
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn ConfigValue>;
}

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
