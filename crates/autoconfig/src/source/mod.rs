//! Configuration sources.
//!
//! The engine talks to sources via the [`KeyValueSource`] trait. The default source is [`ConfigRepository`],
//! which combines an [`Environment`] layer with an optional config file layer.

use std::{collections::BTreeSet, sync::Arc};

pub use self::{
    env::{Environment, env_var_name},
    file::{ConfigFile, FileFormat},
};
use crate::{
    Configurable,
    error::PopulateError,
    metadata::FieldKind,
    value::{self, Map, Value, ValueOrigin, WithOrigin},
};

mod env;
pub(crate) mod file;

/// External key–value source populating config records.
pub trait KeyValueSource {
    /// Returns the namespace prefix scoping key lookup. E.g., key `port` under prefix `app`
    /// is looked up as the env variable `APP_PORT`.
    fn prefix(&self) -> &str;

    /// Registers a key as bindable even if no value is currently present for it.
    fn register_key(&mut self, key: &str);

    /// Refreshes source contents. Called by the engine at the start of each bind pass.
    fn refresh(&mut self) {}

    /// Populates all fields of the record that have a value in this source. Fields without a value
    /// are left intact.
    ///
    /// # Errors
    ///
    /// Returns an error if a source value cannot be assigned to a field.
    fn populate(&self, target: &mut dyn Configurable) -> Result<(), PopulateError>;
}

/// Layered key–value source: env variables override config file contents.
///
/// Env variables are only consulted for [registered](KeyValueSource::register_key()) keys; empty variables
/// are treated as absent. File values are looked up for all keys, matching them case-insensitively.
///
/// A repository created with [`Self::new()`] re-reads process env variables on each [refresh](KeyValueSource::refresh()),
/// i.e. each time a config is bound. An env layer supplied via [`Self::with_env()`] is fixed.
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    prefix: String,
    env: Environment,
    reads_process_env: bool,
    file: Option<Map>,
    keys: BTreeSet<String>,
}

impl ConfigRepository {
    /// Creates a repository capturing the process env variables starting with `{prefix}_`.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let env = Environment::prefixed(&prefix);
        Self {
            prefix,
            env,
            reads_process_env: true,
            file: None,
            keys: BTreeSet::new(),
        }
    }

    /// Replaces the env layer.
    #[must_use]
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self.reads_process_env = false;
        self
    }

    /// Sets the file layer.
    #[must_use]
    pub fn with_file_contents(mut self, contents: Map) -> Self {
        self.set_file_contents(contents);
        self
    }

    /// Sets the file layer, replacing the existing one.
    pub fn set_file_contents(&mut self, contents: Map) {
        self.file = Some(contents);
    }

    /// Returns the env layer.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Iterates over registered keys in the lexicographic order. Keys are lowercased.
    pub fn registered_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.keys.iter().map(String::as_str)
    }

    /// Checks whether the key is registered.
    pub fn is_registered(&self, key: &str) -> bool {
        self.keys.contains(&key.to_lowercase())
    }

    /// Resolves a key, checking the env layer first.
    pub fn lookup(&self, key: &str) -> Option<WithOrigin> {
        self.lookup_env(key).or_else(|| self.lookup_file(key))
    }

    fn lookup_env(&self, key: &str) -> Option<WithOrigin> {
        if !self.is_registered(key) {
            return None;
        }
        let var_name = env_var_name(&self.prefix, key);
        let var_value = self.env.get(&var_name).filter(|value| !value.is_empty())?;
        let var_value = Value::String(var_value.to_owned());
        Some(WithOrigin::new(var_value, Arc::new(ValueOrigin::EnvVar(var_name))))
    }

    fn lookup_file(&self, key: &str) -> Option<WithOrigin> {
        value::get_ignore_case(self.file.as_ref()?, key).cloned()
    }
}

impl KeyValueSource for ConfigRepository {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn register_key(&mut self, key: &str) {
        self.keys.insert(key.to_lowercase());
    }

    fn refresh(&mut self) {
        if self.reads_process_env {
            self.env = Environment::prefixed(&self.prefix);
            tracing::debug!(prefix = self.prefix.as_str(), vars = self.env.len(), "Re-read env variables");
        }
    }

    fn populate(&self, target: &mut dyn Configurable) -> Result<(), PopulateError> {
        let descriptor = target.descriptor();
        for (i, field) in descriptor.fields.iter().enumerate() {
            let Some(key) = field.binding_key() else {
                continue;
            };
            // Env variables are scalars, so records can only be populated from the file layer.
            let value = if field.kind == FieldKind::Record {
                self.lookup_file(key)
            } else {
                self.lookup(key)
            };
            let Some(value) = value else {
                continue;
            };
            let Some(slot) = target.field_mut(i) else {
                continue;
            };

            tracing::trace!(field = field.name, key, origin = %value.origin, "Populating field");
            slot.assign(&value).map_err(|source| PopulateError {
                field: field.name,
                key,
                source,
            })?;
        }
        Ok(())
    }
}
