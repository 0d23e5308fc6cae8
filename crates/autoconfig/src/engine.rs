//! Configuration engine binding sources to records and validating them.

use std::{collections::HashMap, sync::Arc};

use crate::{
    Configurable,
    error::{Error, ErrorKind, Operation, ShapeError},
    metadata::{FieldKind, FieldMetadata, MetadataCache, RecordDescriptor},
    source::{ConfigFile, ConfigRepository, KeyValueSource},
    value::{Value, ValueOrigin, WithOrigin, join_path},
};

/// Populates [`Configurable`] records from a [key–value source](KeyValueSource), checks required fields
/// and applies defaults.
///
/// Binding ([`Self::bind()`]) and validation ([`Self::validate()`]) are independent passes; [`Self::load()`]
/// runs both. Validation only requires a shared reference to the engine and can run concurrently
/// from multiple threads; binding mutates the key registry and thus requires an exclusive reference.
#[derive(Debug)]
pub struct ConfigEngine<S = ConfigRepository> {
    source: S,
    bound_keys: HashMap<String, &'static str>,
    cache: MetadataCache,
    file: Option<ConfigFile>,
}

impl ConfigEngine {
    /// Creates an engine with the default [`ConfigRepository`] source reading env variables
    /// with the specified prefix. Env variables are re-read on each [bind](Self::bind()).
    pub fn new(prefix: &str) -> Self {
        Self::with_source(ConfigRepository::new(prefix))
    }

    /// Sets up a config file to be read by [`Self::read_file()`] and [`Self::load()`].
    #[must_use]
    pub fn with_file(mut self, file: ConfigFile) -> Self {
        self.file = Some(file);
        self
    }

    /// Returns the config file, if it's set up.
    pub fn file(&self) -> Option<&ConfigFile> {
        self.file.as_ref()
    }

    /// Reads the config file, installs it as the file layer of the source and populates the record from it.
    ///
    /// # Errors
    ///
    /// Returns an error if no file is set up, the file is missing or cannot be parsed, or its values
    /// cannot be assigned to the record.
    #[tracing::instrument(level = "debug", skip_all, fields(ty = target.descriptor().ty.name_in_code()))]
    pub fn read_file(&mut self, target: &mut dyn Configurable) -> Result<(), Error> {
        let file = self.file.as_ref().ok_or_else(|| {
            Error::new(
                Operation::ReadFile,
                ErrorKind::Setup("config file is not set up".to_owned()),
            )
        })?;
        let contents = file.read()?;
        tracing::debug!(path = %file.path().display(), entries = contents.len(), "Read config file");

        self.source.set_file_contents(contents);
        self.source
            .populate(target)
            .map_err(|err| Error::new(Operation::ReadFile, ErrorKind::Populate(err)))
    }

    /// Reads the config file (if it's set up), then [binds](Self::bind()) and [validates](Self::validate())
    /// the record.
    ///
    /// # Errors
    ///
    /// Propagates errors from the individual passes.
    pub fn load(&mut self, target: &mut dyn Configurable) -> Result<(), Error> {
        if self.file.is_some() {
            self.read_file(target)?;
        }
        self.bind(target)?;
        self.validate(target)
    }
}

impl<S: KeyValueSource> ConfigEngine<S> {
    /// Creates an engine with a custom source.
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            bound_keys: HashMap::new(),
            cache: MetadataCache::new(),
            file: None,
        }
    }

    /// Returns the namespace prefix of the source.
    pub fn prefix(&self) -> &str {
        self.source.prefix()
    }

    /// Returns the source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns a mutable reference to the source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Returns keys bound so far, keyed by the dot-separated path of the field in Rust code
    /// (e.g., `database.host`).
    pub fn bound_keys(&self) -> &HashMap<String, &'static str> {
        &self.bound_keys
    }

    /// Returns the metadata cache.
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Returns cached metadata for the described record type, building it if necessary.
    pub fn metadata(&self, descriptor: &RecordDescriptor) -> Arc<[FieldMetadata]> {
        self.cache.get_or_build(descriptor)
    }

    /// Returns cached metadata for the record type.
    pub fn metadata_for<C: Configurable>(&self) -> Arc<[FieldMetadata]> {
        self.metadata(C::describe())
    }

    /// Registers binding keys of the record with the source and populates the record from the source.
    ///
    /// The source is [refreshed](KeyValueSource::refresh()) first. Fields annotated with `rules = "struct"` (exactly)
    /// are bound recursively before the containing record is populated.
    ///
    /// # Errors
    ///
    /// Returns an error if a nested record is absent or has a wrong shape, or if a source value
    /// cannot be assigned to a field.
    #[tracing::instrument(level = "debug", skip_all, fields(ty = target.descriptor().ty.name_in_code()))]
    pub fn bind(&mut self, target: &mut dyn Configurable) -> Result<(), Error> {
        self.source.refresh();
        self.bind_record(target, "")
    }

    fn bind_record(&mut self, target: &mut dyn Configurable, path: &str) -> Result<(), Error> {
        let descriptor = target.descriptor();
        for (i, field) in descriptor.fields.iter().enumerate() {
            let field_path = join_path(path, field.name);
            if field.is_bound_nested() {
                let nested = target
                    .field_mut(i)
                    .ok_or_else(|| missing_field(Operation::Bind, descriptor, i))?;
                let nested = nested
                    .as_record_mut()
                    .map_err(|err| Error::shape(Operation::Bind, err).nested(field.name))?;
                self.bind_record(nested, &field_path)
                    .map_err(|err| err.nested(field.name))?;
            }

            if let Some(key) = field.binding_key() {
                self.source.register_key(key);
                tracing::debug!(path = field_path.as_str(), key, "Registered key");
                self.bound_keys.insert(field_path, key);
            }
        }

        self.source
            .populate(target)
            .map_err(|err| Error::new(Operation::Bind, ErrorKind::Populate(err)))
    }

    /// Checks required fields and applies defaults to zero fields, recursing into fields annotated
    /// with the `struct` rule.
    ///
    /// Fields are processed in the declaration order, and the first violation is returned.
    /// The required check precedes applying the default, so a field with both `required` and `default=...`
    /// rules fails validation if it's zero.
    ///
    /// # Errors
    ///
    /// Returns an error if a nested record is absent or has a wrong shape, a required field is zero,
    /// or a default cannot be applied.
    #[tracing::instrument(level = "debug", skip_all, fields(ty = target.descriptor().ty.name_in_code()))]
    pub fn validate(&self, target: &mut dyn Configurable) -> Result<(), Error> {
        let descriptor = target.descriptor();
        let metadata = self.metadata(descriptor);

        for field in metadata.iter() {
            let value = target
                .field_mut(field.index)
                .ok_or_else(|| missing_field(Operation::Validate, descriptor, field.index))?;

            if field.is_nested {
                let nested = value
                    .as_record_mut()
                    .map_err(|err| Error::shape(Operation::Validate, err).nested(field.name))?;
                self.validate(nested).map_err(|err| err.nested(field.name))?;
            }

            if !value.is_zero() {
                continue;
            }
            if field.required {
                return Err(Error::new(
                    Operation::Validate,
                    ErrorKind::MissingRequired {
                        field: field.name,
                        prefix: self.prefix().to_owned(),
                        key: field.key,
                    },
                ));
            }
            if let Some(default_value) = &field.default_value {
                apply_default(field, default_value, value)?;
                tracing::debug!(field = field.name, default_value = default_value.as_str(), "Applied default");
            }
        }
        Ok(())
    }
}

fn missing_field(operation: Operation, descriptor: &RecordDescriptor, index: usize) -> Error {
    let err = ShapeError::MissingField {
        ty: descriptor.ty.name_in_code(),
        index,
    };
    Error::shape(operation, err)
}

fn apply_default(
    field: &FieldMetadata,
    literal: &str,
    value: &mut dyn crate::de::ConfigValue,
) -> Result<(), Error> {
    let kind = value.kind();
    match kind {
        FieldKind::Bool
        | FieldKind::Integer
        | FieldKind::Unsigned
        | FieldKind::Float
        | FieldKind::String => {}
        _ => {
            return Err(Error::new(
                Operation::Validate,
                ErrorKind::UnsupportedDefault {
                    field: field.name,
                    kind,
                },
            ));
        }
    }

    let origin = Arc::new(ValueOrigin::Default { field: field.name });
    let default_value = WithOrigin::new(Value::String(literal.to_owned()), origin);
    value.assign(&default_value).map_err(|err| {
        Error::new(
            Operation::Validate,
            ErrorKind::InvalidDefault {
                field: field.name,
                kind,
                literal: literal.to_owned(),
                reason: err.message().to_owned(),
            },
        )
    })
}
