//! Testing tools for configurations.

use std::{fmt, marker::PhantomData, sync::Arc};

use crate::{
    ConfigEngine, ConfigRepository, Configurable, Environment, Error,
    source::file::parse_yaml,
    value::Map,
};

/// Tests config loading from the provided env variables. The variables are isolated from
/// the process environment.
///
/// # Errors
///
/// Propagates loading errors, which allows testing negative cases.
///
/// # Examples
///
/// ## Basic usage
///
/// ```
/// use autoconfig::{testing, Configurable};
///
/// #[derive(Default, Configurable)]
/// struct TestConfig {
///     #[config(key = "flag", rules = "default=true")]
///     flag: bool,
///     #[config(key = "size_mb")]
///     size_mb: u64,
/// }
///
/// let config: TestConfig = testing::load("test", [("TEST_SIZE_MB", "2")])?;
/// assert!(config.flag);
/// assert_eq!(config.size_mb, 2);
/// # anyhow::Ok(())
/// ```
///
/// ## Testing errors
///
/// ```
/// # use autoconfig::{testing, Configurable};
/// #[derive(Debug, Default, Configurable)]
/// struct TestConfig {
///     #[config(key = "flag")]
///     flag: bool,
/// }
///
/// let err = testing::load::<TestConfig, 1>("test", [("TEST_FLAG", "no")]).unwrap_err();
/// assert_eq!(err.field_path(), ["flag"]);
/// assert!(err.to_string().contains("invalid Boolean \"no\""));
/// ```
pub fn load<C: Configurable + Default, const N: usize>(
    prefix: &str,
    vars: [(&str, &str); N],
) -> Result<C, Error> {
    let mut tester = Tester::new(prefix);
    for (name, value) in vars {
        tester.set_env(name, value);
    }
    tester.load()
}

/// Test case builder that allows configuring env variables and file contents.
///
/// # Examples
///
/// ```
/// use autoconfig::{testing::Tester, Configurable};
///
/// #[derive(Debug, Default, Configurable)]
/// struct TestConfig {
///     #[config(key = "port", rules = "default=8000")]
///     port: u16,
///     #[config(key = "host")]
///     host: String,
/// }
///
/// let config = Tester::<TestConfig>::new("app")
///     .set_yaml("host: localhost\nport: 3000")
///     .set_env("APP_PORT", "3001")
///     .load_complete()?;
/// assert_eq!(config.host, "localhost");
/// assert_eq!(config.port, 3001);
/// # anyhow::Ok(())
/// ```
pub struct Tester<C> {
    prefix: String,
    env: Environment,
    file: Option<Map>,
    _config: PhantomData<fn() -> C>,
}

impl<C> fmt::Debug for Tester<C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Tester")
            .field("prefix", &self.prefix)
            .field("env", &self.env)
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

impl<C: Configurable + Default> Tester<C> {
    /// Creates a tester with the specified prefix, no env variables and no file contents.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            env: Environment::default(),
            file: None,
            _config: PhantomData,
        }
    }

    /// Sets an env variable.
    pub fn set_env(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.env = std::mem::take(&mut self.env).with_var(name, value);
        self
    }

    /// Sets file contents from a YAML string.
    ///
    /// # Panics
    ///
    /// Panics if `yaml` is not a valid YAML mapping.
    pub fn set_yaml(&mut self, yaml: &str) -> &mut Self {
        let filename: Arc<str> = "test.yaml".into();
        let contents = parse_yaml(yaml, &filename).expect("invalid YAML file contents");
        self.file = Some(contents);
        self
    }

    /// Creates an engine over the configured sources.
    pub fn new_engine(&self) -> ConfigEngine {
        let mut repo = ConfigRepository::new(self.prefix.clone()).with_env(self.env.clone());
        if let Some(contents) = &self.file {
            repo.set_file_contents(contents.clone());
        }
        ConfigEngine::with_source(repo)
    }

    /// Binds and validates a default-initialized config.
    ///
    /// # Errors
    ///
    /// Propagates loading errors, which allows testing negative cases.
    pub fn load(&self) -> Result<C, Error> {
        self.load_with_engine().map(|(config, _)| config)
    }

    /// Same as [`Self::load()`], but additionally ensures that *all* bound keys have a value in the sources.
    ///
    /// # Panics
    ///
    /// Panics if some bound keys are missing. The panic message will contain paths to the corresponding fields.
    ///
    /// # Errors
    ///
    /// Propagates loading errors, which allows testing negative cases.
    pub fn load_complete(&self) -> Result<C, Error> {
        let (config, engine) = self.load_with_engine()?;
        let mut missing_paths: Vec<_> = engine
            .bound_keys()
            .iter()
            .filter(|(_, key)| engine.source().lookup(key).is_none())
            .map(|(path, _)| path.as_str())
            .collect();
        missing_paths.sort_unstable();
        assert!(
            missing_paths.is_empty(),
            "The provided sources do not cover fields: {missing_paths:?}"
        );
        Ok(config)
    }

    fn load_with_engine(&self) -> Result<(C, ConfigEngine), Error> {
        let mut engine = self.new_engine();
        let mut config = C::default();
        engine.bind(&mut config)?;
        engine.validate(&mut config)?;
        Ok((config, engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testonly::{AppConfig, DatabaseConfig, ServerConfig};

    #[test]
    fn loading_with_env() {
        let config: AppConfig = load("app", [("APP_DB_HOST", "db.local")]).unwrap();
        assert_eq!(config.name, "app");
        assert_eq!(config.storage.database.host, "db.local");
    }

    #[test]
    fn loading_with_file_and_env() {
        let config = Tester::<ServerConfig>::new("app")
            .set_yaml("address: '::1'\ndb_host: db.local\nport: 3000")
            .set_env("APP_PORT", "3001")
            .set_env("APP_DEBUG", "1")
            .load()
            .unwrap();
        assert_eq!(config.address, "::1");
        assert_eq!(config.port, 3001);
        assert!(config.debug);
        assert_eq!(config.database.host, "db.local");
    }

    #[test]
    fn complete_loading() {
        let config = Tester::<DatabaseConfig>::new("app")
            .set_env("APP_DB_HOST", "db.local")
            .set_env("APP_DB_PORT", "6432")
            .load_complete()
            .unwrap();
        assert_eq!(config.port, 6432);
    }

    #[test]
    #[should_panic(expected = "The provided sources do not cover fields: [\"database.port\", \"port\"]")]
    fn incomplete_loading() {
        Tester::<ServerConfig>::new("app")
            .set_env("APP_ADDRESS", "::1")
            .set_env("APP_DB_HOST", "db.local")
            .set_env("APP_DEBUG", "false")
            .set_env("APP_ORIGINS", "")
            .set_yaml("origins: []")
            .load_complete()
            .unwrap();
    }
}
