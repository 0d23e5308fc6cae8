use autoconfig::{ConfigEngine, ConfigRepository, Configurable, Environment};

#[derive(Debug, Default, PartialEq, Configurable)]
pub(crate) struct DatabaseConfig {
    /// Database host.
    #[config(key = "db_host", rules = "required")]
    pub host: String,
    /// Database port.
    #[config(key = "db_port", rules = "default=5432")]
    pub port: u16,
}

/// Test application config.
/// Used to check CLI output.
#[derive(Debug, Default, PartialEq, Configurable)]
pub(crate) struct TestConfig {
    /// Port to listen on.
    #[config(key = "port", rules = "default=8000")]
    pub port: u16,
    /// Allowed origins.
    #[config(key = "origins")]
    pub origins: Vec<String>,
    /// Scaling factor.
    #[config(rules = "default=0.5")]
    pub ratio: f64,
    #[config(rules = "struct")]
    pub database: DatabaseConfig,
}

#[derive(Debug, Default, PartialEq, Configurable)]
pub(crate) struct FlagsConfig {
    #[config(key = "verbose")]
    pub verbose: bool,
}

/// Config with a nested record that is validated, but not bound.
#[derive(Debug, Default, PartialEq, Configurable)]
pub(crate) struct PartiallyBoundConfig {
    #[config(key = "name")]
    pub name: String,
    #[config(rules = "struct, required")]
    pub flags: FlagsConfig,
}

pub(crate) fn create_engine(vars: &[(&str, &str)]) -> ConfigEngine {
    let env = Environment::from_iter(vars.iter().copied());
    ConfigEngine::with_source(ConfigRepository::new("app").with_env(env))
}
