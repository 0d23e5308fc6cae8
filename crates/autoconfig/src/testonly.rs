//! Test-only functionality shared among multiple test modules.

use crate::{Configurable, Environment};

#[derive(Debug, Default, PartialEq, Configurable)]
#[config(crate = crate)]
pub(crate) struct DatabaseConfig {
    /// Database host.
    #[config(key = "db_host", rules = "required")]
    pub host: String,
    /// Database port.
    #[config(key = "db_port", rules = "default=5432")]
    pub port: u16,
}

/// Test server config.
#[derive(Debug, Default, PartialEq, Configurable)]
#[config(crate = crate)]
pub(crate) struct ServerConfig {
    /// Port to listen on.
    #[config(key = "port", rules = "default=8000")]
    pub port: i64,
    /// Address to bind to.
    #[config(key = "address", rules = "required")]
    pub address: String,
    #[config(key = "debug")]
    pub debug: bool,
    /// Allowed origins.
    #[config(key = "origins")]
    pub origins: Vec<String>,
    #[config(rules = "default=0.5")]
    pub ratio: f64,
    #[config(rules = "struct")]
    pub database: DatabaseConfig,
    #[config(skip)]
    pub internal: u32,
}

#[derive(Debug, Default, PartialEq, Configurable)]
#[config(crate = crate)]
pub(crate) struct StorageConfig {
    #[config(rules = "struct")]
    pub database: DatabaseConfig,
}

#[derive(Debug, Default, PartialEq, Configurable)]
#[config(crate = crate)]
pub(crate) struct AppConfig {
    #[config(key = "name", rules = "default=app")]
    pub name: String,
    #[config(rules = "struct")]
    pub storage: StorageConfig,
}

#[derive(Debug, Default, PartialEq, Configurable)]
#[config(crate = crate)]
pub(crate) struct OptionalDatabaseConfig {
    #[config(rules = "struct")]
    pub database: Option<DatabaseConfig>,
}

/// Config with annotations excluding fields from binding and metadata.
#[derive(Debug, Default, PartialEq, Configurable)]
#[config(crate = crate)]
pub(crate) struct ExcludedFieldsConfig {
    #[config(key = "-", rules = "default=1")]
    pub unbound: u32,
    #[config(key = "excluded", rules = "-")]
    pub excluded: u32,
    #[config(key = "plain")]
    pub plain: String,
    #[config(key = "flags", rules = "struct, required")]
    pub flags: FlagsConfig,
}

#[derive(Debug, Default, PartialEq, Configurable)]
#[config(crate = crate)]
pub(crate) struct FlagsConfig {
    #[config(key = "verbose", rules = "default=true")]
    pub verbose: bool,
    #[config(key = "level", rules = "default=-3")]
    pub level: i8,
}

#[derive(Debug, Default, PartialEq, Configurable)]
#[config(crate = crate)]
pub(crate) struct InvalidDefaultConfig {
    #[config(key = "port", rules = "default=70000")]
    pub port: u16,
}

#[derive(Debug, Default, PartialEq, Configurable)]
#[config(crate = crate)]
pub(crate) struct UnsupportedDefaultConfig {
    #[config(key = "items", rules = "default=a,b")]
    pub items: Vec<String>,
}

#[derive(Debug, Default, PartialEq, Configurable)]
#[config(crate = crate)]
pub(crate) struct RequiredWithDefaultConfig {
    #[config(key = "port", rules = "required,default=8000")]
    pub port: u16,
}

#[derive(Debug, Default, PartialEq, Configurable)]
#[config(crate = crate)]
pub(crate) struct NotRecordConfig {
    #[config(key = "port", rules = "struct")]
    pub port: u16,
}

pub(crate) fn env<const N: usize>(vars: [(&str, &str); N]) -> Environment {
    Environment::from_iter(vars)
}
