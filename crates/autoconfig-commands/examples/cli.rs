//! Example CLI app loading configuration from env variables and an optional config file.
//!
//! Try running e.g. `APP_DB_HOST=db.local cargo run --example cli -- values`.

use std::{path::PathBuf, process};

use anstyle::{AnsiColor, Color, Style};
use autoconfig::{ConfigEngine, ConfigFile, Configurable, FileFormat};
use autoconfig_commands::{FieldRef, Printer};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Database connection settings.
#[derive(Debug, Default, Configurable)]
pub struct DatabaseConfig {
    /// Database host.
    #[config(key = "db_host", rules = "required")]
    pub host: String,
    /// Database port.
    #[config(key = "db_port", rules = "default=5432")]
    pub port: u16,
    /// Maximum number of pooled connections.
    #[config(key = "db_pool_size", rules = "default=10")]
    pub pool_size: u32,
}

/// Example application configuration.
#[derive(Debug, Default, Configurable)]
pub struct AppConfig {
    /// Application name.
    #[config(key = "name", rules = "default=app")]
    pub name: String,
    /// Port to listen on.
    #[config(key = "port", rules = "default=8000")]
    pub port: u16,
    /// Whether to enable debug endpoints.
    #[config(key = "debug", rules = "default=false")]
    pub debug: bool,
    /// Allowed CORS origins, comma-separated.
    #[config(key = "origins")]
    pub origins: Vec<String>,
    #[config(rules = "struct")]
    pub database: DatabaseConfig,
}

#[derive(Debug, Parser)]
struct Cli {
    /// Directory with the config file. If not specified, the default directory for the app is used.
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    /// Format of the config file.
    #[arg(long, global = true, value_enum, default_value_t = Format::Yaml)]
    format: Format,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Prints configuration help.
    Help {
        /// Filter for field paths.
        filter: Option<String>,
    },
    /// Loads configuration and prints its values.
    Values,
    /// Loads configuration and prints it in the debug format.
    Load,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

impl From<Format> for FileFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => Self::Json,
            Format::Yaml => Self::Yaml,
        }
    }
}

const ERROR: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));

fn create_engine(cli: &Cli) -> anyhow::Result<ConfigEngine> {
    let mut engine = ConfigEngine::new("app");
    let file = ConfigFile::create("app", "config", cli.config_dir.as_deref(), cli.format.into())?;
    if file.path().is_file() {
        tracing::info!(path = %file.path().display(), "Using config file");
        engine = engine.with_file(file);
    }
    Ok(engine)
}

fn load_config(engine: &mut ConfigEngine) -> AppConfig {
    let mut config = AppConfig::default();
    if let Err(err) = engine.load(&mut config) {
        anstream::eprintln!("{ERROR}Failed loading configuration:\n{err}{ERROR:#}");
        process::exit(1);
    }
    config
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut engine = create_engine(&cli)?;
    match &cli.command {
        Command::Help { filter } => {
            let filter = |field_ref: FieldRef<'_>| {
                filter
                    .as_ref()
                    .is_none_or(|needle| field_ref.path.contains(needle.as_str()))
            };
            Printer::stderr().print_help::<AppConfig, _>(&engine, filter)?;
        }
        Command::Values => {
            let config = load_config(&mut engine);
            Printer::stderr().print_values(&engine, &config)?;
        }
        Command::Load => {
            let config = load_config(&mut engine);
            println!("{config:#?}");
        }
    }
    Ok(())
}
