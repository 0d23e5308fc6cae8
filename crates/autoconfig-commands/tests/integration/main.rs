//! Integration tests for CLI printing.

use anstream::AutoStream;
use autoconfig::{ConfigEngine, Configurable};
use autoconfig_commands::{FieldRef, Printer};

use crate::configs::{PartiallyBoundConfig, TestConfig, create_engine};

mod configs;

fn print_help(filter: impl FnMut(FieldRef<'_>) -> bool) -> String {
    print_config_help::<TestConfig>(&create_engine(&[]), filter)
}

fn print_config_help<C: Configurable>(
    engine: &ConfigEngine,
    filter: impl FnMut(FieldRef<'_>) -> bool,
) -> String {
    let mut buffer = vec![];
    Printer::custom(AutoStream::never(&mut buffer))
        .print_help::<C, _>(engine, filter)
        .unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Returns paths of the fields listed in help with an env variable, and paths of the keys registered by binding.
fn listed_and_bound_paths<C: Configurable + Default>(vars: &[(&str, &str)]) -> (Vec<String>, Vec<String>) {
    let mut engine = create_engine(vars);
    let mut listed_paths = vec![];
    print_config_help::<C>(&engine, |field_ref| {
        if field_ref.var_name.is_some() {
            listed_paths.push(field_ref.path.to_owned());
        }
        true
    });
    listed_paths.sort_unstable();

    engine.bind(&mut C::default()).unwrap();
    let mut bound_paths: Vec<_> = engine.bound_keys().keys().cloned().collect();
    bound_paths.sort_unstable();
    (listed_paths, bound_paths)
}

#[test]
fn full_config_help() {
    let buffer = print_help(|_| true);

    assert!(
        buffer.starts_with("Test application config. Used to check CLI output.\n\n"),
        "{buffer}"
    );
    let expected_port_help = "\
APP_PORT
  Path: port
  Type: unsigned integer [Rust: u16]
  Default: \"8000\"
  Port to listen on.
";
    assert!(buffer.contains(expected_port_help), "{buffer}");

    let expected_host_help = "\
APP_DB_HOST
  Path: database.host
  Type: string [Rust: String]
  Required
  Database host.
";
    assert!(buffer.contains(expected_host_help), "{buffer}");
    assert!(buffer.contains("(not bound)\n  Path: ratio\n"), "{buffer}");
    assert!(buffer.contains("APP_ORIGINS\n  Path: origins\n  Type: sequence [Rust: Vec<String>]\n"));
    // Unbound nested records are not listed themselves.
    assert!(!buffer.contains("Path: database\n"), "{buffer}");
}

#[test]
fn filtered_config_help() {
    let buffer = print_help(|field_ref| field_ref.path.starts_with("database."));

    assert!(buffer.contains("APP_DB_HOST"), "{buffer}");
    assert!(buffer.contains("APP_DB_PORT"), "{buffer}");
    assert!(!buffer.contains("APP_PORT"), "{buffer}");
    assert!(!buffer.contains("Path: ratio"), "{buffer}");
}

#[test]
fn field_refs_in_help_filter() {
    let mut var_names = vec![];
    print_help(|field_ref| {
        var_names.push(field_ref.var_name.map(str::to_owned));
        true
    });
    assert_eq!(
        var_names,
        [
            Some("APP_PORT".to_owned()),
            Some("APP_ORIGINS".to_owned()),
            None,
            Some("APP_DB_HOST".to_owned()),
            Some("APP_DB_PORT".to_owned()),
        ]
    );
}

#[test]
fn printing_values() {
    let mut engine = create_engine(&[
        ("APP_PORT", "3000"),
        ("APP_DB_HOST", "db.local"),
        ("APP_ORIGINS", "a, b"),
    ]);
    let mut config = TestConfig::default();
    engine.load(&mut config).unwrap();
    assert_eq!(config.database.port, 5432);

    let mut buffer = vec![];
    Printer::custom(AutoStream::never(&mut buffer))
        .print_values(&engine, &config)
        .unwrap();
    let buffer = String::from_utf8(buffer).unwrap();

    assert!(buffer.starts_with("Values of TestConfig:\n"), "{buffer}");
    assert!(
        buffer.contains("APP_PORT (port) = 3000 [env variable 'APP_PORT']\n"),
        "{buffer}"
    );
    assert!(
        buffer.contains(r#"APP_ORIGINS (origins) = ["a", "b"] [env variable 'APP_ORIGINS']"#),
        "{buffer}"
    );
    assert!(buffer.contains("ratio = 0.5\n"), "{buffer}");
    assert!(
        buffer.contains(r#"APP_DB_HOST (database.host) = "db.local" [env variable 'APP_DB_HOST']"#),
        "{buffer}"
    );
    assert!(
        buffer.contains("APP_DB_PORT (database.port) = 5432 [not set]\n"),
        "{buffer}"
    );
}

#[test]
fn metadata_is_shared_between_commands() {
    let mut engine = create_engine(&[("APP_DB_HOST", "db.local")]);
    let mut config = TestConfig::default();
    engine.load(&mut config).unwrap();
    let build_count = engine.cache().build_count();

    let mut buffer = vec![];
    Printer::custom(AutoStream::never(&mut buffer))
        .print_help::<TestConfig, _>(&engine, |_| true)
        .unwrap();
    assert_eq!(engine.cache().build_count(), build_count);
    assert!(std::ptr::eq(config.descriptor(), TestConfig::describe()));
}

#[test]
fn help_skips_records_that_are_not_bound() {
    let engine = create_engine(&[("APP_VERBOSE", "true")]);
    let buffer = print_config_help::<PartiallyBoundConfig>(&engine, |_| true);

    assert!(!buffer.contains("APP_VERBOSE"), "{buffer}");
    assert!(!buffer.contains("flags.verbose"), "{buffer}");
    assert!(buffer.contains("APP_NAME\n  Path: name\n"), "{buffer}");
    let expected_flags_help = "\
(not bound)
  Path: flags
  Type: record [Rust: FlagsConfig]
  Required
";
    assert!(buffer.contains(expected_flags_help), "{buffer}");
}

#[test]
fn help_lists_exactly_bound_variables() {
    let (listed, bound) = listed_and_bound_paths::<TestConfig>(&[]);
    assert_eq!(listed, bound);
    assert_eq!(listed, ["database.host", "database.port", "origins", "port"]);

    let (listed, bound) = listed_and_bound_paths::<PartiallyBoundConfig>(&[("APP_VERBOSE", "true")]);
    assert_eq!(listed, bound);
    assert_eq!(listed, ["name"]);
}
