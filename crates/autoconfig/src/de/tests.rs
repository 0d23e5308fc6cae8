//! Tests for value conversions.

use std::sync::Arc;

use assert_matches::assert_matches;
use test_casing::test_casing;

use super::*;
use crate::{
    testonly::{DatabaseConfig, OptionalDatabaseConfig, ServerConfig},
    value::{Map, ValueOrigin},
};

const TRUE_LITERALS: [&str; 6] = ["1", "t", "T", "TRUE", "true", "True"];
const FALSE_LITERALS: [&str; 6] = ["0", "f", "F", "FALSE", "false", "False"];

fn env_value(s: &str) -> WithOrigin {
    WithOrigin::new(
        Value::from(s),
        Arc::new(ValueOrigin::EnvVar("APP_TEST".to_owned())),
    )
}

fn object<const N: usize>(entries: [(&str, Value); N]) -> WithOrigin {
    let map: Map = entries
        .into_iter()
        .map(|(key, value)| (key.to_owned(), WithOrigin::new(value, Arc::default())))
        .collect();
    WithOrigin::new(Value::Object(map), Arc::default())
}

#[test_casing(6, TRUE_LITERALS)]
#[test]
fn parsing_true_literals(s: &str) {
    assert_eq!(parse_bool(s), Ok(true));
    let mut flag = false;
    flag.assign(&env_value(s)).unwrap();
    assert!(flag);
}

#[test_casing(6, FALSE_LITERALS)]
#[test]
fn parsing_false_literals(s: &str) {
    assert_eq!(parse_bool(s), Ok(false));
    let mut flag = true;
    flag.assign(&env_value(s)).unwrap();
    assert!(!flag);
}

#[test_casing(5, ["yes", "tRUE", "", " true", "2"])]
#[test]
fn invalid_bool_literals(s: &str) {
    parse_bool(s).unwrap_err();
    let mut flag = false;
    let err = flag.assign(&env_value(s)).unwrap_err();
    assert!(err.message().starts_with("invalid Boolean"), "{err}");
    assert_matches!(err.origin(), ValueOrigin::EnvVar(name) if name == "APP_TEST");
}

#[test]
fn assigning_integers() {
    let mut port = 0_u16;
    port.assign(&env_value("9000")).unwrap();
    assert_eq!(port, 9000);
    port.assign(&WithOrigin::new(Value::Number(8080_u64.into()), Arc::default()))
        .unwrap();
    assert_eq!(port, 8080);

    let err = port.assign(&env_value("70000")).unwrap_err();
    assert!(err.message().starts_with("invalid integer \"70000\""), "{err}");
    let err = port
        .assign(&WithOrigin::new(Value::Number((-1_i64).into()), Arc::default()))
        .unwrap_err();
    assert!(err.message().contains("not an integer in the expected range"), "{err}");
    let err = port.assign(&WithOrigin::new(Value::Bool(true), Arc::default())).unwrap_err();
    assert_eq!(err.message(), "invalid type: expected integer, got Boolean");
    assert_eq!(port, 8080);

    let mut level = 0_i8;
    level.assign(&env_value("-128")).unwrap();
    assert_eq!(level, i8::MIN);
    assert_eq!(level.to_value(), Value::Number((-128_i64).into()));
}

#[test]
fn assigning_floats() {
    let mut ratio = 0.0_f64;
    ratio.assign(&env_value("0.25")).unwrap();
    assert!((ratio - 0.25).abs() < f64::EPSILON);
    ratio.assign(&WithOrigin::new(Value::Number(3_u64.into()), Arc::default()))
        .unwrap();
    assert!((ratio - 3.0).abs() < f64::EPSILON);
    ratio.assign(&env_value("what")).unwrap_err();

    let mut small = 0.0_f32;
    small.assign(&env_value("1.5")).unwrap();
    assert!((small - 1.5).abs() < f32::EPSILON);
    assert_eq!(small.kind(), FieldKind::Float);
}

#[test]
fn assigning_strings() {
    let mut s = String::new();
    assert!(s.is_zero());
    s.assign(&WithOrigin::new(Value::Number(42_u64.into()), Arc::default()))
        .unwrap();
    assert_eq!(s, "42");
    s.assign(&WithOrigin::new(Value::Bool(false), Arc::default()))
        .unwrap();
    assert_eq!(s, "false");
    // Strings are assigned verbatim.
    s.assign(&env_value("  padded ")).unwrap();
    assert_eq!(s, "  padded ");
    assert!(!s.is_zero());

    let err = s.assign(&object([])).unwrap_err();
    assert_eq!(err.message(), "invalid type: expected string, got object");
}

#[test]
fn splitting_sequences() {
    let mut items: Vec<String> = vec![];
    items.assign(&env_value("a, b, c")).unwrap();
    assert_eq!(items, ["a", "b", "c"]);
    items.assign(&env_value("single")).unwrap();
    assert_eq!(items, ["single"]);
    items.assign(&env_value("")).unwrap();
    assert!(items.is_empty() && items.is_zero());
    items.assign(&env_value("a,,b")).unwrap();
    assert_eq!(items, ["a", "", "b"]);

    let mut numbers: Vec<u32> = vec![];
    numbers.assign(&env_value("1, 2,3")).unwrap();
    assert_eq!(numbers, [1, 2, 3]);
    let err = numbers.assign(&env_value("1, x")).unwrap_err();
    assert!(err.message().starts_with("item #1: invalid integer \"x\""), "{err}");
    // Failed assignment leaves the value intact.
    assert_eq!(numbers, [1, 2, 3]);
}

#[test]
fn assigning_arrays() {
    let items = ["a", "b"]
        .map(|item| WithOrigin::new(Value::from(item), Arc::default()))
        .to_vec();
    let mut sequence: Vec<String> = vec![];
    sequence
        .assign(&WithOrigin::new(Value::Array(items), Arc::default()))
        .unwrap();
    assert_eq!(sequence, ["a", "b"]);
    assert_eq!(sequence.kind(), FieldKind::Sequence);
    assert_matches!(sequence.to_value(), Value::Array(items) if items.len() == 2);
}

#[test]
fn zero_records() {
    let mut config = DatabaseConfig::default();
    assert!(config.is_zero());
    config.port = 1;
    assert!(!config.is_zero());

    // Skipped fields are not taken into account.
    let config = ServerConfig {
        internal: 42,
        ..ServerConfig::default()
    };
    assert!(config.is_zero());

    let config = OptionalDatabaseConfig::default();
    assert!(config.is_zero());
    let config = OptionalDatabaseConfig {
        database: Some(DatabaseConfig::default()),
    };
    assert!(!config.is_zero());
}

#[test]
fn assigning_records() {
    let mut config = DatabaseConfig::default();
    let value = object([
        ("DB_HOST", Value::from("db.local")),
        ("db_port", Value::from("6432")),
        ("unknown", Value::Bool(true)),
    ]);
    config.assign(&value).unwrap();
    assert_eq!(
        config,
        DatabaseConfig {
            host: "db.local".to_owned(),
            port: 6432,
        }
    );

    config.assign(&WithOrigin::default()).unwrap();
    assert_eq!(config.port, 6432);

    let err = config.assign(&object([("db_port", Value::Bool(true))])).unwrap_err();
    assert_eq!(
        err.message(),
        "field `port`: invalid type: expected integer, got Boolean"
    );
    let err = config.assign(&env_value("what")).unwrap_err();
    assert_eq!(err.message(), "invalid type: expected object, got string");
}

#[test]
fn assigning_optional_records() {
    let mut config = OptionalDatabaseConfig::default();
    assert_matches!(
        config.database.as_record_mut().map(|_| ()),
        Err(ShapeError::Null)
    );

    config
        .database
        .assign(&object([("db_host", Value::from("db.local"))]))
        .unwrap();
    let database = config.database.as_ref().unwrap();
    assert_eq!(database.host, "db.local");
    assert_eq!(database.port, 0);
    config.database.as_record_mut().unwrap();

    config.database.assign(&WithOrigin::default()).unwrap();
    assert!(config.database.is_none());
}

#[test]
fn non_record_values() {
    let mut port = 0_u16;
    assert_matches!(
        port.as_record_mut().map(|_| ()),
        Err(ShapeError::NotRecord { kind: FieldKind::Unsigned })
    );
}

#[test]
fn converting_records_to_values() {
    let config = ServerConfig {
        port: 8000,
        debug: true,
        origins: vec!["a".to_owned()],
        ..ServerConfig::default()
    };
    let value = config.to_value();
    let map = value.as_object().unwrap();

    assert_eq!(map["port"].inner, Value::Number(8000_u64.into()));
    assert_eq!(map["debug"].inner, Value::Bool(true));
    assert_matches!(&map["origins"].inner, Value::Array(items) if items.len() == 1);
    // Unbound fields are keyed by their names.
    assert_eq!(map["ratio"].inner, Value::Number(serde_json::Number::from_f64(0.0).unwrap()));
    let database = map["database"].inner.as_object().unwrap();
    assert_eq!(database["db_host"].inner, Value::from(""));
    assert!(!map.contains_key("internal"));
}
