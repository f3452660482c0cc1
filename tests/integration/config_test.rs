//! Configuration loading integration tests.

use fleximart_catalog::config::Config;
use fleximart_catalog::error::FleximartError;
use std::io::Write;

#[test]
fn test_load_missing_file_yields_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let config = Config::load_from_file(&path).unwrap();
    assert!(config.connections.is_empty());
}

#[test]
fn test_load_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
[connections.default]
host = "localhost"
database = "fleximart_nosql"

[connections.staging]
host = "staging.example.com"
port = 27018
database = "fleximart_staging"
"#
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();

    let default = config.get_connection(None).unwrap();
    assert_eq!(default.host, Some("localhost".to_string()));
    assert_eq!(default.port, 27017);

    let staging = config.get_connection(Some("staging")).unwrap();
    assert_eq!(staging.port, 27018);
    assert_eq!(staging.database, Some("fleximart_staging".to_string()));
}

#[test]
fn test_load_invalid_toml_reports_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[connections.default\nhost = ").unwrap();

    let result = Config::load_from_file(&path);
    let err = result.unwrap_err();
    assert!(matches!(err, FleximartError::Config(_)));
    assert!(err.to_string().contains("config.toml"));
}
