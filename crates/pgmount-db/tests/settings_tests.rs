#![cfg(feature = "settings")]

//! Settings loading tests
//!
//! File values are overridden by prefixed environment variables, and the
//! loaded settings register like literal options.

use pgmount_db::{DatabaseModule, DatabaseSettings, SettingsError, SettingsLoader};
use pgmount_test::RecordingConnector;
use rstest::*;
use serde_json::json;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

const SETTINGS: &str = r#"
[connect]
host = "localhost"
port = 5432
database = "app"

[config]
allowedSchemas = ["public"]

[driver]
max = 10
"#;

#[fixture]
fn settings_file() -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	file.write_all(SETTINGS.as_bytes()).unwrap();
	file
}

fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
	pairs
		.iter()
		.map(|(k, v)| (k.to_string(), v.to_string()))
		.collect()
}

#[rstest]
fn test_file_sections_map_to_domains(settings_file: NamedTempFile) {
	// Act
	let settings = SettingsLoader::new()
		.with_file(settings_file.path())
		.load_with_env(Vec::new())
		.unwrap();

	// Assert
	assert_eq!(settings.connect.get_str("host").unwrap(), Some("localhost"));
	assert_eq!(settings.connect.get_as::<u16>("port").unwrap(), Some(5432));
	assert_eq!(settings.config.get("allowedSchemas"), Some(&json!(["public"])));
	assert_eq!(settings.driver.get_as::<u32>("max").unwrap(), Some(10));
}

#[rstest]
fn test_prefixed_env_overrides_file(settings_file: NamedTempFile) {
	// Arrange
	let env = vars(&[
		("PGMOUNT_CONNECT__HOST", "db"),
		("PGMOUNT_DRIVER__IDLE_TIMEOUT_MILLIS", "5000"),
		("PGMOUNT_CONFIG__NO_WARNINGS", "true"),
		("UNRELATED", "ignored"),
	]);

	// Act
	let settings = SettingsLoader::new()
		.with_file(settings_file.path())
		.with_env_prefix("PGMOUNT_")
		.load_with_env(env)
		.unwrap();

	// Assert
	assert_eq!(settings.connect.get_str("host").unwrap(), Some("db"));
	assert_eq!(settings.connect.get_str("database").unwrap(), Some("app"));
	assert_eq!(settings.driver.get("idleTimeoutMillis"), Some(&json!(5000)));
	assert_eq!(settings.config.get("noWarnings"), Some(&json!(true)));
	assert_eq!(settings.connect.len(), 3);
}

#[rstest]
fn test_database_url_sets_connection_string() {
	// Act
	let settings = SettingsLoader::new()
		.load_with_env(vars(&[("DATABASE_URL", "postgres://u:p@db:5432/app")]))
		.unwrap();

	// Assert
	assert_eq!(
		settings.connect.get_str("connectionString").unwrap(),
		Some("postgres://u:p@db:5432/app")
	);
}

#[rstest]
fn test_unrecognized_prefixed_variables_are_ignored() {
	// Arrange
	let env = vars(&[
		("PGMOUNT_LOG", "debug"),
		("PGMOUNT_POOL__MAX", "3"),
		("PGMOUNT_DRIVER__MAX", "4"),
	]);

	// Act
	let settings = SettingsLoader::new()
		.with_env_prefix("PGMOUNT_")
		.load_with_env(env)
		.unwrap();

	// Assert
	assert_eq!(settings.driver.len(), 1);
	assert_eq!(settings.driver.get_as::<u32>("max").unwrap(), Some(4));
	assert!(settings.connect.is_empty());
	assert!(settings.config.is_empty());
}

#[rstest]
#[case::url_listed_first(&[
	("DATABASE_URL", "postgres://db/from_url"),
	("PGMOUNT_CONNECT__CONNECTION_STRING", "postgres://db/from_prefix"),
])]
#[case::url_listed_last(&[
	("PGMOUNT_CONNECT__CONNECTION_STRING", "postgres://db/from_prefix"),
	("DATABASE_URL", "postgres://db/from_url"),
])]
fn test_prefixed_connection_string_overrides_database_url(#[case] pairs: &[(&str, &str)]) {
	// Act
	let settings = SettingsLoader::new()
		.with_env_prefix("PGMOUNT_")
		.load_with_env(vars(pairs))
		.unwrap();

	// Assert
	assert_eq!(
		settings.connect.get_str("connectionString").unwrap(),
		Some("postgres://db/from_prefix")
	);
}

#[cfg(feature = "postgres")]
#[rstest]
fn test_numeric_credentials_from_env_reach_connector_as_strings() {
	// Arrange
	let env = vars(&[
		("PGMOUNT_CONNECT__HOST", "db"),
		("PGMOUNT_CONNECT__USER", "1001"),
		("PGMOUNT_CONNECT__PASSWORD", "123456"),
		("PGMOUNT_CONNECT__DATABASE", "2024"),
		("PGMOUNT_CONNECT__PORT", "5433"),
	]);

	// Act
	let settings = SettingsLoader::new()
		.with_env_prefix("PGMOUNT_")
		.load_with_env(env)
		.unwrap();
	let pg = pgmount_db::pg_connect_options(&settings.connect).unwrap();

	// Assert
	assert_eq!(settings.connect.get("password"), Some(&json!("123456")));
	assert_eq!(settings.connect.get("port"), Some(&json!(5433)));
	assert_eq!(pg.get_username(), "1001");
	assert_eq!(pg.get_database(), Some("2024"));
	assert_eq!(pg.get_port(), 5433);
}

#[rstest]
fn test_missing_required_file_is_io_error() {
	// Arrange
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("database.toml");

	// Act
	let required = SettingsLoader::new().with_file(&path).load_with_env(Vec::new());
	let optional = SettingsLoader::new()
		.with_optional_file(&path)
		.load_with_env(Vec::new());

	// Assert
	assert!(matches!(required, Err(SettingsError::Io { .. })));
	assert_eq!(optional.unwrap(), DatabaseSettings::default());
}

#[rstest]
#[serial(database_env)]
fn test_load_reads_process_environment() {
	// Arrange
	// SAFETY: serialized with every other test touching these variables
	unsafe {
		std::env::set_var("PGMOUNT_TEST_DRIVER__MIN", "2");
	}

	// Act
	let settings = SettingsLoader::new()
		.with_env_prefix("PGMOUNT_TEST_")
		.load();

	// Cleanup
	unsafe {
		std::env::remove_var("PGMOUNT_TEST_DRIVER__MIN");
	}

	// Assert
	assert_eq!(settings.unwrap().driver.get_as::<u32>("min").unwrap(), Some(2));
}

#[rstest]
#[tokio::test]
async fn test_registered_settings_reach_connector(settings_file: NamedTempFile) {
	// Arrange
	let settings = SettingsLoader::new()
		.with_file(settings_file.path())
		.load_with_env(Vec::new())
		.unwrap();
	let connector = RecordingConnector::new();
	let module = DatabaseModule::register_settings(connector.clone(), settings.clone());

	// Act
	DatabaseModule::bootstrap(&module).await.unwrap();

	// Assert
	let calls = connector.calls();
	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].connect, settings.connect);
	assert_eq!(calls[0].config, settings.config);
	assert_eq!(calls[0].driver, settings.driver);
}
