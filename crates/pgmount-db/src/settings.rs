//! Loading registration options from TOML files and environment variables
//!
//! A settings file has one table per configuration domain:
//!
//! ```toml
//! [connect]
//! host = "db"
//! port = 5432
//!
//! [driver]
//! max = 10
//! ```
//!
//! Environment variables named `<PREFIX><SECTION>__<NAME>` override file
//! values, e.g. `PGMOUNT_DRIVER__IDLE_TIMEOUT_MILLIS=5000` sets
//! `driver.idleTimeoutMillis`. `DATABASE_URL` sets `connect.connectionString`
//! unless a prefixed `CONNECT__CONNECTION_STRING` is also present, which wins.
//! Prefixed variables whose section is not connect, config or driver are
//! ignored.

use crate::options::{BehaviorOptions, ConfigDomain, ConnectOptions, DriverOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Variable that sets `connect.connectionString` regardless of prefix
pub const DATABASE_URL: &str = "DATABASE_URL";

// Connect options the connector reads as strings; env values for these are
// never parsed as JSON scalars.
const STRING_CONNECT_OPTIONS: &[&str] = &[
	"connectionString",
	"host",
	"database",
	"user",
	"username",
	"password",
	"applicationName",
	"application_name",
];

/// Error type for settings loading
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Options for all three domains, as loaded from settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSettings {
	pub connect: ConnectOptions,
	pub config: BehaviorOptions,
	pub driver: DriverOptions,
}

impl DatabaseSettings {
	pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(content)?)
	}

	fn set(&mut self, domain: ConfigDomain, name: String, value: Value) {
		match domain {
			ConfigDomain::Connect => self.connect.insert(name, value),
			ConfigDomain::Config => self.config.insert(name, value),
			ConfigDomain::Driver => self.driver.insert(name, value),
		};
	}
}

/// Layered settings loader: an optional TOML file, then environment overrides
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
	file: Option<PathBuf>,
	file_required: bool,
	env_prefix: Option<String>,
}

impl SettingsLoader {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads `path`; a missing file is an error.
	pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
		self.file = Some(path.into());
		self.file_required = true;
		self
	}

	/// Reads `path` if it exists.
	pub fn with_optional_file(mut self, path: impl Into<PathBuf>) -> Self {
		self.file = Some(path.into());
		self.file_required = false;
		self
	}

	/// Only variables starting with `prefix` are treated as overrides.
	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = Some(prefix.into());
		self
	}

	/// Loads settings using the process environment.
	pub fn load(&self) -> Result<DatabaseSettings, SettingsError> {
		self.load_with_env(std::env::vars())
	}

	/// Loads settings using `vars` as the environment.
	pub fn load_with_env<I>(&self, vars: I) -> Result<DatabaseSettings, SettingsError>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		let mut settings = match &self.file {
			Some(path) => self.read_file(path)?,
			None => DatabaseSettings::default(),
		};

		let mut database_url = None;
		let mut prefixed = Vec::new();
		for (name, raw) in vars {
			if name == DATABASE_URL {
				database_url = Some(raw);
				continue;
			}
			let Some(prefix) = &self.env_prefix else {
				continue;
			};
			let Some(rest) = name.strip_prefix(prefix.as_str()) else {
				continue;
			};
			match parse_env_key(rest) {
				Some((domain, option)) => prefixed.push((domain, option, raw)),
				None => tracing::debug!(variable = %name, "ignoring unrecognized settings variable"),
			}
		}

		// DATABASE_URL first so a prefixed connection string overrides it
		let mut overrides = prefixed.len();
		if let Some(url) = database_url {
			settings.connect.insert("connectionString", url);
			overrides += 1;
		}
		for (domain, option, raw) in prefixed {
			let value = parse_env_value(domain, &option, raw);
			settings.set(domain, option, value);
		}

		tracing::debug!(
			file = ?self.file,
			overrides,
			"loaded database settings"
		);
		Ok(settings)
	}

	fn read_file(&self, path: &Path) -> Result<DatabaseSettings, SettingsError> {
		match fs::read_to_string(path) {
			Ok(content) => DatabaseSettings::from_toml_str(&content),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound && !self.file_required => {
				Ok(DatabaseSettings::default())
			}
			Err(source) => Err(SettingsError::Io {
				path: path.to_path_buf(),
				source,
			}),
		}
	}
}

fn parse_env_key(key: &str) -> Option<(ConfigDomain, String)> {
	let (section, name) = key.split_once("__")?;
	let domain = match section.to_ascii_lowercase().as_str() {
		"connect" => ConfigDomain::Connect,
		"config" => ConfigDomain::Config,
		"driver" => ConfigDomain::Driver,
		_ => return None,
	};
	let name = camel_case(name);
	(!name.is_empty()).then_some((domain, name))
}

// IDLE_TIMEOUT_MILLIS -> idleTimeoutMillis
fn camel_case(name: &str) -> String {
	let mut out = String::with_capacity(name.len());
	for (i, part) in name.split('_').filter(|p| !p.is_empty()).enumerate() {
		let lower = part.to_ascii_lowercase();
		if i == 0 {
			out.push_str(&lower);
		} else {
			let mut chars = lower.chars();
			if let Some(first) = chars.next() {
				out.push(first.to_ascii_uppercase());
				out.push_str(chars.as_str());
			}
		}
	}
	out
}

fn parse_env_value(domain: ConfigDomain, name: &str, raw: String) -> Value {
	if domain == ConfigDomain::Connect && STRING_CONNECT_OPTIONS.contains(&name) {
		return Value::String(raw);
	}
	match serde_json::from_str::<Value>(raw.trim()) {
		Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::Null)) => value,
		_ => Value::String(raw),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("IDLE_TIMEOUT_MILLIS", "idleTimeoutMillis")]
	#[case("HOST", "host")]
	#[case("POOL_SIZE", "poolSize")]
	#[case("APPLICATION__NAME", "applicationName")]
	fn test_camel_case(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(camel_case(input), expected);
	}

	#[rstest]
	#[case("5432", json!(5432))]
	#[case("true", json!(true))]
	#[case("db", json!("db"))]
	#[case("[1, 2]", json!("[1, 2]"))]
	fn test_env_values_parse_scalars_only(#[case] raw: &str, #[case] expected: Value) {
		assert_eq!(parse_env_value(ConfigDomain::Driver, "max", raw.to_string()), expected);
	}

	#[rstest]
	#[case("password", "123456")]
	#[case("user", "1001")]
	#[case("database", "2024")]
	#[case("host", "true")]
	fn test_string_connect_options_stay_strings(#[case] name: &str, #[case] raw: &str) {
		// Act
		let value = parse_env_value(ConfigDomain::Connect, name, raw.to_string());

		// Assert
		assert_eq!(value, Value::String(raw.to_string()));
	}

	#[rstest]
	fn test_other_connect_options_parse_scalars() {
		// Act
		let port = parse_env_value(ConfigDomain::Connect, "port", "5433".to_string());

		// Assert
		assert_eq!(port, json!(5433));
	}

	#[rstest]
	#[case("DRIVER__MAX", true)]
	#[case("connect__host", true)]
	#[case("POOL__MAX", false)]
	#[case("DRIVER", false)]
	#[case("DRIVER__", false)]
	#[case("LOG", false)]
	fn test_env_key_recognition(#[case] key: &str, #[case] recognized: bool) {
		assert_eq!(parse_env_key(key).is_some(), recognized);
	}

	#[rstest]
	fn test_unknown_toml_section_is_rejected() {
		// Act
		let result = DatabaseSettings::from_toml_str("[pool]\nmax = 1\n");

		// Assert
		assert!(matches!(result, Err(SettingsError::Toml(_))));
	}
}
