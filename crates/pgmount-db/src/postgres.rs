//! PostgreSQL connector backed by an sqlx connection pool

use crate::connection::Connector;
use crate::error::{ProvisionError, ProvisionResult};
use crate::options::{BehaviorOptions, ConfigDomain, ConnectOptions, DriverOptions};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::time::Duration;

/// Opens a [`PgDatabase`] from resolved options.
///
/// Connect options: either `connectionString`, or any of `host`, `port`,
/// `database`, `user`, `password`, `ssl` and `application_name`. Discrete
/// options override the corresponding part of the connection string.
///
/// Driver options: `max` (or `poolSize`), `min`, `idleTimeoutMillis`,
/// `connectionTimeoutMillis`.
#[derive(Debug, Clone, Default)]
pub struct PgConnector {
	lazy: bool,
}

impl PgConnector {
	pub fn new() -> Self {
		Self::default()
	}

	/// Connector whose pool opens connections on first acquire instead of
	/// when the scope constructs it.
	pub fn lazy() -> Self {
		Self { lazy: true }
	}
}

#[async_trait]
impl Connector for PgConnector {
	type Connection = PgDatabase;

	async fn connect(
		&self,
		connect: &ConnectOptions,
		config: &BehaviorOptions,
		driver: &DriverOptions,
	) -> ProvisionResult<PgDatabase> {
		let connect_options = pg_connect_options(connect)?;
		let pool_options = pg_pool_options(driver)?;

		tracing::debug!(
			host = connect_options.get_host(),
			port = connect_options.get_port(),
			database = ?connect_options.get_database(),
			lazy = self.lazy,
			"opening PostgreSQL pool"
		);

		let pool = if self.lazy {
			pool_options.connect_lazy_with(connect_options)
		} else {
			pool_options
				.connect_with(connect_options)
				.await
				.map_err(ProvisionError::connection)?
		};

		Ok(PgDatabase {
			pool,
			behavior: config.clone(),
		})
	}

	fn name(&self) -> &'static str {
		"postgres"
	}
}

/// Maps connect options onto sqlx connection options.
pub fn pg_connect_options(options: &ConnectOptions) -> ProvisionResult<PgConnectOptions> {
	let mut pg = match options.get_str("connectionString")? {
		Some(url) => url.parse::<PgConnectOptions>().map_err(|e| {
			ProvisionError::invalid_option(ConfigDomain::Connect, "connectionString", e)
		})?,
		None => PgConnectOptions::new_without_pgpass(),
	};

	if let Some(host) = options.get_str("host")? {
		pg = pg.host(host);
	}
	if let Some(port) = options.get_as::<u16>("port")? {
		pg = pg.port(port);
	}
	if let Some(database) = options.get_str("database")? {
		pg = pg.database(database);
	}
	if let Some(user) = options.first_as::<String>(&["user", "username"])? {
		pg = pg.username(&user);
	}
	if let Some(password) = options.get_str("password")? {
		pg = pg.password(password);
	}
	if let Some(name) = options.first_as::<String>(&["application_name", "applicationName"])? {
		pg = pg.application_name(&name);
	}
	if let Some(ssl) = options.get("ssl") {
		pg = pg.ssl_mode(ssl_mode(ssl)?);
	}

	Ok(pg)
}

fn ssl_mode(value: &Value) -> ProvisionResult<PgSslMode> {
	match value {
		Value::Bool(true) => Ok(PgSslMode::Require),
		Value::Bool(false) => Ok(PgSslMode::Disable),
		Value::String(mode) => mode
			.parse::<PgSslMode>()
			.map_err(|e| ProvisionError::invalid_option(ConfigDomain::Connect, "ssl", e)),
		other => Err(ProvisionError::invalid_option(
			ConfigDomain::Connect,
			"ssl",
			format!("expected a boolean or an sslmode name, found {}", other),
		)),
	}
}

/// Maps driver options onto sqlx pool options.
pub fn pg_pool_options(options: &DriverOptions) -> ProvisionResult<PgPoolOptions> {
	let mut pool = PgPoolOptions::new();

	if let Some(max) = options.first_as::<u32>(&["max", "poolSize"])? {
		if max == 0 {
			return Err(ProvisionError::invalid_option(
				ConfigDomain::Driver,
				"max",
				"pool size must be at least 1",
			));
		}
		pool = pool.max_connections(max);
	}
	if let Some(min) = options.get_as::<u32>("min")? {
		pool = pool.min_connections(min);
	}
	if let Some(idle) = options.get_as::<u64>("idleTimeoutMillis")? {
		// 0 disables the idle timeout
		pool = pool.idle_timeout((idle > 0).then(|| Duration::from_millis(idle)));
	}
	if let Some(timeout) = options.get_as::<u64>("connectionTimeoutMillis")? {
		pool = pool.acquire_timeout(Duration::from_millis(timeout));
	}

	Ok(pool)
}

/// A shared PostgreSQL pool together with the behavioral configuration it
/// was registered with
#[derive(Debug, Clone)]
pub struct PgDatabase {
	pool: PgPool,
	behavior: BehaviorOptions,
}

impl PgDatabase {
	pub fn pool(&self) -> &PgPool {
		&self.pool
	}

	pub fn behavior(&self) -> &BehaviorOptions {
		&self.behavior
	}

	/// Schemas named by the `allowedSchemas` config option.
	///
	/// Accepts a list of names or a single comma-separated string. Empty when
	/// the option is absent.
	pub fn allowed_schemas(&self) -> ProvisionResult<Vec<String>> {
		match self.behavior.get("allowedSchemas") {
			None | Some(Value::Null) => Ok(Vec::new()),
			Some(Value::String(list)) => Ok(list
				.split(',')
				.map(str::trim)
				.filter(|s| !s.is_empty())
				.map(str::to_string)
				.collect()),
			Some(_) => Ok(self
				.behavior
				.get_as::<Vec<String>>("allowedSchemas")?
				.unwrap_or_default()),
		}
	}

	/// Closes the pool, waiting for checked-out connections to be returned.
	pub async fn close(&self) {
		self.pool.close().await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_discrete_connect_options() {
		// Arrange
		let options = ConnectOptions::new()
			.with("host", "db")
			.with("port", 5433)
			.with("database", "app")
			.with("user", "svc")
			.with("ssl", false);

		// Act
		let pg = pg_connect_options(&options).unwrap();

		// Assert
		assert_eq!(pg.get_host(), "db");
		assert_eq!(pg.get_port(), 5433);
		assert_eq!(pg.get_database(), Some("app"));
		assert_eq!(pg.get_username(), "svc");
		assert!(matches!(pg.get_ssl_mode(), PgSslMode::Disable));
	}

	#[rstest]
	fn test_discrete_options_override_connection_string() {
		// Arrange
		let options = ConnectOptions::new()
			.with("connectionString", "postgres://u:p@primary:5432/app")
			.with("host", "replica");

		// Act
		let pg = pg_connect_options(&options).unwrap();

		// Assert
		assert_eq!(pg.get_host(), "replica");
		assert_eq!(pg.get_database(), Some("app"));
		assert_eq!(pg.get_username(), "u");
	}

	#[rstest]
	#[case(json!("verify-full"), true)]
	#[case(json!(true), true)]
	#[case(json!("sometimes"), false)]
	#[case(json!(1), false)]
	fn test_ssl_option(#[case] value: Value, #[case] valid: bool) {
		// Act
		let result = pg_connect_options(&ConnectOptions::new().with("ssl", value));

		// Assert
		assert_eq!(result.is_ok(), valid);
	}

	#[rstest]
	fn test_pool_options_from_driver_options() {
		// Arrange
		let options = DriverOptions::new()
			.with("poolSize", 12)
			.with("min", 2)
			.with("idleTimeoutMillis", 0)
			.with("connectionTimeoutMillis", 1500);

		// Act
		let pool = pg_pool_options(&options).unwrap();

		// Assert
		assert_eq!(pool.get_max_connections(), 12);
		assert_eq!(pool.get_min_connections(), 2);
		assert_eq!(pool.get_idle_timeout(), None);
		assert_eq!(pool.get_acquire_timeout(), Duration::from_millis(1500));
	}

	#[rstest]
	fn test_zero_pool_size_is_rejected() {
		// Act
		let result = pg_pool_options(&DriverOptions::new().with("max", 0));

		// Assert
		assert!(matches!(
			result,
			Err(ProvisionError::InvalidOption { domain: ConfigDomain::Driver, .. })
		));
	}

	#[rstest]
	#[tokio::test]
	async fn test_lazy_connector_builds_pool_without_server() {
		// Arrange
		let connector = PgConnector::lazy();
		let connect = ConnectOptions::new().with("host", "db").with("port", 5432);
		let config = BehaviorOptions::new().with("allowedSchemas", "public, audit");

		// Act
		let db = connector
			.connect(&connect, &config, &DriverOptions::new().with("max", 3))
			.await
			.unwrap();

		// Assert
		assert_eq!(db.pool().connect_options().get_host(), "db");
		assert_eq!(db.pool().options().get_max_connections(), 3);
		assert_eq!(db.allowed_schemas().unwrap(), ["public", "audit"]);
		db.close().await;
	}
}
