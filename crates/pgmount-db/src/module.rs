//! Registration composer
//!
//! [`DatabaseModule`] assembles the providers for one database integration:
//! resolved options for the three configuration domains plus the shared
//! connection built from them.

use crate::connection::{Connector, connection_provider};
use crate::descriptor::ConfigDescriptor;
use crate::error::ProvisionResult;
use crate::keys::{CONFIG_OPTIONS, CONNECT_OPTIONS, CONNECTION, DRIVER_OPTIONS};
use crate::options::{BehaviorOptions, ConnectOptions, DriverOptions};
use crate::resolver::{resolve_descriptor, resolve_optional};
use pgmount_di::{Module, Scope};
use std::fmt;
use std::sync::Arc;

/// Descriptors for an asynchronous registration
///
/// Only `connect` is required, and [`AsyncOptions::new`] is the only way to
/// build one. Absent `config` or `driver` descriptors resolve to empty options.
pub struct AsyncOptions {
	connect: ConfigDescriptor<ConnectOptions>,
	config: Option<ConfigDescriptor<BehaviorOptions>>,
	driver: Option<ConfigDescriptor<DriverOptions>>,
	imports: Vec<Module>,
}

impl AsyncOptions {
	pub fn new(connect: ConfigDescriptor<ConnectOptions>) -> Self {
		Self {
			connect,
			config: None,
			driver: None,
			imports: Vec::new(),
		}
	}

	pub fn config(mut self, descriptor: ConfigDescriptor<BehaviorOptions>) -> Self {
		self.config = Some(descriptor);
		self
	}

	pub fn driver(mut self, descriptor: ConfigDescriptor<DriverOptions>) -> Self {
		self.driver = Some(descriptor);
		self
	}

	/// Makes the providers of `module` visible to the descriptors' dependencies.
	pub fn import(mut self, module: Module) -> Self {
		self.imports.push(module);
		self
	}

	pub fn imports(mut self, modules: impl IntoIterator<Item = Module>) -> Self {
		self.imports.extend(modules);
		self
	}
}

impl fmt::Debug for AsyncOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let imports: Vec<_> = self.imports.iter().map(Module::name).collect();
		f.debug_struct("AsyncOptions")
			.field("connect", &self.connect)
			.field("config", &self.config)
			.field("driver", &self.driver)
			.field("imports", &imports)
			.finish()
	}
}

/// Fully resolved options of a scope
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
	pub connect: Arc<ConnectOptions>,
	pub config: Arc<BehaviorOptions>,
	pub driver: Arc<DriverOptions>,
}

/// Entry point for registering a database integration
///
/// # Examples
///
/// ```no_run
/// use pgmount_db::{ConnectOptions, DatabaseModule, PgConnector};
///
/// # async fn example() -> pgmount_db::ProvisionResult<()> {
/// let module = DatabaseModule::register(
///     PgConnector::new(),
///     ConnectOptions::new().with("host", "db").with("port", 5432),
///     None,
///     None,
/// );
///
/// let scope = DatabaseModule::bootstrap(&module).await?;
/// let db = DatabaseModule::connection::<PgConnector>(&scope).await?;
/// println!("pool size: {}", db.pool().size());
/// # Ok(())
/// # }
/// ```
pub struct DatabaseModule;

impl DatabaseModule {
	/// Name of the modules produced by this type
	pub const NAME: &'static str = "DatabaseModule";

	/// Registers literal options.
	pub fn register<C: Connector>(
		connector: C,
		connect: ConnectOptions,
		config: Option<BehaviorOptions>,
		driver: Option<DriverOptions>,
	) -> Module {
		Self::register_async(
			connector,
			AsyncOptions {
				connect: ConfigDescriptor::Static(connect),
				config: config.map(ConfigDescriptor::Static),
				driver: driver.map(ConfigDescriptor::Static),
				imports: Vec::new(),
			},
		)
	}

	/// Registers options described by descriptors.
	///
	/// Produces exactly four providers: one per configuration domain and one
	/// for the connection, which depends on all three. The imports of
	/// `options` are carried so that factory and existing-provider
	/// dependencies resolve. Nothing is invoked until a scope needs it.
	pub fn register_async<C: Connector>(connector: C, options: AsyncOptions) -> Module {
		let AsyncOptions {
			connect,
			config,
			driver,
			imports,
		} = options;

		tracing::debug!(
			connector = connector.name(),
			imports = imports.len(),
			"registering database module"
		);

		Module::new(Self::NAME)
			.with_imports(imports)
			.provider(resolve_descriptor(connect))
			.provider(resolve_optional(config))
			.provider(resolve_optional(driver))
			.provider(connection_provider(Arc::new(connector)))
	}

	/// Registers options loaded by a [`SettingsLoader`](crate::SettingsLoader).
	#[cfg(feature = "settings")]
	pub fn register_settings<C: Connector>(
		connector: C,
		settings: crate::settings::DatabaseSettings,
	) -> Module {
		let crate::settings::DatabaseSettings {
			connect,
			config,
			driver,
		} = settings;
		Self::register(connector, connect, Some(config), Some(driver))
	}

	/// Builds a scope for `module` and constructs every provider eagerly.
	///
	/// The first failure aborts startup and is returned.
	pub async fn bootstrap(module: &Module) -> ProvisionResult<Scope> {
		let scope = Scope::build(module)?;
		scope.instantiate_all().await?;
		tracing::info!(scope = %scope.id(), "database module ready");
		Ok(scope)
	}

	/// The shared connection of `scope`, constructing it on first use.
	pub async fn connection<C: Connector>(scope: &Scope) -> ProvisionResult<Arc<C::Connection>> {
		Ok(scope.get::<C::Connection>(&CONNECTION).await?)
	}

	/// The resolved options of `scope`.
	pub async fn resolved_options(scope: &Scope) -> ProvisionResult<ResolvedOptions> {
		let (connect_key, config_key, driver_key) = (CONNECT_OPTIONS, CONFIG_OPTIONS, DRIVER_OPTIONS);
		let (connect, config, driver) = futures::try_join!(
			scope.get::<ConnectOptions>(&connect_key),
			scope.get::<BehaviorOptions>(&config_key),
			scope.get::<DriverOptions>(&driver_key),
		)?;
		Ok(ResolvedOptions {
			connect,
			config,
			driver,
		})
	}
}
