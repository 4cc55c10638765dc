//! # pgmount database module
//!
//! Registers a database integration with the [`pgmount_di`] injector: the
//! connection options for three configuration domains, each given as a
//! literal, a factory, or a reference to an existing provider, and a single
//! shared connection built from them.
//!
//! ## Configuration domains
//!
//! | Domain  | Options type        | Provider key       |
//! |---------|---------------------|--------------------|
//! | connect | [`ConnectOptions`]  | [`CONNECT_OPTIONS`] |
//! | config  | [`BehaviorOptions`] | [`CONFIG_OPTIONS`]  |
//! | driver  | [`DriverOptions`]   | [`DRIVER_OPTIONS`]  |
//!
//! ## Example
//!
//! ```rust,no_run
//! use pgmount_db::{AsyncOptions, ConfigDescriptor, ConnectOptions, DatabaseModule, PgConnector};
//! use pgmount_di::{DependencyKey, Module, Provider};
//!
//! # async fn example() -> pgmount_db::ProvisionResult<()> {
//! let secrets = Module::new("secrets")
//!     .provider(Provider::value(DependencyKey::named("db_password"), "s3cret".to_string()));
//!
//! let module = DatabaseModule::register_async(
//!     PgConnector::new(),
//!     AsyncOptions::new(ConfigDescriptor::factory(
//!         [DependencyKey::named("db_password")],
//!         |deps| async move {
//!             let password = deps.get::<String>(0)?;
//!             Ok(ConnectOptions::new()
//!                 .with("host", "db")
//!                 .with("password", password.as_str()))
//!         },
//!     ))
//!     .import(secrets),
//! );
//!
//! let scope = DatabaseModule::bootstrap(&module).await?;
//! let db = DatabaseModule::connection::<PgConnector>(&scope).await?;
//! # let _ = db;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod descriptor;
pub mod error;
pub mod keys;
pub mod module;
pub mod options;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod resolver;
#[cfg(feature = "settings")]
pub mod settings;

pub use connection::{Connector, connection_provider};
pub use descriptor::{
	ConfigDescriptor, FactoryDescriptor, OptionsFactory, OptionsFuture, options_factory_provider,
};
pub use error::{ProvisionError, ProvisionResult};
pub use keys::{CONFIG_OPTIONS, CONNECT_OPTIONS, CONNECTION, DRIVER_OPTIONS};
pub use module::{AsyncOptions, DatabaseModule, ResolvedOptions};
pub use options::{BehaviorOptions, ConfigDomain, ConnectOptions, DriverOptions, OptionsMap};
#[cfg(feature = "postgres")]
pub use postgres::{PgConnector, PgDatabase, pg_connect_options, pg_pool_options};
pub use resolver::{DomainOptions, resolve_descriptor, resolve_optional};
#[cfg(feature = "settings")]
pub use settings::{DatabaseSettings, SettingsError, SettingsLoader};
