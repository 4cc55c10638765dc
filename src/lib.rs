//! # pgmount
//!
//! Configuration resolution and singleton connection provisioning for
//! database clients.
//!
//! pgmount lets an application describe how its database connection is
//! configured, in three domains (connection parameters, behavioral config,
//! driver options), where each domain is a literal value, an asynchronous
//! factory over injected dependencies, or a reference to a provider that
//! already knows how to produce it. It then opens exactly one shared
//! connection per scope from the resolved options.
//!
//! ## Crates
//!
//! - [`di`]: keyed providers, modules and singleton-per-scope construction
//! - [`db`]: configuration descriptors, the registration composer and the
//!   connection provider
//!
//! ## Feature Flags
//!
//! - `postgres` (default): sqlx-backed [`PgConnector`](db::PgConnector)
//! - `settings` (default): [`SettingsLoader`](db::SettingsLoader) for TOML
//!   files and environment variables
//! - `full`: everything
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use pgmount::prelude::*;
//!
//! # async fn example() -> ProvisionResult<()> {
//! let module = DatabaseModule::register(
//!     PgConnector::new(),
//!     ConnectOptions::new().with("host", "db").with("port", 5432),
//!     None,
//!     Some(DriverOptions::new().with("max", 10)),
//! );
//!
//! let scope = DatabaseModule::bootstrap(&module).await?;
//! let db = DatabaseModule::connection::<PgConnector>(&scope).await?;
//! # let _ = db;
//! # Ok(())
//! # }
//! ```

pub use pgmount_db as db;
pub use pgmount_di as di;

pub mod prelude {
	pub use pgmount_db::{
		AsyncOptions, BehaviorOptions, ConfigDescriptor, ConnectOptions, Connector,
		DatabaseModule, DriverOptions, OptionsFactory, ProvisionError, ProvisionResult,
		options_factory_provider,
	};
	#[cfg(feature = "postgres")]
	pub use pgmount_db::{PgConnector, PgDatabase};
	#[cfg(feature = "settings")]
	pub use pgmount_db::{DatabaseSettings, SettingsLoader};
	pub use pgmount_di::{DependencyKey, Module, Provider, Scope};
}
