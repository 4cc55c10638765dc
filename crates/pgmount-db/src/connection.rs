//! The shared connection provider

use crate::error::{ProvisionError, ProvisionResult};
use crate::keys::{CONFIG_OPTIONS, CONNECT_OPTIONS, CONNECTION, DRIVER_OPTIONS};
use crate::options::{BehaviorOptions, ConnectOptions, DriverOptions};
use async_trait::async_trait;
use pgmount_di::Provider;
use std::sync::Arc;

/// Opens connections with the wrapped database library.
///
/// `connect` is called at most once per scope, with the fully resolved
/// options of all three domains. Library failures should be reported with
/// [`ProvisionError::connection`].
#[async_trait]
pub trait Connector: Send + Sync + 'static {
	/// The connection handle shared by every consumer in a scope
	type Connection: Send + Sync + 'static;

	async fn connect(
		&self,
		connect: &ConnectOptions,
		config: &BehaviorOptions,
		driver: &DriverOptions,
	) -> ProvisionResult<Self::Connection>;

	/// Name used in log output
	fn name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}
}

/// Provider for [`CONNECTION`], depending on the three resolved option keys.
pub fn connection_provider<C: Connector>(connector: Arc<C>) -> Provider {
	Provider::factory(
		CONNECTION,
		[CONNECT_OPTIONS, CONFIG_OPTIONS, DRIVER_OPTIONS],
		move |deps| {
			let connector = Arc::clone(&connector);
			async move {
				let connect = deps.get::<ConnectOptions>(0)?;
				let config = deps.get::<BehaviorOptions>(1)?;
				let driver = deps.get::<DriverOptions>(2)?;

				tracing::debug!(connector = connector.name(), "opening connection");
				let result: Result<C::Connection, ProvisionError> =
					connector.connect(&connect, &config, &driver).await;
				match &result {
					Ok(_) => tracing::info!(connector = connector.name(), "connection established"),
					Err(e) => tracing::warn!(
						connector = connector.name(),
						error = %e,
						"failed to open connection"
					),
				}
				result
			}
		},
	)
}
