//! Options factories and factory dependencies

use async_trait::async_trait;
use pgmount_db::{
	BehaviorOptions, ConfigDomain, ConnectOptions, DriverOptions, OptionsFactory, ProvisionError,
	ProvisionResult,
};
use pgmount_di::{DependencyKey, Module, Provider};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Key under which [`vault_module`] registers the client
pub const VAULT_CLIENT: DependencyKey = DependencyKey::from_static("VaultClient");

/// An [`OptionsFactory`] that supports only the domains it was given options for
#[derive(Debug, Default)]
pub struct StubOptionsFactory {
	connect: Option<ConnectOptions>,
	config: Option<BehaviorOptions>,
	driver: Option<DriverOptions>,
	invocations: AtomicUsize,
}

impl StubOptionsFactory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn connect(mut self, options: ConnectOptions) -> Self {
		self.connect = Some(options);
		self
	}

	pub fn config(mut self, options: BehaviorOptions) -> Self {
		self.config = Some(options);
		self
	}

	pub fn driver(mut self, options: DriverOptions) -> Self {
		self.driver = Some(options);
		self
	}

	/// Number of capability calls, successful or not
	pub fn invocations(&self) -> usize {
		self.invocations.load(Ordering::SeqCst)
	}

	fn produce<T: Clone>(&self, options: &Option<T>, domain: ConfigDomain) -> ProvisionResult<T> {
		self.invocations.fetch_add(1, Ordering::SeqCst);
		options
			.clone()
			.ok_or(ProvisionError::CapabilityNotImplemented {
				method: domain.method(),
			})
	}
}

#[async_trait]
impl OptionsFactory for StubOptionsFactory {
	async fn create_connect_options(&self) -> ProvisionResult<ConnectOptions> {
		self.produce(&self.connect, ConfigDomain::Connect)
	}

	async fn create_config_options(&self) -> ProvisionResult<BehaviorOptions> {
		self.produce(&self.config, ConfigDomain::Config)
	}

	async fn create_driver_options(&self) -> ProvisionResult<DriverOptions> {
		self.produce(&self.driver, ConfigDomain::Driver)
	}
}

#[derive(Debug, thiserror::Error)]
#[error("Secret not found: {0}")]
pub struct SecretNotFound(pub String);

/// In-memory secret store with an artificial round-trip delay
#[derive(Debug, Default)]
pub struct VaultClient {
	secrets: HashMap<String, String>,
	fetches: AtomicUsize,
}

impl VaultClient {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.secrets.insert(name.into(), value.into());
		self
	}

	pub async fn secret(&self, name: &str) -> Result<String, SecretNotFound> {
		self.fetches.fetch_add(1, Ordering::SeqCst);
		tokio::time::sleep(Duration::from_millis(5)).await;
		self.secrets
			.get(name)
			.cloned()
			.ok_or_else(|| SecretNotFound(name.to_string()))
	}

	pub fn fetches(&self) -> usize {
		self.fetches.load(Ordering::SeqCst)
	}
}

/// Module exporting `client` under [`VAULT_CLIENT`]
pub fn vault_module(client: Arc<VaultClient>) -> Module {
	Module::new("VaultModule").provider(Provider::value(VAULT_CLIENT, client))
}
