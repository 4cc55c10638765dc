//! Turns a [`ConfigDescriptor`] into a provider registration under the
//! domain's well-known key.

use crate::descriptor::{ConfigDescriptor, FactoryDescriptor, OptionsFactory, OptionsFuture};
use crate::error::ProvisionError;
use crate::options::{BehaviorOptions, ConfigDomain, ConnectOptions, DriverOptions};
use pgmount_di::{DependencyKey, Provider};
use std::sync::Arc;

mod sealed {
	pub trait Sealed {}
	impl Sealed for crate::ConnectOptions {}
	impl Sealed for crate::BehaviorOptions {}
	impl Sealed for crate::DriverOptions {}
}

/// Options types that can be resolved from a descriptor
pub trait DomainOptions: sealed::Sealed + Clone + Default + Send + Sync + 'static {
	const DOMAIN: ConfigDomain;

	/// Invokes the capability of `factory` matching this domain.
	fn from_factory(factory: Arc<dyn OptionsFactory>) -> OptionsFuture<Self>;
}

impl DomainOptions for ConnectOptions {
	const DOMAIN: ConfigDomain = ConfigDomain::Connect;

	fn from_factory(factory: Arc<dyn OptionsFactory>) -> OptionsFuture<Self> {
		Box::pin(async move { factory.create_connect_options().await })
	}
}

impl DomainOptions for BehaviorOptions {
	const DOMAIN: ConfigDomain = ConfigDomain::Config;

	fn from_factory(factory: Arc<dyn OptionsFactory>) -> OptionsFuture<Self> {
		Box::pin(async move { factory.create_config_options().await })
	}
}

impl DomainOptions for DriverOptions {
	const DOMAIN: ConfigDomain = ConfigDomain::Driver;

	fn from_factory(factory: Arc<dyn OptionsFactory>) -> OptionsFuture<Self> {
		Box::pin(async move { factory.create_driver_options().await })
	}
}

/// Builds the provider registration for `descriptor`.
///
/// - `Static` becomes a constant provider with no dependencies.
/// - `Factory` becomes a factory provider with the descriptor's dependencies,
///   in order.
/// - `Existing(key)` depends on `key` alone and calls the matching
///   [`OptionsFactory`] method on the resolved instance. An instance that is
///   not an `OptionsFactory`, or that leaves the method unimplemented, fails
///   with [`ProvisionError::MissingProviderCapability`].
///
/// Nothing is invoked here; all work happens when a scope resolves the key.
pub fn resolve_descriptor<T: DomainOptions>(descriptor: ConfigDescriptor<T>) -> Provider {
	let key = T::DOMAIN.key();
	match descriptor {
		ConfigDescriptor::Static(options) => Provider::value(key, options),
		ConfigDescriptor::Factory(FactoryDescriptor { inject, factory }) => {
			Provider::factory(key, inject, move |deps| factory(deps))
		}
		ConfigDescriptor::Existing(target) => existing_provider::<T>(key, target),
	}
}

/// Like [`resolve_descriptor`], with an absent descriptor meaning empty options.
pub fn resolve_optional<T: DomainOptions>(descriptor: Option<ConfigDescriptor<T>>) -> Provider {
	resolve_descriptor(descriptor.unwrap_or_else(|| ConfigDescriptor::Static(T::default())))
}

fn existing_provider<T: DomainOptions>(key: DependencyKey, target: DependencyKey) -> Provider {
	let referenced = target.clone();
	Provider::factory(key, [target], move |deps| {
		let referenced = referenced.clone();
		async move {
			let missing = || ProvisionError::MissingProviderCapability {
				key: referenced.clone(),
				domain: T::DOMAIN,
				method: T::DOMAIN.method(),
			};
			let factory = deps
				.get::<Arc<dyn OptionsFactory>>(0)
				.map_err(|_| missing())?;
			tracing::debug!(
				provider = %referenced,
				domain = %T::DOMAIN,
				"resolving options from existing provider"
			);
			match T::from_factory(Arc::clone(&*factory)).await {
				Err(ProvisionError::CapabilityNotImplemented { .. }) => Err(missing()),
				other => other,
			}
		}
	})
}
