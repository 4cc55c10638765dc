//! Configuration descriptors
//!
//! A [`ConfigDescriptor`] says how one domain's options are produced: a
//! literal value, a factory over injected dependencies, or a reference to an
//! already-registered [`OptionsFactory`] provider.

use crate::error::{ProvisionError, ProvisionResult};
use crate::options::{BehaviorOptions, ConfigDomain, ConnectOptions, DriverOptions};
use async_trait::async_trait;
use futures::future::BoxFuture;
use pgmount_di::{Dependencies, DependencyKey, Provider};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future returned by a descriptor factory
pub type OptionsFuture<T> = BoxFuture<'static, ProvisionResult<T>>;

type FactoryFn<T> = Arc<dyn Fn(Dependencies) -> OptionsFuture<T> + Send + Sync>;

/// A provider capable of producing options for one or more domains.
///
/// Implementors override the methods for the domains they support. A
/// referenced provider that leaves a method at its default fails resolution
/// of that domain with [`ProvisionError::MissingProviderCapability`].
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use pgmount_db::{ConnectOptions, OptionsFactory, ProvisionResult};
///
/// struct EnvConfig;
///
/// #[async_trait]
/// impl OptionsFactory for EnvConfig {
///     async fn create_connect_options(&self) -> ProvisionResult<ConnectOptions> {
///         Ok(ConnectOptions::new().with("host", "db"))
///     }
/// }
/// ```
#[async_trait]
pub trait OptionsFactory: Send + Sync {
	async fn create_connect_options(&self) -> ProvisionResult<ConnectOptions> {
		Err(ProvisionError::CapabilityNotImplemented {
			method: ConfigDomain::Connect.method(),
		})
	}

	async fn create_config_options(&self) -> ProvisionResult<BehaviorOptions> {
		Err(ProvisionError::CapabilityNotImplemented {
			method: ConfigDomain::Config.method(),
		})
	}

	async fn create_driver_options(&self) -> ProvisionResult<DriverOptions> {
		Err(ProvisionError::CapabilityNotImplemented {
			method: ConfigDomain::Driver.method(),
		})
	}
}

/// Registers `factory` under `key` so descriptors can reference it with
/// [`ConfigDescriptor::existing`].
pub fn options_factory_provider(key: DependencyKey, factory: Arc<dyn OptionsFactory>) -> Provider {
	Provider::value(key, factory)
}

/// Factory half of a [`ConfigDescriptor`]
pub struct FactoryDescriptor<T> {
	pub(crate) inject: Vec<DependencyKey>,
	pub(crate) factory: FactoryFn<T>,
}

impl<T> FactoryDescriptor<T> {
	/// Dependencies passed to the factory, in order
	pub fn inject(&self) -> &[DependencyKey] {
		&self.inject
	}
}

impl<T> Clone for FactoryDescriptor<T> {
	fn clone(&self) -> Self {
		Self {
			inject: self.inject.clone(),
			factory: Arc::clone(&self.factory),
		}
	}
}

/// How the options of one domain are produced
pub enum ConfigDescriptor<T> {
	/// Literal options used as-is
	Static(T),
	/// Options computed by a factory from injected dependencies
	Factory(FactoryDescriptor<T>),
	/// Options obtained from a registered [`OptionsFactory`]
	Existing(DependencyKey),
}

impl<T> ConfigDescriptor<T>
where
	T: Send + Sync + 'static,
{
	pub fn value(options: T) -> Self {
		Self::Static(options)
	}

	/// Asynchronous factory receiving the values of `inject`, in that order.
	///
	/// # Examples
	///
	/// ```
	/// use pgmount_db::{ConfigDescriptor, ConnectOptions};
	/// use pgmount_di::DependencyKey;
	///
	/// let descriptor = ConfigDescriptor::factory(
	///     [DependencyKey::named("db_host")],
	///     |deps| async move {
	///         let host = deps.get::<String>(0)?;
	///         Ok(ConnectOptions::new().with("host", host.as_str()))
	///     },
	/// );
	/// assert_eq!(descriptor.dependencies().len(), 1);
	/// ```
	pub fn factory<I, F, Fut>(inject: I, f: F) -> Self
	where
		I: IntoIterator<Item = DependencyKey>,
		F: Fn(Dependencies) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = ProvisionResult<T>> + Send + 'static,
	{
		Self::Factory(FactoryDescriptor {
			inject: inject.into_iter().collect(),
			factory: Arc::new(move |deps: Dependencies| -> OptionsFuture<T> { Box::pin(f(deps)) }),
		})
	}

	/// Synchronous variant of [`ConfigDescriptor::factory`].
	pub fn factory_fn<I, F>(inject: I, f: F) -> Self
	where
		I: IntoIterator<Item = DependencyKey>,
		F: Fn(Dependencies) -> ProvisionResult<T> + Send + Sync + 'static,
	{
		Self::Factory(FactoryDescriptor {
			inject: inject.into_iter().collect(),
			factory: Arc::new(move |deps: Dependencies| -> OptionsFuture<T> {
				Box::pin(std::future::ready(f(deps)))
			}),
		})
	}

	/// Reference to an [`OptionsFactory`] registered under `key`.
	///
	/// The target must be registered with [`options_factory_provider`], which
	/// stores it as `Arc<dyn OptionsFactory>`. A concrete `Arc<MyFactory>`
	/// registered through `Provider::value` is a different type and fails
	/// resolution with [`ProvisionError::MissingProviderCapability`], even
	/// when `MyFactory` implements [`OptionsFactory`].
	pub fn existing(key: impl Into<DependencyKey>) -> Self {
		Self::Existing(key.into())
	}

	/// Keys the produced provider depends on
	pub fn dependencies(&self) -> &[DependencyKey] {
		match self {
			Self::Static(_) => &[],
			Self::Factory(factory) => &factory.inject,
			Self::Existing(key) => std::slice::from_ref(key),
		}
	}
}

impl<T: Clone> Clone for ConfigDescriptor<T> {
	fn clone(&self) -> Self {
		match self {
			Self::Static(options) => Self::Static(options.clone()),
			Self::Factory(factory) => Self::Factory(factory.clone()),
			Self::Existing(key) => Self::Existing(key.clone()),
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for ConfigDescriptor<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Static(options) => f.debug_tuple("Static").field(options).finish(),
			Self::Factory(factory) => f
				.debug_struct("Factory")
				.field("inject", &factory.inject)
				.finish_non_exhaustive(),
			Self::Existing(key) => f.debug_tuple("Existing").field(key).finish(),
		}
	}
}
