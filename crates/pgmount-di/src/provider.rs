//! Dependency providers

use crate::{BoxError, DependencyKey, DiError, DiResult};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// A constructed dependency value as stored in a scope
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Type alias for the complex provider future type
type ProviderFutureInner = Pin<Box<dyn Future<Output = DiResult<Instance>> + Send>>;

/// Wrapper type for the future returned by providers
///
/// This newtype wraps a pinned boxed future that resolves to a dependency value.
pub struct ProviderFuture(ProviderFutureInner);

impl ProviderFuture {
	/// Create a new ProviderFuture from a pinned boxed future
	pub fn new(future: ProviderFutureInner) -> Self {
		Self(future)
	}

	/// Create a future that is already complete.
	///
	/// Used for constant providers so that resolving them never suspends.
	pub fn ready(result: DiResult<Instance>) -> Self {
		Self(Box::pin(std::future::ready(result)))
	}

	/// Convert into the inner pinned future
	pub fn into_inner(self) -> ProviderFutureInner {
		self.0
	}
}

impl Future for ProviderFuture {
	type Output = DiResult<Instance>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		self.0.as_mut().poll(cx)
	}
}

impl From<ProviderFutureInner> for ProviderFuture {
	fn from(future: ProviderFutureInner) -> Self {
		Self::new(future)
	}
}

/// Wrapper type for provider functions
///
/// The function receives the provider's resolved dependencies, in the order
/// they were declared, and returns the future producing the value.
#[derive(Clone)]
pub struct ProviderFn(Arc<dyn Fn(Dependencies) -> ProviderFuture + Send + Sync>);

impl ProviderFn {
	/// Create a new ProviderFn from an Arc-wrapped function
	pub fn new(func: Arc<dyn Fn(Dependencies) -> ProviderFuture + Send + Sync>) -> Self {
		Self(func)
	}

	/// Invoke the function with resolved dependencies
	pub fn call(&self, deps: Dependencies) -> ProviderFuture {
		(self.0)(deps)
	}
}

/// Resolved dependency values, positionally matching a provider's `inject` list
#[derive(Clone, Default)]
pub struct Dependencies {
	keys: Vec<DependencyKey>,
	values: Vec<Instance>,
}

impl Dependencies {
	pub(crate) fn new(keys: Vec<DependencyKey>, values: Vec<Instance>) -> Self {
		debug_assert_eq!(keys.len(), values.len());
		Self { keys, values }
	}

	/// Returns the dependency at `index`, downcast to `T`.
	///
	/// # Examples
	///
	/// ```
	/// use pgmount_di::{DependencyKey, Module, Provider, Scope};
	///
	/// # async fn example() -> pgmount_di::DiResult<()> {
	/// let module = Module::new("app")
	///     .provider(Provider::value(DependencyKey::named("port"), 5432u16))
	///     .provider(Provider::from_fn(
	///         DependencyKey::named("url"),
	///         [DependencyKey::named("port")],
	///         |deps| Ok::<_, pgmount_di::DiError>(format!("db:{}", deps.get::<u16>(0)?)),
	///     ));
	///
	/// let scope = Scope::build(&module)?;
	/// let url = scope.get::<String>(&DependencyKey::named("url")).await?;
	/// assert_eq!(url.as_str(), "db:5432");
	/// # Ok(())
	/// # }
	/// ```
	pub fn get<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Arc<T>> {
		let value = self.values.get(index).ok_or_else(|| DiError::Internal {
			message: format!(
				"dependency index {} out of range ({} declared)",
				index,
				self.values.len()
			),
		})?;
		value
			.clone()
			.downcast::<T>()
			.map_err(|_| DiError::TypeMismatch {
				key: self.keys[index].clone(),
				expected: std::any::type_name::<T>(),
			})
	}

	/// Returns the untyped instance at `index`.
	pub fn instance(&self, index: usize) -> Option<&Instance> {
		self.values.get(index)
	}

	/// Keys in declaration order
	pub fn keys(&self) -> &[DependencyKey] {
		&self.keys
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

/// How a provider produces its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
	/// Constant value known at registration time
	Value,
	/// Value computed from dependencies at resolution time
	Factory,
}

/// A single provider registration: a key, its declared dependencies, and a factory
#[derive(Clone)]
pub struct Provider {
	key: DependencyKey,
	inject: Vec<DependencyKey>,
	factory: ProviderFn,
	kind: ProviderKind,
}

impl Provider {
	/// Registers a constant value.
	///
	/// Every scope built from the registration receives its own clone of
	/// `value`, so scopes never share resolved state.
	pub fn value<T>(key: DependencyKey, value: T) -> Self
	where
		T: Any + Send + Sync + Clone,
	{
		let factory = ProviderFn::new(Arc::new(move |_deps: Dependencies| {
			ProviderFuture::ready(Ok(Arc::new(value.clone()) as Instance))
		}));
		Self {
			key,
			inject: Vec::new(),
			factory,
			kind: ProviderKind::Value,
		}
	}

	/// Registers an asynchronous factory.
	///
	/// `f` is called with the values of `inject`, resolved in that order.
	pub fn factory<I, F, Fut, T, E>(key: DependencyKey, inject: I, f: F) -> Self
	where
		I: IntoIterator<Item = DependencyKey>,
		F: Fn(Dependencies) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<T, E>> + Send + 'static,
		T: Any + Send + Sync,
		E: Into<BoxError>,
	{
		let provider_key = key.clone();
		let factory = ProviderFn::new(Arc::new(move |deps: Dependencies| {
			let fut = f(deps);
			let key = provider_key.clone();
			ProviderFuture::new(Box::pin(async move {
				match fut.await {
					Ok(value) => Ok(Arc::new(value) as Instance),
					Err(e) => Err(into_di_error(key, e.into())),
				}
			}))
		}));
		Self {
			key,
			inject: inject.into_iter().collect(),
			factory,
			kind: ProviderKind::Factory,
		}
	}

	/// Registers a synchronous factory.
	pub fn from_fn<I, F, T, E>(key: DependencyKey, inject: I, f: F) -> Self
	where
		I: IntoIterator<Item = DependencyKey>,
		F: Fn(Dependencies) -> Result<T, E> + Send + Sync + 'static,
		T: Any + Send + Sync,
		E: Into<BoxError>,
	{
		let provider_key = key.clone();
		let factory = ProviderFn::new(Arc::new(move |deps: Dependencies| {
			let result = f(deps)
				.map(|value| Arc::new(value) as Instance)
				.map_err(|e| into_di_error(provider_key.clone(), e.into()));
			ProviderFuture::ready(result)
		}));
		Self {
			key,
			inject: inject.into_iter().collect(),
			factory,
			kind: ProviderKind::Factory,
		}
	}

	pub fn key(&self) -> &DependencyKey {
		&self.key
	}

	/// Declared dependencies, in the order the factory receives them
	pub fn inject(&self) -> &[DependencyKey] {
		&self.inject
	}

	pub fn kind(&self) -> ProviderKind {
		self.kind
	}

	/// Runs the factory with already-resolved dependencies.
	pub fn provide(&self, deps: Dependencies) -> ProviderFuture {
		self.factory.call(deps)
	}
}

impl fmt::Debug for Provider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Provider")
			.field("key", &self.key)
			.field("inject", &self.inject)
			.field("kind", &self.kind)
			.finish()
	}
}

// A DiError coming out of a factory (e.g. a failed `Dependencies::get`) is
// passed through as-is instead of being nested under `Provider`.
fn into_di_error(key: DependencyKey, error: BoxError) -> DiError {
	match error.downcast::<DiError>() {
		Ok(di) => *di,
		Err(other) => DiError::Provider { key, source: other },
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn deps_of(values: Vec<(&'static str, Instance)>) -> Dependencies {
		let (keys, values) = values
			.into_iter()
			.map(|(k, v)| (DependencyKey::from_static(k), v))
			.unzip();
		Dependencies::new(keys, values)
	}

	#[rstest]
	#[tokio::test]
	async fn test_value_provider_ignores_dependencies() {
		// Arrange
		let provider = Provider::value(DependencyKey::named("answer"), 42u32);

		// Act
		let value = provider
			.provide(deps_of(vec![("unused", Arc::new("x") as Instance)]))
			.await
			.unwrap();

		// Assert
		assert_eq!(*value.downcast::<u32>().unwrap(), 42);
		assert_eq!(provider.kind(), ProviderKind::Value);
		assert!(provider.inject().is_empty());
	}

	#[rstest]
	fn test_dependencies_get_reports_type_mismatch() {
		// Arrange
		let deps = deps_of(vec![("port", Arc::new(5432u16) as Instance)]);

		// Act
		let result = deps.get::<String>(0);

		// Assert
		match result {
			Err(DiError::TypeMismatch { key, expected }) => {
				assert_eq!(key, DependencyKey::named("port"));
				assert!(expected.contains("String"));
			}
			other => panic!("Expected TypeMismatch, got {:?}", other.map(|_| ())),
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_factory_error_is_wrapped_with_key() {
		// Arrange
		let provider = Provider::factory(DependencyKey::named("broken"), [], |_deps| async {
			Err::<u8, _>(std::io::Error::other("boom"))
		});

		// Act
		let result = provider.provide(Dependencies::default()).await;

		// Assert
		match result {
			Err(DiError::Provider { key, source }) => {
				assert_eq!(key, DependencyKey::named("broken"));
				assert_eq!(source.to_string(), "boom");
			}
			other => panic!("Expected Provider error, got {:?}", other.map(|_| ())),
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_factory_di_error_passes_through() {
		// Arrange
		let provider = Provider::from_fn(DependencyKey::named("typed"), [], |deps| {
			deps.get::<u8>(3).map(|v| *v)
		});

		// Act
		let result = provider.provide(Dependencies::default()).await;

		// Assert
		assert!(matches!(result, Err(DiError::Internal { .. })));
	}
}
