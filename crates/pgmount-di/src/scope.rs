//! Registration scopes
//!
//! A [`Scope`] is the runtime counterpart of a [`Module`]: it owns one slot
//! per effective provider and constructs each value at most once, on first
//! need. Two scopes built from the same module share nothing.

use crate::{
	DependencyGraph, DependencyKey, DiError, DiResult, Module, Provider,
	provider::{Dependencies, Instance},
};
use futures::future::{BoxFuture, FutureExt, join_all};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

struct Slot {
	provider: Provider,
	module: String,
	cell: OnceCell<Instance>,
}

/// An independent set of constructed providers.
///
/// # Examples
///
/// ```
/// use pgmount_di::{DependencyKey, Module, Provider, Scope};
///
/// # async fn example() -> pgmount_di::DiResult<()> {
/// let module = Module::new("app")
///     .provider(Provider::value(DependencyKey::named("greeting"), "hello".to_string()));
///
/// let scope = Scope::build(&module)?;
/// let first = scope.get::<String>(&DependencyKey::named("greeting")).await?;
/// let second = scope.get::<String>(&DependencyKey::named("greeting")).await?;
///
/// // Same instance on every lookup within a scope
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// # Ok(())
/// # }
/// ```
pub struct Scope {
	id: Uuid,
	name: String,
	slots: HashMap<DependencyKey, Slot>,
	order: Vec<DependencyKey>,
	graph: DependencyGraph,
}

impl Scope {
	/// Builds a scope from `module` and its imports.
	///
	/// Imports are registered before the module's own providers; when a key
	/// is registered more than once the later registration wins. The
	/// dependency graph is validated before the scope is returned, nothing
	/// is constructed yet.
	pub fn build(module: &Module) -> DiResult<Self> {
		let graph = DependencyGraph::from_module(module);
		graph.validate()?;

		let mut slots: HashMap<DependencyKey, Slot> = HashMap::new();
		let mut order = Vec::new();
		for (module_name, provider) in module.flatten() {
			let key = provider.key().clone();
			let slot = Slot {
				provider: provider.clone(),
				module: module_name.to_string(),
				cell: OnceCell::new(),
			};
			match slots.insert(key.clone(), slot) {
				Some(previous) => {
					tracing::debug!(
						key = %key,
						previous = %previous.module,
						module = %module_name,
						"provider registration overridden"
					);
				}
				None => order.push(key),
			}
		}

		let id = Uuid::new_v4();
		tracing::debug!(
			scope = %id,
			module = module.name(),
			providers = order.len(),
			"scope built"
		);

		Ok(Self {
			id,
			name: module.name().to_string(),
			slots,
			order,
			graph,
		})
	}

	/// Resolves `key`, constructing it (and its dependencies) if needed.
	///
	/// Dependencies are resolved concurrently and handed to the factory in
	/// declaration order. Every dependency runs to completion even when a
	/// sibling fails; the first error in declaration order is returned. A
	/// successful result is kept for the lifetime of the scope; a failed
	/// construction is not kept, and the error is returned unchanged.
	pub fn resolve<'a>(&'a self, key: &'a DependencyKey) -> BoxFuture<'a, DiResult<Instance>> {
		async move {
			let slot = self
				.slots
				.get(key)
				.ok_or_else(|| DiError::NotRegistered(key.clone()))?;
			let instance = slot.cell.get_or_try_init(|| self.construct(slot)).await?;
			Ok(Arc::clone(instance))
		}
		.boxed()
	}

	async fn construct(&self, slot: &Slot) -> DiResult<Instance> {
		let inject = slot.provider.inject();
		let values = join_all(inject.iter().map(|dep| self.resolve(dep)))
			.await
			.into_iter()
			.collect::<DiResult<Vec<_>>>()?;

		tracing::debug!(
			scope = %self.id,
			key = %slot.provider.key(),
			dependencies = inject.len(),
			"constructing provider"
		);
		slot.provider
			.provide(Dependencies::new(inject.to_vec(), values))
			.await
	}

	/// Resolves `key` and downcasts the value to `T`.
	pub async fn get<T: Any + Send + Sync>(&self, key: &DependencyKey) -> DiResult<Arc<T>> {
		self.resolve(key)
			.await?
			.downcast::<T>()
			.map_err(|_| DiError::TypeMismatch {
				key: key.clone(),
				expected: std::any::type_name::<T>(),
			})
	}

	/// Constructs every provider, in registration order.
	///
	/// Stops at the first failure.
	pub async fn instantiate_all(&self) -> DiResult<()> {
		for key in &self.order {
			self.resolve(key).await?;
		}
		tracing::debug!(scope = %self.id, module = %self.name, "all providers constructed");
		Ok(())
	}

	/// Whether the value for `key` has already been constructed
	pub fn is_constructed(&self, key: &DependencyKey) -> bool {
		self.slots
			.get(key)
			.is_some_and(|slot| slot.cell.initialized())
	}

	pub fn contains(&self, key: &DependencyKey) -> bool {
		self.slots.contains_key(key)
	}

	/// Registered keys in registration order
	pub fn keys(&self) -> &[DependencyKey] {
		&self.order
	}

	pub fn id(&self) -> Uuid {
		self.id
	}

	/// Name of the root module the scope was built from
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn graph(&self) -> &DependencyGraph {
		&self.graph
	}
}

impl fmt::Debug for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Scope")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("keys", &self.order)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn key(name: &'static str) -> DependencyKey {
		DependencyKey::from_static(name)
	}

	#[rstest]
	#[tokio::test]
	async fn test_later_registration_overrides_import() {
		// Arrange
		let base = Module::new("base").provider(Provider::value(key("port"), 5432u16));
		let app = Module::new("app")
			.import(base)
			.provider(Provider::value(key("port"), 6543u16));

		// Act
		let scope = Scope::build(&app).unwrap();

		// Assert
		assert_eq!(*scope.get::<u16>(&key("port")).await.unwrap(), 6543);
		assert_eq!(scope.keys(), &[key("port")]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_failed_construction_is_not_memoized() {
		// Arrange
		let attempts = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&attempts);
		let module = Module::new("app").provider(Provider::from_fn(key("flaky"), [], move |_| {
			if counter.fetch_add(1, Ordering::SeqCst) == 0 {
				Err(DiError::Internal {
					message: "first attempt fails".to_string(),
				})
			} else {
				Ok(7u8)
			}
		}));
		let scope = Scope::build(&module).unwrap();

		// Act
		let first = scope.get::<u8>(&key("flaky")).await;
		let second = scope.get::<u8>(&key("flaky")).await;

		// Assert
		assert!(first.is_err());
		assert!(!scope.graph().nodes().is_empty());
		assert_eq!(*second.unwrap(), 7);
		assert_eq!(attempts.load(Ordering::SeqCst), 2);
		assert!(scope.is_constructed(&key("flaky")));
	}

	#[rstest]
	#[tokio::test]
	async fn test_unknown_key_is_not_registered() {
		// Arrange
		let scope = Scope::build(&Module::new("empty")).unwrap();

		// Act
		let result = scope.resolve(&key("missing")).await;

		// Assert
		assert!(matches!(result, Err(DiError::NotRegistered(k)) if k == key("missing")));
	}
}
