//! Dependency resolution errors

use crate::DependencyKey;

/// Boxed error produced by a provider factory
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building a scope or resolving a dependency
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DiError {
	/// A provider declares a dependency that nothing in the scope provides
	#[error("Dependency not found: {key} (required by {required_by})")]
	DependencyNotFound {
		/// Missing dependency
		key: DependencyKey,
		/// Provider that declared it
		required_by: DependencyKey,
	},

	/// A key was requested from a scope that has no provider for it
	#[error("No provider registered for {0}")]
	NotRegistered(DependencyKey),

	/// Providers form a dependency cycle
	#[error(
		"Circular dependency detected\n  Path: {path}\nThis forms a cycle that cannot be resolved."
	)]
	CircularDependency {
		/// Circular path (format: A -> B -> C -> A)
		path: String,
	},

	/// A resolved value did not have the requested type
	#[error("Type mismatch for {key}: expected {expected}")]
	TypeMismatch {
		/// Key whose value was downcast
		key: DependencyKey,
		/// Requested type name
		expected: &'static str,
	},

	/// A provider factory failed
	#[error("Provider for {key} failed: {source}")]
	Provider {
		/// Key of the failing provider
		key: DependencyKey,
		/// Error returned by the factory
		#[source]
		source: BoxError,
	},

	#[error("Internal error: {message}")]
	Internal { message: String },
}

impl DiError {
	/// Wraps a factory error for `key`.
	pub fn provider(key: DependencyKey, source: impl Into<BoxError>) -> Self {
		Self::Provider {
			key,
			source: source.into(),
		}
	}
}

/// Result alias used throughout the DI core
pub type DiResult<T> = Result<T, DiError>;
