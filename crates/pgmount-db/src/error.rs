//! Provisioning errors

use crate::options::ConfigDomain;
use pgmount_di::{BoxError, DependencyKey, DiError};

/// Result alias for provisioning operations
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Errors raised while resolving configuration or opening the connection
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
	/// A referenced provider does not expose the capability for a domain
	#[error("Provider {key} cannot supply {domain} options: `{method}` is not available")]
	MissingProviderCapability {
		/// Key of the referenced provider
		key: DependencyKey,
		/// Domain being resolved
		domain: ConfigDomain,
		/// Capability method that was required
		method: &'static str,
	},

	/// Returned by the default [`OptionsFactory`](crate::OptionsFactory) methods
	#[error("`{method}` is not implemented")]
	CapabilityNotImplemented { method: &'static str },

	/// A user factory failed
	#[error("Options factory failed: {0}")]
	Factory(#[source] BoxError),

	/// The injector could not satisfy a dependency
	#[error(transparent)]
	DependencyResolution(DiError),

	/// The wrapped library failed to open the connection
	#[error("Failed to open connection: {source}")]
	ConnectionFailure {
		#[source]
		source: BoxError,
	},

	/// An option value has the wrong shape for the connector
	#[error("Invalid {domain} option `{name}`: {reason}")]
	InvalidOption {
		domain: ConfigDomain,
		name: String,
		reason: String,
	},

	#[cfg(feature = "settings")]
	#[error(transparent)]
	Settings(#[from] crate::settings::SettingsError),
}

impl ProvisionError {
	/// Wraps an error raised by a user options factory.
	pub fn factory(source: impl Into<BoxError>) -> Self {
		Self::Factory(source.into())
	}

	/// Wraps an error raised by the wrapped connection library.
	pub fn connection(source: impl Into<BoxError>) -> Self {
		Self::ConnectionFailure {
			source: source.into(),
		}
	}

	pub fn invalid_option(
		domain: ConfigDomain,
		name: impl Into<String>,
		reason: impl ToString,
	) -> Self {
		Self::InvalidOption {
			domain,
			name: name.into(),
			reason: reason.to_string(),
		}
	}
}

// Provider factories registered by this crate fail with a ProvisionError,
// which the injector carries inside `DiError::Provider`. Unwrap it so callers
// see the variant the factory returned.
impl From<DiError> for ProvisionError {
	fn from(error: DiError) -> Self {
		match error {
			DiError::Provider { key, source } => match source.downcast::<ProvisionError>() {
				Ok(inner) => *inner,
				Err(source) => Self::DependencyResolution(DiError::Provider { key, source }),
			},
			other => Self::DependencyResolution(other),
		}
	}
}
