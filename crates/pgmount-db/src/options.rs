//! Option mappings for the three configuration domains
//!
//! The schema of each mapping belongs to the wrapped connection library; this
//! crate only carries them. An omitted mapping is always an empty one.

use crate::error::{ProvisionError, ProvisionResult};
use crate::keys::{CONFIG_OPTIONS, CONNECT_OPTIONS, DRIVER_OPTIONS};
use indexmap::IndexMap;
use pgmount_di::DependencyKey;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Ordered mapping of option name to value
pub type OptionsMap = IndexMap<String, Value>;

/// The configuration domain an option mapping belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigDomain {
	/// Connection parameters (host, credentials, ...)
	Connect,
	/// General behavioral configuration
	Config,
	/// Low-level driver options
	Driver,
}

impl ConfigDomain {
	/// Well-known key of the provider holding this domain's resolved options
	pub fn key(self) -> DependencyKey {
		match self {
			Self::Connect => CONNECT_OPTIONS,
			Self::Config => CONFIG_OPTIONS,
			Self::Driver => DRIVER_OPTIONS,
		}
	}

	/// Name of the capability method that produces this domain's options
	pub fn method(self) -> &'static str {
		match self {
			Self::Connect => "create_connect_options",
			Self::Config => "create_config_options",
			Self::Driver => "create_driver_options",
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Connect => "connect",
			Self::Config => "config",
			Self::Driver => "driver",
		}
	}
}

impl fmt::Display for ConfigDomain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

macro_rules! options_type {
	($(#[$meta:meta])* $name:ident => $domain:expr) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(OptionsMap);

		impl $name {
			/// Domain these options belong to
			pub const DOMAIN: ConfigDomain = $domain;

			pub fn new() -> Self {
				Self::default()
			}

			/// Builder-style insert
			pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
				self.0.insert(name.into(), value.into());
				self
			}

			pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
				self.0.insert(name.into(), value.into())
			}

			pub fn get(&self, name: &str) -> Option<&Value> {
				self.0.get(name)
			}

			/// Deserializes option `name` into `T`.
			///
			/// Returns `Ok(None)` when the option is absent or `null`, and
			/// [`ProvisionError::InvalidOption`] when it has the wrong shape.
			pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> ProvisionResult<Option<T>> {
				match self.0.get(name) {
					None | Some(Value::Null) => Ok(None),
					Some(value) => serde_json::from_value(value.clone())
						.map(Some)
						.map_err(|e| ProvisionError::invalid_option(Self::DOMAIN, name, e)),
				}
			}

			/// First present option among `names`, deserialized into `T`
			pub fn first_as<T: DeserializeOwned>(&self, names: &[&str]) -> ProvisionResult<Option<T>> {
				for name in names {
					if let Some(value) = self.get_as(name)? {
						return Ok(Some(value));
					}
				}
				Ok(None)
			}

			/// String option `name`; any other JSON type is an error
			pub fn get_str(&self, name: &str) -> ProvisionResult<Option<&str>> {
				match self.0.get(name) {
					None | Some(Value::Null) => Ok(None),
					Some(Value::String(s)) => Ok(Some(s)),
					Some(other) => Err(ProvisionError::invalid_option(
						Self::DOMAIN,
						name,
						format!("expected a string, found {}", other),
					)),
				}
			}

			/// Overlays `other` on top of these options; `other` wins on conflicts.
			pub fn merge(&mut self, other: $name) {
				self.0.extend(other.0);
			}

			pub fn is_empty(&self) -> bool {
				self.0.is_empty()
			}

			pub fn len(&self) -> usize {
				self.0.len()
			}

			pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
				self.0.iter()
			}

			pub fn as_map(&self) -> &OptionsMap {
				&self.0
			}

			pub fn into_inner(self) -> OptionsMap {
				self.0
			}
		}

		impl From<OptionsMap> for $name {
			fn from(map: OptionsMap) -> Self {
				Self(map)
			}
		}

		impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for $name {
			fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
				Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
			}
		}
	};
}

options_type!(
	/// Connection parameters handed to the wrapped library
	///
	/// # Examples
	///
	/// ```
	/// use pgmount_db::ConnectOptions;
	///
	/// let options = ConnectOptions::new().with("host", "db").with("port", 5432);
	///
	/// assert_eq!(options.get_str("host").unwrap(), Some("db"));
	/// assert_eq!(options.get_as::<u16>("port").unwrap(), Some(5432));
	/// assert!(options.get_str("port").is_err());
	/// ```
	ConnectOptions => ConfigDomain::Connect
);

options_type!(
	/// General behavioral configuration of the produced connection
	BehaviorOptions => ConfigDomain::Config
);

options_type!(
	/// Low-level driver options (pool sizing, timeouts, ...)
	DriverOptions => ConfigDomain::Driver
);
