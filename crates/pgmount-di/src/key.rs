//! Dependency keys

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;

/// Opaque identifier a scope uses to look up a provider.
///
/// Keys are compared for equality and hashed, never interpreted. A key is
/// either a name (the usual choice for well-known providers) or derived
/// from a Rust type.
///
/// # Examples
///
/// ```
/// use pgmount_di::DependencyKey;
///
/// struct VaultClient;
///
/// let by_name = DependencyKey::named("VaultClient");
/// let by_type = DependencyKey::of::<VaultClient>();
///
/// assert_ne!(by_name, by_type);
/// assert_eq!(by_name, DependencyKey::named(String::from("VaultClient")));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum DependencyKey {
	/// Key identified by a name
	Named(Cow<'static, str>),
	/// Key identified by a Rust type
	Type {
		/// Type identity used for equality
		id: TypeId,
		/// Type name used for display only
		name: &'static str,
	},
}

impl DependencyKey {
	/// Creates a named key.
	pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
		Self::Named(name.into())
	}

	/// Creates a named key usable in `const` position.
	///
	/// # Examples
	///
	/// ```
	/// use pgmount_di::DependencyKey;
	///
	/// const CACHE: DependencyKey = DependencyKey::from_static("cache");
	/// assert_eq!(CACHE.to_string(), "cache");
	/// ```
	pub const fn from_static(name: &'static str) -> Self {
		Self::Named(Cow::Borrowed(name))
	}

	/// Creates a key derived from type `T`.
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self::Type {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	/// Human readable name of the key.
	pub fn name(&self) -> &str {
		match self {
			Self::Named(name) => name,
			Self::Type { name, .. } => name,
		}
	}
}

impl fmt::Display for DependencyKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl fmt::Debug for DependencyKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Named(name) => write!(f, "DependencyKey({:?})", name),
			Self::Type { name, .. } => write!(f, "DependencyKey(<{}>)", name),
		}
	}
}

impl From<&'static str> for DependencyKey {
	fn from(name: &'static str) -> Self {
		Self::from_static(name)
	}
}

impl From<String> for DependencyKey {
	fn from(name: String) -> Self {
		Self::Named(Cow::Owned(name))
	}
}
