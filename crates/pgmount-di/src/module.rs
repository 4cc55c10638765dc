//! Registration units

use crate::{DependencyKey, Provider};
use std::borrow::Cow;

/// A named group of providers plus the modules it imports.
///
/// A scope built from a module sees the providers of every imported module
/// (recursively) as well as its own.
///
/// # Examples
///
/// ```
/// use pgmount_di::{DependencyKey, Module, Provider};
///
/// let vault = Module::new("vault")
///     .provider(Provider::value(DependencyKey::named("VaultClient"), "token".to_string()));
///
/// let app = Module::new("app").import(vault);
/// assert_eq!(app.imports().len(), 1);
/// assert!(app.providers().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Module {
	name: Cow<'static, str>,
	imports: Vec<Module>,
	providers: Vec<Provider>,
}

impl Module {
	pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
		Self {
			name: name.into(),
			imports: Vec::new(),
			providers: Vec::new(),
		}
	}

	/// Adds a provider to this module.
	pub fn provider(mut self, provider: Provider) -> Self {
		self.providers.push(provider);
		self
	}

	/// Adds several providers to this module.
	pub fn with_providers(mut self, providers: impl IntoIterator<Item = Provider>) -> Self {
		self.providers.extend(providers);
		self
	}

	/// Imports another module so its providers are visible to this one.
	pub fn import(mut self, module: Module) -> Self {
		self.imports.push(module);
		self
	}

	/// Imports several modules.
	pub fn with_imports(mut self, modules: impl IntoIterator<Item = Module>) -> Self {
		self.imports.extend(modules);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn imports(&self) -> &[Module] {
		&self.imports
	}

	/// Providers registered directly on this module, excluding imports
	pub fn providers(&self) -> &[Provider] {
		&self.providers
	}

	/// Keys registered directly on this module
	pub fn keys(&self) -> impl Iterator<Item = &DependencyKey> {
		self.providers.iter().map(Provider::key)
	}

	/// Flattens imports depth-first, then this module's own providers.
	///
	/// Later entries win when a key is registered more than once.
	pub(crate) fn flatten(&self) -> Vec<(&str, &Provider)> {
		let mut out = Vec::new();
		self.flatten_into(&mut out);
		out
	}

	fn flatten_into<'a>(&'a self, out: &mut Vec<(&'a str, &'a Provider)>) {
		for import in &self.imports {
			import.flatten_into(out);
		}
		out.extend(self.providers.iter().map(|p| (self.name.as_ref(), p)));
	}
}
