//! # pgmount dependency injection core
//!
//! A small, explicit injector: providers are registered under opaque
//! [`DependencyKey`]s, grouped into [`Module`]s, and constructed by a
//! [`Scope`].
//!
//! ## Features
//!
//! - **Keyed**: dependencies are looked up by key, never by ambient state
//! - **Async-first**: factories are futures; constant providers never suspend
//! - **Singleton per scope**: each provider is constructed at most once per
//!   scope, even with concurrent consumers
//! - **Validated**: missing dependencies and cycles are rejected when the
//!   scope is built
//!
//! ## Example
//!
//! ```rust
//! use pgmount_di::{DependencyKey, DiError, Module, Provider, Scope};
//!
//! # async fn example() -> pgmount_di::DiResult<()> {
//! let host = DependencyKey::named("host");
//! let url = DependencyKey::named("url");
//!
//! let module = Module::new("app")
//!     .provider(Provider::value(host.clone(), "db".to_string()))
//!     .provider(Provider::factory(url.clone(), [host], |deps| async move {
//!         let host = deps.get::<String>(0)?;
//!         Ok::<_, DiError>(format!("postgres://{}:5432", host))
//!     }));
//!
//! let scope = Scope::build(&module)?;
//! assert_eq!(scope.get::<String>(&url).await?.as_str(), "postgres://db:5432");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod key;
pub mod module;
pub mod provider;
pub mod scope;

pub use error::{BoxError, DiError, DiResult};
pub use graph::{DependencyGraph, GraphNode};
pub use key::DependencyKey;
pub use module::Module;
pub use provider::{Dependencies, Instance, Provider, ProviderFn, ProviderFuture, ProviderKind};
pub use scope::Scope;
