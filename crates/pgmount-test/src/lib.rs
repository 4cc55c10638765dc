//! Test doubles and fixtures for pgmount
//!
//! - [`RecordingConnector`]: a [`Connector`](pgmount_db::Connector) that
//!   records every call instead of talking to a database
//! - [`StubOptionsFactory`]: an [`OptionsFactory`](pgmount_db::OptionsFactory)
//!   with a configurable set of capabilities
//! - [`VaultClient`]: an asynchronous secret store used as a factory dependency

pub mod connector;
pub mod factories;
pub mod fixtures;
pub mod logging;

pub use connector::{ConnectCall, RecordedConnection, RecordingConnector};
pub use factories::{SecretNotFound, StubOptionsFactory, VAULT_CLIENT, VaultClient, vault_module};
pub use fixtures::*;
pub use logging::init_test_logging;
