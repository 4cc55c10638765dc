//! rstest fixtures

use crate::{RecordingConnector, VaultClient};
use pgmount_db::ConnectOptions;
use rstest::fixture;
use std::sync::Arc;

/// Fixture providing a connector that records its calls
#[fixture]
pub fn recording_connector() -> RecordingConnector {
	RecordingConnector::new()
}

/// Fixture providing a vault holding `db_password`
#[fixture]
pub fn vault_client() -> Arc<VaultClient> {
	Arc::new(VaultClient::new().with_secret("db_password", "s3cret"))
}

/// Fixture providing `{host: "db", port: 5432}`
#[fixture]
pub fn connect_options() -> ConnectOptions {
	ConnectOptions::new().with("host", "db").with("port", 5432)
}
