//! Test logging utilities

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing output for tests (call once)
///
/// Honors `RUST_LOG`; output is captured by the test harness.
pub fn init_test_logging() {
	INIT.call_once(|| {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_test_writer()
			.try_init();
	});
}
