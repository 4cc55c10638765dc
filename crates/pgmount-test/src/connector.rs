//! A connector that records calls instead of connecting

use async_trait::async_trait;
use pgmount_db::{BehaviorOptions, ConnectOptions, Connector, DriverOptions, ProvisionError, ProvisionResult};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Options passed to one `connect` call
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectCall {
	pub connect: ConnectOptions,
	pub config: BehaviorOptions,
	pub driver: DriverOptions,
}

/// Connection produced by [`RecordingConnector`]
#[derive(Debug)]
pub struct RecordedConnection {
	/// 1-based number of the `connect` call that produced this connection
	pub serial: usize,
	pub call: ConnectCall,
}

/// Records every `connect` call. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingConnector {
	calls: Arc<Mutex<Vec<ConnectCall>>>,
	failure: Option<String>,
	delay: Option<Duration>,
}

impl RecordingConnector {
	pub fn new() -> Self {
		Self::default()
	}

	/// Connector whose every call fails with `message`.
	pub fn failing(message: impl Into<String>) -> Self {
		Self {
			failure: Some(message.into()),
			..Self::default()
		}
	}

	/// Sleeps for `delay` before completing each call.
	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);
		self
	}

	pub fn calls(&self) -> Vec<ConnectCall> {
		self.calls
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	pub fn connect_count(&self) -> usize {
		self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
	}
}

#[async_trait]
impl Connector for RecordingConnector {
	type Connection = RecordedConnection;

	async fn connect(
		&self,
		connect: &ConnectOptions,
		config: &BehaviorOptions,
		driver: &DriverOptions,
	) -> ProvisionResult<RecordedConnection> {
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}

		let call = ConnectCall {
			connect: connect.clone(),
			config: config.clone(),
			driver: driver.clone(),
		};
		let serial = {
			let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
			calls.push(call.clone());
			calls.len()
		};

		match &self.failure {
			Some(message) => Err(ProvisionError::connection(std::io::Error::other(
				message.clone(),
			))),
			None => Ok(RecordedConnection { serial, call }),
		}
	}

	fn name(&self) -> &'static str {
		"recording"
	}
}
