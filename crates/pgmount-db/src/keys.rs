//! Well-known provider keys registered by [`DatabaseModule`](crate::DatabaseModule)

use pgmount_di::DependencyKey;

/// Resolved [`ConnectOptions`](crate::ConnectOptions)
pub const CONNECT_OPTIONS: DependencyKey = DependencyKey::from_static("pgmount:connect_options");

/// Resolved [`BehaviorOptions`](crate::BehaviorOptions)
pub const CONFIG_OPTIONS: DependencyKey = DependencyKey::from_static("pgmount:config_options");

/// Resolved [`DriverOptions`](crate::DriverOptions)
pub const DRIVER_OPTIONS: DependencyKey = DependencyKey::from_static("pgmount:driver_options");

/// The shared connection produced by the registered connector
pub const CONNECTION: DependencyKey = DependencyKey::from_static("pgmount:connection");
