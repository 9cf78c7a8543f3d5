//! Domain layer: identifiers, waiter registry, query types, errors, config.

pub mod config;
pub mod correlation;
pub mod error;
pub mod pending;
pub mod query;

pub use config::{ConfigError, CorrelatorConfig, DEFAULT_QUERY_TIMEOUT};
pub use correlation::RequestIdGenerator;
pub use error::{IqError, RegistryError};
pub use pending::{PendingStats, PendingStatsSnapshot, ResponseWaiter, WaiterRegistry, WaiterSignal};
pub use query::{InfoQuery, IqType};
