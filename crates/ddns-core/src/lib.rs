// # ddns-core
//
// Core library for the DDNS record synchronizer.
//
// ## Architecture Overview
//
// This library keeps a set of DNS A records pointed at the host's public address:
// - **AddressSource**: Trait for discovering the current public address
// - **RecordStore**: Trait for listing and updating A records via provider APIs
// - **MetricsSink**: Trait receiving per-record observability signals
// - **Synchronizer**: One pass of discover → list → update-on-mismatch
// - **Scheduler**: Runs the synchronizer forever at fixed success/failure intervals
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider and source implementations
// 2. **Explicit Wiring**: Configuration and sinks are passed into constructors, never global
// 3. **Fail-Fast Passes**: The first error ends a pass; the scheduler retries the whole pass
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Idempotency**: A record is only written when its published address differs

pub mod config;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod sources;
pub mod traits;

// Re-export core types for convenience
pub use config::{AddressSourceConfig, DdnsConfig, MetricsServerConfig, ProviderConfig};
pub use engine::{RecordOutcome, SyncReport, Synchronizer};
pub use error::{Error, Result};
pub use scheduler::{Retryable, Scheduler, SchedulerState, Sleeper, TokioSleeper};
pub use sources::StaticAddressSource;
pub use traits::{AddressSource, MetricsSink, NoopMetricsSink, RecordAddressMapping, RecordStore};
