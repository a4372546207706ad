//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressSource`]: Discover the current public address
//! - [`RecordStore`]: Read and update A records via provider APIs
//! - [`MetricsSink`]: Receive per-record observability signals

pub mod address_source;
pub mod metrics_sink;
pub mod record_store;

pub use address_source::AddressSource;
pub use metrics_sink::{MetricsSink, NoopMetricsSink};
pub use record_store::{RecordAddressMapping, RecordStore};
