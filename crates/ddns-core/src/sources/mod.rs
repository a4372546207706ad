//! Built-in address sources
//!
//! Sources that need no I/O live here. Network-backed sources are separate
//! crates (`ddns-ip-http`).

pub mod static_address;

pub use static_address::StaticAddressSource;
