// # Record Store Trait
//
// Defines the interface for reading and updating A records via a DNS
// provider's API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::RecordStore;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* RecordStore implementation */;
//
//     for mapping in store.list_record_addresses().await? {
//         if mapping.address != "203.0.113.7" {
//             store.set_record_address("203.0.113.7", &mapping).await?;
//         }
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// One resolved A record as observed at the provider
///
/// Built fresh from the provider listing on every pass and dropped when
/// the pass ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordAddressMapping {
    /// The record ID (provider-specific), required for updates
    pub id: String,
    /// The record name
    pub name: String,
    /// The address currently published for the record
    pub address: String,
}

impl RecordAddressMapping {
    /// Create a new mapping
    pub fn new(id: impl Into<String>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Trait for DNS provider implementations
///
/// # Responsibilities
///
/// A store owns the list of record names it manages and the credentials
/// to reach its provider. Each method issues a single API request:
///
/// - ✅ Resolve configured names against one listing response
/// - ✅ Return an error on any transport, status or decoding failure
/// - ❌ Retry or back off (owned by the scheduler)
/// - ❌ Decide whether an update is needed (owned by the synchronizer)
/// - ❌ Cache listings across calls
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the published address of every configured record
    ///
    /// Mappings are returned in the order the provider listed them. If any
    /// configured name cannot be resolved to exactly one record the whole
    /// call fails and no mapping is returned.
    async fn list_record_addresses(&self) -> Result<Vec<RecordAddressMapping>, crate::Error>;

    /// Point the record identified by `mapping` at `address`
    async fn set_record_address(
        &self,
        address: &str,
        mapping: &RecordAddressMapping,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
