// # Static Address Source
//
// Returns a fixed, configured address on every call.
//
// ## When to Use
//
// - Hosts with a known address that still want records kept in sync
// - Testing the provider side without depending on a discovery service

use async_trait::async_trait;

use crate::traits::AddressSource;
use crate::Result;

/// Address source returning a configured value
///
/// The value is passed through as-is; it is not validated as an IP literal.
#[derive(Debug, Clone)]
pub struct StaticAddressSource {
    address: String,
}

impl StaticAddressSource {
    /// Create a new static address source
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// The configured address
    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl AddressSource for StaticAddressSource {
    async fn current(&self) -> Result<String> {
        Ok(self.address.clone())
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}
