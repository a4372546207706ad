// # Address Source Trait
//
// Defines the interface for discovering the host's current public address.
//
// ## Implementations
//
// - Static: `ddns_core::sources::StaticAddressSource`
// - URL-based: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::AddressSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* AddressSource implementation */;
//
//     let address = source.current().await?;
//     println!("Current address: {}", address);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for address discovery implementations
///
/// The returned address is an opaque string. Sources that extract the
/// address from a larger payload are expected to validate it as an IP
/// literal; sources returning a configured value or a raw response body
/// pass it through untouched.
///
/// # Responsibilities
///
/// A source performs at most one lookup per call. It never retries,
/// never sleeps and never caches between calls: the scheduler owns
/// timing, and every pass must observe a fresh address.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Get the current address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The discovered address
    /// - `Err(Error)`: If the address could not be determined
    async fn current(&self) -> Result<String, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
