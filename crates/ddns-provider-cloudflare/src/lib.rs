// # Cloudflare DNS Provider
//
// This crate provides a Cloudflare record store for the DDNS system.
//
// ## Behavior
//
// - ✅ One HTTP request per trait call (one GET to list, one PUT to update)
// - ✅ Full error propagation to the synchronizer (scheduler handles retries)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Configured names resolved locally against a single zone listing
// - ✅ Unresolvable or ambiguous names fail the whole listing call
// - ❌ NO retry logic (owned by the scheduler)
// - ❌ NO caching (every pass re-lists the zone)
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Store construction fails fast if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::ProviderConfig;
use ddns_core::traits::{RecordAddressMapping, RecordStore};
use ddns_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Record type managed by this store
const RECORD_TYPE_A: &str = "A";

/// Response of the record listing endpoint
///
/// Only the fields the synchronizer needs are decoded.
#[derive(Debug, Deserialize)]
struct ListRecordsResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    #[serde(default)]
    result: Option<Vec<ListedRecord>>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

/// A single entry of the zone listing
#[derive(Debug, Clone, Deserialize)]
struct ListedRecord {
    id: String,
    name: String,
    content: String,
    #[serde(rename = "type", default)]
    record_type: Option<String>,
}

impl ListedRecord {
    /// Entries without a type are treated as A records
    fn is_a_record(&self) -> bool {
        self.record_type.as_deref().is_none_or(|t| t == RECORD_TYPE_A)
    }
}

/// Body of the record update request
#[derive(Debug, Serialize)]
struct UpdateRecordPayload<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    record_type: &'static str,
    content: &'a str,
}

fn default_success() -> bool {
    true
}

/// Cloudflare record store
///
/// Holds the zone, the names to manage and the API token for the lifetime
/// of the process.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareStore {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone holding the records
    zone_id: String,

    /// A records to manage
    records: Vec<String>,

    /// API base URL (overridable for testing)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareStore")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("records", &self.records)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareStore {
    /// Create a new Cloudflare record store
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with DNS read and edit permissions
    /// - `zone_id`: Zone holding the records
    /// - `records`: Names of the A records to manage
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the token is empty or the HTTP
    /// client cannot be built.
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        records: Vec<String>,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            zone_id: zone_id.into(),
            records,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Create a store from provider configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare {
                api_token,
                zone_id,
                records,
            } => Self::new(api_token.clone(), zone_id.clone(), records.clone()),
        }
    }

    /// Point the store at a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The record names this store manages
    pub fn records(&self) -> &[String] {
        &self.records
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, self.zone_id)
    }

    fn record_url(&self, record_id: &str) -> String {
        format!("{}/{}", self.records_url(), record_id)
    }
}

/// Turn a non-2xx response into a protocol error
async fn ensure_success(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    let hint = match status.as_u16() {
        401 | 403 => " (check the API token and its DNS permissions)",
        429 => " (rate limited)",
        _ => "",
    };

    Err(Error::protocol(format!(
        "{}: response status code was {}{} - {}",
        context, status, hint, error_text
    )))
}

/// Resolve every configured name against the zone listing
///
/// Mappings are returned in listing order. Fails if any name has no A
/// record, or more than one.
fn resolve_records(listing: &[ListedRecord], names: &[String]) -> Result<Vec<RecordAddressMapping>> {
    for name in names {
        let matches = listing
            .iter()
            .filter(|r| r.is_a_record() && &r.name == name)
            .count();

        match matches {
            0 => {
                return Err(Error::resolution(format!(
                    "no record with name {} was found",
                    name
                )));
            }
            1 => {}
            n => {
                return Err(Error::resolution(format!(
                    "found {} A records with name {}, expected exactly one",
                    n, name
                )));
            }
        }
    }

    Ok(listing
        .iter()
        .filter(|r| r.is_a_record() && names.contains(&r.name))
        .map(|r| RecordAddressMapping::new(&r.id, &r.name, &r.content))
        .collect())
}

#[async_trait]
impl RecordStore for CloudflareStore {
    /// List the zone once and resolve the configured names locally
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records
    /// Authorization: Bearer <token>
    /// ```
    async fn list_record_addresses(&self) -> Result<Vec<RecordAddressMapping>> {
        let url = self.records_url();
        tracing::debug!("Listing DNS records of zone {}", self.zone_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| Error::transport(format!("Record listing request failed: {}", e)))?;

        let response = ensure_success(response, "Record listing failed").await?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read listing response: {}", e)))?;

        let listing: ListRecordsResponse = serde_json::from_str(&body)?;

        if !listing.success {
            let messages: Vec<&str> = listing.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(Error::protocol(format!(
                "Record listing was not successful: {}",
                messages.join("; ")
            )));
        }

        let records = listing.result.unwrap_or_default();
        tracing::debug!("Zone {} lists {} record(s)", self.zone_id, records.len());

        resolve_records(&records, &self.records)
    }

    /// Update one record by its provider ID
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "name": "a.example.com",
    ///   "type": "A",
    ///   "content": "1.2.3.4"
    /// }
    /// ```
    async fn set_record_address(&self, address: &str, mapping: &RecordAddressMapping) -> Result<()> {
        tracing::info!("Setting A record {} to {}", mapping.name, address);

        let url = self.record_url(&mapping.id);
        let payload = UpdateRecordPayload {
            name: &mapping.name,
            record_type: RECORD_TYPE_A,
            content: address,
        };

        tracing::debug!("Executing PUT against {} with content {}", url, payload.content);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::transport(format!("Record update request failed: {}", e)))?;

        ensure_success(response, &format!("Update of {} failed", mapping.name)).await?;

        tracing::info!("DNS record updated successfully: {} -> {}", mapping.name, address);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
