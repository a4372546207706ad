// # URL Address Source
//
// This crate provides a URL-based address source for the DDNS system.
//
// ## Behavior
//
// - One HTTP GET per `current()` call, no caching and no retries
// - Scheme selected by the `https` flag, the configured URL carries none
// - Basic auth attached only when both username and password are set
// - Without a pattern the response body is returned as-is
// - With a pattern, exactly one match is required and its single capture
//   group must be an IP literal
//
// ## Example
//
// ```rust,ignore
// use ddns_ip_http::UrlAddressSource;
//
// let source = UrlAddressSource::new("ifconfig.me/ip", true, false, None, None, None)?;
// let address = source.current().await?;
// ```

use ddns_core::config::AddressSourceConfig;
use ddns_core::traits::AddressSource;
use ddns_core::{Error, Result};

use regex::Regex;
use std::net::IpAddr;
use std::time::Duration;

/// HTTP timeout for discovery requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Address source backed by an HTTP endpoint
pub struct UrlAddressSource {
    /// Full request URL including the scheme
    endpoint: String,

    /// Compiled extraction pattern
    pattern: Option<Regex>,

    /// Basic auth credentials, present only when both parts are non-empty
    credentials: Option<(String, String)>,

    /// HTTP client
    client: reqwest::Client,
}

// Custom Debug implementation that hides the basic auth password
impl std::fmt::Debug for UrlAddressSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlAddressSource")
            .field("endpoint", &self.endpoint)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field(
                "credentials",
                &self.credentials.as_ref().map(|(user, _)| (user, "<REDACTED>")),
            )
            .finish()
    }
}

impl UrlAddressSource {
    /// Create a new URL address source
    ///
    /// # Parameters
    ///
    /// - `url`: Host and path without a scheme (e.g. "ifconfig.me/ip")
    /// - `https`: Query over https when true, http otherwise
    /// - `insecure_skip_verify`: Accept any TLS certificate
    /// - `pattern`: Optional regex with exactly one capture group, empty for none
    /// - `username` / `password`: Optional basic auth credentials
    ///
    /// # Errors
    ///
    /// Returns an extraction error if the pattern does not compile or does
    /// not have exactly one capture group, and a configuration error if the
    /// HTTP client cannot be built.
    pub fn new(
        url: &str,
        https: bool,
        insecure_skip_verify: bool,
        pattern: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self> {
        let scheme = if https { "https" } else { "http" };
        let endpoint = format!("{}://{}", scheme, url);

        // An empty pattern means no pattern
        let pattern = pattern
            .filter(|p| !p.is_empty())
            .map(compile_pattern)
            .transpose()?;

        let credentials = match (username, password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some((user.to_string(), pass.to_string()))
            }
            _ => None,
        };

        if insecure_skip_verify {
            tracing::warn!("TLS certificate verification disabled for {}", endpoint);
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .danger_accept_invalid_certs(insecure_skip_verify)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            pattern,
            credentials,
            client,
        })
    }

    /// Create a source from address source configuration
    ///
    /// Fails with a configuration error for any variant other than `url`.
    pub fn from_config(config: &AddressSourceConfig) -> Result<Self> {
        match config {
            AddressSourceConfig::Url {
                url,
                https,
                insecure_skip_verify,
                regex,
                username,
                password,
            } => Self::new(
                url,
                *https,
                *insecure_skip_verify,
                regex.as_deref(),
                username.as_deref(),
                password.as_deref(),
            ),
            other => Err(Error::config(format!(
                "Cannot build a URL address source from a {} source configuration",
                other.type_name()
            ))),
        }
    }

    /// The URL queried on every call
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_body(&self) -> Result<String> {
        let mut request = self.client.get(&self.endpoint);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("Request to {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::protocol(format!(
                "response status code was {} for {}",
                status, self.endpoint
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response body: {}", e)))
    }
}

/// Compile a pattern and check it has exactly one capture group
fn compile_pattern(pattern: &str) -> Result<Regex> {
    let re = Regex::new(pattern)
        .map_err(|e| Error::extraction(format!("invalid regex {}: {}", pattern, e)))?;

    // captures_len counts the implicit whole-match group
    if re.captures_len() != 2 {
        return Err(Error::extraction(format!(
            "regex {} must have exactly one capture group, found {}",
            pattern,
            re.captures_len() - 1
        )));
    }

    Ok(re)
}

/// Extract the address selected by `re` from `body`
///
/// The pattern must match exactly once and its capture group must parse
/// as an IPv4 or IPv6 literal. The capture is returned as written in the
/// body.
pub fn extract_address(re: &Regex, body: &str) -> Result<String> {
    let mut matches = re.captures_iter(body);

    let captures = match (matches.next(), matches.next()) {
        (Some(captures), None) => captures,
        _ => {
            return Err(Error::extraction(format!(
                "unexpected result when applying regex to {}",
                body
            )));
        }
    };

    let candidate = captures
        .get(1)
        .map(|m| m.as_str())
        .ok_or_else(|| Error::extraction(format!("regex group did not participate in match on {}", body)))?;

    candidate
        .parse::<IpAddr>()
        .map_err(|_| Error::extraction(format!("{} is not a valid IP address", candidate)))?;

    Ok(candidate.to_string())
}

#[async_trait::async_trait]
impl AddressSource for UrlAddressSource {
    async fn current(&self) -> Result<String> {
        tracing::debug!("Requesting address from {}", self.endpoint);
        let body = self.fetch_body().await?;

        match &self.pattern {
            Some(re) => extract_address(re, &body),
            None => Ok(body),
        }
    }

    fn source_name(&self) -> &'static str {
        "url"
    }
}
