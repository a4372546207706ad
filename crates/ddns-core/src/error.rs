//! Error types for the DDNS system
//!
//! Every failure a synchronization pass can hit maps to one kind below.
//! The scheduler treats all kinds the same way: log, wait the failure
//! interval, try again.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Network failure reaching the discovery or provider endpoint
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx response from an endpoint
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Response body could not be decoded
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// A configured record name could not be resolved in the provider listing
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// The discovery pattern did not yield exactly one IP address
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a protocol (HTTP status) error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a decoding error
    pub fn decoding(msg: impl Into<String>) -> Self {
        Self::Decoding(msg.into())
    }

    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create an extraction error
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = Error::resolution("no record with name a.example.com was found");
        assert_eq!(
            err.to_string(),
            "Resolution error: no record with name a.example.com was found"
        );

        let err = Error::extraction("unexpected result when applying regex to body");
        assert_eq!(
            err.to_string(),
            "Extraction error: unexpected result when applying regex to body"
        );
    }

    #[test]
    fn test_json_error_is_decoding() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Decoding(_)));
    }
}
