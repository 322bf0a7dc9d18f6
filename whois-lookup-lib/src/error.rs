//! Error handling for lookup operations.
//!
//! Every failure below the CLI is represented here first and then folded into
//! a [`LookupResult`] error variant, so callers always receive one normalized
//! result shape.

use crate::types::{ErrorKind, LookupResult};
use std::fmt;
use std::time::Duration;

/// Main error type for lookup operations.
#[derive(Debug, Clone)]
pub enum WhoisLookupError {
    /// Invalid or missing domain argument
    InvalidDomain {
        domain: String,
        reason: String,
    },

    /// No WhoAPI credential was supplied
    MissingToken,

    /// Invalid configuration file or value
    ConfigError {
        message: String,
    },

    /// The request did not complete within the timeout
    Timeout {
        duration: Duration,
    },

    /// Connection or other transport failure
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// HTTP 401 from the provider
    Unauthorized,

    /// HTTP 429 from the provider
    RateLimited,

    /// Any other non-200 HTTP status
    HttpStatus {
        status_code: u16,
    },

    /// HTTP 200 but the provider reported a failure in its own status field
    ProviderError {
        status: String,
        message: String,
    },

    /// Response body could not be decoded
    ParseError {
        message: String,
    },

    /// A runtime prerequisite is missing
    SystemError {
        message: String,
    },
}

impl WhoisLookupError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new provider-reported error.
    pub fn provider<S: Into<String>, M: Into<String>>(status: S, message: M) -> Self {
        Self::ProviderError {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Create a new system error.
    pub fn system<M: Into<String>>(message: M) -> Self {
        Self::SystemError {
            message: message.into(),
        }
    }

    /// The user-facing error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDomain { .. } => ErrorKind::ValidationError,
            Self::MissingToken | Self::ConfigError { .. } => ErrorKind::ConfigurationError,
            Self::SystemError { .. } => ErrorKind::SystemError,
            Self::Timeout { .. }
            | Self::NetworkError { .. }
            | Self::Unauthorized
            | Self::RateLimited
            | Self::HttpStatus { .. }
            | Self::ProviderError { .. }
            | Self::ParseError { .. } => ErrorKind::ApiError,
        }
    }

    /// What the user can do about it.
    pub fn suggested_action(&self) -> String {
        match self {
            Self::InvalidDomain { .. } => {
                "Usage: whois-lookup <domain>  (e.g. whois-lookup example.com)".to_string()
            }
            Self::MissingToken => "Set the WHOAPI_TOKEN environment variable (or api.token in \
                 the config file) to your WhoAPI key. Get one at https://whoapi.com/"
                .to_string(),
            Self::ConfigError { .. } => {
                "Fix the configuration file or environment variable and try again".to_string()
            }
            Self::Unauthorized => "Check that WHOAPI_TOKEN holds a valid WhoAPI key".to_string(),
            Self::RateLimited => {
                "Wait before retrying. Previously checked domains are still served from the cache"
                    .to_string()
            }
            Self::SystemError { .. } => {
                "Check the runtime environment (cache directory, TLS support) and try again"
                    .to_string()
            }
            Self::Timeout { .. }
            | Self::NetworkError { .. }
            | Self::HttpStatus { .. }
            | Self::ProviderError { .. }
            | Self::ParseError { .. } => {
                "Try again later. Cached results remain available for recently checked domains"
                    .to_string()
            }
        }
    }
}

impl fmt::Display for WhoisLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                if domain.is_empty() {
                    write!(f, "{}", reason)
                } else {
                    write!(f, "Invalid domain '{}': {}", domain, reason)
                }
            }
            Self::MissingToken => write!(f, "WhoAPI token not configured (WHOAPI_TOKEN is not set)"),
            Self::ConfigError { message } => write!(f, "Configuration error: {}", message),
            Self::Timeout { duration } => {
                write!(f, "Request to WhoAPI timed out after {:?}", duration)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} ({})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::Unauthorized => write!(f, "Invalid API key (HTTP 401)"),
            Self::RateLimited => write!(f, "Rate limit reached (HTTP 429)"),
            Self::HttpStatus { status_code } => {
                write!(f, "WhoAPI returned unexpected HTTP status {}", status_code)
            }
            Self::ProviderError { status, message } => {
                write!(f, "WhoAPI error (status {}): {}", status, message)
            }
            Self::ParseError { message } => write!(f, "Invalid response from WhoAPI: {}", message),
            Self::SystemError { message } => write!(f, "System error: {}", message),
        }
    }
}

impl std::error::Error for WhoisLookupError {}

impl From<WhoisLookupError> for LookupResult {
    fn from(err: WhoisLookupError) -> Self {
        LookupResult::error(err.kind(), err.to_string(), err.suggested_action())
    }
}

impl From<reqwest::Error> for WhoisLookupError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts are mapped in WhoApiClient::transport_error
        if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for WhoisLookupError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON parsing failed: {}", err),
        }
    }
}

impl From<toml::de::Error> for WhoisLookupError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("Failed to parse TOML configuration: {}", err))
    }
}

impl From<std::io::Error> for WhoisLookupError {
    fn from(err: std::io::Error) -> Self {
        Self::system(format!("I/O error: {}", err))
    }
}
