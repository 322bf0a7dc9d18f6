//! Core data types for domain lookups.
//!
//! This module defines the normalized lookup result that every stage of the
//! pipeline produces, plus the runtime configuration shared by the client,
//! the cache and the checker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default WhoAPI endpoint.
pub const DEFAULT_API_URL: &str = "https://api.whoapi.com/";

/// Default timeout for the single WhoAPI request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default lifetime of a cache entry.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Result of a domain lookup.
///
/// Serialized with a `status` discriminator. Only the fields of the active
/// variant are present in the JSON, never null-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LookupResult {
    /// The domain is not registered.
    Available {
        domain: String,
        /// Set when the result was persisted to or served from the cache
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checked_at: Option<DateTime<Utc>>,
    },

    /// The domain is registered.
    Taken {
        domain: String,
        registrant: String,
        registrar: String,
        expires: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checked_at: Option<DateTime<Utc>>,
    },

    /// The lookup could not be completed.
    Error {
        error_type: ErrorKind,
        message: String,
        suggested_action: String,
    },
}

/// Classification of a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing domain argument
    ValidationError,
    /// Missing credential or invalid configuration
    ConfigurationError,
    /// Anything at or after the network boundary
    ApiError,
    /// A runtime prerequisite is not met
    SystemError,
}

impl LookupResult {
    /// Build an `available` result without a timestamp.
    pub fn available<D: Into<String>>(domain: D) -> Self {
        Self::Available {
            domain: domain.into(),
            checked_at: None,
        }
    }

    /// Build a `taken` result without a timestamp.
    pub fn taken<D, R, G, E>(domain: D, registrant: R, registrar: G, expires: E) -> Self
    where
        D: Into<String>,
        R: Into<String>,
        G: Into<String>,
        E: Into<String>,
    {
        Self::Taken {
            domain: domain.into(),
            registrant: registrant.into(),
            registrar: registrar.into(),
            expires: expires.into(),
            checked_at: None,
        }
    }

    /// Build an `error` result.
    pub fn error<M: Into<String>, A: Into<String>>(
        error_type: ErrorKind,
        message: M,
        suggested_action: A,
    ) -> Self {
        Self::Error {
            error_type,
            message: message.into(),
            suggested_action: suggested_action.into(),
        }
    }

    /// Whether this is an `available` or `taken` result.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// The domain this result describes, if it is a success.
    pub fn domain(&self) -> Option<&str> {
        match self {
            Self::Available { domain, .. } | Self::Taken { domain, .. } => Some(domain),
            Self::Error { .. } => None,
        }
    }

    /// When the result was stamped for the cache.
    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Available { checked_at, .. } | Self::Taken { checked_at, .. } => *checked_at,
            Self::Error { .. } => None,
        }
    }

    /// The error kind, if this is an error result.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Error { error_type, .. } => Some(*error_type),
            _ => None,
        }
    }

    /// Process exit code for this result: 0 on success, 1 on any error.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Return a copy of a success result stamped with `at`.
    ///
    /// Error results are returned unchanged.
    pub fn stamped(self, at: DateTime<Utc>) -> Self {
        match self {
            Self::Available { domain, .. } => Self::Available {
                domain,
                checked_at: Some(at),
            },
            Self::Taken {
                domain,
                registrant,
                registrar,
                expires,
                ..
            } => Self::Taken {
                domain,
                registrant,
                registrar,
                expires,
                checked_at: Some(at),
            },
            error @ Self::Error { .. } => error,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ValidationError => write!(f, "validation_error"),
            ErrorKind::ConfigurationError => write!(f, "configuration_error"),
            ErrorKind::ApiError => write!(f, "api_error"),
            ErrorKind::SystemError => write!(f, "system_error"),
        }
    }
}

/// Runtime configuration for a lookup.
///
/// Built once at the program boundary (defaults, then config file, then
/// environment) and passed down explicitly. Nothing in the library reads the
/// process environment on its own.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// WhoAPI credential. `None` makes every remote lookup a configuration error.
    pub api_token: Option<String>,

    /// WhoAPI endpoint
    /// Default: https://api.whoapi.com/
    pub api_url: String,

    /// Timeout for the single WhoAPI request
    /// Default: 10 seconds
    pub timeout: Duration,

    /// Directory holding one JSON file per domain
    /// Default: `<user cache dir>/whois-lookup`
    pub cache_dir: Option<PathBuf>,

    /// Lifetime of a cache entry
    /// Default: 24 hours
    pub cache_ttl: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache_dir: None,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl LookupConfig {
    /// Set the WhoAPI credential.
    pub fn with_api_token<T: Into<String>>(mut self, token: T) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the WhoAPI endpoint.
    pub fn with_api_url<U: Into<String>>(mut self, url: U) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the cache directory.
    pub fn with_cache_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set the cache entry lifetime.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}
