//! Lookup orchestration.
//!
//! This module provides the [`WhoisChecker`] that runs the lookup pipeline:
//! validate, consult the cache, fall back to WhoAPI, persist successes.

use crate::cache::{CacheEntry, CacheStore, FileCache};
use crate::error::WhoisLookupError;
use crate::protocols::WhoApiClient;
use crate::types::{LookupConfig, LookupResult};
use crate::utils::check_domain_argument;
use chrono::Utc;
use tracing::debug;

/// Runs domain lookups against a cache and the WhoAPI client.
///
/// # Example
///
/// ```rust,no_run
/// use whois_lookup_lib::{LookupConfig, WhoisChecker};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = LookupConfig::default()
///         .with_api_token("my-whoapi-key")
///         .with_cache_dir("/tmp/whois-lookup");
///     let checker = WhoisChecker::new(&config)?;
///     let result = checker.check("example.com").await;
///     println!("{}", serde_json::to_string_pretty(&result)?);
///     Ok(())
/// }
/// ```
pub struct WhoisChecker<C = FileCache> {
    /// Remote provider client
    client: WhoApiClient,
    /// Store for successful results
    cache: C,
}

impl WhoisChecker<FileCache> {
    /// Create a checker with a file cache, from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns a system error if no cache directory is configured and none
    /// can be derived for this platform, or if the HTTP client cannot be built.
    pub fn new(config: &LookupConfig) -> Result<Self, WhoisLookupError> {
        let cache_dir = config.cache_dir.clone().ok_or_else(|| {
            WhoisLookupError::system(
                "Could not determine a cache directory; set WHOIS_LOOKUP_CACHE_DIR",
            )
        })?;

        let client = WhoApiClient::new(config)?;
        let cache = FileCache::with_ttl(cache_dir, config.cache_ttl);

        Ok(Self::with_cache(client, cache))
    }
}

impl<C: CacheStore> WhoisChecker<C> {
    /// Create a checker over any cache backend.
    pub fn with_cache(client: WhoApiClient, cache: C) -> Self {
        Self { client, cache }
    }

    /// The cache backend.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Look up a single domain.
    ///
    /// The pipeline:
    /// 1. Validate the domain (failure: `validation_error`, nothing else runs)
    /// 2. Return a fresh cache entry if there is one
    /// 3. Otherwise query WhoAPI once
    /// 4. Stamp and persist `available`/`taken` results; errors are not cached
    ///
    /// Never fails: every problem is reported as an `error` result.
    pub async fn check(&self, domain: &str) -> LookupResult {
        if let Err(e) = check_domain_argument(domain) {
            return e.into();
        }

        if let Some(entry) = self.cache.get(domain) {
            debug!("serving {} from cache", domain);
            return entry.into_result();
        }

        let result = self.client.lookup(domain).await;

        match CacheEntry::new(result.clone(), Utc::now()) {
            Some(entry) => {
                self.cache.set(domain, &entry);
                entry.into_result()
            }
            None => result,
        }
    }
}
