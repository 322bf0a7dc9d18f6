//! Time-boxed lookup cache.
//!
//! Successful lookups are stored per domain behind the [`CacheStore`] trait.
//! [`FileCache`] keeps one JSON file per domain in a cache directory;
//! [`MemoryCache`] keeps entries in a map.
//!
//! The two miss paths differ:
//! - a corrupt entry (unparsable, missing `checked_at`, wrong types, an
//!   error result, or one stored for another domain) is deleted and reported
//!   as a miss;
//! - an expired entry is reported as a miss but left in place until the next
//!   successful `set` overwrites it.
//!
//! Neither path ever surfaces an error, and write failures are swallowed.

use crate::types::{LookupResult, DEFAULT_CACHE_TTL};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// A successful lookup result together with the time it was checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    result: LookupResult,
}

impl CacheEntry {
    /// Stamp a result for caching.
    ///
    /// Returns `None` for error results, which are never cached.
    pub fn new(result: LookupResult, checked_at: DateTime<Utc>) -> Option<Self> {
        if !result.is_success() {
            return None;
        }
        Some(Self {
            result: result.stamped(checked_at),
        })
    }

    /// Rebuild an entry from a stored result, rejecting anything that is not
    /// a stamped success.
    fn from_stored(result: LookupResult) -> Option<Self> {
        if result.is_success() && result.checked_at().is_some() {
            Some(Self { result })
        } else {
            None
        }
    }

    /// When the underlying lookup happened.
    pub fn checked_at(&self) -> DateTime<Utc> {
        // from_stored and new both guarantee a timestamp
        self.result.checked_at().unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Borrow the cached result.
    pub fn result(&self) -> &LookupResult {
        &self.result
    }

    /// Take the cached result, `checked_at` included.
    pub fn into_result(self) -> LookupResult {
        self.result
    }

    /// Whether the entry is older than `ttl` at `now`. Exactly `ttl` old is
    /// still fresh.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.checked_at());
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => age > ttl,
            Err(_) => false,
        }
    }
}

/// Key-value store for lookup results, keyed by validated domain.
pub trait CacheStore {
    /// Fetch a fresh entry. Corrupt and expired entries read as `None`.
    fn get(&self, domain: &str) -> Option<CacheEntry>;

    /// Store an entry. Failures are swallowed.
    fn set(&self, domain: &str, entry: &CacheEntry);
}

/// Storage key for a domain.
fn cache_key(domain: &str) -> String {
    domain.to_ascii_lowercase()
}

/// Filesystem-backed cache: `<dir>/<domain>.json`.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FileCache {
    /// Create a cache rooted at `dir` with the default 24 hour TTL.
    ///
    /// The directory is created lazily on the first `set`.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self::with_ttl(dir, DEFAULT_CACHE_TTL)
    }

    /// Create a cache rooted at `dir` with a custom TTL.
    pub fn with_ttl<P: Into<PathBuf>>(dir: P, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `domain`.
    pub fn entry_path(&self, domain: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(domain)))
    }

    /// Fetch an entry as of `now`.
    pub fn get_at(&self, domain: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        let path = self.entry_path(domain);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!("cache read failed for {}: {}", path.display(), e);
                }
                return None;
            }
        };

        let entry = serde_json::from_str::<LookupResult>(&content)
            .ok()
            .and_then(CacheEntry::from_stored)
            .filter(|entry| {
                entry
                    .result()
                    .domain()
                    .is_some_and(|stored| stored.eq_ignore_ascii_case(domain))
            });

        let Some(entry) = entry else {
            warn!("removing corrupt cache entry {}", path.display());
            if let Err(e) = fs::remove_file(&path) {
                debug!("could not remove {}: {}", path.display(), e);
            }
            return None;
        };

        if entry.is_expired(self.ttl, now) {
            debug!("cache entry for {} expired", domain);
            return None;
        }

        debug!("cache hit for {}", domain);
        Some(entry)
    }

    fn try_set(&self, domain: &str, entry: &CacheEntry) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(entry.result())?;
        fs::write(self.entry_path(domain), json)
    }
}

impl CacheStore for FileCache {
    fn get(&self, domain: &str) -> Option<CacheEntry> {
        self.get_at(domain, Utc::now())
    }

    fn set(&self, domain: &str, entry: &CacheEntry) {
        if let Err(e) = self.try_set(domain, entry) {
            warn!(
                "failed to write cache entry for {} in {}: {}",
                domain,
                self.dir.display(),
                e
            );
        }
    }
}

/// In-memory cache with the same expiry semantics as [`FileCache`].
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl MemoryCache {
    /// Create an empty cache with the default 24 hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Create an empty cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, domain: &str) -> Option<CacheEntry> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(&cache_key(domain))
            .filter(|entry| !entry.is_expired(self.ttl, Utc::now()))
            .cloned()
    }

    fn set(&self, domain: &str, entry: &CacheEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(cache_key(domain), entry.clone());
        }
    }
}

impl<C: CacheStore + ?Sized> CacheStore for &C {
    fn get(&self, domain: &str) -> Option<CacheEntry> {
        (**self).get(domain)
    }

    fn set(&self, domain: &str, entry: &CacheEntry) {
        (**self).set(domain, entry)
    }
}
