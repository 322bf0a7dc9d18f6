//! # Whois Lookup Library
//!
//! Domain availability lookups against the WhoAPI whois service, with a
//! time-boxed local cache.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whois_lookup_lib::{LookupConfig, LookupResult, WhoisChecker};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LookupConfig::default()
//!         .with_api_token("my-whoapi-key")
//!         .with_cache_dir("/tmp/whois-lookup");
//!     let checker = WhoisChecker::new(&config)?;
//!
//!     match checker.check("example.com").await {
//!         LookupResult::Available { domain, .. } => println!("{} is available", domain),
//!         LookupResult::Taken { domain, registrar, .. } => {
//!             println!("{} is taken (registrar: {})", domain, registrar)
//!         }
//!         LookupResult::Error { message, .. } => eprintln!("lookup failed: {}", message),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Validation**: syntax check before anything touches disk or network
//! - **Cache**: one JSON file per domain, 24h TTL, corrupt entries self-heal
//! - **WhoAPI**: a single request with a 10s timeout, no retry
//! - **Normalized results**: every failure becomes a [`LookupResult::Error`]

pub use cache::{CacheEntry, CacheStore, FileCache, MemoryCache};
pub use checker::WhoisChecker;
pub use config::{
    default_cache_dir, load_env_config, ApiConfig, CacheConfig, ConfigManager, EnvConfig,
    FileConfig, APP_NAME,
};
pub use error::WhoisLookupError;
pub use protocols::WhoApiClient;
pub use types::{
    ErrorKind, LookupConfig, LookupResult, DEFAULT_API_URL, DEFAULT_CACHE_TTL, DEFAULT_TIMEOUT,
};
pub use utils::{check_domain_argument, parse_duration_string, validate_domain};

mod cache;
mod checker;
mod config;
mod error;
mod protocols;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, WhoisLookupError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
