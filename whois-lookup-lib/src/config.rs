//! Configuration file parsing and management.
//!
//! Configuration is resolved once, at the program boundary, in three layers:
//! built-in defaults, then a TOML file, then environment variables. The
//! result is a [`LookupConfig`] that is passed down explicitly.

use crate::error::WhoisLookupError;
use crate::types::LookupConfig;
use crate::utils::parse_duration_string;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application name used for config and cache directories.
pub const APP_NAME: &str = "whois-lookup";

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// WhoAPI settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiConfig>,

    /// Cache settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,
}

/// `[api]` table.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// WhoAPI key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Endpoint override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Request timeout (e.g. "10s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// `[cache]` table.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Cache directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Entry lifetime (e.g. "24h")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

/// Values taken from the process environment.
///
/// Read by [`load_env_config`] in the binary; the library never reads the
/// environment itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    /// `WHOAPI_TOKEN`
    pub api_token: Option<String>,
    /// `WHOIS_LOOKUP_API_URL`
    pub api_url: Option<String>,
    /// `WHOIS_LOOKUP_TIMEOUT`
    pub timeout: Option<String>,
    /// `WHOIS_LOOKUP_CACHE_DIR`
    pub cache_dir: Option<PathBuf>,
    /// `WHOIS_LOOKUP_CACHE_TTL`
    pub cache_ttl: Option<String>,
    /// `WHOIS_LOOKUP_CONFIG`
    pub config_path: Option<PathBuf>,
}

/// Load configuration from environment variables.
///
/// Empty values are treated as unset. Values are validated later, in
/// [`ConfigManager::resolve`].
pub fn load_env_config() -> EnvConfig {
    fn non_empty(name: &str) -> Option<String> {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    EnvConfig {
        api_token: non_empty("WHOAPI_TOKEN"),
        api_url: non_empty("WHOIS_LOOKUP_API_URL"),
        timeout: non_empty("WHOIS_LOOKUP_TIMEOUT"),
        cache_dir: non_empty("WHOIS_LOOKUP_CACHE_DIR").map(PathBuf::from),
        cache_ttl: non_empty("WHOIS_LOOKUP_CACHE_TTL"),
        config_path: non_empty("WHOIS_LOOKUP_CONFIG").map(PathBuf::from),
    }
}

/// Configuration discovery, loading and merging.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// Directory searched for `whois-lookup/config.toml`.
    /// Defaults to the platform config directory.
    config_home: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a manager using the platform config directory.
    pub fn new() -> Self {
        Self {
            config_home: dirs::config_dir(),
        }
    }

    /// Create a manager that searches `config_home` instead of the platform
    /// config directory.
    pub fn with_config_home<P: Into<PathBuf>>(config_home: P) -> Self {
        Self {
            config_home: Some(config_home.into()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, WhoisLookupError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| {
            WhoisLookupError::config(format!(
                "Failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Find and load the configuration file, if any.
    ///
    /// An explicit path must exist. Otherwise `./whois-lookup.toml` wins over
    /// `<config home>/whois-lookup/config.toml`; having neither is fine.
    pub fn discover_and_load(
        &self,
        explicit: Option<&Path>,
    ) -> Result<FileConfig, WhoisLookupError> {
        if let Some(path) = explicit {
            return self.load_file(path);
        }

        match self.discover() {
            Some(path) => self.load_file(path),
            None => Ok(FileConfig::default()),
        }
    }

    fn discover(&self) -> Option<PathBuf> {
        let local = Path::new("./whois-lookup.toml");
        if local.exists() {
            return Some(local.to_path_buf());
        }

        let user = self.config_home.as_ref()?.join(APP_NAME).join("config.toml");
        if user.exists() {
            Some(user)
        } else {
            None
        }
    }

    /// Resolve the final configuration: defaults, then file, then environment.
    pub fn resolve(
        &self,
        file: &FileConfig,
        env: &EnvConfig,
    ) -> Result<LookupConfig, WhoisLookupError> {
        let mut config = LookupConfig::default();
        let api = file.api.clone().unwrap_or_default();
        let cache = file.cache.clone().unwrap_or_default();

        config.api_token = env
            .api_token
            .clone()
            .or(api.token)
            .filter(|t| !t.trim().is_empty());

        if let Some(url) = env.api_url.clone().or(api.url) {
            config.api_url = url;
        }

        if let Some(timeout) = env.timeout.as_deref().or(api.timeout.as_deref()) {
            config.timeout = parse_setting("timeout", timeout)?;
        }

        config.cache_dir = env
            .cache_dir
            .clone()
            .or(cache.dir)
            .or_else(default_cache_dir);

        if let Some(ttl) = env.cache_ttl.as_deref().or(cache.ttl.as_deref()) {
            config.cache_ttl = parse_setting("cache ttl", ttl)?;
        }

        Ok(config)
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), WhoisLookupError> {
        if let Some(api) = &config.api {
            if let Some(url) = &api.url {
                if url.trim().is_empty() {
                    return Err(WhoisLookupError::config("api.url cannot be empty"));
                }
            }
            if let Some(timeout) = &api.timeout {
                parse_setting("api.timeout", timeout)?;
            }
        }

        if let Some(cache) = &config.cache {
            if let Some(ttl) = &cache.ttl {
                parse_setting("cache.ttl", ttl)?;
            }
        }

        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Default cache directory: `<user cache dir>/whois-lookup`.
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join(APP_NAME))
}

fn parse_setting(name: &str, value: &str) -> Result<Duration, WhoisLookupError> {
    match parse_duration_string(value) {
        Some(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(WhoisLookupError::config(format!(
            "Invalid {} '{}'. Use a format like '10s', '15m' or '24h'",
            name, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(
            r#"
[api]
token = "file-token"
timeout = "5s"

[cache]
dir = "/tmp/whois-cache"
ttl = "12h"
"#,
        );

        let config = ConfigManager::new().load_file(file.path()).unwrap();
        let api = config.api.unwrap();
        assert_eq!(api.token.as_deref(), Some("file-token"));
        assert_eq!(api.timeout.as_deref(), Some("5s"));
        let cache = config.cache.unwrap();
        assert_eq!(cache.dir, Some(PathBuf::from("/tmp/whois-cache")));
        assert_eq!(cache.ttl.as_deref(), Some("12h"));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let file = write_config("[api]\ntimeout = \"soon\"\n");
        let err = ConfigManager::new().load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let file = write_config("[cache]\nttl = \"0s\"\n");
        assert!(ConfigManager::new().load_file(file.path()).is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let file = write_config("[api]\ntokn = \"typo\"\n");
        let err = ConfigManager::new().load_file(file.path()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let result = ConfigManager::with_config_home(dir.path()).discover_and_load(Some(&missing));
        assert!(result.is_err());
    }

    #[test]
    fn test_discovers_user_config() {
        let home = TempDir::new().unwrap();
        let app_dir = home.path().join(APP_NAME);
        fs::create_dir_all(&app_dir).unwrap();
        fs::write(app_dir.join("config.toml"), "[cache]\nttl = \"1h\"\n").unwrap();

        let manager = ConfigManager::with_config_home(home.path());
        let config = manager.discover_and_load(None).unwrap();
        assert_eq!(config.cache.unwrap().ttl.as_deref(), Some("1h"));
    }

    #[test]
    fn test_resolve_defaults() {
        let config = ConfigManager::new()
            .resolve(&FileConfig::default(), &EnvConfig::default())
            .unwrap();

        assert_eq!(config.api_token, None);
        assert_eq!(config.api_url, crate::types::DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.cache_ttl, Duration::from_secs(24 * 3600));
        assert_eq!(config.cache_dir, default_cache_dir());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileConfig {
            api: Some(ApiConfig {
                token: Some("file-token".to_string()),
                url: Some("https://file.example/".to_string()),
                timeout: Some("5s".to_string()),
            }),
            cache: Some(CacheConfig {
                dir: Some(PathBuf::from("/file/cache")),
                ttl: Some("1h".to_string()),
            }),
        };
        let env = EnvConfig {
            api_token: Some("env-token".to_string()),
            cache_ttl: Some("30m".to_string()),
            ..Default::default()
        };

        let config = ConfigManager::new().resolve(&file, &env).unwrap();

        assert_eq!(config.api_token.as_deref(), Some("env-token"));
        assert_eq!(config.api_url, "https://file.example/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.cache_dir, Some(PathBuf::from("/file/cache")));
        assert_eq!(config.cache_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn test_invalid_env_value_rejected() {
        let env = EnvConfig {
            timeout: Some("forever".to_string()),
            ..Default::default()
        };
        let err = ConfigManager::new()
            .resolve(&FileConfig::default(), &env)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_blank_token_treated_as_missing() {
        let file = FileConfig {
            api: Some(ApiConfig {
                token: Some("   ".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = ConfigManager::new()
            .resolve(&file, &EnvConfig::default())
            .unwrap();
        assert_eq!(config.api_token, None);
    }
}
