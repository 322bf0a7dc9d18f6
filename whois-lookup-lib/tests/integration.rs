// whois-lookup-lib/tests/integration.rs

//! Integration tests for the lookup pipeline through the public API

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use whois_lookup_lib::{
    validate_domain, CacheEntry, CacheStore, ErrorKind, FileCache, LookupConfig, LookupResult,
    WhoApiClient, WhoisChecker,
};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, cache: &TempDir) -> LookupConfig {
    LookupConfig::default()
        .with_api_url(server.uri())
        .with_api_token("secret")
        .with_cache_dir(cache.path())
}

async fn mount_available(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(query_param("domain", "example.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "0", "registered": false})),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[test]
fn test_validator_examples() {
    for good in ["example.com", "sub.example.co.uk", "test-domain.dev"] {
        assert!(validate_domain(good), "{} should be valid", good);
    }
    for bad in ["", "no-tld", ".startswith-dot.com", "endswith-dot.com.", "in valid.com"] {
        assert!(!validate_domain(bad), "{:?} should be invalid", bad);
    }
}

#[tokio::test]
async fn test_available_is_cached_on_disk() {
    let server = MockServer::start().await;
    mount_available(&server, 1).await;
    let cache_dir = TempDir::new().unwrap();

    let checker = WhoisChecker::new(&config_for(&server, &cache_dir)).unwrap();
    let result = checker.check("example.com").await;

    let checked_at = result.checked_at().expect("fresh results are stamped");
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "status": "available",
            "domain": "example.com",
            "checked_at": serde_json::to_value(checked_at).unwrap(),
        })
    );

    let stored = fs::read_to_string(cache_dir.path().join("example.com.json")).unwrap();
    let stored: LookupResult = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored, result);
}

#[tokio::test]
async fn test_two_checks_make_one_request() {
    let server = MockServer::start().await;
    mount_available(&server, 1).await;
    let cache_dir = TempDir::new().unwrap();
    let config = config_for(&server, &cache_dir);

    // Separate checkers share only the cache directory, like two CLI runs
    let first = WhoisChecker::new(&config).unwrap().check("example.com").await;
    let second = WhoisChecker::new(&config).unwrap().check("example.com").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_corrupt_entry_is_replaced() {
    let server = MockServer::start().await;
    mount_available(&server, 1).await;
    let cache_dir = TempDir::new().unwrap();
    let path = cache_dir.path().join("example.com.json");
    fs::write(&path, "garbage").unwrap();

    let checker = WhoisChecker::new(&config_for(&server, &cache_dir)).unwrap();
    let result = checker.check("example.com").await;

    assert!(result.is_success());
    let stored: LookupResult = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored, result);
}

#[test]
fn test_soft_expiry_and_hard_delete_differ() {
    let cache_dir = TempDir::new().unwrap();
    let cache = FileCache::new(cache_dir.path());

    let stale = CacheEntry::new(
        LookupResult::available("stale.com"),
        Utc::now() - ChronoDuration::hours(30),
    )
    .unwrap();
    cache.set("stale.com", &stale);
    fs::write(cache_dir.path().join("broken.com.json"), r#"{"status": "available"}"#).unwrap();

    assert!(cache.get("stale.com").is_none());
    assert!(cache.get("broken.com").is_none());

    assert!(cache_dir.path().join("stale.com.json").exists());
    assert!(!cache_dir.path().join("broken.com.json").exists());
}

#[tokio::test]
async fn test_checker_over_borrowed_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "registered": true,
            "whois_name": "Example Registrar Inc",
            "date_expires": "2027-01-15 00:00:00",
            "contacts": [{"type": "registrant", "organization": "Example Corp"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let cache_dir = TempDir::new().unwrap();
    let config = config_for(&server, &cache_dir);
    let cache = FileCache::new(cache_dir.path());

    let checker = WhoisChecker::with_cache(WhoApiClient::new(&config).unwrap(), &cache);
    let result = checker.check("example.com").await;

    let entry = cache.get("example.com").expect("taken results are cached");
    assert_eq!(entry.result(), &result);
    match result {
        LookupResult::Taken {
            registrant,
            registrar,
            expires,
            ..
        } => {
            assert_eq!(registrant, "Example Corp");
            assert_eq!(registrar, "Example Registrar Inc");
            assert_eq!(expires, "2027-01-15");
        }
        other => panic!("expected taken, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_token_never_reaches_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let cache_dir = TempDir::new().unwrap();
    let config = LookupConfig::default()
        .with_api_url(server.uri())
        .with_cache_dir(cache_dir.path());

    let result = WhoisChecker::new(&config).unwrap().check("example.com").await;

    assert_eq!(result.error_kind(), Some(ErrorKind::ConfigurationError));
    assert_eq!(result.exit_code(), 1);
    assert!(fs::read_dir(cache_dir.path()).map_or(true, |mut d| d.next().is_none()));
}
