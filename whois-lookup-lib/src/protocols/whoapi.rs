//! WhoAPI client.
//!
//! Issues a single `GET ?domain=<d>&r=whois&apikey=<key>` request and maps the
//! outcome onto a [`LookupResult`]. There is no retry: every failure becomes
//! an `api_error` result.

use crate::error::WhoisLookupError;
use crate::types::{LookupConfig, LookupResult};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Placeholder for registration details the provider did not report.
const UNKNOWN: &str = "Unknown";

/// Client for the WhoAPI whois endpoint.
#[derive(Clone)]
pub struct WhoApiClient {
    /// HTTP client with the request timeout applied
    http_client: reqwest::Client,
    /// Endpoint URL
    api_url: String,
    /// Credential; `None` short-circuits every lookup
    api_token: Option<String>,
    /// Request timeout, reported in timeout errors
    timeout: Duration,
}

/// Subset of the WhoAPI whois response that we consume.
#[derive(Debug, Deserialize, Default)]
struct WhoApiResponse {
    /// "0" (or 0) on success
    #[serde(default)]
    status: serde_json::Value,
    #[serde(default)]
    status_desc: Option<String>,
    #[serde(default)]
    registered: Option<bool>,
    /// Registrar name
    #[serde(default)]
    whois_name: Option<String>,
    /// "YYYY-MM-DD HH:MM:SS"
    #[serde(default)]
    date_expires: Option<String>,
    /// Absent or `null` when the provider has no contacts
    #[serde(default)]
    contacts: Option<Vec<WhoApiContact>>,
}

#[derive(Debug, Deserialize, Default)]
struct WhoApiContact {
    #[serde(rename = "type", default)]
    contact_type: Option<String>,
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl WhoApiClient {
    /// Create a client from the resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns a system error if the HTTP client cannot be built (for example
    /// when the TLS backend fails to initialise).
    pub fn new(config: &LookupConfig) -> Result<Self, WhoisLookupError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("whois-lookup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                WhoisLookupError::system(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone(),
            api_token: config
                .api_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
            timeout: config.timeout,
        })
    }

    /// Look up a domain.
    ///
    /// Never fails: transport, HTTP and provider failures are returned as
    /// `error` results.
    pub async fn lookup(&self, domain: &str) -> LookupResult {
        match self.try_lookup(domain).await {
            Ok(result) => result,
            Err(e) => {
                debug!("lookup for {} failed: {}", domain, e);
                e.into()
            }
        }
    }

    async fn try_lookup(&self, domain: &str) -> Result<LookupResult, WhoisLookupError> {
        let token = self
            .api_token
            .as_deref()
            .ok_or(WhoisLookupError::MissingToken)?;

        debug!("querying WhoAPI at {} for {}", self.api_url, domain);

        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("domain", domain), ("r", "whois"), ("apikey", token)])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(WhoisLookupError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => return Err(WhoisLookupError::RateLimited),
            code => {
                return Err(WhoisLookupError::HttpStatus {
                    status_code: code.as_u16(),
                })
            }
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: WhoApiResponse = serde_json::from_str(&body)?;

        map_response(domain, parsed)
    }

    fn transport_error(&self, err: reqwest::Error) -> WhoisLookupError {
        if err.is_timeout() {
            WhoisLookupError::Timeout {
                duration: self.timeout,
            }
        } else {
            err.into()
        }
    }
}

/// Whether the provider's own status field reports success.
fn provider_succeeded(status: &serde_json::Value) -> bool {
    match status {
        serde_json::Value::String(s) => s.trim() == "0",
        serde_json::Value::Number(n) => n.as_u64() == Some(0),
        _ => false,
    }
}

fn map_response(domain: &str, response: WhoApiResponse) -> Result<LookupResult, WhoisLookupError> {
    if !provider_succeeded(&response.status) {
        let status = match &response.status {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "missing".to_string(),
            other => other.to_string(),
        };
        let message = response
            .status_desc
            .unwrap_or_else(|| "Unknown provider error".to_string());
        return Err(WhoisLookupError::provider(status, message));
    }

    if !response.registered.unwrap_or(false) {
        return Ok(LookupResult::available(domain));
    }

    let registrant = extract_registrant(response.contacts.as_deref().unwrap_or_default());
    let registrar = non_blank(response.whois_name).unwrap_or_else(|| UNKNOWN.to_string());
    let expires = response
        .date_expires
        .as_deref()
        .map(expiration_date)
        .filter(|date| !date.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string());

    Ok(LookupResult::taken(domain, registrant, registrar, expires))
}

/// Organization (or personal name) of the first registrant contact.
fn extract_registrant(contacts: &[WhoApiContact]) -> String {
    contacts
        .iter()
        .find(|contact| {
            contact
                .contact_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("registrant"))
        })
        .and_then(|contact| {
            non_blank(contact.organization.clone()).or_else(|| non_blank(contact.name.clone()))
        })
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Date portion of a provider timestamp: everything before the first space.
fn expiration_date(raw: &str) -> String {
    raw.trim()
        .split(' ')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
