//! Utility functions for domain validation and duration parsing.

use crate::error::WhoisLookupError;
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    /// One or more alphanumeric labels (hyphens only inside a label), then an
    /// alphabetic TLD of at least two characters.
    static ref DOMAIN_PATTERN: Regex = Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?)*\.[a-zA-Z]{2,}$"
    )
    .expect("domain pattern is a valid regex");
}

/// Validate a domain name format.
///
/// Total over all strings: never panics, never errors. Leading/trailing dots,
/// whitespace anywhere and a missing alphabetic TLD all yield `false`.
pub fn validate_domain(domain: &str) -> bool {
    !domain.is_empty() && DOMAIN_PATTERN.is_match(domain)
}

/// Validate a candidate argument, producing a validation error on failure.
pub fn check_domain_argument(domain: &str) -> Result<(), WhoisLookupError> {
    if domain.is_empty() {
        return Err(WhoisLookupError::invalid_domain(
            domain,
            "Domain name cannot be empty",
        ));
    }

    if !validate_domain(domain) {
        return Err(WhoisLookupError::invalid_domain(
            domain,
            "expected a name like example.com (letters, digits and inner hyphens, ending in a TLD)",
        ));
    }

    Ok(())
}

/// Parse a duration string like "30s", "15m", "24h" or bare seconds.
///
/// Returns `None` for unparsable input.
pub fn parse_duration_string(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();

    let seconds = if let Some(s) = value.strip_suffix('s') {
        s.trim().parse::<u64>().ok()
    } else if let Some(m) = value.strip_suffix('m') {
        m.trim().parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else if let Some(h) = value.strip_suffix('h') {
        h.trim().parse::<u64>().ok().and_then(|h| h.checked_mul(3600))
    } else {
        value.parse::<u64>().ok()
    }?;

    Some(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_domains() {
        assert!(validate_domain("example.com"));
        assert!(validate_domain("sub.example.com"));
        assert!(validate_domain("example.co.uk"));
        assert!(validate_domain("sub.example.co.uk"));
        assert!(validate_domain("test-domain.dev"));
        assert!(validate_domain("a1.io"));
    }

    #[test]
    fn test_invalid_domains() {
        assert!(!validate_domain(""));
        assert!(!validate_domain("invalid domain"));
        assert!(!validate_domain("no-tld"));
        assert!(!validate_domain(".startswith-dot.com"));
        assert!(!validate_domain("endswith-dot.com."));
        assert!(!validate_domain("example.c"));
        assert!(!validate_domain("example.c0m"));
        assert!(!validate_domain("-example.com"));
        assert!(!validate_domain("example-.com"));
        assert!(!validate_domain("example..com"));
        assert!(!validate_domain(" example.com"));
        assert!(!validate_domain("example.com\n"));
        assert!(!validate_domain("exa mple.com"));
    }

    #[test]
    fn test_check_domain_argument() {
        assert!(check_domain_argument("example.com").is_ok());

        let err = check_domain_argument("").unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));

        let err = check_domain_argument("no-tld").unwrap_err();
        assert!(err.to_string().contains("no-tld"));
    }

    #[test]
    fn test_parse_duration_string() {
        assert_eq!(parse_duration_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(
            parse_duration_string("24h"),
            Some(Duration::from_secs(86_400))
        );
        assert_eq!(parse_duration_string("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration_string("soon"), None);
        assert_eq!(parse_duration_string(""), None);
    }
}
