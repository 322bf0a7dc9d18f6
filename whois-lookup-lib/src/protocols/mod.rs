//! Remote whois providers.
//!
//! Only WhoAPI is supported.

/// WhoAPI HTTP client
pub mod whoapi;

pub use whoapi::WhoApiClient;
