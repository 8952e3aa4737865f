//! Configuration constants, request options and validation functions.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{HarvesterError, Result};

/// HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Number of times a failed request is retried.
pub const DEFAULT_RETRIES: u32 = 0;

/// Delay between retries in seconds.
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 10;

/// Metadata prefix every repository must support.
pub const DEFAULT_METADATA_PREFIX: &str = "oai_dc";

/// User agent string identifying this harvester.
pub const USER_AGENT: &str = concat!("oai-harvester/", env!("CARGO_PKG_VERSION"));

/// Metadata prefix pattern from the protocol schema.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static METADATA_PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-_.!~*'()]+$").expect("valid regex"));

/// Set spec pattern: colon-separated list of unreserved tokens.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SET_SPEC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9\-_.!~*'()]+(:[A-Za-z0-9\-_.!~*'()]+)*$").expect("valid regex")
});

/// Validate a metadata prefix.
///
/// # Examples
/// ```
/// use oai_harvester::config::validate_metadata_prefix;
///
/// assert!(validate_metadata_prefix("oai_dc").is_ok());
/// assert!(validate_metadata_prefix("oai dc").is_err());
/// ```
pub fn validate_metadata_prefix(prefix: &str) -> Result<()> {
    if METADATA_PREFIX_PATTERN.is_match(prefix) {
        Ok(())
    } else {
        Err(HarvesterError::InvalidArgument {
            name: "metadata prefix",
            value: prefix.to_string(),
        })
    }
}

/// Validate a set spec such as `TIB` or `TIB.DAGST:2017`.
///
/// # Examples
/// ```
/// use oai_harvester::config::validate_set_spec;
///
/// assert!(validate_set_spec("TIB.DAGST").is_ok());
/// assert!(validate_set_spec("a::b").is_err());
/// ```
pub fn validate_set_spec(spec: &str) -> Result<()> {
    if SET_SPEC_PATTERN.is_match(spec) {
        Ok(())
    } else {
        Err(HarvesterError::InvalidArgument {
            name: "set spec",
            value: spec.to_string(),
        })
    }
}

/// Parse and validate a repository base URL.
///
/// Only `http` and `https` URLs are accepted. Any query string on the base
/// URL is dropped since every request sets its own.
pub fn validate_base_url(url: &str) -> Result<reqwest::Url> {
    let invalid = |reason: &str| HarvesterError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let mut parsed = reqwest::Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("expected an http or https URL"));
    }
    parsed.set_query(None);
    parsed.set_fragment(None);

    Ok(parsed)
}

/// Bounded fixed-delay retry policy for transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Delay before each retry.
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, interval: Duration) -> Self {
        Self { retries, interval }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_RETRIES,
            Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
        )
    }
}

/// Options for talking to a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub retries: u32,
    pub interval: Duration,
    /// Sent as `Authorization: Bearer <token>`.
    pub bearer_token: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            retries: DEFAULT_RETRIES,
            interval: Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
            bearer_token: None,
            headers: Vec::new(),
        }
    }
}

impl Options {
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, self.interval)
    }

    /// All headers to send, custom headers first, then the bearer token.
    #[must_use]
    pub fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers = self.headers.clone();
        if let Some(token) = &self.bearer_token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }
}
