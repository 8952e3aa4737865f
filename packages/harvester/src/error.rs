//! Error types for the harvester.
//!
//! Failures fall into three classes: transport failures (`NetworkError`,
//! retryable), protocol failures (`ProtocolError`, reported by the
//! repository itself) and malformed responses. `HarvesterError` wraps all
//! of them for library consumers.

use std::fmt;

use thiserror::Error;

/// The fixed OAI-PMH error-code vocabulary.
///
/// See <https://www.openarchives.org/OAI/openarchivesprotocol.html#ErrorConditions>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadArgument,
    BadResumptionToken,
    BadVerb,
    CannotDisseminateFormat,
    IdDoesNotExist,
    NoRecordsMatch,
    NoMetadataFormats,
    NoSetHierarchy,
}

impl ErrorKind {
    /// Map a wire error code to its kind.
    ///
    /// Returns `None` for codes outside the protocol vocabulary; repositories
    /// are free to add their own and those are not failures.
    ///
    /// # Examples
    /// ```
    /// use oai_harvester::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::classify("badVerb"), Some(ErrorKind::BadVerb));
    /// assert_eq!(ErrorKind::classify("somethingCustom"), None);
    /// ```
    #[must_use]
    pub fn classify(code: &str) -> Option<Self> {
        match code {
            "badArgument" => Some(Self::BadArgument),
            "badResumptionToken" => Some(Self::BadResumptionToken),
            "badVerb" => Some(Self::BadVerb),
            "cannotDisseminateFormat" => Some(Self::CannotDisseminateFormat),
            "idDoesNotExist" => Some(Self::IdDoesNotExist),
            "noRecordsMatch" => Some(Self::NoRecordsMatch),
            "noMetadataFormats" => Some(Self::NoMetadataFormats),
            "noSetHierarchy" => Some(Self::NoSetHierarchy),
            _ => None,
        }
    }

    /// The wire code for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadArgument => "badArgument",
            Self::BadResumptionToken => "badResumptionToken",
            Self::BadVerb => "badVerb",
            Self::CannotDisseminateFormat => "cannotDisseminateFormat",
            Self::IdDoesNotExist => "idDoesNotExist",
            Self::NoRecordsMatch => "noRecordsMatch",
            Self::NoMetadataFormats => "noMetadataFormats",
            Self::NoSetHierarchy => "noSetHierarchy",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified `<error>` entry reported by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Repository reported {kind}: {message}")]
pub struct ProtocolError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ProtocolError {
    /// Classify a raw error entry, dropping unknown codes.
    #[must_use]
    pub fn classify(code: &str, message: impl Into<String>) -> Option<Self> {
        ErrorKind::classify(code).map(|kind| Self {
            kind,
            message: message.into(),
        })
    }
}

/// Transport-level failure while requesting a page.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The request did not complete in time.
    #[error("Timeout requesting {url}")]
    Timeout { url: String },

    /// Connection-level failure (refused, reset, unreachable, ...).
    #[error("Error requesting {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The repository answered with a non-success status.
    #[error("Invalid response from {url}: HTTP {status}")]
    Status {
        url: String,
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: String,
    },
}

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// The repository reported a classified protocol error.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Transport failure after all retries were used.
    #[error("Request failed after {attempts} attempt(s): {source}")]
    Network {
        attempts: u32,
        #[source]
        source: NetworkError,
    },

    /// Response body is not well-formed XML.
    #[error("XML parsing failed: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Response body is not UTF-8.
    #[error("Response from {url} is not valid UTF-8: {source}")]
    InvalidEncoding {
        url: String,
        #[source]
        source: std::str::Utf8Error,
    },

    /// Missing required XML element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// Response ended before every element was closed.
    #[error("Response ended inside <{0}>")]
    Truncated(String),

    /// A datestamp matched neither accepted granularity.
    #[error("Invalid datestamp: '{0}'. Expected YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ")]
    InvalidDatestamp(String),

    /// Repository base URL could not be used.
    #[error("Invalid repository URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A request argument failed validation.
    #[error("Invalid {name}: '{value}'")]
    InvalidArgument { name: &'static str, value: String },

    /// A custom header name or value is not valid HTTP.
    #[error("Invalid HTTP header: {0}")]
    InvalidHeader(String),

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl HarvesterError {
    /// Whether this failure came from a body that could not be understood.
    #[must_use]
    pub fn is_malformed_response(&self) -> bool {
        matches!(
            self,
            Self::Xml(_)
                | Self::InvalidEncoding { .. }
                | Self::MissingElement { .. }
                | Self::Truncated(_)
                | Self::InvalidDatestamp(_)
        )
    }

    /// The protocol error kind, if the repository reported one.
    #[must_use]
    pub fn protocol_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Protocol(err) => Some(err.kind),
            _ => None,
        }
    }
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;

#[cfg(test)]
mod tests {
    use super::*;

    const CODES: [(&str, ErrorKind); 8] = [
        ("badArgument", ErrorKind::BadArgument),
        ("badResumptionToken", ErrorKind::BadResumptionToken),
        ("badVerb", ErrorKind::BadVerb),
        ("cannotDisseminateFormat", ErrorKind::CannotDisseminateFormat),
        ("idDoesNotExist", ErrorKind::IdDoesNotExist),
        ("noRecordsMatch", ErrorKind::NoRecordsMatch),
        ("noMetadataFormats", ErrorKind::NoMetadataFormats),
        ("noSetHierarchy", ErrorKind::NoSetHierarchy),
    ];

    #[test]
    fn test_classify_known_codes() {
        for (code, kind) in CODES {
            assert_eq!(ErrorKind::classify(code), Some(kind));
            assert_eq!(kind.as_str(), code);
        }
    }

    #[test]
    fn test_classify_unknown_codes() {
        assert_eq!(ErrorKind::classify(""), None);
        assert_eq!(ErrorKind::classify("BadVerb"), None);
        assert_eq!(ErrorKind::classify("rateLimited"), None);
    }

    #[test]
    fn test_protocol_error_carries_message() {
        let err = ProtocolError::classify("noRecordsMatch", "Nothing here").unwrap();
        assert_eq!(err.kind, ErrorKind::NoRecordsMatch);
        assert_eq!(
            err.to_string(),
            "Repository reported noRecordsMatch: Nothing here"
        );
        assert!(ProtocolError::classify("custom", "ignored").is_none());
    }

    #[test]
    fn test_network_error_display() {
        let err = HarvesterError::Network {
            attempts: 2,
            source: NetworkError::Status {
                url: "http://example.com/oai?verb=Identify".to_string(),
                status: 503,
                body: "Retry after 5 seconds".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Request failed after 2 attempt(s): Invalid response from http://example.com/oai?verb=Identify: HTTP 503"
        );
        assert!(!err.is_malformed_response());
        assert_eq!(err.protocol_kind(), None);
    }

    #[test]
    fn test_malformed_classification() {
        let err = HarvesterError::MissingElement {
            element: "responseDate".to_string(),
            context: "OAI-PMH response".to_string(),
        };
        assert!(err.is_malformed_response());
        assert!(HarvesterError::InvalidDatestamp("x".to_string()).is_malformed_response());

        let source = String::from_utf8(b"caf\xe9".to_vec()).unwrap_err().utf8_error();
        let err = HarvesterError::InvalidEncoding {
            url: "http://example.com/oai?verb=ListSets".to_string(),
            source,
        };
        assert!(err.is_malformed_response());
    }
}
