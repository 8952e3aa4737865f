//! Selective-harvesting arguments for `ListRecords` and `ListIdentifiers`.
//!
//! See <https://www.openarchives.org/OAI/openarchivesprotocol.html#SelectiveHarvesting>

use crate::config::{validate_metadata_prefix, validate_set_spec, DEFAULT_METADATA_PREFIX};
use crate::datestamp::Datestamp;
use crate::error::Result;
use crate::paginator::Query;

/// Arguments for a list request.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use oai_harvester::Arguments;
///
/// let query = Arguments::default()
///     .with_metadata_prefix("xoai")
///     .with_from(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap())
///     .to_query()?;
/// assert_eq!(
///     query,
///     vec![
///         ("metadataPrefix".to_string(), "xoai".to_string()),
///         ("from".to_string(), "2001-01-01".to_string()),
///     ]
/// );
/// # Ok::<(), oai_harvester::HarvesterError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arguments {
    pub metadata_prefix: String,
    pub from: Option<Datestamp>,
    pub until: Option<Datestamp>,
    pub set: Option<String>,
    /// Resume an earlier harvest. Continuation is normally handled by the
    /// paginator, so this is rarely needed.
    pub resumption_token: Option<String>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            metadata_prefix: DEFAULT_METADATA_PREFIX.to_string(),
            from: None,
            until: None,
            set: None,
            resumption_token: None,
        }
    }
}

impl Arguments {
    #[must_use]
    pub fn with_metadata_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metadata_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_from(mut self, from: impl Into<Datestamp>) -> Self {
        self.from = Some(from.into());
        self
    }

    #[must_use]
    pub fn with_until(mut self, until: impl Into<Datestamp>) -> Self {
        self.until = Some(until.into());
        self
    }

    #[must_use]
    pub fn with_set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }

    #[must_use]
    pub fn with_resumption_token(mut self, token: impl Into<String>) -> Self {
        self.resumption_token = Some(token.into());
        self
    }

    /// Validate and convert into ordered query parameters.
    ///
    /// Datestamps keep the granularity they were given with.
    pub fn to_query(&self) -> Result<Query> {
        validate_metadata_prefix(&self.metadata_prefix)?;

        let mut query = vec![("metadataPrefix".to_string(), self.metadata_prefix.clone())];
        if let Some(from) = &self.from {
            query.push(("from".to_string(), from.to_string()));
        }
        if let Some(until) = &self.until {
            query.push(("until".to_string(), until.to_string()));
        }
        if let Some(set) = &self.set {
            validate_set_spec(set)?;
            query.push(("set".to_string(), set.clone()));
        }
        if let Some(token) = &self.resumption_token {
            query.push(("resumptionToken".to_string(), token.clone()));
        }

        Ok(query)
    }
}
