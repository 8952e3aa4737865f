//! One method per protocol verb over a single repository.

use crate::arguments::Arguments;
use crate::config::{validate_metadata_prefix, Options, RetryPolicy};
use crate::error::{HarvesterError, Result};
use crate::http::{Fetch, ReqwestFetcher};
use crate::paginator::{Items, Paginator};
use crate::types::{Header, Identify, MetadataFormat, Record, Set, Verb};

/// A network-accessible server answering the six OAI-PMH requests.
///
/// # Examples
/// ```no_run
/// use oai_harvester::{Arguments, Options, Repository};
///
/// let repository = Repository::new("http://www.example.com/oai", &Options::default())?;
/// for record in repository.records(&Arguments::default())? {
///     let record = record?;
///     if !record.is_deleted() {
///         println!("{}", record.metadata.unwrap_or_default());
///     }
/// }
/// # Ok::<(), oai_harvester::HarvesterError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Repository<F = ReqwestFetcher> {
    paginator: Paginator<F>,
}

impl Repository<ReqwestFetcher> {
    pub fn new(base_url: &str, options: &Options) -> Result<Self> {
        Ok(Self {
            paginator: Paginator::new(base_url, options)?,
        })
    }
}

impl<F: Fetch> Repository<F> {
    /// Talk to the repository through a custom transport.
    pub fn with_fetcher(base_url: &str, fetcher: F, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            paginator: Paginator::with_fetcher(base_url, fetcher, retry)?,
        })
    }

    #[must_use]
    pub fn paginator(&self) -> &Paginator<F> {
        &self.paginator
    }

    /// Send an `Identify` request.
    pub fn identify(&self) -> Result<Identify> {
        first(self.paginator.items(Verb::Identify, Vec::new()), "Identify")
    }

    /// Send a `ListMetadataFormats` request, optionally for one item.
    pub fn metadata_formats(&self, identifier: Option<&str>) -> Items<'_, F, MetadataFormat> {
        let query = identifier
            .map(|id| vec![("identifier".to_string(), id.to_string())])
            .unwrap_or_default();
        self.paginator.items(Verb::ListMetadataFormats, query)
    }

    /// Send a `ListSets` request.
    pub fn sets(&self) -> Items<'_, F, Set> {
        self.paginator.items(Verb::ListSets, Vec::new())
    }

    /// Send a `ListRecords` request.
    ///
    /// Fails before any request is made if `arguments` do not validate.
    pub fn records(&self, arguments: &Arguments) -> Result<Items<'_, F, Record>> {
        Ok(self
            .paginator
            .items(Verb::ListRecords, arguments.to_query()?))
    }

    /// Send a `ListIdentifiers` request, yielding headers only.
    pub fn identifiers(&self, arguments: &Arguments) -> Result<Items<'_, F, Header>> {
        Ok(self
            .paginator
            .items(Verb::ListIdentifiers, arguments.to_query()?))
    }

    /// Send a `GetRecord` request for one item.
    pub fn get(&self, identifier: &str, metadata_prefix: &str) -> Result<Record> {
        validate_metadata_prefix(metadata_prefix)?;
        let query = vec![
            ("identifier".to_string(), identifier.to_string()),
            ("metadataPrefix".to_string(), metadata_prefix.to_string()),
        ];
        first(self.paginator.items(Verb::GetRecord, query), "record")
    }
}

fn first<T>(mut items: impl Iterator<Item = Result<T>>, element: &str) -> Result<T> {
    items.next().unwrap_or_else(|| {
        Err(HarvesterError::MissingElement {
            element: element.to_string(),
            context: "OAI-PMH response".to_string(),
        })
    })
}
