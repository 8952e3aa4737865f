//! Flow control over multi-page results.
//!
//! A `Paginator` turns one request into a lazy sequence of items, following
//! resumption tokens until the repository stops sending them.
//!
//! See <https://www.openarchives.org/OAI/openarchivesprotocol.html#FlowControl>

use std::collections::VecDeque;
use std::marker::PhantomData;

use reqwest::Url;

use crate::config::{validate_base_url, Options, RetryPolicy};
use crate::error::Result;
use crate::fragment::Fragment;
use crate::http::{decode_body, fetch_with_retry, Fetch, ReqwestFetcher};
use crate::types::Verb;
use crate::xml::read_response;

/// Ordered query parameters, excluding `verb`.
pub type Query = Vec<(String, String)>;

/// Issues requests against one repository and follows resumption tokens.
#[derive(Debug, Clone)]
pub struct Paginator<F = ReqwestFetcher> {
    base_url: Url,
    fetcher: F,
    retry: RetryPolicy,
}

impl Paginator<ReqwestFetcher> {
    /// Create a paginator using the blocking HTTP client.
    pub fn new(base_url: &str, options: &Options) -> Result<Self> {
        let fetcher = ReqwestFetcher::new(options)?;
        Self::with_fetcher(base_url, fetcher, options.retry_policy())
    }
}

impl<F: Fetch> Paginator<F> {
    /// Create a paginator over a custom transport.
    pub fn with_fetcher(base_url: &str, fetcher: F, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            base_url: validate_base_url(base_url)?,
            fetcher,
            retry,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Lazily produce every item for `verb`, starting from `query`.
    ///
    /// Nothing is requested until the first item is pulled, and a page is
    /// only requested once every item of the previous page has been taken.
    /// Iteration stops after the first error.
    ///
    /// # Examples
    /// ```no_run
    /// use oai_harvester::{Options, Paginator, Record, Verb};
    ///
    /// let paginator = Paginator::new("http://www.example.com/oai", &Options::default())?;
    /// let query = vec![("metadataPrefix".to_string(), "oai_dc".to_string())];
    /// for record in paginator.items::<Record>(Verb::ListRecords, query).take(10_000) {
    ///     println!("{}", record?.identifier());
    /// }
    /// # Ok::<(), oai_harvester::HarvesterError>(())
    /// ```
    pub fn items<T: Fragment>(&self, verb: Verb, query: Query) -> Items<'_, F, T> {
        Items {
            paginator: self,
            verb,
            next_query: Some(query),
            buffer: VecDeque::new(),
            _item: PhantomData,
        }
    }

    /// Build the request URL for `verb` with `query`.
    #[must_use]
    pub fn request_url(&self, verb: Verb, query: &[(String, String)]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("verb", verb.as_str());
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        url
    }

    /// Request and read one page, returning its items and the next token.
    fn fetch_page<T: Fragment>(
        &self,
        verb: Verb,
        query: &[(String, String)],
    ) -> Result<(Vec<T>, Option<String>)> {
        let url = self.request_url(verb, query);
        let body = decode_body(fetch_with_retry(&self.fetcher, &url, self.retry)?, &url)?;

        let response = read_response::<T>(&body, verb)?;
        let token = response.resumption_token.clone();
        let items = response.into_items()?;

        Ok((items, token))
    }
}

/// Lazy, non-restartable sequence of items across pages.
///
/// Created by [`Paginator::items`]. Dropping it stops the harvest.
pub struct Items<'p, F, T> {
    paginator: &'p Paginator<F>,
    verb: Verb,
    /// Query for the next page; `None` once the harvest is over.
    next_query: Option<Query>,
    buffer: VecDeque<T>,
    _item: PhantomData<T>,
}

impl<F: Fetch, T: Fragment> Iterator for Items<'_, F, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }

            let query = self.next_query.take()?;
            match self.paginator.fetch_page::<T>(self.verb, &query) {
                Ok((items, token)) => {
                    self.buffer = items.into();
                    if let Some(token) = token {
                        tracing::debug!(verb = %self.verb, token = %token, "Resumption token");
                        self.next_query = Some(vec![("resumptionToken".to_string(), token)]);
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
