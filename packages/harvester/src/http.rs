//! HTTP transport for repository requests.

use std::thread;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

use crate::config::{Options, RetryPolicy, USER_AGENT};
use crate::error::{HarvesterError, NetworkError, Result};

/// Something that can GET a URL and hand back the raw response body.
pub trait Fetch {
    /// Fetch `url`, failing on transport errors and non-success statuses.
    fn fetch(&self, url: &Url) -> std::result::Result<Vec<u8>, NetworkError>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, url: &Url) -> std::result::Result<Vec<u8>, NetworkError> {
        (**self).fetch(url)
    }
}

/// Blocking `reqwest` transport.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Create a fetcher with timeout and headers taken from `options`.
    pub fn new(options: &Options) -> Result<Self> {
        Ok(Self {
            client: create_client(options)?,
        })
    }
}

impl Fetch for ReqwestFetcher {
    fn fetch(&self, url: &Url) -> std::result::Result<Vec<u8>, NetworkError> {
        tracing::info!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_else(|e| {
                tracing::debug!(url = %url, error = %e, "Could not read error response body");
                String::new()
            });
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().map_err(|e| transport_error(url, e))?;
        Ok(bytes.to_vec())
    }
}

fn transport_error(url: &Url, error: reqwest::Error) -> NetworkError {
    if error.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
    } else {
        NetworkError::Transport {
            url: url.to_string(),
            source: Box::new(error),
        }
    }
}

/// Create a configured HTTP client.
///
/// # Returns
/// A `reqwest::blocking::Client` with the timeout, user agent and default
/// headers from `options`.
pub fn create_client(options: &Options) -> Result<Client> {
    let mut headers = HeaderMap::new();
    for (name, value) in options.request_headers() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HarvesterError::InvalidHeader(name.clone()))?;
        let header_value = HeaderValue::from_str(&value)
            .map_err(|_| HarvesterError::InvalidHeader(format!("{name}: <invalid value>")))?;
        headers.insert(header_name, header_value);
    }

    let client = Client::builder()
        .timeout(options.timeout)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Fetch a URL, retrying transport failures with a fixed delay.
///
/// Every `NetworkError` is retried up to `policy.retries` times. When the
/// retries run out the last failure is returned together with the number of
/// attempts made.
pub fn fetch_with_retry<F: Fetch + ?Sized>(
    fetcher: &F,
    url: &Url,
    policy: RetryPolicy,
) -> Result<Vec<u8>> {
    let mut attempts = 0;

    loop {
        attempts += 1;
        match fetcher.fetch(url) {
            Ok(body) => return Ok(body),
            Err(error) if attempts <= policy.retries => {
                tracing::warn!(
                    error = %error,
                    attempt = attempts,
                    max_retries = policy.retries,
                    delay_ms = policy.interval.as_millis() as u64,
                    "Request failed, will retry"
                );
                thread::sleep(policy.interval);
            }
            Err(source) => return Err(HarvesterError::Network { attempts, source }),
        }
    }
}

/// Decode a response body fetched from `url`.
///
/// Responses must be UTF-8; anything else is a malformed response.
pub fn decode_body(bytes: Vec<u8>, url: &Url) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| HarvesterError::InvalidEncoding {
        url: url.to_string(),
        source: e.utf8_error(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    struct Scripted {
        responses: RefCell<VecDeque<std::result::Result<Vec<u8>, NetworkError>>>,
        calls: RefCell<u32>,
    }

    impl Scripted {
        fn new(responses: Vec<std::result::Result<Vec<u8>, NetworkError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: RefCell::new(0),
            }
        }
    }

    impl Fetch for Scripted {
        fn fetch(&self, url: &Url) -> std::result::Result<Vec<u8>, NetworkError> {
            *self.calls.borrow_mut() += 1;
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(NetworkError::Timeout { url: url.to_string() }))
        }
    }

    fn unavailable() -> NetworkError {
        NetworkError::Status {
            url: "http://example.com/oai".to_string(),
            status: 503,
            body: "Retry after 5 seconds".to_string(),
        }
    }

    fn url() -> Url {
        Url::parse("http://example.com/oai?verb=Identify").unwrap()
    }

    #[test]
    fn test_create_client() {
        assert!(create_client(&Options::default()).is_ok());
        assert!(create_client(&Options::default().with_bearer_token("t")).is_ok());
    }

    #[test]
    fn test_create_client_rejects_bad_header() {
        let options = Options::default().with_header("Bad Header", "x");
        assert!(matches!(
            create_client(&options),
            Err(HarvesterError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_retry_recovers() {
        let fetcher = Scripted::new(vec![Err(unavailable()), Ok(b"body".to_vec())]);
        let policy = RetryPolicy::new(1, Duration::from_millis(1));

        assert_eq!(fetch_with_retry(&fetcher, &url(), policy).unwrap(), b"body");
        assert_eq!(*fetcher.calls.borrow(), 2);
    }

    #[test]
    fn test_no_retries_fails_on_first_failure() {
        let fetcher = Scripted::new(vec![Err(unavailable()), Ok(b"body".to_vec())]);

        let err = fetch_with_retry(&fetcher, &url(), RetryPolicy::none()).unwrap_err();
        match err {
            HarvesterError::Network {
                attempts,
                source: NetworkError::Status { status, body, .. },
            } => {
                assert_eq!(attempts, 1);
                assert_eq!(status, 503);
                assert_eq!(body, "Retry after 5 seconds");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*fetcher.calls.borrow(), 1);
    }

    #[test]
    fn test_retries_exhausted() {
        let fetcher = Scripted::new(vec![Err(unavailable()), Err(unavailable()), Err(unavailable())]);
        let policy = RetryPolicy::new(2, Duration::from_millis(1));

        let err = fetch_with_retry(&fetcher, &url(), policy).unwrap_err();
        assert!(matches!(err, HarvesterError::Network { attempts: 3, .. }));
        assert_eq!(*fetcher.calls.borrow(), 3);
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(b"<OAI-PMH/>".to_vec(), &url()).unwrap(), "<OAI-PMH/>");
        assert_eq!(
            decode_body("<title>café</title>".as_bytes().to_vec(), &url()).unwrap(),
            "<title>café</title>"
        );
    }

    #[test]
    fn test_decode_body_rejects_latin1() {
        let err = decode_body(b"<identifier>caf\xe9</identifier>".to_vec(), &url()).unwrap_err();
        assert!(matches!(err, HarvesterError::InvalidEncoding { .. }));
        assert!(err.is_malformed_response());
    }
}
