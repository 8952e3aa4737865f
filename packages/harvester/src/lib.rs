//! OAI-PMH Harvester - Stream metadata from OAI-PMH repositories.
//!
//! This crate issues OAI-PMH requests, reads each response as a stream of
//! XML events and follows resumption tokens so that an arbitrarily long list
//! is consumed as one lazy iterator.
//!
//! # Example
//!
//! ```
//! use oai_harvester::{read_response, Record, Verb};
//!
//! let body = r#"<OAI-PMH>
//!   <responseDate>2017-05-05T14:48:37Z</responseDate>
//!   <ListRecords>
//!     <record>
//!       <header><identifier>oai:example:1</identifier></header>
//!       <metadata><dc>Title</dc></metadata>
//!     </record>
//!   </ListRecords>
//! </OAI-PMH>"#;
//!
//! let response = read_response::<Record>(body, Verb::ListRecords)?;
//! assert_eq!(response.items[0].identifier(), "oai:example:1");
//! assert_eq!(response.items[0].metadata.as_deref(), Some("<dc>Title</dc>"));
//! # Ok::<(), oai_harvester::HarvesterError>(())
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants, request options and validation
//! - [`error`]: Error taxonomy and Result alias
//! - [`datestamp`]: Day and second granularity datestamps
//! - [`types`]: Harvested fragments (Record, Header, Set, ...)
//! - [`fragment`]: Field tables mapping element paths onto fragments
//! - [`xml`]: Streaming response reader
//! - [`http`]: HTTP transport with retries
//! - [`arguments`]: Selective-harvesting arguments
//! - [`paginator`]: Resumption-token flow control
//! - [`repository`]: One method per protocol verb
//! - [`cli`]: Command-line interface

pub mod arguments;
pub mod cli;
pub mod config;
pub mod datestamp;
pub mod error;
pub mod fragment;
pub mod http;
pub mod paginator;
pub mod repository;
pub mod types;
pub mod xml;

// Re-export commonly used items
pub use arguments::Arguments;
pub use config::{Options, RetryPolicy};
pub use datestamp::Datestamp;
pub use error::{ErrorKind, HarvesterError, NetworkError, ProtocolError, Result};
pub use fragment::Fragment;
pub use http::{Fetch, ReqwestFetcher};
pub use paginator::{Items, Paginator};
pub use repository::Repository;
pub use types::{Header, Identify, MetadataFormat, Record, Set, Verb};
pub use xml::{read_response, Response, ResponseReader};
