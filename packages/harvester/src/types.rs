//! Core data types for the harvester.
//!
//! These types represent the items a repository hands out for each verb.
//! Free-form sections (record metadata, about sections, set and repository
//! descriptions) are kept as raw markup and never interpreted.
//!
//! See <https://www.openarchives.org/OAI/openarchivesprotocol.html>

use std::fmt;

use serde::Serialize;

use crate::datestamp::Datestamp;

/// The six protocol requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Verb {
    Identify,
    ListMetadataFormats,
    ListSets,
    ListIdentifiers,
    ListRecords,
    GetRecord,
}

impl Verb {
    /// The `verb` query value, also the name of the response element.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identify => "Identify",
            Self::ListMetadataFormats => "ListMetadataFormats",
            Self::ListSets => "ListSets",
            Self::ListIdentifiers => "ListIdentifiers",
            Self::ListRecords => "ListRecords",
            Self::GetRecord => "GetRecord",
        }
    }

    /// Name of each item element below the verb element.
    ///
    /// `None` for `Identify`, whose response element is itself the item.
    #[must_use]
    pub fn item_element(&self) -> Option<&'static str> {
        match self {
            Self::Identify => None,
            Self::ListMetadataFormats => Some("metadataFormat"),
            Self::ListSets => Some("set"),
            Self::ListIdentifiers => Some("header"),
            Self::ListRecords | Self::GetRecord => Some("record"),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier, datestamp and set membership of an item.
///
/// See <https://www.openarchives.org/OAI/openarchivesprotocol.html#header>
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Header {
    pub identifier: String,

    /// Date of creation, modification or deletion.
    pub datestamp: Option<Datestamp>,

    /// Set specs this item belongs to.
    pub sets: Vec<String>,

    /// `deleted` when the item was withdrawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Date of the response this header came from.
    #[serde(skip)]
    pub response_date: Option<Datestamp>,
}

impl Header {
    #[must_use]
    pub fn new(response_date: Option<Datestamp>) -> Self {
        Self {
            response_date,
            ..Self::default()
        }
    }

    /// Whether the repository marked this item as deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.status.as_deref() == Some("deleted")
    }
}

/// Metadata for one item in one format.
///
/// See <https://www.openarchives.org/OAI/openarchivesprotocol.html#Record>
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Record {
    pub header: Header,

    /// Raw markup of the `metadata` section, absent for deleted records.
    pub metadata: Option<String>,

    /// Raw markup of each `about` section.
    pub about: Vec<String>,
}

impl Record {
    #[must_use]
    pub fn new(response_date: Option<Datestamp>) -> Self {
        Self {
            header: Header::new(response_date),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.header.identifier
    }

    #[must_use]
    pub fn datestamp(&self) -> Option<&Datestamp> {
        self.header.datestamp.as_ref()
    }

    #[must_use]
    pub fn sets(&self) -> &[String] {
        &self.header.sets
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.header.status.as_deref()
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.header.is_deleted()
    }

    #[must_use]
    pub fn response_date(&self) -> Option<&Datestamp> {
        self.header.response_date.as_ref()
    }
}

/// A grouping of items for selective harvesting.
///
/// See <https://www.openarchives.org/OAI/openarchivesprotocol.html#Set>
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Set {
    pub spec: String,
    pub name: String,

    /// Raw markup of each `setDescription`.
    pub descriptions: Vec<String>,

    #[serde(skip)]
    pub response_date: Option<Datestamp>,
}

impl Set {
    #[must_use]
    pub fn new(response_date: Option<Datestamp>) -> Self {
        Self {
            response_date,
            ..Self::default()
        }
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec)
    }
}

/// A metadata format supported by the repository.
///
/// See <https://www.openarchives.org/OAI/openarchivesprotocol.html#ListMetadataFormats>
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MetadataFormat {
    pub prefix: String,

    /// Location of the XML Schema for the format.
    pub schema: String,

    /// XML namespace URI of the format.
    pub namespace: String,

    #[serde(skip)]
    pub response_date: Option<Datestamp>,
}

impl MetadataFormat {
    #[must_use]
    pub fn new(response_date: Option<Datestamp>) -> Self {
        Self {
            response_date,
            ..Self::default()
        }
    }
}

impl fmt::Display for MetadataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)
    }
}

/// Information about a repository.
///
/// See <https://www.openarchives.org/OAI/openarchivesprotocol.html#Identify>
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Identify {
    pub repository_name: String,
    pub base_url: String,
    pub protocol_version: String,
    pub admin_emails: Vec<String>,

    /// Lower limit of all datestamps in the repository.
    pub earliest_datestamp: Option<Datestamp>,

    /// `no`, `transient` or `persistent`.
    pub deleted_record: String,

    /// Finest datestamp granularity the repository supports.
    pub granularity: String,
    pub compression: Vec<String>,

    /// Raw markup of each `description`.
    pub descriptions: Vec<String>,

    #[serde(skip)]
    pub response_date: Option<Datestamp>,
}

impl Identify {
    #[must_use]
    pub fn new(response_date: Option<Datestamp>) -> Self {
        Self {
            response_date,
            ..Self::default()
        }
    }
}
