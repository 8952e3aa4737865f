//! Field tables mapping element positions inside an item to item fields.
//!
//! Paths are relative to the item element, so `["header", "identifier"]`
//! inside a `record` is the record identifier. The empty path is the item
//! element itself.

use crate::datestamp::Datestamp;
use crate::error::Result;
use crate::types::{Header, Identify, MetadataFormat, Record, Set};

/// An item the response reader can build while streaming.
pub trait Fragment: Sized {
    /// Start a new item; collection fields start out empty.
    fn new(response_date: Option<Datestamp>) -> Self;

    /// Whether the element at `path` is kept as raw markup.
    fn is_opaque(_path: &[&str]) -> bool {
        false
    }

    /// Text content of the element at `path`, already trimmed and non-empty.
    fn text(&mut self, path: &[&str], text: String) -> Result<()>;

    /// Attribute on the element at `path`.
    fn attribute(&mut self, _path: &[&str], _name: &str, _value: &str) {}

    /// Raw inner markup of an opaque element at `path`.
    fn opaque(&mut self, _path: &[&str], _markup: String) {}
}

impl Fragment for Header {
    fn new(response_date: Option<Datestamp>) -> Self {
        Header::new(response_date)
    }

    fn text(&mut self, path: &[&str], text: String) -> Result<()> {
        match path {
            ["identifier"] => self.identifier = text,
            ["datestamp"] => self.datestamp = Some(Datestamp::parse(&text)?),
            ["setSpec"] => self.sets.push(text),
            _ => {}
        }
        Ok(())
    }

    fn attribute(&mut self, path: &[&str], name: &str, value: &str) {
        if path.is_empty() && name == "status" {
            self.status = Some(value.to_string());
        }
    }
}

impl Fragment for Record {
    fn new(response_date: Option<Datestamp>) -> Self {
        Record::new(response_date)
    }

    fn is_opaque(path: &[&str]) -> bool {
        matches!(path, ["metadata"] | ["about"])
    }

    fn text(&mut self, path: &[&str], text: String) -> Result<()> {
        match path {
            ["header", rest @ ..] => self.header.text(rest, text),
            _ => Ok(()),
        }
    }

    fn attribute(&mut self, path: &[&str], name: &str, value: &str) {
        if let ["header", rest @ ..] = path {
            self.header.attribute(rest, name, value);
        }
    }

    fn opaque(&mut self, path: &[&str], markup: String) {
        match path {
            ["metadata"] => self.metadata = Some(markup),
            ["about"] => self.about.push(markup),
            _ => {}
        }
    }
}

impl Fragment for Set {
    fn new(response_date: Option<Datestamp>) -> Self {
        Set::new(response_date)
    }

    fn is_opaque(path: &[&str]) -> bool {
        matches!(path, ["setDescription"])
    }

    fn text(&mut self, path: &[&str], text: String) -> Result<()> {
        match path {
            ["setSpec"] => self.spec = text,
            ["setName"] => self.name = text,
            _ => {}
        }
        Ok(())
    }

    fn opaque(&mut self, _path: &[&str], markup: String) {
        self.descriptions.push(markup);
    }
}

impl Fragment for MetadataFormat {
    fn new(response_date: Option<Datestamp>) -> Self {
        MetadataFormat::new(response_date)
    }

    fn text(&mut self, path: &[&str], text: String) -> Result<()> {
        match path {
            ["metadataPrefix"] => self.prefix = text,
            ["schema"] => self.schema = text,
            ["metadataNamespace"] => self.namespace = text,
            _ => {}
        }
        Ok(())
    }
}

impl Fragment for Identify {
    fn new(response_date: Option<Datestamp>) -> Self {
        Identify::new(response_date)
    }

    fn is_opaque(path: &[&str]) -> bool {
        matches!(path, ["description"])
    }

    fn text(&mut self, path: &[&str], text: String) -> Result<()> {
        match path {
            ["repositoryName"] => self.repository_name = text,
            ["baseURL"] => self.base_url = text,
            ["protocolVersion"] => self.protocol_version = text,
            ["adminEmail"] => self.admin_emails.push(text),
            ["earliestDatestamp"] => self.earliest_datestamp = Some(Datestamp::parse(&text)?),
            ["deletedRecord"] => self.deleted_record = text,
            ["granularity"] => self.granularity = text,
            ["compression"] => self.compression.push(text),
            _ => {}
        }
        Ok(())
    }

    fn opaque(&mut self, _path: &[&str], markup: String) {
        self.descriptions.push(markup);
    }
}
