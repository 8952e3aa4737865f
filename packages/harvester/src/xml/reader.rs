//! Streaming reader for one OAI-PMH response body.
//!
//! The reader walks the body event by event, keeping a stack of open
//! element names. Items are built from the elements directly below the
//! verb element; free-form sections inside an item are copied through as
//! raw markup without being interpreted. Alongside the items it picks up
//! the envelope values every response carries: `responseDate`, `error`
//! entries and the `resumptionToken`.
//!
//! ```text
//! <OAI-PMH>
//!   <responseDate>..</responseDate>
//!   <error code="..">..</error>
//!   <ListRecords>
//!     <record>..</record>
//!     <resumptionToken>..</resumptionToken>
//!   </ListRecords>
//! </OAI-PMH>
//! ```

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;

use crate::datestamp::Datestamp;
use crate::error::{HarvesterError, ProtocolError, Result};
use crate::fragment::Fragment;
use crate::types::Verb;
use crate::xml::utils::{
    get_attribute, get_attributes, get_tag_name, push_end_tag, push_start_tag, raw,
};

/// What the reader is doing with the current event.
enum Mode<T> {
    /// Outside any item.
    Envelope,
    /// Inside an item, extracting fields.
    Item(T),
    /// Copying raw markup until the element opened at `depth` closes.
    Opaque { item: T, depth: usize, markup: String },
}

/// Lazily yields the items of one response in document order.
///
/// The iterator ends after the first error. Envelope values are available
/// through the accessors once the part of the body holding them has been
/// read; after the iterator is exhausted they are final.
pub struct ResponseReader<'a, T> {
    reader: Reader<&'a [u8]>,
    verb: Verb,
    /// Stack length at which an item element sits.
    item_depth: usize,
    stack: Vec<String>,
    mode: Mode<T>,
    /// Text of the open elements; an element's text runs from its offset
    /// in `text_starts` to the end, so inline children stay part of it.
    text: String,
    text_starts: Vec<usize>,
    /// `code` attribute of the `error` element being read.
    error_code: Option<String>,
    response_date: Option<Datestamp>,
    errors: Vec<ProtocolError>,
    resumption_token: Option<String>,
    finished: bool,
}

impl<'a, T: Fragment> ResponseReader<'a, T> {
    pub fn new(body: &'a str, verb: Verb) -> Self {
        let item_depth = if verb.item_element().is_some() { 3 } else { 2 };

        Self {
            reader: Reader::from_str(body),
            verb,
            item_depth,
            stack: Vec::new(),
            mode: Mode::Envelope,
            text: String::new(),
            text_starts: Vec::new(),
            error_code: None,
            response_date: None,
            errors: Vec::new(),
            resumption_token: None,
            finished: false,
        }
    }

    #[must_use]
    pub fn response_date(&self) -> Option<&Datestamp> {
        self.response_date.as_ref()
    }

    /// Classified errors seen so far, in document order.
    #[must_use]
    pub fn errors(&self) -> &[ProtocolError] {
        &self.errors
    }

    /// The continuation token; empty tokens are reported as `None`.
    #[must_use]
    pub fn resumption_token(&self) -> Option<&str> {
        self.resumption_token.as_deref()
    }

    fn step(&mut self) -> Result<Option<T>> {
        match self.reader.read_event()? {
            Event::Start(start) => self.start(&start, false),
            Event::Empty(start) => self.start(&start, true),
            Event::End(end) => self.end(&end),
            Event::Text(text) => {
                if let Mode::Opaque { markup, .. } = &mut self.mode {
                    markup.push_str(&raw(&text));
                } else {
                    self.text.push_str(&text.unescape()?);
                }
                Ok(None)
            }
            Event::CData(data) => {
                if let Mode::Opaque { markup, .. } = &mut self.mode {
                    markup.push_str("<![CDATA[");
                    markup.push_str(&raw(&data));
                    markup.push_str("]]>");
                } else {
                    self.text.push_str(&raw(&data));
                }
                Ok(None)
            }
            Event::Comment(comment) => {
                if let Mode::Opaque { markup, .. } = &mut self.mode {
                    markup.push_str("<!--");
                    markup.push_str(&raw(&comment));
                    markup.push_str("-->");
                }
                Ok(None)
            }
            Event::PI(pi) => {
                if let Mode::Opaque { markup, .. } = &mut self.mode {
                    markup.push_str("<?");
                    markup.push_str(&raw(&pi));
                    markup.push_str("?>");
                }
                Ok(None)
            }
            Event::Decl(_) | Event::DocType(_) => Ok(None),
            Event::Eof => {
                self.finished = true;
                self.finish()?;
                Ok(None)
            }
        }
    }

    fn start(&mut self, start: &BytesStart<'_>, empty: bool) -> Result<Option<T>> {
        if let Mode::Opaque { markup, .. } = &mut self.mode {
            push_start_tag(markup, start, empty);
            if !empty {
                self.stack.push(get_tag_name(start));
            }
            return Ok(None);
        }

        self.stack.push(get_tag_name(start));
        self.open(start)?;

        if empty {
            self.close()
        } else {
            Ok(None)
        }
    }

    fn end(&mut self, end: &BytesEnd<'_>) -> Result<Option<T>> {
        if let Mode::Opaque { markup, depth, .. } = &mut self.mode {
            if self.stack.len() > *depth {
                push_end_tag(markup, end);
                self.stack.pop();
                return Ok(None);
            }
        }

        self.close()
    }

    /// Handle an element that was just pushed onto the stack.
    fn open(&mut self, start: &BytesStart<'_>) -> Result<()> {
        self.text_starts.push(self.text.len());

        match std::mem::replace(&mut self.mode, Mode::Envelope) {
            Mode::Envelope if self.at_item() => {
                let mut item = T::new(self.response_date);
                for (name, value) in get_attributes(start)? {
                    item.attribute(&[], &name, &value);
                }
                self.mode = Mode::Item(item);
            }
            Mode::Envelope => {
                if self.at(&["error"]) {
                    self.error_code = get_attribute(start, "code")?;
                }
            }
            Mode::Item(mut item) => {
                let path = relative_path(&self.stack, self.item_depth);
                if T::is_opaque(&path) {
                    self.mode = Mode::Opaque {
                        item,
                        depth: self.stack.len(),
                        markup: String::new(),
                    };
                } else {
                    for (name, value) in get_attributes(start)? {
                        item.attribute(&path, &name, &value);
                    }
                    self.mode = Mode::Item(item);
                }
            }
            mode @ Mode::Opaque { .. } => self.mode = mode,
        }

        Ok(())
    }

    /// Handle the close of the element on top of the stack, then pop it.
    fn close(&mut self) -> Result<Option<T>> {
        let start = self.text_starts.pop().unwrap_or_default();
        let text = self.text.get(start..).unwrap_or_default().trim().to_string();
        let mut emitted = None;

        match std::mem::replace(&mut self.mode, Mode::Envelope) {
            Mode::Opaque {
                mut item, markup, ..
            } => {
                let path = relative_path(&self.stack, self.item_depth);
                item.opaque(&path, markup.trim().to_string());
                self.mode = Mode::Item(item);
            }
            Mode::Item(item) if self.stack.len() == self.item_depth => {
                self.text.truncate(start);
                emitted = Some(item);
            }
            // Text stays in the buffer so an enclosing field sees it too.
            Mode::Item(mut item) => {
                if !text.is_empty() {
                    let path = relative_path(&self.stack, self.item_depth);
                    item.text(&path, text)?;
                }
                self.mode = Mode::Item(item);
            }
            Mode::Envelope => {
                self.text.truncate(start);
                self.close_envelope(&text)?;
            }
        }

        self.stack.pop();
        Ok(emitted)
    }

    fn close_envelope(&mut self, text: &str) -> Result<()> {
        if self.at(&["responseDate"]) {
            self.response_date = Some(Datestamp::parse(text)?);
        } else if self.at(&["error"]) {
            let code = self.error_code.take().unwrap_or_default();
            match ProtocolError::classify(&code, text) {
                Some(error) => self.errors.push(error),
                None => {
                    tracing::debug!(code = %code, detail = text, "Ignoring unrecognised error code");
                }
            }
        } else if self.at(&[self.verb.as_str(), "resumptionToken"]) && !text.is_empty() {
            self.resumption_token = Some(text.to_string());
        }
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        if let Some(open) = self.stack.last() {
            return Err(HarvesterError::Truncated(open.clone()));
        }
        if self.response_date.is_none() {
            return Err(HarvesterError::MissingElement {
                element: "responseDate".to_string(),
                context: "OAI-PMH response".to_string(),
            });
        }
        Ok(())
    }

    /// Whether the stack, below the root element, is exactly `path`.
    fn at(&self, path: &[&str]) -> bool {
        self.stack.len() == path.len() + 1
            && self.stack[1..]
                .iter()
                .map(String::as_str)
                .eq(path.iter().copied())
    }

    fn at_item(&self) -> bool {
        match self.verb.item_element() {
            Some(element) => self.at(&[self.verb.as_str(), element]),
            None => self.at(&[self.verb.as_str()]),
        }
    }
}

fn relative_path(stack: &[String], item_depth: usize) -> Vec<&str> {
    stack
        .get(item_depth..)
        .unwrap_or_default()
        .iter()
        .map(String::as_str)
        .collect()
}

impl<T: Fragment> Iterator for ResponseReader<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.step() {
                Ok(Some(item)) => return Some(Ok(item)),
                Ok(None) => {}
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

/// One fully read response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<T> {
    pub response_date: Datestamp,
    pub errors: Vec<ProtocolError>,
    pub resumption_token: Option<String>,
    pub items: Vec<T>,
}

impl<T> Response<T> {
    /// The items, or the first classified error if the repository reported any.
    pub fn into_items(self) -> Result<Vec<T>> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error.into()),
            None => Ok(self.items),
        }
    }
}

/// Read a complete response body.
///
/// Fails on bodies that are not well-formed or lack a `responseDate`;
/// classified errors are returned in the `Response` for the caller to act on.
pub fn read_response<T: Fragment>(body: &str, verb: Verb) -> Result<Response<T>> {
    let mut reader = ResponseReader::<T>::new(body, verb);
    let items = reader.by_ref().collect::<Result<Vec<T>>>()?;
    let response_date = reader
        .response_date
        .ok_or_else(|| HarvesterError::MissingElement {
            element: "responseDate".to_string(),
            context: "OAI-PMH response".to_string(),
        })?;

    Ok(Response {
        response_date,
        errors: reader.errors,
        resumption_token: reader.resumption_token,
        items,
    })
}
