//! Helpers for pulling names and attributes out of streaming XML events
//! and for re-serializing events as raw markup.

use std::borrow::Cow;

use quick_xml::events::{BytesEnd, BytesStart};

use crate::error::Result;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use quick_xml::events::BytesStart;
/// use oai_harvester::xml::get_tag_name;
///
/// let start = BytesStart::new("oai:record");
/// assert_eq!(get_tag_name(&start), "record");
/// ```
pub fn get_tag_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Get all attributes as `(local name, unescaped value)` pairs.
pub fn get_attributes(start: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    start
        .attributes()
        .map(|attr| -> Result<(String, String)> {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            Ok((name, value))
        })
        .collect()
}

/// Get an attribute value by local name.
///
/// # Returns
/// Attribute value, or `None` if not found
pub fn get_attribute(start: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    Ok(get_attributes(start)?
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value))
}

/// Raw source text of an event, exactly as it appeared in the document.
pub fn raw(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Append an opening (or self-closing) tag, prefixes and attribute quoting
/// preserved.
pub fn push_start_tag(markup: &mut String, start: &BytesStart<'_>, empty: bool) {
    markup.push('<');
    markup.push_str(&raw(start));
    markup.push_str(if empty { "/>" } else { ">" });
}

/// Append a closing tag.
pub fn push_end_tag(markup: &mut String, end: &BytesEnd<'_>) {
    markup.push_str("</");
    markup.push_str(&raw(end));
    markup.push('>');
}
