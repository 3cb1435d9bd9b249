//! Shared helpers for the hand-rolled pull parser.

use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use crate::errors::{TmxError, TmxResult};

pub(crate) type XmlReader<'a> = Reader<&'a [u8]>;

/// Creates a reader over a document. Self-closing elements are expanded so
/// every element arrives as a start/end pair; end-name checking stays on so
/// mismatched tags fail the parse.
pub(crate) fn reader_from(text: &str) -> XmlReader<'_> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().expand_empty_elements = true;
    reader
}

pub(crate) fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

pub(crate) fn attr_string(attr: &Attribute<'_>) -> TmxResult<String> {
    Ok(attr.unescape_value()?.into_owned())
}

/// Parses an attribute value with [`FromStr`], reporting the element,
/// attribute name and offending value on failure.
pub(crate) fn attr_parse<T: FromStr>(element: &'static str, attr: &Attribute<'_>) -> TmxResult<T> {
    let value = attr.unescape_value()?;
    value.parse().map_err(|_| TmxError::InvalidAttribute {
        element,
        attribute: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
        value: value.into_owned(),
    })
}

/// Parses a `0`/`1` flag attribute the way the format writes them.
pub(crate) fn attr_bool(element: &'static str, attr: &Attribute<'_>) -> TmxResult<bool> {
    let value = attr.unescape_value()?;
    match value.as_ref() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(TmxError::InvalidAttribute {
            element,
            attribute: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value: value.into_owned(),
        }),
    }
}

/// Consumes an element we do not model, children and all.
pub(crate) fn skip_element(reader: &mut XmlReader<'_>, e: &BytesStart<'_>) -> TmxResult<()> {
    trace!(element = %element_name(e), "skipping unrecognized element");
    reader.read_to_end(e.name())?;
    Ok(())
}

/// Scans past the XML prolog to the document's root element, which must be
/// the `expected` one.
pub(crate) fn root_start<'a>(
    reader: &mut XmlReader<'a>,
    expected: &'static str,
) -> TmxResult<BytesStart<'a>> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.name().as_ref() == expected.as_bytes() {
                    return Ok(e);
                }
                return Err(TmxError::UnexpectedRoot {
                    expected,
                    found: element_name(&e),
                });
            }
            Event::Eof => return Err(TmxError::UnexpectedEof(expected)),
            _ => {}
        }
    }
}

/// Collects the text content of the current element up to its end tag.
/// Child elements are skipped; text is unescaped but not trimmed.
pub(crate) fn read_text_content(
    reader: &mut XmlReader<'_>,
    element: &'static str,
) -> TmxResult<String> {
    let mut content = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => content.push_str(&t.unescape()?),
            Event::CData(t) => content.push_str(std::str::from_utf8(t.as_ref())?),
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(_) => return Ok(content),
            Event::Eof => return Err(TmxError::UnexpectedEof(element)),
            _ => {}
        }
    }
}
