use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::errors::{TmxError, TmxResult};
use crate::xml::{self, XmlReader};

/// Custom data attached to almost any element of the map.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Property {
    /// The name of the property.
    pub name: String,
    /// The declared type: string, int, float, bool, color or file. Empty
    /// means string.
    pub property_type: String,
    /// The value, kept as written; interpreting it is left to the consumer.
    pub value: String,
}

/// Parses a `<properties>` wrapper into its `<property>` children.
pub(crate) fn parse_properties(reader: &mut XmlReader<'_>) -> TmxResult<Vec<Property>> {
    let mut properties = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"property" => properties.push(parse_property(reader, &e)?),
                _ => xml::skip_element(reader, &e)?,
            },
            Event::End(_) => return Ok(properties),
            Event::Eof => return Err(TmxError::UnexpectedEof("properties")),
            _ => {}
        }
    }
}

fn parse_property(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<Property> {
    let mut property = Property::default();
    let mut has_value_attr = false;
    for attr in start.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"name" => property.name = xml::attr_string(&attr)?,
            b"type" => property.property_type = xml::attr_string(&attr)?,
            b"value" => {
                property.value = xml::attr_string(&attr)?;
                has_value_attr = true;
            }
            _ => {}
        }
    }
    // Multiline values are written as element text instead of an attribute.
    let text = xml::read_text_content(reader, "property")?;
    if !has_value_attr {
        property.value = text;
    }
    Ok(property)
}
