use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::errors::{TmxError, TmxResult};
use crate::object::Object;
use crate::reference::ParseContext;
use crate::tileset::Tileset;
use crate::xml::{self, XmlReader};

/// An object template: a reusable object definition stored in its own
/// file, referenced by `<object template="…">` nodes. Only the first
/// object of a template is inherited from.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Template {
    /// Tilesets referenced by the template's objects.
    pub tilesets: Vec<Tileset>,
    /// The objects defined by the template.
    pub objects: Vec<Object>,
}

impl Template {
    pub(crate) fn parse(
        reader: &mut XmlReader<'_>,
        _start: &BytesStart<'_>,
        ctx: &ParseContext<'_>,
    ) -> TmxResult<Self> {
        let mut template = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"tileset" => template.tilesets.push(Tileset::parse(reader, &e, ctx)?),
                    b"object" => template.objects.push(Object::parse(reader, &e, ctx)?),
                    _ => xml::skip_element(reader, &e)?,
                },
                Event::End(_) => return Ok(template),
                Event::Eof => return Err(TmxError::UnexpectedEof("template")),
                _ => {}
            }
        }
    }
}
