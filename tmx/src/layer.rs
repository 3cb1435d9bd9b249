use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::data::Data;
use crate::errors::{TmxError, TmxResult};
use crate::object::ObjectGroup;
use crate::property::{Property, parse_properties};
use crate::reference::ParseContext;
use crate::tileset::Image;
use crate::xml::{self, XmlReader};

/// A grid of tiles.
#[derive(Clone, Debug, Serialize)]
pub struct Layer {
    /// The name of the layer.
    pub name: String,
    /// The x coordinate of the layer in tiles.
    pub x: i32,
    /// The y coordinate of the layer in tiles.
    pub y: i32,
    /// The width of the layer in tiles.
    pub width: i32,
    /// The height of the layer in tiles.
    pub height: i32,
    /// The opacity of the layer, 0 to 1.
    pub opacity: f64,
    /// Whether the layer is shown.
    pub visible: bool,
    /// The rendering x offset in pixels.
    pub offset_x: f64,
    /// The rendering y offset in pixels.
    pub offset_y: f64,
    /// Custom properties of the layer.
    pub properties: Vec<Property>,
    /// The decoded tile content, absent when the layer has no `<data>`.
    pub data: Option<Data>,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            name: String::new(),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            opacity: 1.0,
            visible: true,
            offset_x: 0.0,
            offset_y: 0.0,
            properties: Vec::new(),
            data: None,
        }
    }
}

/// A layer consisting of a single image.
#[derive(Clone, Debug, Serialize)]
pub struct ImageLayer {
    /// The name of the image layer.
    pub name: String,
    /// The rendering x offset in pixels.
    pub offset_x: f64,
    /// The rendering y offset in pixels.
    pub offset_y: f64,
    /// The x position in pixels (deprecated in favor of the offset).
    pub x: f64,
    /// The y position in pixels (deprecated in favor of the offset).
    pub y: f64,
    /// The opacity of the layer, 0 to 1.
    pub opacity: f64,
    /// Whether the layer is shown.
    pub visible: bool,
    /// Custom properties of the layer.
    pub properties: Vec<Property>,
    /// The image shown by the layer.
    pub image: Option<Image>,
}

impl Default for ImageLayer {
    fn default() -> Self {
        Self {
            name: String::new(),
            offset_x: 0.0,
            offset_y: 0.0,
            x: 0.0,
            y: 0.0,
            opacity: 1.0,
            visible: true,
            properties: Vec::new(),
            image: None,
        }
    }
}

/// A named grouping of layers, applied recursively.
#[derive(Clone, Debug, Serialize)]
pub struct Group {
    /// The name of the group.
    pub name: String,
    /// The rendering x offset in pixels, applied to all descendants.
    pub offset_x: f64,
    /// The rendering y offset in pixels, applied to all descendants.
    pub offset_y: f64,
    /// The opacity of the group, multiplied into all descendants.
    pub opacity: f64,
    /// Whether the group is shown.
    pub visible: bool,
    /// Custom properties of the group.
    pub properties: Vec<Property>,
    /// Tile layers directly inside this group, in document order.
    pub layers: Vec<Layer>,
    /// Object groups directly inside this group, in document order.
    pub object_groups: Vec<ObjectGroup>,
    /// Image layers directly inside this group, in document order.
    pub image_layers: Vec<ImageLayer>,
    /// Nested groups, in document order.
    pub groups: Vec<Group>,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            name: String::new(),
            offset_x: 0.0,
            offset_y: 0.0,
            opacity: 1.0,
            visible: true,
            properties: Vec::new(),
            layers: Vec::new(),
            object_groups: Vec::new(),
            image_layers: Vec::new(),
            groups: Vec::new(),
        }
    }
}

impl Layer {
    pub(crate) fn parse(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<Self> {
        let mut layer = Self::default();
        for attr in start.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"name" => layer.name = xml::attr_string(&attr)?,
                b"x" => layer.x = xml::attr_parse("layer", &attr)?,
                b"y" => layer.y = xml::attr_parse("layer", &attr)?,
                b"width" => layer.width = xml::attr_parse("layer", &attr)?,
                b"height" => layer.height = xml::attr_parse("layer", &attr)?,
                b"opacity" => layer.opacity = xml::attr_parse("layer", &attr)?,
                b"visible" => layer.visible = xml::attr_bool("layer", &attr)?,
                b"offsetx" => layer.offset_x = xml::attr_parse("layer", &attr)?,
                b"offsety" => layer.offset_y = xml::attr_parse("layer", &attr)?,
                _ => {}
            }
        }
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"properties" => layer.properties = parse_properties(reader)?,
                    b"data" => layer.data = Some(Data::parse(reader, &e)?),
                    _ => xml::skip_element(reader, &e)?,
                },
                Event::End(_) => return Ok(layer),
                Event::Eof => return Err(TmxError::UnexpectedEof("layer")),
                _ => {}
            }
        }
    }
}

impl ImageLayer {
    pub(crate) fn parse(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<Self> {
        let mut layer = Self::default();
        for attr in start.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"name" => layer.name = xml::attr_string(&attr)?,
                b"offsetx" => layer.offset_x = xml::attr_parse("imagelayer", &attr)?,
                b"offsety" => layer.offset_y = xml::attr_parse("imagelayer", &attr)?,
                b"x" => layer.x = xml::attr_parse("imagelayer", &attr)?,
                b"y" => layer.y = xml::attr_parse("imagelayer", &attr)?,
                b"opacity" => layer.opacity = xml::attr_parse("imagelayer", &attr)?,
                b"visible" => layer.visible = xml::attr_bool("imagelayer", &attr)?,
                _ => {}
            }
        }
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"properties" => layer.properties = parse_properties(reader)?,
                    b"image" => layer.image = Some(Image::parse(reader, &e)?),
                    _ => xml::skip_element(reader, &e)?,
                },
                Event::End(_) => return Ok(layer),
                Event::Eof => return Err(TmxError::UnexpectedEof("imagelayer")),
                _ => {}
            }
        }
    }
}

impl Group {
    pub(crate) fn parse(
        reader: &mut XmlReader<'_>,
        start: &BytesStart<'_>,
        ctx: &ParseContext<'_>,
    ) -> TmxResult<Self> {
        let mut group = Self::default();
        for attr in start.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"name" => group.name = xml::attr_string(&attr)?,
                b"offsetx" => group.offset_x = xml::attr_parse("group", &attr)?,
                b"offsety" => group.offset_y = xml::attr_parse("group", &attr)?,
                b"opacity" => group.opacity = xml::attr_parse("group", &attr)?,
                b"visible" => group.visible = xml::attr_bool("group", &attr)?,
                _ => {}
            }
        }
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"properties" => group.properties = parse_properties(reader)?,
                    b"layer" => group.layers.push(Layer::parse(reader, &e)?),
                    b"objectgroup" => {
                        group.object_groups.push(ObjectGroup::parse(reader, &e, ctx)?);
                    }
                    b"imagelayer" => group.image_layers.push(ImageLayer::parse(reader, &e)?),
                    b"group" => group.groups.push(Self::parse(reader, &e, ctx)?),
                    _ => xml::skip_element(reader, &e)?,
                },
                Event::End(_) => return Ok(group),
                Event::Eof => return Err(TmxError::UnexpectedEof("group")),
                _ => {}
            }
        }
    }
}
