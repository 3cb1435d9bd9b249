use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::errors::{TmxError, TmxResult};
use crate::layer::{Group, ImageLayer, Layer};
use crate::object::ObjectGroup;
use crate::property::{Property, parse_properties};
use crate::reference::ParseContext;
use crate::tileset::Tileset;
use crate::xml::{self, XmlReader};

/// A parsed TMX map document.
#[derive(Clone, Debug, Serialize)]
pub struct Map {
    /// The TMX format version.
    pub version: String,
    /// The version of the editor that wrote the file.
    pub tiled_version: String,
    /// `orthogonal`, `isometric`, `staggered` or `hexagonal`.
    pub orientation: String,
    /// The order tiles are rendered in: `right-down` (the default),
    /// `right-up`, `left-down` or `left-up`.
    pub render_order: String,
    /// The width of the map in tiles.
    pub width: i32,
    /// The height of the map in tiles.
    pub height: i32,
    /// The width of a tile in pixels.
    pub tile_width: i32,
    /// The height of a tile in pixels.
    pub tile_height: i32,
    /// For hexagonal maps, the side length of the hexagons in pixels.
    pub hex_side_length: i32,
    /// For staggered and hexagonal maps, which axis is staggered: `x`
    /// or `y`.
    pub stagger_axis: String,
    /// For staggered and hexagonal maps, whether the `even` or `odd`
    /// rows/columns are shifted.
    pub stagger_index: String,
    /// The background color of the map, e.g. `#RRGGBB`.
    pub background_color: String,
    /// The next id available for a new object.
    pub next_object_id: u32,
    /// Whether the map grows without fixed bounds (chunked layers).
    pub infinite: bool,
    /// Custom properties of the map.
    pub properties: Vec<Property>,
    /// The tilesets of the map, with external references resolved.
    pub tilesets: Vec<Tileset>,
    /// Top-level tile layers, in document order.
    pub layers: Vec<Layer>,
    /// Top-level object groups, in document order.
    pub object_groups: Vec<ObjectGroup>,
    /// Top-level image layers, in document order.
    pub image_layers: Vec<ImageLayer>,
    /// Top-level layer groups, in document order.
    pub groups: Vec<Group>,
}

impl Default for Map {
    fn default() -> Self {
        Self {
            version: String::new(),
            tiled_version: String::new(),
            orientation: String::new(),
            render_order: "right-down".to_string(),
            width: 0,
            height: 0,
            tile_width: 0,
            tile_height: 0,
            hex_side_length: 0,
            stagger_axis: String::new(),
            stagger_index: String::new(),
            background_color: String::new(),
            next_object_id: 0,
            infinite: false,
            properties: Vec::new(),
            tilesets: Vec::new(),
            layers: Vec::new(),
            object_groups: Vec::new(),
            image_layers: Vec::new(),
            groups: Vec::new(),
        }
    }
}

impl Map {
    pub(crate) fn parse(
        reader: &mut XmlReader<'_>,
        start: &BytesStart<'_>,
        ctx: &ParseContext<'_>,
    ) -> TmxResult<Self> {
        let mut map = Self::default();
        for attr in start.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"version" => map.version = xml::attr_string(&attr)?,
                b"tiledversion" => map.tiled_version = xml::attr_string(&attr)?,
                b"orientation" => map.orientation = xml::attr_string(&attr)?,
                b"renderorder" => map.render_order = xml::attr_string(&attr)?,
                b"width" => map.width = xml::attr_parse("map", &attr)?,
                b"height" => map.height = xml::attr_parse("map", &attr)?,
                b"tilewidth" => map.tile_width = xml::attr_parse("map", &attr)?,
                b"tileheight" => map.tile_height = xml::attr_parse("map", &attr)?,
                b"hexsidelength" => map.hex_side_length = xml::attr_parse("map", &attr)?,
                b"staggeraxis" => map.stagger_axis = xml::attr_string(&attr)?,
                b"staggerindex" => map.stagger_index = xml::attr_string(&attr)?,
                b"backgroundcolor" => map.background_color = xml::attr_string(&attr)?,
                b"nextobjectid" => map.next_object_id = xml::attr_parse("map", &attr)?,
                b"infinite" => map.infinite = xml::attr_bool("map", &attr)?,
                _ => {}
            }
        }
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"properties" => map.properties = parse_properties(reader)?,
                    b"tileset" => map.tilesets.push(Tileset::parse(reader, &e, ctx)?),
                    b"layer" => map.layers.push(Layer::parse(reader, &e)?),
                    b"objectgroup" => {
                        map.object_groups.push(ObjectGroup::parse(reader, &e, ctx)?);
                    }
                    b"imagelayer" => map.image_layers.push(ImageLayer::parse(reader, &e)?),
                    b"group" => map.groups.push(Group::parse(reader, &e, ctx)?),
                    _ => xml::skip_element(reader, &e)?,
                },
                Event::End(_) => return Ok(map),
                Event::Eof => return Err(TmxError::UnexpectedEof("map")),
                _ => {}
            }
        }
    }
}
