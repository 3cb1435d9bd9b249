use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::errors::{TmxError, TmxResult};
use crate::object::ObjectGroup;
use crate::property::{Property, parse_properties};
use crate::reference::{ParseContext, resolve_tileset};
use crate::wangset::{WangSet, parse_wangsets};
use crate::xml::{self, XmlReader};

/// A catalog of tile definitions, either embedded in the map or stored in
/// an external TSX file referenced by `source`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Tileset {
    /// The first global tile id of this tileset: its position in the
    /// owning map's GID space.
    pub first_gid: u32,
    /// The path of the external TSX file, if any. When non-empty, every
    /// descriptive field below comes from that file.
    pub source: String,
    /// The name of the tileset.
    pub name: String,
    /// The (maximum) width of tiles in the tileset, in pixels.
    pub tile_width: i32,
    /// The (maximum) height of tiles in the tileset, in pixels.
    pub tile_height: i32,
    /// The spacing between tiles in the tileset image, in pixels.
    pub spacing: i32,
    /// The margin around the tiles in the tileset image, in pixels.
    pub margin: f64,
    /// The number of tiles in the tileset.
    pub tile_count: i32,
    /// The number of tile columns in the tileset.
    pub columns: i32,
    /// A drawing offset applied to every tile of this tileset.
    pub tile_offset: Option<TileOffset>,
    /// Grid rendering hints, only meaningful for isometric orientation.
    pub grid: Option<Grid>,
    /// Custom properties of the tileset.
    pub properties: Vec<Property>,
    /// The atlas image of the tileset.
    pub image: Option<Image>,
    /// Terrain types defined by the tileset.
    pub terrain_types: Vec<Terrain>,
    /// Per-tile records (metadata, per-tile images, collision shapes,
    /// animations).
    pub tiles: Vec<Tile>,
    /// Wang sets defined by the tileset.
    pub wang_sets: Vec<WangSet>,
}

/// An offset in pixels applied when drawing tiles from a tileset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TileOffset {
    pub x: f64,
    /// Positive is down.
    pub y: f64,
}

/// Grid rendering hints for terrain/collision overlays.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Grid {
    /// `orthogonal` or `isometric`.
    pub orientation: String,
    pub width: f64,
    pub height: f64,
}

/// A reference to an image file, or an embedded image.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Image {
    /// File-extension format tag, used together with [`Image::data`] for
    /// embedded images.
    pub format: String,
    /// The path of the image file. Empty for embedded images.
    pub source: String,
    /// A color treated as transparent, e.g. `#FF00FF`.
    pub transparent: String,
    /// The image width in pixels.
    pub width: f64,
    /// The image height in pixels.
    pub height: f64,
    /// The payload of an embedded image.
    pub data: Option<ImageData>,
}

/// The payload of an embedded image, kept as written; decoding it is left
/// to the consumer.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ImageData {
    /// The `encoding` attribute value, normally `base64`.
    pub encoding: String,
    /// The raw element text.
    pub content: String,
}

/// A terrain type.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Terrain {
    /// The name of the terrain type.
    pub name: String,
    /// The local id of the tile representing the terrain.
    pub tile: u32,
}

/// A single tile record within a tileset.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Tile {
    /// The local tile id within its tileset.
    pub id: u32,
    /// The type of the tile (`type` attribute).
    pub tile_type: String,
    /// Corner terrain indexes, comma-separated, as written.
    pub terrain: String,
    /// Relative probability for the terrain tool.
    pub probability: f64,
    /// Custom properties of the tile.
    pub properties: Vec<Property>,
    /// A per-tile image, for image-collection tilesets.
    pub image: Option<Image>,
    /// Collision shapes attached to the tile.
    pub object_groups: Vec<ObjectGroup>,
    /// Animation frames, in display order.
    pub animation: Vec<Frame>,
}

/// One frame of a tile animation.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct Frame {
    /// The local id of the tile shown during this frame.
    pub tile_id: u32,
    /// How long the frame is displayed, in milliseconds.
    pub duration: f64,
}

impl Tileset {
    pub(crate) fn parse(
        reader: &mut XmlReader<'_>,
        start: &BytesStart<'_>,
        ctx: &ParseContext<'_>,
    ) -> TmxResult<Self> {
        let mut tileset = Self::default();
        for attr in start.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"firstgid" => tileset.first_gid = xml::attr_parse("tileset", &attr)?,
                b"source" => tileset.source = xml::attr_string(&attr)?,
                b"name" => tileset.name = xml::attr_string(&attr)?,
                b"tilewidth" => tileset.tile_width = xml::attr_parse("tileset", &attr)?,
                b"tileheight" => tileset.tile_height = xml::attr_parse("tileset", &attr)?,
                b"spacing" => tileset.spacing = xml::attr_parse("tileset", &attr)?,
                b"margin" => tileset.margin = xml::attr_parse("tileset", &attr)?,
                b"tilecount" => tileset.tile_count = xml::attr_parse("tileset", &attr)?,
                b"columns" => tileset.columns = xml::attr_parse("tileset", &attr)?,
                _ => {}
            }
        }

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"tileoffset" => tileset.tile_offset = Some(parse_tile_offset(reader, &e)?),
                    b"grid" => tileset.grid = Some(parse_grid(reader, &e)?),
                    b"properties" => tileset.properties = parse_properties(reader)?,
                    b"image" => tileset.image = Some(Image::parse(reader, &e)?),
                    b"terraintypes" => tileset.terrain_types = parse_terrain_types(reader)?,
                    b"tile" => tileset.tiles.push(Tile::parse(reader, &e, ctx)?),
                    b"wangsets" => tileset.wang_sets = parse_wangsets(reader)?,
                    _ => xml::skip_element(reader, &e)?,
                },
                Event::End(_) => break,
                Event::Eof => return Err(TmxError::UnexpectedEof("tileset")),
                _ => {}
            }
        }

        if !tileset.source.is_empty() {
            let external = resolve_tileset(&tileset.source, ctx)?;
            tileset.apply_external(external);
        }
        Ok(tileset)
    }

    /// Overlays an external tileset onto this referencing node: every
    /// descriptive field is replaced wholesale; only `first_gid` (the
    /// node's position in the map's GID space) and the `source` string
    /// itself survive.
    fn apply_external(&mut self, external: Self) {
        self.name = external.name;
        self.tile_width = external.tile_width;
        self.tile_height = external.tile_height;
        self.spacing = external.spacing;
        self.margin = external.margin;
        self.tile_count = external.tile_count;
        self.columns = external.columns;
        self.tile_offset = external.tile_offset;
        self.grid = external.grid;
        self.properties = external.properties;
        self.image = external.image;
        self.terrain_types = external.terrain_types;
        self.tiles = external.tiles;
        self.wang_sets = external.wang_sets;
    }
}

impl Image {
    pub(crate) fn parse(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<Self> {
        let mut image = Self::default();
        for attr in start.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"format" => image.format = xml::attr_string(&attr)?,
                b"source" => image.source = xml::attr_string(&attr)?,
                b"trans" => image.transparent = xml::attr_string(&attr)?,
                b"width" => image.width = xml::attr_parse("image", &attr)?,
                b"height" => image.height = xml::attr_parse("image", &attr)?,
                _ => {}
            }
        }
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"data" => image.data = Some(parse_image_data(reader, &e)?),
                    _ => xml::skip_element(reader, &e)?,
                },
                Event::End(_) => return Ok(image),
                Event::Eof => return Err(TmxError::UnexpectedEof("image")),
                _ => {}
            }
        }
    }
}

fn parse_image_data(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<ImageData> {
    let mut data = ImageData::default();
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"encoding" {
            data.encoding = xml::attr_string(&attr)?;
        }
    }
    data.content = xml::read_text_content(reader, "data")?;
    Ok(data)
}

impl Tile {
    fn parse(
        reader: &mut XmlReader<'_>,
        start: &BytesStart<'_>,
        ctx: &ParseContext<'_>,
    ) -> TmxResult<Self> {
        let mut tile = Self::default();
        for attr in start.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"id" => tile.id = xml::attr_parse("tile", &attr)?,
                b"type" => tile.tile_type = xml::attr_string(&attr)?,
                b"terrain" => tile.terrain = xml::attr_string(&attr)?,
                b"probability" => tile.probability = xml::attr_parse("tile", &attr)?,
                _ => {}
            }
        }

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"properties" => tile.properties = parse_properties(reader)?,
                    b"image" => tile.image = Some(Image::parse(reader, &e)?),
                    b"objectgroup" => {
                        tile.object_groups.push(ObjectGroup::parse(reader, &e, ctx)?);
                    }
                    b"animation" => tile.animation = parse_animation(reader)?,
                    _ => xml::skip_element(reader, &e)?,
                },
                Event::End(_) => return Ok(tile),
                Event::Eof => return Err(TmxError::UnexpectedEof("tile")),
                _ => {}
            }
        }
    }
}

fn parse_tile_offset(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<TileOffset> {
    let mut offset = TileOffset::default();
    for attr in start.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"x" => offset.x = xml::attr_parse("tileoffset", &attr)?,
            b"y" => offset.y = xml::attr_parse("tileoffset", &attr)?,
            _ => {}
        }
    }
    reader.read_to_end(start.name())?;
    Ok(offset)
}

fn parse_grid(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<Grid> {
    let mut grid = Grid::default();
    for attr in start.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"orientation" => grid.orientation = xml::attr_string(&attr)?,
            b"width" => grid.width = xml::attr_parse("grid", &attr)?,
            b"height" => grid.height = xml::attr_parse("grid", &attr)?,
            _ => {}
        }
    }
    reader.read_to_end(start.name())?;
    Ok(grid)
}

fn parse_terrain_types(reader: &mut XmlReader<'_>) -> TmxResult<Vec<Terrain>> {
    let mut terrains = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"terrain" => {
                    let mut terrain = Terrain::default();
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"name" => terrain.name = xml::attr_string(&attr)?,
                            b"tile" => terrain.tile = xml::attr_parse("terrain", &attr)?,
                            _ => {}
                        }
                    }
                    reader.read_to_end(e.name())?;
                    terrains.push(terrain);
                }
                _ => xml::skip_element(reader, &e)?,
            },
            Event::End(_) => return Ok(terrains),
            Event::Eof => return Err(TmxError::UnexpectedEof("terraintypes")),
            _ => {}
        }
    }
}

fn parse_animation(reader: &mut XmlReader<'_>) -> TmxResult<Vec<Frame>> {
    let mut frames = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"frame" => {
                    let mut frame = Frame::default();
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"tileid" => frame.tile_id = xml::attr_parse("frame", &attr)?,
                            b"duration" => frame.duration = xml::attr_parse("frame", &attr)?,
                            _ => {}
                        }
                    }
                    reader.read_to_end(e.name())?;
                    frames.push(frame);
                }
                _ => xml::skip_element(reader, &e)?,
            },
            Event::End(_) => return Ok(frames),
            Event::Eof => return Err(TmxError::UnexpectedEof("animation")),
            _ => {}
        }
    }
}
