use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::errors::{TmxError, TmxResult};
use crate::xml::{self, XmlReader};

/// A wang set: a palette of corner/edge colors plus the tiles annotated
/// with them.
#[derive(Clone, Debug, Default, Serialize)]
pub struct WangSet {
    /// The name of the wang set.
    pub name: String,
    /// The local id of the tile representing the wang set.
    pub tile: u32,
    /// Colors usable on tile corners.
    pub corner_colors: Vec<WangColor>,
    /// Colors usable on tile edges.
    pub edge_colors: Vec<WangColor>,
    /// The annotated tiles.
    pub wang_tiles: Vec<WangTile>,
}

/// A corner or edge color of a wang set.
#[derive(Clone, Debug, Default, Serialize)]
pub struct WangColor {
    /// The name of this color.
    pub name: String,
    /// The color in `#RRGGBB` format.
    pub color: String,
    /// The local id of the tile representing this color.
    pub tile: u32,
    /// The relative probability that this color is chosen.
    pub probability: f64,
}

/// A tile annotated with a wang id.
#[derive(Clone, Debug, Default, Serialize)]
pub struct WangTile {
    /// The local tile id.
    pub tile_id: u32,
    /// The wang id in `0xCECECECE` form, kept as written so consumers can
    /// pick their own representation.
    pub wang_id: String,
}

pub(crate) fn parse_wangsets(reader: &mut XmlReader<'_>) -> TmxResult<Vec<WangSet>> {
    let mut sets = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"wangset" => sets.push(parse_wangset(reader, &e)?),
                _ => xml::skip_element(reader, &e)?,
            },
            Event::End(_) => return Ok(sets),
            Event::Eof => return Err(TmxError::UnexpectedEof("wangsets")),
            _ => {}
        }
    }
}

fn parse_wangset(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<WangSet> {
    let mut set = WangSet::default();
    for attr in start.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"name" => set.name = xml::attr_string(&attr)?,
            b"tile" => set.tile = xml::attr_parse("wangset", &attr)?,
            _ => {}
        }
    }
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"wangcornercolor" => set.corner_colors.push(parse_wang_color(reader, &e)?),
                b"wangedgecolor" => set.edge_colors.push(parse_wang_color(reader, &e)?),
                b"wangtile" => set.wang_tiles.push(parse_wang_tile(reader, &e)?),
                _ => xml::skip_element(reader, &e)?,
            },
            Event::End(_) => return Ok(set),
            Event::Eof => return Err(TmxError::UnexpectedEof("wangset")),
            _ => {}
        }
    }
}

fn parse_wang_color(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<WangColor> {
    let mut color = WangColor::default();
    for attr in start.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"name" => color.name = xml::attr_string(&attr)?,
            b"color" => color.color = xml::attr_string(&attr)?,
            b"tile" => color.tile = xml::attr_parse("wangcolor", &attr)?,
            b"probability" => color.probability = xml::attr_parse("wangcolor", &attr)?,
            _ => {}
        }
    }
    reader.read_to_end(start.name())?;
    Ok(color)
}

fn parse_wang_tile(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<WangTile> {
    let mut tile = WangTile::default();
    for attr in start.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"tileid" => tile.tile_id = xml::attr_parse("wangtile", &attr)?,
            b"wangid" => tile.wang_id = xml::attr_string(&attr)?,
            _ => {}
        }
    }
    reader.read_to_end(start.name())?;
    Ok(tile)
}
