//! The decoded form of a layer's `<data>` element and the dispatch into
//! the tile-data codec.

use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use tmx_tile_utils::{EncodedPayload, TileCell, decode_tile_data};

use crate::errors::{TmxError, TmxResult};
use crate::xml::{self, XmlReader};

/// The tile content of a layer: either one flat grid or a set of chunks,
/// never both.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Data {
    /// The decoded cells of the layer grid, row-major in payload order.
    /// Empty when the layer is chunked.
    pub tiles: Vec<TileCell>,
    /// Chunks for partitioned (infinite/streamed) layers. Empty for
    /// fixed-size layers.
    pub chunks: Vec<Chunk>,
}

/// A rectangular sub-region of a chunked layer, owning its own grid.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Chunk {
    /// The x coordinate of the chunk in tiles.
    pub x: i32,
    /// The y coordinate of the chunk in tiles.
    pub y: i32,
    /// The width of the chunk in tiles.
    pub width: i32,
    /// The height of the chunk in tiles.
    pub height: i32,
    /// The decoded cells of the chunk, row-major in payload order.
    pub tiles: Vec<TileCell>,
}

/// A chunk as read off the wire, before its payload is decoded.
struct RawChunk {
    chunk: Chunk,
    inline: Vec<TileCell>,
    text: String,
}

impl Data {
    pub(crate) fn parse(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<Self> {
        let mut encoding = String::new();
        let mut compression = String::new();
        for attr in start.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"encoding" => encoding = xml::attr_string(&attr)?,
                b"compression" => compression = xml::attr_string(&attr)?,
                _ => {}
            }
        }

        let mut inline = Vec::new();
        let mut raw_chunks = Vec::new();
        let mut text = String::new();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"tile" => inline.push(parse_inline_tile(reader, &e)?),
                    b"chunk" => raw_chunks.push(parse_raw_chunk(reader, &e)?),
                    _ => xml::skip_element(reader, &e)?,
                },
                Event::Text(t) => text.push_str(&t.unescape()?),
                Event::CData(t) => text.push_str(std::str::from_utf8(t.as_ref())?),
                Event::End(_) => break,
                Event::Eof => return Err(TmxError::UnexpectedEof("data")),
                _ => {}
            }
        }

        // Explicit per-tile elements take precedence over everything else;
        // chunks take precedence over the grid-level payload.
        if !inline.is_empty() {
            return Ok(Self {
                tiles: inline,
                chunks: Vec::new(),
            });
        }
        if !raw_chunks.is_empty() {
            let chunks = raw_chunks
                .into_iter()
                .map(|raw| raw.decode(&encoding, &compression))
                .collect::<TmxResult<Vec<Chunk>>>()?;
            return Ok(Self {
                tiles: Vec::new(),
                chunks,
            });
        }
        let tiles = decode_tile_data(&EncodedPayload {
            encoding: &encoding,
            compression: &compression,
            text: &text,
        })?;
        Ok(Self {
            tiles,
            chunks: Vec::new(),
        })
    }
}

impl RawChunk {
    fn decode(self, encoding: &str, compression: &str) -> TmxResult<Chunk> {
        let mut chunk = self.chunk;
        chunk.tiles = if self.inline.is_empty() {
            decode_tile_data(&EncodedPayload {
                encoding,
                compression,
                text: &self.text,
            })?
        } else {
            self.inline
        };
        Ok(chunk)
    }
}

/// Reads one `<tile gid="…"/>` child; an absent gid means "no tile".
fn parse_inline_tile(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<TileCell> {
    let mut raw = 0u32;
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"gid" {
            raw = xml::attr_parse("tile", &attr)?;
        }
    }
    reader.read_to_end(start.name())?;
    Ok(TileCell::from_raw(raw))
}

fn parse_raw_chunk(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<RawChunk> {
    let mut chunk = Chunk::default();
    for attr in start.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"x" => chunk.x = xml::attr_parse("chunk", &attr)?,
            b"y" => chunk.y = xml::attr_parse("chunk", &attr)?,
            b"width" => chunk.width = xml::attr_parse("chunk", &attr)?,
            b"height" => chunk.height = xml::attr_parse("chunk", &attr)?,
            _ => {}
        }
    }

    let mut inline = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"tile" => inline.push(parse_inline_tile(reader, &e)?),
                _ => xml::skip_element(reader, &e)?,
            },
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(t) => text.push_str(std::str::from_utf8(t.as_ref())?),
            Event::End(_) => break,
            Event::Eof => return Err(TmxError::UnexpectedEof("chunk")),
            _ => {}
        }
    }
    Ok(RawChunk {
        chunk,
        inline,
        text,
    })
}
