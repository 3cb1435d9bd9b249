//! A parser for TMX map documents and their companion TSX tileset and
//! object-template files.
//!
//! The whole document tree is materialized in one pass: layer payloads are
//! decoded into [`TileCell`] grids via [`tmx_tile_utils`], and external
//! tileset/template references are resolved eagerly, consulting a
//! caller-provided [`PreloadCache`] before falling back to storage.
//! Reference paths always resolve against the directory of the top-level
//! document, regardless of how deeply the referencing node is nested.
//!
//! ```no_run
//! use tmx::{PreloadCache, parse_file};
//!
//! # fn main() -> Result<(), tmx::TmxError> {
//! let map = parse_file("maps/overworld.tmx", &PreloadCache::new())?;
//! println!("{}x{} tiles, {} layers", map.width, map.height, map.layers.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod data;
mod errors;
mod layer;
mod map;
mod object;
mod property;
mod reference;
mod template;
mod tileset;
mod wangset;
mod xml;

use std::path::Path;

pub use tmx_tile_utils::{
    CodecError, FLIP_DIAGONAL, FLIP_HORIZONTAL, FLIP_MASK, FLIP_VERTICAL, FlipFlags, GID_MASK,
    TileCell,
};

pub use crate::data::{Chunk, Data};
pub use crate::errors::{TmxError, TmxResult};
pub use crate::layer::{Group, ImageLayer, Layer};
pub use crate::map::Map;
pub use crate::object::{Object, ObjectGroup, Polygon, Polyline, Text};
pub use crate::property::Property;
pub use crate::reference::{PreloadCache, ReferenceKind};
pub use crate::template::Template;
pub use crate::tileset::{Frame, Grid, Image, ImageData, Terrain, Tile, TileOffset, Tileset};
pub use crate::wangset::{WangColor, WangSet, WangTile};

use crate::reference::ParseContext;

/// Parses a TMX document from raw bytes.
///
/// `base_dir` is the directory external references resolve against; it
/// applies at every nesting depth, so a template referenced from an
/// external tileset still resolves relative to the top-level document.
/// References found in `cache` are served from it instead of storage.
pub fn parse_document(
    bytes: &[u8],
    base_dir: impl AsRef<Path>,
    cache: &PreloadCache,
) -> TmxResult<Map> {
    let ctx = ParseContext {
        base_dir: base_dir.as_ref(),
        cache,
    };
    let text = std::str::from_utf8(bytes)?;
    let mut reader = xml::reader_from(text);
    let start = xml::root_start(&mut reader, "map")?;
    Map::parse(&mut reader, &start, &ctx)
}

/// Parses a TMX document from a file, resolving external references
/// against the file's directory.
pub fn parse_file(path: impl AsRef<Path>, cache: &PreloadCache) -> TmxResult<Map> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| TmxError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_document(&bytes, base_dir, cache)
}
