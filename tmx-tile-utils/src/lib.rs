//! Utilities for decoding the packed tile-grid payloads of TMX maps.
//!
//! A tile layer stores its grid as one payload: either comma-separated
//! decimal cells or base64-encoded little-endian 32-bit words, the latter
//! optionally zlib- or gzip-compressed. Every cell is a 32-bit word whose
//! top three bits carry the flip flags and whose remaining 29 bits carry
//! the global tile id (GID). [`decode_tile_data`] turns such a payload
//! into a flat sequence of [`TileCell`]s; the flag/GID split itself lives
//! in [`TileCell::from_raw`] so both input paths share it.

#![forbid(unsafe_code)]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

mod decoders;

pub use decoders::{decode_gzip, decode_zlib};

/// Bit flag for a horizontally flipped tile.
pub const FLIP_HORIZONTAL: u32 = 0x8000_0000;
/// Bit flag for a vertically flipped tile.
pub const FLIP_VERTICAL: u32 = 0x4000_0000;
/// Bit flag for a diagonally flipped tile (used for rotations).
pub const FLIP_DIAGONAL: u32 = 0x2000_0000;
/// Mask covering all three flip flags.
pub const FLIP_MASK: u32 = FLIP_HORIZONTAL | FLIP_VERTICAL | FLIP_DIAGONAL;
/// Mask extracting the global tile id from a raw cell word.
pub const GID_MASK: u32 = !FLIP_MASK;

/// Errors that can occur while decoding a tile-grid payload.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// The `encoding` tag is neither `csv` nor `base64`.
    #[error("unknown tile data encoding {0:?}")]
    UnknownEncoding(String),

    /// The `compression` tag is neither empty, `zlib` nor `gzip`.
    #[error("unknown tile data compression {0:?}")]
    UnknownCompression(String),

    /// The payload text is not valid standard base64.
    #[error("tile data is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// A CSV field is empty or not an unsigned 32-bit decimal integer.
    #[error("tile data cell {0:?} is not an unsigned 32-bit integer")]
    InvalidCellToken(String),

    /// A CSV payload contained no records at all.
    #[error("tile data payload contains no cells")]
    EmptyPayload,

    /// The compressed stream could not be decompressed.
    #[error("corrupt {0} stream in tile data: {1}")]
    DecompressionError(Compression, #[source] std::io::Error),

    /// The binary word stream ended in the middle of a 32-bit word.
    #[error("tile data stream ended mid-word with {0} trailing byte(s)")]
    StreamError(usize),
}

/// How a tile-grid payload encodes its cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Encoding {
    /// Comma-separated decimal cells, one record per line.
    Csv,
    /// Standard base64 over a little-endian 32-bit word stream.
    Base64,
}

impl Encoding {
    /// Parses the `encoding` attribute value. Anything other than the two
    /// known tags is rejected, never silently ignored.
    pub fn parse(value: &str) -> Result<Self, CodecError> {
        match value {
            "csv" => Ok(Self::Csv),
            "base64" => Ok(Self::Base64),
            other => Err(CodecError::UnknownEncoding(other.to_string())),
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Base64 => "base64",
        })
    }
}

/// How a base64 payload is compressed. CSV payloads are never compressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Compression {
    /// No compression; the decoded bytes are the word stream.
    Uncompressed,
    Zlib,
    Gzip,
}

impl Compression {
    /// Parses the `compression` attribute value; an absent attribute maps
    /// to the empty string and means uncompressed.
    pub fn parse(value: &str) -> Result<Self, CodecError> {
        match value {
            "" => Ok(Self::Uncompressed),
            "zlib" => Ok(Self::Zlib),
            "gzip" => Ok(Self::Gzip),
            other => Err(CodecError::UnknownCompression(other.to_string())),
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Uncompressed => "uncompressed",
            Self::Zlib => "zlib",
            Self::Gzip => "gzip",
        })
    }
}

/// The orientation flags carried by a single cell word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FlipFlags(u32);

impl FlipFlags {
    /// Keeps only the three flag bits of `bits`.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & FLIP_MASK)
    }

    /// The raw flag bits, already masked.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn horizontal(self) -> bool {
        self.0 & FLIP_HORIZONTAL != 0
    }

    #[must_use]
    pub const fn vertical(self) -> bool {
        self.0 & FLIP_VERTICAL != 0
    }

    #[must_use]
    pub const fn diagonal(self) -> bool {
        self.0 & FLIP_DIAGONAL != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// One decoded cell of a tile grid.
///
/// `gid == 0` conventionally means "no tile here"; the codec neither
/// enforces nor interprets that, it is left to the consumer.
///
/// # Examples
///
/// ```
/// use tmx_tile_utils::{FLIP_VERTICAL, TileCell};
///
/// let cell = TileCell::from_raw(235 | FLIP_VERTICAL);
/// assert_eq!(cell.gid, 235);
/// assert!(cell.flags.vertical());
/// assert!(!cell.flags.horizontal());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TileCell {
    /// The cell word exactly as stored in the payload.
    pub raw: u32,
    /// The global tile id, i.e. `raw` with the flip bits cleared.
    pub gid: u32,
    /// The flip flags present on this cell.
    pub flags: FlipFlags,
}

impl TileCell {
    /// Splits a raw cell word into GID and flip flags.
    ///
    /// This is the only place the split happens; both the CSV and the
    /// binary decode paths go through it.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            raw,
            gid: raw & GID_MASK,
            flags: FlipFlags::from_bits(raw),
        }
    }
}

/// A tile-grid payload as found in the document: the two attribute tags,
/// still unvalidated, plus the element text.
#[derive(Clone, Copy, Debug)]
pub struct EncodedPayload<'a> {
    /// The `encoding` attribute value, or `""` when absent.
    pub encoding: &'a str,
    /// The `compression` attribute value, or `""` when absent.
    pub compression: &'a str,
    /// The raw element text.
    pub text: &'a str,
}

/// Decodes a tile-grid payload into its ordered cell sequence.
///
/// Cells come out in the payload's own traversal order (row-major); no
/// reordering is performed. The `compression` tag is ignored for CSV
/// payloads.
///
/// # Examples
///
/// ```
/// use tmx_tile_utils::{EncodedPayload, decode_tile_data};
///
/// let payload = EncodedPayload { encoding: "csv", compression: "", text: "1,2,3" };
/// let cells = decode_tile_data(&payload)?;
/// assert_eq!(cells.iter().map(|c| c.gid).collect::<Vec<_>>(), [1, 2, 3]);
/// # Ok::<(), tmx_tile_utils::CodecError>(())
/// ```
pub fn decode_tile_data(payload: &EncodedPayload<'_>) -> Result<Vec<TileCell>, CodecError> {
    match Encoding::parse(payload.encoding)? {
        Encoding::Csv => decode_csv(payload.text),
        Encoding::Base64 => {
            let bytes = BASE64.decode(payload.text.trim())?;
            let words = match Compression::parse(payload.compression)? {
                Compression::Uncompressed => bytes,
                Compression::Zlib => decode_zlib(&bytes)
                    .map_err(|e| CodecError::DecompressionError(Compression::Zlib, e))?,
                Compression::Gzip => decode_gzip(&bytes)
                    .map_err(|e| CodecError::DecompressionError(Compression::Gzip, e))?,
            };
            read_word_stream(&words)
        }
    }
}

fn decode_csv(text: &str) -> Result<Vec<TileCell>, CodecError> {
    let mut cells = Vec::new();
    let mut records = 0usize;
    for record in text.trim().lines() {
        if record.is_empty() {
            continue;
        }
        records += 1;
        let fields: Vec<&str> = record.split(',').collect();
        let last = fields.len() - 1;
        for (i, field) in fields.iter().enumerate() {
            // Tiled ends every line of a grid with a comma except the very
            // last one; the resulting empty trailing field is dropped. Any
            // other empty field is a real error.
            if field.is_empty() && i == last {
                continue;
            }
            let raw: u32 = field
                .parse()
                .map_err(|_| CodecError::InvalidCellToken((*field).to_string()))?;
            cells.push(TileCell::from_raw(raw));
        }
    }
    if records == 0 {
        return Err(CodecError::EmptyPayload);
    }
    Ok(cells)
}

fn read_word_stream(bytes: &[u8]) -> Result<Vec<TileCell>, CodecError> {
    let words = bytes.chunks_exact(4);
    let trailing = words.remainder().len();
    if trailing != 0 {
        return Err(CodecError::StreamError(trailing));
    }
    Ok(words
        .map(|w| TileCell::from_raw(u32::from_le_bytes([w[0], w[1], w[2], w[3]])))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use rstest::rstest;

    use super::*;

    const NINE_GIDS: [u32; 9] = [235, 236, 237, 247, 356, 282, 323, 324, 273];

    fn words_le(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn base64_payload(values: &[u32], compression: &str) -> String {
        let raw = words_le(values);
        let bytes = match compression {
            "" => raw,
            "zlib" => {
                let mut enc =
                    flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                enc.write_all(&raw).unwrap();
                enc.finish().unwrap()
            }
            "gzip" => {
                let mut enc =
                    flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
                enc.write_all(&raw).unwrap();
                enc.finish().unwrap()
            }
            other => panic!("unexpected compression {other}"),
        };
        BASE64.encode(bytes)
    }

    fn decode(encoding: &str, compression: &str, text: &str) -> Result<Vec<TileCell>, CodecError> {
        decode_tile_data(&EncodedPayload {
            encoding,
            compression,
            text,
        })
    }

    #[rstest]
    #[case(0)]
    #[case(235)]
    #[case(235 | FLIP_HORIZONTAL)]
    #[case(236 | FLIP_VERTICAL | FLIP_DIAGONAL)]
    #[case(u32::MAX)]
    fn split_round_trips(#[case] raw: u32) {
        let cell = TileCell::from_raw(raw);
        assert_eq!(cell.gid | cell.flags.bits(), raw);
        assert_eq!(cell.gid & FLIP_MASK, 0);
        assert_eq!(cell.raw, raw);
    }

    #[test]
    fn csv_decodes_in_order() {
        let cells = decode("csv", "", "235,236,237,247,356,282,323,324,273").unwrap();
        let raws: Vec<u32> = cells.iter().map(|c| c.raw).collect();
        assert_eq!(raws, NINE_GIDS);
    }

    #[rstest]
    #[case("")]
    #[case("zlib")]
    #[case("gzip")]
    fn base64_matches_csv(#[case] compression: &str) {
        let text = base64_payload(&NINE_GIDS, compression);
        let cells = decode("base64", compression, &text).unwrap();
        let raws: Vec<u32> = cells.iter().map(|c| c.raw).collect();
        assert_eq!(raws, NINE_GIDS);
    }

    #[test]
    fn csv_trailing_comma_is_tolerated() {
        let cells = decode("csv", "", "1,2,3,").unwrap();
        assert_eq!(cells.len(), 3);

        let cells = decode("csv", "", "1,2,3,\n4,5,6").unwrap();
        assert_eq!(cells.iter().map(|c| c.gid).collect::<Vec<_>>(), [
            1, 2, 3, 4, 5, 6
        ]);
    }

    #[test]
    fn csv_interior_empty_field_is_an_error() {
        let err = decode("csv", "", "1,,3").unwrap_err();
        assert!(matches!(err, CodecError::InvalidCellToken(f) if f.is_empty()));
    }

    #[test]
    fn csv_non_numeric_field_is_an_error() {
        let err = decode("csv", "", "1,two,3").unwrap_err();
        assert!(matches!(err, CodecError::InvalidCellToken(f) if f == "two"));
    }

    #[test]
    fn flip_flags_are_split_out() {
        let text = format!("{}", 235 | FLIP_VERTICAL | FLIP_DIAGONAL);
        let cells = decode("csv", "", &text).unwrap();
        assert_eq!(cells[0].gid, 235);
        assert!(cells[0].flags.vertical());
        assert!(cells[0].flags.diagonal());
        assert!(!cells[0].flags.horizontal());
        assert_eq!(cells[0].flags.bits(), FLIP_VERTICAL | FLIP_DIAGONAL);
    }

    #[test]
    fn empty_csv_payload_is_an_error() {
        assert!(matches!(
            decode("csv", "", "   \n  ").unwrap_err(),
            CodecError::EmptyPayload
        ));
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let err = decode("base85", "", "1,2,3").unwrap_err();
        assert!(matches!(err, CodecError::UnknownEncoding(e) if e == "base85"));
    }

    #[test]
    fn unknown_compression_is_rejected() {
        let text = base64_payload(&NINE_GIDS, "");
        let err = decode("base64", "zstd", &text).unwrap_err();
        assert!(matches!(err, CodecError::UnknownCompression(c) if c == "zstd"));
    }

    #[test]
    fn csv_ignores_the_compression_tag() {
        assert!(decode("csv", "zstd", "1,2,3").is_ok());
    }

    #[test]
    fn malformed_base64_is_an_error() {
        let err = decode("base64", "", "@@not base64@@").unwrap_err();
        assert!(matches!(err, CodecError::InvalidEncoding(_)));
    }

    #[rstest]
    #[case("zlib")]
    #[case("gzip")]
    fn corrupt_stream_is_an_error(#[case] compression: &str) {
        // Valid base64 over bytes that are not a valid compressed stream.
        let text = BASE64.encode([0xDEu8, 0xAD, 0xBE, 0xEF, 0x00, 0x01]);
        let err = decode("base64", compression, &text).unwrap_err();
        assert!(matches!(err, CodecError::DecompressionError(_, _)));
    }

    #[test]
    fn truncated_word_stream_is_an_error() {
        let mut bytes = words_le(&[1, 2]);
        bytes.push(0x07);
        let text = BASE64.encode(bytes);
        let err = decode("base64", "", &text).unwrap_err();
        assert!(matches!(err, CodecError::StreamError(1)));
    }

    #[test]
    fn empty_binary_payload_is_an_empty_grid() {
        let cells = decode("base64", "", "").unwrap();
        assert!(cells.is_empty());
    }
}
