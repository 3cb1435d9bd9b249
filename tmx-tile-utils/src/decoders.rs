//! Buffer-in/buffer-out decompression helpers for tile-grid payloads.
//!
//! The TMX format only ever compresses with zlib or gzip, so these are the
//! only two decoders. Both consume the whole input and return the
//! decompressed bytes; corrupt streams surface as [`std::io::Error`].

use std::io::Read as _;

use flate2::read::{GzDecoder, ZlibDecoder};

pub fn decode_zlib(data: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

pub fn decode_gzip(data: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}
