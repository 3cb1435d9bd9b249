use std::io::Write as _;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use criterion::{Criterion, criterion_group, criterion_main};
use tmx_tile_utils::{EncodedPayload, decode_tile_data};

fn grid(cells: usize) -> Vec<u32> {
    (0..cells as u32).map(|i| (i % 512) + 1).collect()
}

fn csv_payload(values: &[u32]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn base64_zlib_payload(values: &[u32]) -> String {
    let raw: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(&raw).unwrap();
    BASE64.encode(enc.finish().unwrap())
}

fn bench_decode(c: &mut Criterion) {
    let values = grid(256 * 256);
    let csv = csv_payload(&values);
    let zlib = base64_zlib_payload(&values);

    c.bench_function("decode csv 256x256", |b| {
        b.iter(|| {
            decode_tile_data(&EncodedPayload {
                encoding: "csv",
                compression: "",
                text: &csv,
            })
            .unwrap()
        });
    });

    c.bench_function("decode base64+zlib 256x256", |b| {
        b.iter(|| {
            decode_tile_data(&EncodedPayload {
                encoding: "base64",
                compression: "zlib",
                text: &zlib,
            })
            .unwrap()
        });
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
