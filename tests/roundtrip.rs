//! Integration tests exercising the public `write` API end-to-end, verifying
//! round-trip correctness against `miniz_oxide` rather than this crate's own
//! encoder (so a bug shared between encode and a self-check can't hide).

use std::io::Write;

use deflate::write::{DeflateEncoder, ZlibEncoder};

const LOREM: &[u8] = b"\
Call me Ishmael. Some years ago--never mind how long precisely--having \
little or no money in my purse, and nothing particular to interest me on \
shore, I thought I would sail about a little and see the watery part of \
the world. It is a way I have of driving off the spleen, and regulating \
the circulation. Whenever I find myself growing grim about the mouth; \
whenever it is a damp, drizzly November in my soul; whenever I find \
myself involuntarily pausing before coffin warehouses, and bringing up \
the rear of every funeral I meet; and especially whenever my hypos get \
such an upper hand of me, that it requires a strong moral principle to \
prevent me from deliberately stepping into the street, and methodically \
knocking people's hats off--then, I account it high time to get to sea \
as soon as I can.";

fn highly_compressible(len: usize) -> Vec<u8> {
    b"abcabcabcabc".iter().cycle().take(len).cloned().collect()
}

fn incompressible(len: usize) -> Vec<u8> {
    // A simple xorshift PRNG -- deterministic without pulling in `rand`.
    let mut state: u32 = 0x9e3779b9;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        })
        .collect()
}

fn roundtrip_deflate(data: &[u8], level: u8) {
    let mut encoder = DeflateEncoder::new(Vec::new(), level).unwrap();
    encoder.write_all(data).unwrap();
    let compressed = encoder.finish().unwrap();
    let decompressed = miniz_oxide::inflate::decompress_to_vec(&compressed)
        .expect("decompression failed");
    assert_eq!(decompressed, data, "level {}", level);
}

fn roundtrip_zlib(data: &[u8], level: u8) {
    let mut encoder = ZlibEncoder::new(Vec::new(), level).unwrap();
    encoder.write_all(data).unwrap();
    let compressed = encoder.finish().unwrap();
    let decompressed = miniz_oxide::inflate::decompress_to_vec_zlib(&compressed)
        .expect("decompression failed");
    assert_eq!(decompressed, data, "level {}", level);
}

#[test]
fn every_level_round_trips_text() {
    for level in 0..=9 {
        roundtrip_deflate(LOREM, level);
        roundtrip_zlib(LOREM, level);
    }
}

#[test]
fn every_level_round_trips_highly_compressible_data() {
    let data = highly_compressible(100_000);
    for level in 0..=9 {
        roundtrip_deflate(&data, level);
    }
}

#[test]
fn every_level_round_trips_incompressible_data() {
    let data = incompressible(50_000);
    for level in 0..=9 {
        roundtrip_deflate(&data, level);
    }
}

#[test]
fn empty_input_round_trips() {
    roundtrip_deflate(b"", 6);
    roundtrip_zlib(b"", 6);
}

#[test]
fn input_spanning_many_window_slides_round_trips() {
    // A few times the window size, so the encoder must slide repeatedly.
    let data = highly_compressible(400_000);
    roundtrip_deflate(&data, 6);
}

#[test]
fn writes_in_small_chunks_round_trip() {
    let mut encoder = DeflateEncoder::new(Vec::new(), 6).unwrap();
    for chunk in LOREM.chunks(7) {
        encoder.write_all(chunk).unwrap();
    }
    let compressed = encoder.finish().unwrap();
    let decompressed = miniz_oxide::inflate::decompress_to_vec(&compressed).unwrap();
    assert_eq!(decompressed, LOREM);
}

#[test]
fn reset_produces_independent_streams() {
    let mut encoder = DeflateEncoder::new(Vec::new(), 6).unwrap();
    encoder.write_all(b"first stream contents").unwrap();
    let first = encoder.reset(Vec::new()).unwrap();
    encoder.write_all(b"second, unrelated stream").unwrap();
    let second = encoder.finish().unwrap();

    assert_eq!(miniz_oxide::inflate::decompress_to_vec(&first).unwrap(),
               b"first stream contents");
    assert_eq!(miniz_oxide::inflate::decompress_to_vec(&second).unwrap(),
               b"second, unrelated stream");
}
