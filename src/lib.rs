//! A DEFLATE (RFC 1951) and zlib (RFC 1950) compression engine.
//!
//! The engine proper lives in [`engine::Engine`]: a `set_input`/`deflate`
//! state machine that owns a sliding window, a chained hash table for LZ77
//! match search, and a Huffman coder, selecting one of three drivers (stored,
//! fast greedy, or slow lazy) per the active compression level. The [`write`]
//! module wraps it in `std::io::Write` adapters for streaming use.
//!
//! # Examples
//!
//! ```
//! use std::io::Write;
//! use deflate::write::ZlibEncoder;
//!
//! let mut encoder = ZlibEncoder::new(Vec::new(), 6).unwrap();
//! encoder.write_all(b"Hello, deflate!").unwrap();
//! let compressed = encoder.finish().unwrap();
//! ```

mod bitstream;
mod checksum;
mod drivers;
mod encoder_state;
mod engine;
mod error;
mod huffman_lengths;
mod huffman_table;
mod length_encode;
mod levels;
mod matching;
mod pending;
mod window;
pub mod write;
mod zlib;

#[cfg(test)]
mod test_utils;

pub use engine::Engine;
pub use error::CompressError;
pub use levels::Strategy;
