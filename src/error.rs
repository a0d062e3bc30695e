use std::error::Error;
use std::fmt;

/// Errors that can be returned by [`Engine`](crate::engine::Engine) operations.
///
/// Mirrors the error kinds a caller can run into when driving the engine
/// incorrectly, as opposed to `HuffmanError` which only covers malformed
/// huffman length tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressError {
    /// A null buffer, a negative offset/count, a count out of bounds, or a
    /// level outside `0..=9` was passed to an operation.
    BadArgument,
    /// `set_input` was called while a previous input region was still
    /// unconsumed.
    InvalidState,
    /// An unknown `CompressionFunction` was reached. Indicates corrupted
    /// engine state; the engine should be discarded.
    InternalInvariant,
}

impl fmt::Display for CompressError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match *self {
            CompressError::BadArgument => "invalid argument passed to deflate engine",
            CompressError::InvalidState => "deflate engine called in an invalid state",
            CompressError::InternalInvariant => "deflate engine reached an unreachable state",
        };
        f.write_str(msg)
    }
}

impl Error for CompressError {}
