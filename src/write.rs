//! `Write`-based wrappers around [`Engine`](crate::engine::Engine).
//!
//! Adapted from the teacher's `DeflateEncoder`/`ZlibEncoder` shape: a boxed,
//! `Option`-wrapped inner state to let `Drop` and `finish()` coexist, a
//! `Vec<u8>` sink collected from the engine's pending buffer on every call.

use std::io::{self, Write};
use std::thread;

use byteorder::{BigEndian, WriteBytesExt};

use checksum::{Adler32Checksum, RollingChecksum};
use engine::Engine;
use error::CompressError;
use zlib::{write_zlib_header, CompressionLevel, DEFAULT_WINDOW_BITS};

fn to_io_error(_: CompressError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "deflate engine called in an invalid state")
}

struct Inner<W: Write> {
    engine: Engine,
    writer: W,
}

impl<W: Write> Inner<W> {
    fn new(writer: W) -> Inner<W> {
        Inner { engine: Engine::new(), writer }
    }

    fn drain_pending(&mut self) -> io::Result<()> {
        let bytes = self.engine.pending_mut().take();
        if !bytes.is_empty() {
            self.writer.write_all(&bytes)?;
        }
        Ok(())
    }

    fn run(&mut self, buf: &[u8], flush: bool, finish: bool) -> io::Result<usize> {
        if !buf.is_empty() {
            self.engine.set_input(buf, 0, buf.len()).map_err(to_io_error)?;
        }
        self.engine.deflate(flush, finish).map_err(to_io_error)?;
        self.drain_pending()?;
        Ok(buf.len())
    }
}

/// A DEFLATE encoder/compressor.
///
/// Implements `Write`, compressing everything written to it and forwarding
/// the compressed bytes to the wrapped writer.
///
/// # Examples
///
/// ```
/// use std::io::Write;
///
/// use deflate::write::DeflateEncoder;
///
/// let data = b"This is some test data";
/// let mut encoder = DeflateEncoder::new(Vec::new(), 6).unwrap();
/// encoder.write_all(data).unwrap();
/// let compressed_data = encoder.finish().unwrap();
/// ```
pub struct DeflateEncoder<W: Write> {
    inner: Option<Box<Inner<W>>>,
}

impl<W: Write> DeflateEncoder<W> {
    /// Creates a new encoder at the given compression level (0..=9).
    pub fn new(writer: W, level: u8) -> Result<DeflateEncoder<W>, CompressError> {
        let mut inner = Inner::new(writer);
        inner.engine.set_level(level)?;
        Ok(DeflateEncoder { inner: Some(Box::new(inner)) })
    }

    /// Encodes all pending data, consumes the encoder, and returns the
    /// wrapped writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.output_all()?;
        let inner = self.inner.take();
        Ok(inner.unwrap().writer)
    }

    /// Resets the encoder, replacing the wrapped writer with a new one and
    /// returning the old one.
    pub fn reset(&mut self, writer: W) -> io::Result<W> {
        self.output_all()?;
        let inner = self.inner.as_mut().unwrap();
        inner.engine.reset();
        Ok(std::mem::replace(&mut inner.writer, writer))
    }

    fn output_all(&mut self) -> io::Result<()> {
        self.inner.as_mut().unwrap().run(&[], true, true).map(|_| ())
    }
}

impl<W: Write> Write for DeflateEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.as_mut().unwrap().run(buf, false, false)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.as_mut().unwrap().run(&[], true, false).map(|_| ())
    }
}

impl<W: Write> Drop for DeflateEncoder<W> {
    /// Outputs the rest of the data when the encoder is dropped.
    ///
    /// WARNING: this may silently fail if writing fails. Call `finish()` if
    /// the wrapped writer's failures need to be observed.
    fn drop(&mut self) {
        if self.inner.is_some() && !thread::panicking() {
            let _ = self.output_all();
        }
    }
}

/// A zlib encoder/compressor: DEFLATE with the RFC 1950 two-byte header and
/// Adler-32 trailer.
///
/// # Examples
///
/// ```
/// use std::io::Write;
///
/// use deflate::write::ZlibEncoder;
///
/// let data = b"This is some test data";
/// let mut encoder = ZlibEncoder::new(Vec::new(), 6).unwrap();
/// encoder.write_all(data).unwrap();
/// let compressed_data = encoder.finish().unwrap();
/// ```
pub struct ZlibEncoder<W: Write> {
    inner: Option<Box<Inner<W>>>,
    header_written: bool,
}

impl<W: Write> ZlibEncoder<W> {
    pub fn new(writer: W, level: u8) -> Result<ZlibEncoder<W>, CompressError> {
        let mut inner = Inner::new(writer);
        inner.engine.set_level(level)?;
        Ok(ZlibEncoder {
            inner: Some(Box::new(inner)),
            header_written: false,
        })
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.output_all()?;
        let inner = self.inner.take();
        Ok(inner.unwrap().writer)
    }

    pub fn reset(&mut self, writer: W) -> io::Result<W> {
        self.output_all()?;
        self.header_written = false;
        let inner = self.inner.as_mut().unwrap();
        inner.engine.reset();
        Ok(std::mem::replace(&mut inner.writer, writer))
    }

    fn check_write_header(&mut self) -> io::Result<()> {
        if !self.header_written {
            write_zlib_header(&mut self.inner.as_mut().unwrap().writer, DEFAULT_WINDOW_BITS,
                              CompressionLevel::Default)?;
            self.header_written = true;
        }
        Ok(())
    }

    fn write_trailer(&mut self) -> io::Result<()> {
        let hash = self.inner.as_ref().unwrap().engine.adler();
        self.inner.as_mut().unwrap().writer.write_u32::<BigEndian>(hash)
    }

    fn output_all(&mut self) -> io::Result<()> {
        self.check_write_header()?;
        self.inner.as_mut().unwrap().run(&[], true, true)?;
        self.write_trailer()
    }
}

impl<W: Write> Write for ZlibEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_write_header()?;
        self.inner.as_mut().unwrap().run(buf, false, false)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check_write_header()?;
        self.inner.as_mut().unwrap().run(&[], true, false).map(|_| ())
    }
}

impl<W: Write> Drop for ZlibEncoder<W> {
    fn drop(&mut self) {
        if self.inner.is_some() && !thread::panicking() {
            let _ = self.output_all();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deflate_encoder_finish_returns_wrapped_writer() {
        let data = b"a very compressible a a a a a a string";
        let mut encoder = DeflateEncoder::new(Vec::new(), 6).unwrap();
        encoder.write_all(data).unwrap();
        let compressed = encoder.finish().unwrap();
        assert!(!compressed.is_empty());
    }

    #[test]
    fn zlib_encoder_prepends_a_two_byte_header() {
        let data = b"zlib framed data";
        let mut encoder = ZlibEncoder::new(Vec::new(), 6).unwrap();
        encoder.write_all(data).unwrap();
        let compressed = encoder.finish().unwrap();
        assert!(compressed.len() > 6);
        assert_eq!(compressed[0] & 0x0f, 8); // CM = deflate
    }

    #[test]
    fn zlib_encoder_appends_an_adler32_trailer() {
        let data = b"checksum me";
        let mut encoder = ZlibEncoder::new(Vec::new(), 6).unwrap();
        encoder.write_all(data).unwrap();
        let compressed = encoder.finish().unwrap();
        let trailer = &compressed[compressed.len() - 4..];
        let mut expected = Adler32Checksum::new();
        expected.update_from_slice(data);
        assert_eq!(u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]),
                  expected.current_hash());
    }

    #[test]
    fn reset_allows_reuse_with_a_new_writer() {
        let data = b"reset me";
        let mut encoder = DeflateEncoder::new(Vec::new(), 6).unwrap();
        encoder.write_all(data).unwrap();
        let first = encoder.reset(Vec::new()).unwrap();
        encoder.write_all(data).unwrap();
        let second = encoder.finish().unwrap();
        assert_eq!(first, second);
    }
}
