//! The pending-output bit buffer the engine drains from on every `deflate`
//! call.
//!
//! Wraps `bitstream::LsbWriter` over an owned `Vec<u8>` rather than an
//! arbitrary `Write`, since the engine needs to peek at how many bytes are
//! buffered and hand them back to the caller a chunk at a time.

use std::io::Write;

use crate::bitstream::{BitWriter, LsbWriter};

pub struct Pending {
    writer: LsbWriter<Vec<u8>>,
}

impl Pending {
    pub fn new() -> Pending {
        Pending { writer: LsbWriter::new(Vec::new()) }
    }

    /// Gives direct access to the underlying bit writer, for collaborators
    /// (such as `huffman_lengths::write_huffman_lengths`) that write their
    /// own multi-field headers a few bits at a time.
    pub fn writer_mut(&mut self) -> &mut LsbWriter<Vec<u8>> {
        &mut self.writer
    }

    pub fn write_bits(&mut self, value: u16, bits: u8) {
        // LsbWriter's Vec<u8> sink never fails.
        self.writer.write_bits(value, bits).expect("write to Vec<u8> cannot fail");
    }

    /// Byte-aligns the stream, padding the final partial byte with zero bits.
    pub fn align_to_byte(&mut self) {
        self.writer.flush().expect("flush to Vec<u8> cannot fail");
    }

    /// True when there is no partial byte waiting for more bits.
    pub fn is_flushed(&self) -> bool {
        self.writer.pending_bits() == 0
    }

    /// Appends raw, already byte-aligned bytes (used by stored blocks).
    ///
    /// # Panics
    ///
    /// Panics if a partial byte is pending; callers must `align_to_byte`
    /// first.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        assert!(self.is_flushed(), "write_bytes called with a partial byte pending");
        self.writer.w.extend_from_slice(bytes);
    }

    pub fn buffer(&self) -> &[u8] {
        &self.writer.w
    }

    pub fn is_empty(&self) -> bool {
        self.writer.w.is_empty()
    }

    /// Removes and returns everything buffered so far.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.writer.w)
    }
}

impl Default for Pending {
    fn default() -> Pending {
        Pending::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn byte_align_pads_with_zero_bits() {
        let mut p = Pending::new();
        p.write_bits(0b101, 3);
        assert!(!p.is_flushed());
        p.align_to_byte();
        assert!(p.is_flushed());
        assert_eq!(p.buffer(), &[0b0000_0101]);
    }

    #[test]
    fn flush_at_byte_boundary_adds_no_extra_byte() {
        let mut p = Pending::new();
        p.write_bits(0xff, 8);
        p.align_to_byte();
        assert_eq!(p.buffer().len(), 1);
    }

    #[test]
    fn take_drains_the_buffer() {
        let mut p = Pending::new();
        p.write_bits(0xab, 8);
        p.align_to_byte();
        let drained = p.take();
        assert_eq!(drained, vec![0xab]);
        assert!(p.is_empty());
    }

    #[test]
    fn write_bytes_appends_raw_bytes() {
        let mut p = Pending::new();
        p.write_bytes(&[1, 2, 3]);
        assert_eq!(p.buffer(), &[1, 2, 3]);
    }
}
