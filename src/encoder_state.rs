//! The Huffman coder that sits downstream of the LZ77 drivers.
//!
//! Collects the literal/length/distance tokens a driver produces for one
//! block, decides which of the three DEFLATE block types (RFC 1951 section
//! 3.2.3) is cheapest, and writes the finished block into the pending bit
//! buffer. Grounded on `huffman_table.rs`'s code-construction machinery and
//! `huffman_lengths.rs`'s dynamic header writer, generalized to run once per
//! block inside the engine rather than once per top-level `write()` call.

use huffman_table::{HuffmanTable, HuffmanError, FrequencyType, NUM_LITERALS_AND_LENGTHS,
                    NUM_DISTANCE_CODES, END_OF_BLOCK_POSITION, FIXED_CODE_LENGTHS,
                    FIXED_CODE_LENGTHS_DISTANCE, get_length_code, get_distance_code, MIN_MATCH,
                    MAX_MATCH};
use huffman_lengths::{gen_huffman_lengths, write_huffman_lengths, DynamicBlockHeader};
use pending::Pending;

// First two bits of a block describe its type; the third is the final-block flag.
const BTYPE_STORED: u16 = 0b00;
const BTYPE_FIXED: u16 = 0b01;
const BTYPE_DYNAMIC: u16 = 0b10;

/// A single LZ77 output token, as produced by the drivers and consumed by
/// the Huffman coder.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Match { length: u16, distance: u16 },
}

/// A cap on how many tokens accumulate before a block is forced to flush,
/// independent of the byte length of the window region it spans. Keeps
/// block headers amortized without letting a single block's token buffer
/// grow unboundedly on highly compressible input.
pub const MAX_BLOCK_TOKENS: usize = 1 << 14;

pub struct EncoderState {
    tokens: Vec<Token>,
    l_freqs: Vec<FrequencyType>,
    d_freqs: Vec<FrequencyType>,
    pending: Pending,
}

impl EncoderState {
    pub fn new() -> EncoderState {
        let mut state = EncoderState {
            tokens: Vec::with_capacity(MAX_BLOCK_TOKENS),
            l_freqs: vec![0; NUM_LITERALS_AND_LENGTHS],
            d_freqs: vec![0; NUM_DISTANCE_CODES],
            pending: Pending::new(),
        };
        state.l_freqs[END_OF_BLOCK_POSITION] = 1;
        state
    }

    pub fn pending(&self) -> &Pending {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut Pending {
        &mut self.pending
    }

    /// Tallies a literal byte. Returns whether the block is now full.
    pub fn tally_lit(&mut self, byte: u8) -> bool {
        self.l_freqs[usize::from(byte)] += 1;
        self.tokens.push(Token::Literal(byte));
        self.is_full()
    }

    /// Tallies a length/distance match. Returns whether the block is now full.
    pub fn tally_dist(&mut self, distance: u16, length: u16) -> bool {
        debug_assert!(length >= MIN_MATCH && length <= MAX_MATCH);
        let l_code = get_length_code(length).expect("length out of range");
        self.l_freqs[usize::from(l_code)] += 1;
        let d_code = get_distance_code(distance).expect("distance out of range");
        self.d_freqs[usize::from(d_code)] += 1;
        self.tokens.push(Token::Match { length, distance });
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.tokens.len() >= MAX_BLOCK_TOKENS
    }

    pub fn reset(&mut self) {
        self.tokens.clear();
        for f in self.l_freqs.iter_mut() {
            *f = 0;
        }
        for f in self.d_freqs.iter_mut() {
            *f = 0;
        }
        self.l_freqs[END_OF_BLOCK_POSITION] = 1;
    }

    fn write_start_of_block(&mut self, btype: u16, last_block: bool) {
        let value = btype | ((last_block as u16) << 2);
        self.pending.write_bits(value, 3);
    }

    fn write_tokens(&mut self, table: &HuffmanTable) {
        let tokens = ::std::mem::replace(&mut self.tokens, Vec::new());
        for token in &tokens {
            match *token {
                Token::Literal(b) => {
                    let code = table.get_literal(b);
                    self.pending.write_bits(code.code, code.length);
                }
                Token::Match { length, distance } => {
                    let ld = table.get_length_distance_code(length, distance)
                        .expect("length/distance out of huffman table range");
                    self.pending.write_bits(ld.length_code.code, ld.length_code.length);
                    self.pending.write_bits(ld.length_extra_bits.code, ld.length_extra_bits.length);
                    self.pending.write_bits(ld.distance_code.code, ld.distance_code.length);
                    self.pending.write_bits(ld.distance_extra_bits.code, ld.distance_extra_bits.length);
                }
            }
        }
        let eob = table.get_end_of_block();
        self.pending.write_bits(eob.code, eob.length);
    }

    fn fixed_cost_bits(&self) -> u64 {
        let l_bits: u64 = self.l_freqs.iter()
            .zip(FIXED_CODE_LENGTHS.iter())
            .fold(0, |acc, (&f, &l)| acc + u64::from(f) * u64::from(l));
        let d_bits: u64 = self.d_freqs.iter()
            .zip(FIXED_CODE_LENGTHS_DISTANCE.iter())
            .fold(0, |acc, (&f, &l)| acc + u64::from(f) * u64::from(l));
        l_bits + d_bits
    }

    fn dynamic_cost_bits(&self, header: &DynamicBlockHeader) -> u64 {
        let l_bits: u64 = self.l_freqs.iter()
            .zip(header.l_lengths.iter())
            .fold(0, |acc, (&f, &l)| acc + u64::from(f) * u64::from(l));
        let d_bits: u64 = self.d_freqs.iter()
            .zip(header.d_lengths.iter())
            .fold(0, |acc, (&f, &l)| acc + u64::from(f) * u64::from(l));
        l_bits + d_bits
    }

    /// Writes a complete Huffman-coded DEFLATE block (fixed or dynamic,
    /// whichever is cheaper) for the tallied tokens, covering the `length`
    /// bytes of `window` starting at `start`. `window`/`start`/`length` are
    /// present to satisfy the collaborator contract (a stored fallback needs
    /// the raw bytes); the Huffman path itself only consumes the tallied
    /// token buffer.
    pub fn flush_block(&mut self, window: &[u8], start: usize, length: usize, last_block: bool)
                        -> Result<(), HuffmanError> {
        let dynamic_header = gen_huffman_lengths(&self.l_freqs, &self.d_freqs, length as u64);
        let fixed_bits = self.fixed_cost_bits();
        let stored_bits = (length as u64) * 8 + 32;

        let use_dynamic = dynamic_header.as_ref()
            .map(|h| self.dynamic_cost_bits(h) <= fixed_bits)
            .unwrap_or(false);

        if use_dynamic {
            let header = dynamic_header.unwrap();
            if self.dynamic_cost_bits(&header) > stored_bits && length > 0 {
                self.reset();
                return self.flush_stored_block(window, start, length, last_block);
            }
            self.write_start_of_block(BTYPE_DYNAMIC, last_block);
            write_huffman_lengths(&header, self.pending.writer_mut())
                .expect("write to in-memory pending buffer cannot fail");
            let table = HuffmanTable::from_length_tables(&header.l_lengths, &header.d_lengths)?;
            self.write_tokens(&table);
        } else if fixed_bits <= stored_bits || length == 0 {
            self.write_start_of_block(BTYPE_FIXED, last_block);
            let table = HuffmanTable::fixed_table();
            self.write_tokens(&table);
        } else {
            self.reset();
            return self.flush_stored_block(window, start, length, last_block);
        }

        self.reset();
        Ok(())
    }

    /// Writes an uncompressed (stored) block directly from the window,
    /// bypassing the token buffer and Huffman tables entirely.
    pub fn flush_stored_block(&mut self, window: &[u8], start: usize, length: usize, last_block: bool)
                               -> Result<(), HuffmanError> {
        assert!(length <= u16::max_value() as usize,
               "stored block length {} exceeds DEFLATE's 16-bit LEN field", length);
        self.write_start_of_block(BTYPE_STORED, last_block);
        self.pending.align_to_byte();
        let len = length as u16;
        self.pending.write_bytes(&len.to_le_bytes());
        self.pending.write_bytes(&(!len).to_le_bytes());
        self.pending.write_bytes(&window[start..start + length]);
        Ok(())
    }
}

impl Default for EncoderState {
    fn default() -> EncoderState {
        EncoderState::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literal_only_block_round_trips_through_fixed_or_dynamic() {
        let mut state = EncoderState::new();
        let window = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        for &b in window {
            state.tally_lit(b);
        }
        state.flush_block(window, 0, window.len(), true).unwrap();
        assert!(!state.pending().is_empty());
    }

    #[test]
    fn reset_clears_tallies_and_tokens() {
        let mut state = EncoderState::new();
        state.tally_lit(b'x');
        state.reset();
        assert_eq!(state.l_freqs[usize::from(b'x')], 0);
        assert_eq!(state.l_freqs[END_OF_BLOCK_POSITION], 1);
    }

    #[test]
    fn stored_block_is_byte_aligned_and_carries_length_complement() {
        let mut state = EncoderState::new();
        let window = b"raw bytes, no matches here";
        state.flush_stored_block(window, 0, window.len(), true).unwrap();
        let buf = state.pending().buffer();
        // Block-type bits are padded to 1 byte, then LEN/NLEN follow.
        let len = u16::from_le_bytes([buf[1], buf[2]]);
        let nlen = u16::from_le_bytes([buf[3], buf[4]]);
        assert_eq!(len as usize, window.len());
        assert_eq!(nlen, !len);
        assert_eq!(&buf[5..5 + window.len()], window);
    }

    #[test]
    fn a_match_is_tallied_into_both_frequency_tables() {
        let mut state = EncoderState::new();
        state.tally_dist(1, 10);
        assert!(state.l_freqs.iter().any(|&f| f > 0) );
        assert!(state.d_freqs.iter().any(|&f| f > 0));
    }
}
