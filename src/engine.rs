//! The public engine front: `set_input`, `needs_input`, `set_level`,
//! `set_strategy`, `reset`, `reset_adler`, `adler`, `deflate`.
//!
//! Owns the window/hash tables, the per-level tunables, and the Huffman
//! coder, and dispatches each `deflate` call to whichever of the three
//! drivers the current compression function selects. Grounded on the
//! `DeflateState`/`compress_data_dynamic_n` orchestration in `compress.rs`,
//! rebuilt around the fresh `window`/`matching`/`drivers`/`encoder_state`
//! modules rather than a separate `LZ77State`/`InputBuffer` split.

use checksum::{Adler32Checksum, RollingChecksum};
use drivers::{deflate_fast, deflate_slow, deflate_stored, DriverState};
use encoder_state::EncoderState;
use error::CompressError;
use levels::{tunables_for_level, CompressionFunction, Strategy};
use pending::Pending;
use window::{fill_window, SlidingWindow, MIN_MATCH};

/// The input region `set_input` attaches, held until fully consumed.
///
/// Owns a copy of the region rather than borrowing it, since the `write`
/// module's `Write` wrappers hand the engine buffers that only live for the
/// duration of a single `write()` call, with no lifetime the engine itself
/// could borrow across calls.
struct InputCursor {
    buf: Vec<u8>,
    off: usize,
}

pub struct Engine {
    win: SlidingWindow,
    checksum: Adler32Checksum,
    coder: EncoderState,

    strstart: usize,
    lookahead: usize,
    block_start: usize,
    match_start: usize,
    match_len: usize,
    prev_available: bool,
    total_in: u64,

    level: u8,
    strategy: Strategy,
    good_length: usize,
    max_lazy: usize,
    nice_length: usize,
    max_chain: usize,
    compression_function: CompressionFunction,

    input: Option<InputCursor>,
}

impl Engine {
    /// Constructs a fresh engine at level 6 / strategy Default, as zlib
    /// itself defaults to.
    pub fn new() -> Engine {
        let tunables = tunables_for_level(6);
        Engine {
            win: SlidingWindow::new(),
            checksum: Adler32Checksum::new(),
            coder: EncoderState::new(),
            strstart: 1,
            lookahead: 0,
            block_start: 1,
            match_start: 0,
            match_len: MIN_MATCH - 1,
            prev_available: false,
            total_in: 0,
            level: 6,
            strategy: Strategy::Default,
            good_length: tunables.good_length as usize,
            max_lazy: tunables.max_lazy as usize,
            nice_length: tunables.nice_length as usize,
            max_chain: tunables.max_chain as usize,
            compression_function: tunables.compression_function,
            input: None,
        }
    }

    pub fn pending(&self) -> &Pending {
        self.coder.pending()
    }

    pub fn pending_mut(&mut self) -> &mut Pending {
        self.coder.pending_mut()
    }

    /// Attaches an input region. Fails if prior input is unconsumed, or if
    /// `offset + count` is out of bounds.
    pub fn set_input(&mut self, buffer: &[u8], offset: usize, count: usize)
                      -> Result<(), CompressError> {
        if let Some(ref cur) = self.input {
            if cur.off < cur.buf.len() {
                return Err(CompressError::InvalidState);
            }
        }
        let end = offset.checked_add(count).ok_or(CompressError::BadArgument)?;
        if end > buffer.len() {
            return Err(CompressError::BadArgument);
        }
        self.input = Some(InputCursor { buf: buffer[offset..end].to_vec(), off: 0 });
        Ok(())
    }

    pub fn needs_input(&self) -> bool {
        match self.input {
            Some(ref cur) => cur.off >= cur.buf.len(),
            None => true,
        }
    }

    /// Validates `level` and updates tunables, performing a mode transition
    /// if the selected driver changes.
    pub fn set_level(&mut self, level: u8) -> Result<(), CompressError> {
        if level > 9 {
            return Err(CompressError::BadArgument);
        }
        let tunables = tunables_for_level(level);
        let old_function = self.compression_function;
        let new_function = tunables.compression_function;

        if old_function != new_function {
            match (old_function, new_function) {
                (CompressionFunction::Stored, _) => {
                    if self.strstart > self.block_start {
                        self.flush_stored(false);
                        self.win.update_hash(self.strstart);
                    }
                }
                (CompressionFunction::Fast, _) => {
                    if self.strstart > self.block_start {
                        self.flush_huffman(false);
                    }
                }
                (CompressionFunction::Slow, _) => {
                    if self.prev_available {
                        self.coder.tally_lit(self.win.window[self.strstart - 1]);
                    }
                    if self.strstart > self.block_start {
                        self.flush_huffman(false);
                    }
                    self.prev_available = false;
                    self.match_len = MIN_MATCH - 1;
                }
            }
        }

        self.level = level;
        self.good_length = tunables.good_length as usize;
        self.max_lazy = tunables.max_lazy as usize;
        self.nice_length = tunables.nice_length as usize;
        self.max_chain = tunables.max_chain as usize;
        self.compression_function = new_function;
        Ok(())
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    /// Resets the engine (Huffman coder, Adler checksum, hash tables, and
    /// cursors) back to its just-constructed state, keeping the current
    /// level/strategy.
    pub fn reset(&mut self) {
        self.coder.reset();
        self.coder.pending_mut().take();
        self.checksum = Adler32Checksum::new();
        self.win.reset();
        self.block_start = 1;
        self.strstart = 1;
        self.lookahead = 0;
        self.total_in = 0;
        self.prev_available = false;
        self.match_len = MIN_MATCH - 1;
        self.input = None;
    }

    pub fn reset_adler(&mut self) {
        self.checksum = Adler32Checksum::new();
    }

    pub fn adler(&self) -> u32 {
        self.checksum.current_hash()
    }

    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    fn flush_huffman(&mut self, last_block: bool) {
        let len = self.strstart - self.block_start;
        self.coder.flush_block(&self.win.window, self.block_start, len, last_block)
            .expect("huffman block write cannot fail");
        self.block_start = self.strstart;
    }

    fn flush_stored(&mut self, last_block: bool) {
        let len = self.strstart - self.block_start;
        self.coder.flush_stored_block(&self.win.window, self.block_start, len, last_block)
            .expect("stored block write cannot fail");
        self.block_start = self.strstart;
    }

    fn fill(&mut self) {
        let cur = match self.input {
            Some(ref cur) => cur,
            None => return,
        };
        let remaining: Vec<u8> = cur.buf[cur.off..].to_vec();
        let mut off = 0;
        fill_window(&mut self.win, &mut self.checksum, &mut self.strstart, &mut self.lookahead,
                   &mut self.block_start, &mut self.match_start, &remaining, &mut off,
                   &mut self.total_in);
        if let Some(ref mut cur) = self.input {
            cur.off += off;
        }
    }

    /// Runs the engine forward, dispatching to the selected driver until
    /// either the current input is exhausted without a flush request, or
    /// the pending buffer has unflushed bytes and the driver made no
    /// further progress. Returns whether any progress was made.
    pub fn deflate(&mut self, flush: bool, finish: bool) -> Result<bool, CompressError> {
        let mut last_progress = false;
        loop {
            self.fill();
            let can_flush = flush && self.needs_input();

            let mut d = DriverState {
                window: &mut self.win,
                strstart: &mut self.strstart,
                lookahead: &mut self.lookahead,
                block_start: &mut self.block_start,
                match_start: &mut self.match_start,
                match_len: &mut self.match_len,
                prev_available: &mut self.prev_available,
                strategy: self.strategy,
                good_length: self.good_length,
                max_lazy: self.max_lazy,
                nice_length: self.nice_length,
                max_chain: self.max_chain,
            };

            let progress = match self.compression_function {
                CompressionFunction::Stored => deflate_stored(&mut d, &mut self.coder, can_flush, finish),
                CompressionFunction::Fast => deflate_fast(&mut d, &mut self.coder, can_flush, finish),
                CompressionFunction::Slow => deflate_slow(&mut d, &mut self.coder, can_flush, finish),
            };

            last_progress = progress;

            if self.coder.pending().is_flushed() && !progress {
                break;
            }
            if !progress && self.needs_input() {
                break;
            }
        }
        Ok(last_progress)
    }
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fresh_engine_needs_input() {
        let engine = Engine::new();
        assert!(engine.needs_input());
    }

    #[test]
    fn set_input_rejects_out_of_bounds_region() {
        let mut engine = Engine::new();
        let data = [1u8, 2, 3];
        assert_eq!(engine.set_input(&data, 1, 10), Err(CompressError::BadArgument));
    }

    #[test]
    fn set_level_rejects_out_of_range() {
        let mut engine = Engine::new();
        assert_eq!(engine.set_level(10), Err(CompressError::BadArgument));
    }

    #[test]
    fn deflate_produces_output_for_small_input() {
        let mut engine = Engine::new();
        let data = b"Hello, Hello, Hello.";
        engine.set_input(data, 0, data.len()).unwrap();
        engine.deflate(true, true).unwrap();
        assert!(!engine.pending().is_empty());
        assert!(engine.needs_input());
    }

    #[test]
    fn adler_reflects_admitted_bytes() {
        use adler32::RollingAdler32;
        let mut engine = Engine::new();
        let data = b"abcdef";
        engine.set_input(data, 0, data.len()).unwrap();
        engine.deflate(true, true).unwrap();
        let mut expected = RollingAdler32::new();
        expected.update_buffer(data);
        assert_eq!(engine.adler(), expected.hash());
    }

    #[test]
    fn mid_stream_level_change_flushes_a_block_boundary() {
        let mut engine = Engine::new();
        engine.set_level(0).unwrap();
        let data = b"some bytes to absorb into a stored block";
        engine.set_input(data, 0, data.len()).unwrap();
        engine.deflate(false, false).unwrap();
        let before = engine.pending().buffer().len();
        engine.set_level(6).unwrap();
        assert!(engine.pending().buffer().len() >= before);
    }
}
