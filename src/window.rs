//! The sliding window and chained hash tables the engine searches against.
//!
//! Unlike `chained_hash_table.rs` (which pairs a window-sized hash/chain
//! table with an external `InputBuffer`), this owns the full
//! 2*W-byte window array directly alongside `head`/`prev`, matching the
//! zlib-style single-owner layout the engine's state needs: window bytes,
//! hash chains, and the strstart/lookahead cursors must slide together as
//! one atomic operation.

use checksum::RollingChecksum;

pub const WINDOW_SIZE: usize = 32768; // W
pub const WINDOW_MASK: usize = WINDOW_SIZE - 1;
pub const MIN_MATCH: usize = 3;
pub const MAX_MATCH: usize = 258;
pub const MIN_LOOKAHEAD: usize = MAX_MATCH + MIN_MATCH + 1; // 262
pub const MAX_DIST: usize = WINDOW_SIZE - MIN_LOOKAHEAD; // 32506
pub const HASH_BITS: u32 = 15;
pub const HASH_SIZE: usize = 1 << HASH_BITS;
pub const HASH_MASK: u16 = (HASH_SIZE - 1) as u16;
pub const HASH_SHIFT: u32 = (HASH_BITS + MIN_MATCH as u32 - 1) / MIN_MATCH as u32; // 5
pub const TOO_FAR: usize = 4096;

/// The sliding window plus its hash chains: the `window`/`head`/`prev`
/// triple that must be manipulated as a single coherent unit.
pub struct SlidingWindow {
    pub window: Box<[u8]>,
    pub head: Box<[u16]>,
    pub prev: Box<[u16]>,
    pub ins_h: u16,
}

impl SlidingWindow {
    pub fn new() -> SlidingWindow {
        SlidingWindow {
            window: vec![0u8; 2 * WINDOW_SIZE].into_boxed_slice(),
            head: vec![0u16; HASH_SIZE].into_boxed_slice(),
            prev: vec![0u16; WINDOW_SIZE].into_boxed_slice(),
            ins_h: 0,
        }
    }

    pub fn reset(&mut self) {
        for h in self.head.iter_mut() {
            *h = 0;
        }
        for p in self.prev.iter_mut() {
            *p = 0;
        }
        self.ins_h = 0;
    }

    /// Copies `window[W..2W]` down to `window[0..W]` and rewrites every
    /// chain-table index that survives the slide, invalidating (zeroing)
    /// any that don't. `strstart`/`match_start`/`block_start` are the
    /// engine's own cursors and are adjusted by the caller.
    pub fn slide(&mut self) {
        self.window.copy_within(WINDOW_SIZE..2 * WINDOW_SIZE, 0);
        for h in self.head.iter_mut() {
            *h = if *h as usize >= WINDOW_SIZE { *h - WINDOW_SIZE as u16 } else { 0 };
        }
        for p in self.prev.iter_mut() {
            *p = if *p as usize >= WINDOW_SIZE { *p - WINDOW_SIZE as u16 } else { 0 };
        }
    }

    /// Primes `ins_h` from the two bytes at `strstart`/`strstart+1`. Must be
    /// called once lookahead has been seeded, before the first
    /// `insert_string`.
    pub fn update_hash(&mut self, strstart: usize) {
        self.ins_h = (u16::from(self.window[strstart]) << HASH_SHIFT) ^ u16::from(self.window[strstart + 1]);
    }

    /// Inserts `window[strstart..strstart+MIN_MATCH]` into the hash chain
    /// and advances the rolling hash by one byte. Returns the previous head
    /// of the chain for this hash (0 means "no predecessor").
    ///
    /// Index 0 is reserved as the chain terminator,
    /// since `strstart` never starts at or returns to 0; never insert there.
    pub fn insert_string(&mut self, strstart: usize) -> u16 {
        let hash = (self.ins_h << HASH_SHIFT) ^ u16::from(self.window[strstart + MIN_MATCH - 1]);
        let hash = hash & HASH_MASK;
        let head = self.head[hash as usize];
        self.prev[strstart & WINDOW_MASK] = head;
        self.head[hash as usize] = strstart as u16;
        self.ins_h = hash;
        head
    }

    pub fn get_prev(&self, position: usize) -> u16 {
        self.prev[position & WINDOW_MASK]
    }
}

impl Default for SlidingWindow {
    fn default() -> SlidingWindow {
        SlidingWindow::new()
    }
}

/// Fills the window from the input cursor, sliding first if necessary, and
/// feeds every newly admitted byte through the checksum. Returns the number
/// of bytes copied in.
///
/// This is a free function (rather than a `SlidingWindow` method) because it
/// also needs to reach into the engine's `strstart`/`lookahead`/`block_start`
/// cursors and input cursor, which `SlidingWindow` itself doesn't own.
pub fn fill_window<C: RollingChecksum>(win: &mut SlidingWindow,
                                       checksum: &mut C,
                                       strstart: &mut usize,
                                       lookahead: &mut usize,
                                       block_start: &mut usize,
                                       match_start: &mut usize,
                                       input: &[u8],
                                       input_off: &mut usize,
                                       total_in: &mut u64) {
    if *strstart >= WINDOW_SIZE + MAX_DIST {
        win.slide();
        *strstart -= WINDOW_SIZE;
        *block_start -= WINDOW_SIZE;
        if *match_start >= WINDOW_SIZE {
            *match_start -= WINDOW_SIZE;
        } else {
            *match_start = 0;
        }
    }

    while *lookahead < MIN_LOOKAHEAD && *input_off < input.len() {
        let available = input.len() - *input_off;
        let space = 2 * WINDOW_SIZE - *lookahead - *strstart;
        let count = available.min(space);
        if count == 0 {
            break;
        }
        let dst = *strstart + *lookahead;
        win.window[dst..dst + count].copy_from_slice(&input[*input_off..*input_off + count]);
        checksum.update_from_slice(&input[*input_off..*input_off + count]);
        *input_off += count;
        *total_in += count as u64;
        *lookahead += count;
    }

    if *lookahead >= MIN_MATCH {
        win.update_hash(*strstart);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use checksum::NoChecksum;

    #[test]
    fn fill_window_copies_all_available_input_below_min_lookahead() {
        let mut win = SlidingWindow::new();
        let mut checksum = NoChecksum::new();
        let mut strstart = 1;
        let mut lookahead = 0;
        let mut block_start = 1;
        let mut match_start = 0;
        let mut input_off = 0;
        let mut total_in = 0;
        let input = b"hello world";

        fill_window(&mut win, &mut checksum, &mut strstart, &mut lookahead, &mut block_start,
                   &mut match_start, input, &mut input_off, &mut total_in);

        assert_eq!(input_off, input.len());
        assert_eq!(lookahead, input.len());
        assert_eq!(total_in, input.len() as u64);
        assert_eq!(&win.window[1..1 + input.len()], input);
    }

    #[test]
    fn slide_preserves_the_upper_half_as_the_new_lower_half() {
        let mut win = SlidingWindow::new();
        for (i, b) in win.window[WINDOW_SIZE..2 * WINDOW_SIZE].iter_mut().enumerate() {
            *b = (i % 251) as u8;
        }
        let expected: Vec<u8> = win.window[WINDOW_SIZE..2 * WINDOW_SIZE].to_vec();
        win.slide();
        assert_eq!(&win.window[0..WINDOW_SIZE], &expected[..]);
    }

    #[test]
    fn slide_zeroes_chain_entries_below_the_window() {
        let mut win = SlidingWindow::new();
        win.head[5] = 10;
        win.prev[3] = 100;
        win.slide();
        assert_eq!(win.head[5], 0);
        assert_eq!(win.prev[3], 0);
    }

    #[test]
    fn insert_string_links_repeated_substrings() {
        let mut win = SlidingWindow::new();
        let data = b"abcabcabc";
        win.window[1..1 + data.len()].copy_from_slice(data);
        win.update_hash(1);
        let first = win.insert_string(1);
        assert_eq!(first, 0);
        win.update_hash(2);
        win.insert_string(2);
        win.update_hash(3);
        win.insert_string(3);
        win.update_hash(4);
        let second = win.insert_string(4);
        // "bca" at position 4 should chain back to "bca" at position 1.
        assert_eq!(second, 1);
    }
}
