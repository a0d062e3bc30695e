//! The three compression drivers: stored, fast, and slow (lazy).
//!
//! Each shares the engine's window/hash state and the `EncoderState`
//! collaborator; they differ only in their emission policy. Grounded on the
//! classic zlib `deflate_stored`/`deflate_fast`/`deflate_slow` shape, rebuilt
//! here against `SlidingWindow`/`matching::longest_match`/`EncoderState`
//! rather than a disjoint `LZ77State`/`OutputWriter` split.

use encoder_state::EncoderState;
use levels::Strategy;
use matching::longest_match;
use window::{SlidingWindow, MAX_DIST, MIN_MATCH, TOO_FAR, WINDOW_SIZE, MIN_LOOKAHEAD};

pub const MAX_BLOCK_SIZE: usize = 65535;

/// Cursors the drivers mutate directly; owned by the engine and borrowed in
/// for the duration of one driver call.
pub struct DriverState<'a> {
    pub window: &'a mut SlidingWindow,
    pub strstart: &'a mut usize,
    pub lookahead: &'a mut usize,
    pub block_start: &'a mut usize,
    pub match_start: &'a mut usize,
    pub match_len: &'a mut usize,
    pub prev_available: &'a mut bool,
    pub strategy: Strategy,
    pub good_length: usize,
    pub max_lazy: usize,
    pub nice_length: usize,
    pub max_chain: usize,
}

fn insert_current(d: &mut DriverState) -> u16 {
    if *d.lookahead >= MIN_MATCH {
        d.window.insert_string(*d.strstart)
    } else {
        0
    }
}

fn search(d: &DriverState, hash_head: u16, prev_length: usize) -> Option<(usize, usize)> {
    if hash_head == 0 || d.strategy == Strategy::HuffmanOnly {
        return None;
    }
    if *d.strstart - hash_head as usize > MAX_DIST {
        return None;
    }
    longest_match(d.window, *d.strstart, hash_head, prev_length, *d.lookahead,
                  d.good_length, d.nice_length, d.max_chain)
        .map(|m| (m.start, m.length))
}

/// `deflate_stored(flush, finish)`. Absorbs all lookahead directly into a
/// stored block, splitting at `MAX_BLOCK_SIZE` or window-slide boundaries.
pub fn deflate_stored(d: &mut DriverState, coder: &mut EncoderState, flush: bool, finish: bool)
                       -> bool {
    let absorbed = *d.lookahead;
    *d.strstart += *d.lookahead;
    *d.lookahead = 0;

    let stored_length = *d.strstart - *d.block_start;
    let would_leave_window = *d.block_start < WINDOW_SIZE && stored_length >= MAX_DIST;

    if stored_length >= MAX_BLOCK_SIZE || would_leave_window || flush {
        let emit_len = stored_length.min(MAX_BLOCK_SIZE);
        // A block exactly MAX_BLOCK_SIZE long is still capped: it must not
        // carry the last-block bit itself, so a trailing empty block can
        // still close out the stream on finish.
        let capped = emit_len >= MAX_BLOCK_SIZE;
        let last_block = finish && !capped;
        if emit_len == 0 && !finish {
            return absorbed > 0;
        }
        coder.flush_stored_block(&d.window.window, *d.block_start, emit_len, last_block)
            .expect("stored block write cannot fail");
        *d.block_start += emit_len;
        return !last_block;
    }

    absorbed > 0
}

/// `deflate_fast(flush, finish)`.
pub fn deflate_fast(d: &mut DriverState, coder: &mut EncoderState, flush: bool, finish: bool)
                     -> bool {
    loop {
        if *d.lookahead < MIN_LOOKAHEAD && !flush {
            return false;
        }
        if *d.lookahead == 0 {
            let last_block = finish;
            coder.flush_block(&d.window.window, *d.block_start, *d.strstart - *d.block_start,
                              last_block)
                .expect("huffman block write cannot fail");
            *d.block_start = *d.strstart;
            return false;
        }

        let hash_head = insert_current(d);
        let found = search(d, hash_head, MIN_MATCH - 1);

        let is_full;
        if let Some((start, length)) = found {
            *d.match_start = start;
            *d.match_len = length;
            let distance = *d.strstart - *d.match_start;
            is_full = coder.tally_dist(distance as u16, length as u16);
            *d.lookahead -= length;

            if length <= d.max_lazy && *d.lookahead >= MIN_MATCH {
                // Re-insert every position the match covered so future
                // searches can find chains through it.
                for _ in 1..length {
                    *d.strstart += 1;
                    d.window.insert_string(*d.strstart);
                }
                *d.strstart += 1;
            } else {
                *d.strstart += length;
                if *d.lookahead >= MIN_MATCH - 1 {
                    d.window.update_hash(*d.strstart);
                }
            }
            *d.match_len = MIN_MATCH - 1;
        } else {
            is_full = coder.tally_lit(d.window.window[*d.strstart]);
            *d.strstart += 1;
            *d.lookahead -= 1;
        }

        if is_full {
            let last_block = finish && *d.lookahead == 0;
            coder.flush_block(&d.window.window, *d.block_start, *d.strstart - *d.block_start,
                              last_block)
                .expect("huffman block write cannot fail");
            *d.block_start = *d.strstart;
            return !last_block;
        }
    }
}

fn reject_short_match(d: &DriverState, length: usize, start: usize) -> bool {
    if length > 5 {
        return false;
    }
    match d.strategy {
        Strategy::Filtered => true,
        _ => length == MIN_MATCH && *d.strstart - start > TOO_FAR,
    }
}

/// `deflate_slow(flush, finish)`: lazy matching, deferring emission by one
/// position to let a longer match starting one byte later win.
pub fn deflate_slow(d: &mut DriverState, coder: &mut EncoderState, flush: bool, finish: bool)
                     -> bool {
    loop {
        if *d.lookahead < MIN_LOOKAHEAD && !flush {
            return false;
        }
        if *d.lookahead == 0 {
            if *d.prev_available {
                coder.tally_lit(d.window.window[*d.strstart - 1]);
            }
            let last_block = finish;
            // The pending literal, if any, was just tallied above and belongs
            // to this block -- unlike the mid-block is_full paths below, where
            // it's held back for the next one.
            let len = *d.strstart - *d.block_start;
            coder.flush_block(&d.window.window, *d.block_start, len, last_block)
                .expect("huffman block write cannot fail");
            *d.block_start = *d.strstart;
            *d.prev_available = false;
            return false;
        }

        let prev_match = *d.match_start;
        let prev_len = *d.match_len;

        let hash_head = insert_current(d);
        let found = search(d, hash_head, prev_len);

        let (mut cand_len, mut cand_start) = (MIN_MATCH - 1, 0usize);
        if let Some((start, length)) = found {
            cand_len = length;
            cand_start = start;
            if reject_short_match(d, cand_len, cand_start) {
                cand_len = MIN_MATCH - 1;
            }
        }
        *d.match_len = cand_len;
        *d.match_start = cand_start;

        if prev_len >= MIN_MATCH && cand_len <= prev_len {
            let distance = *d.strstart - 1 - prev_match;
            let is_full = coder.tally_dist(distance as u16, prev_len as u16);

            let mut remaining = prev_len - 1;
            while remaining > 0 {
                *d.strstart += 1;
                *d.lookahead -= 1;
                if *d.lookahead >= MIN_MATCH {
                    d.window.insert_string(*d.strstart);
                }
                remaining -= 1;
            }
            *d.strstart += 1;
            *d.lookahead -= 1;
            *d.prev_available = false;
            *d.match_len = MIN_MATCH - 1;

            if is_full {
                let last_block = finish && *d.lookahead == 0 && !*d.prev_available;
                coder.flush_block(&d.window.window, *d.block_start, *d.strstart - *d.block_start,
                                  last_block)
                    .expect("huffman block write cannot fail");
                *d.block_start = *d.strstart;
                return !last_block;
            }
        } else {
            let mut is_full = false;
            if *d.prev_available {
                is_full = coder.tally_lit(d.window.window[*d.strstart - 1]);
            }
            *d.prev_available = true;
            *d.strstart += 1;
            *d.lookahead -= 1;

            if is_full {
                let last_block = finish && *d.lookahead == 0 && !*d.prev_available;
                coder.flush_block(&d.window.window, *d.block_start, *d.strstart - *d.block_start - 1,
                                  last_block)
                    .expect("huffman block write cannot fail");
                *d.block_start = *d.strstart - 1;
                return !last_block;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use encoder_state::EncoderState;
    use window::SlidingWindow;

    fn new_state(win: &mut SlidingWindow, strstart: &mut usize, lookahead: &mut usize,
                 block_start: &mut usize, match_start: &mut usize, match_len: &mut usize,
                 prev_available: &mut bool)
                 -> DriverState {
        DriverState {
            window: win,
            strstart,
            lookahead,
            block_start,
            match_start,
            match_len,
            prev_available,
            strategy: Strategy::Default,
            good_length: 8,
            max_lazy: 16,
            nice_length: 128,
            max_chain: 128,
        }
    }

    #[test]
    fn stored_driver_absorbs_lookahead_and_flushes_on_finish() {
        let mut win = SlidingWindow::new();
        let data = b"hello stored world";
        win.window[1..1 + data.len()].copy_from_slice(data);
        let mut strstart = 1;
        let mut lookahead = data.len();
        let mut block_start = 1;
        let mut match_start = 0;
        let mut match_len = MIN_MATCH - 1;
        let mut prev_available = false;
        let mut d = new_state(&mut win, &mut strstart, &mut lookahead, &mut block_start,
                              &mut match_start, &mut match_len, &mut prev_available);
        let mut coder = EncoderState::new();

        let progress = deflate_stored(&mut d, &mut coder, true, true);
        assert!(!progress);
        assert!(!coder.pending().is_empty());
    }

    #[test]
    fn stored_driver_does_not_spin_once_a_call_absorbs_nothing() {
        let mut win = SlidingWindow::new();
        let mut strstart = 1;
        let mut lookahead = 0;
        let mut block_start = 1;
        let mut match_start = 0;
        let mut match_len = MIN_MATCH - 1;
        let mut prev_available = false;
        let mut d = new_state(&mut win, &mut strstart, &mut lookahead, &mut block_start,
                              &mut match_start, &mut match_len, &mut prev_available);
        let mut coder = EncoderState::new();

        // No lookahead, not flushing: nothing absorbed, so this must report
        // no progress rather than echoing a nonzero buffered-block size.
        let progress = deflate_stored(&mut d, &mut coder, false, false);
        assert!(!progress);
    }

    #[test]
    fn stored_driver_splits_a_block_of_exactly_max_block_size() {
        let mut win = SlidingWindow::new();
        let data = vec![b'x'; MAX_BLOCK_SIZE];
        win.window[1..1 + data.len()].copy_from_slice(&data);
        let mut strstart = 1;
        let mut lookahead = data.len();
        let mut block_start = 1;
        let mut match_start = 0;
        let mut match_len = MIN_MATCH - 1;
        let mut prev_available = false;
        let mut d = new_state(&mut win, &mut strstart, &mut lookahead, &mut block_start,
                              &mut match_start, &mut match_len, &mut prev_available);
        let mut coder = EncoderState::new();

        // First call absorbs exactly MAX_BLOCK_SIZE bytes; that block must
        // not be marked last even though finish=true, since the stream still
        // needs a trailing (empty) final block.
        let progress = deflate_stored(&mut d, &mut coder, true, true);
        assert!(progress, "a capped block is not the end of the stream");
        assert_eq!(block_start, 1 + MAX_BLOCK_SIZE);

        let progress = deflate_stored(&mut d, &mut coder, true, true);
        assert!(!progress, "the trailing empty block finishes the stream");
        assert_eq!(block_start, 1 + MAX_BLOCK_SIZE);
    }

    #[test]
    fn fast_driver_emits_a_literal_for_unmatched_input() {
        let mut win = SlidingWindow::new();
        let data = b"xyz";
        win.window[1..1 + data.len()].copy_from_slice(data);
        let mut strstart = 1;
        let mut lookahead = data.len();
        let mut block_start = 1;
        let mut match_start = 0;
        let mut match_len = MIN_MATCH - 1;
        let mut prev_available = false;
        let mut d = new_state(&mut win, &mut strstart, &mut lookahead, &mut block_start,
                              &mut match_start, &mut match_len, &mut prev_available);
        let mut coder = EncoderState::new();

        deflate_fast(&mut d, &mut coder, true, true);
        assert!(!coder.pending().is_empty());
    }

    #[test]
    fn slow_driver_carries_pending_literal_into_final_block() {
        let mut win = SlidingWindow::new();
        let data = b"ab";
        win.window[1..1 + data.len()].copy_from_slice(data);
        let mut strstart = 1;
        let mut lookahead = data.len();
        let mut block_start = 1;
        let mut match_start = 0;
        let mut match_len = MIN_MATCH - 1;
        let mut prev_available = false;
        let mut d = new_state(&mut win, &mut strstart, &mut lookahead, &mut block_start,
                              &mut match_start, &mut match_len, &mut prev_available);
        let mut coder = EncoderState::new();

        deflate_slow(&mut d, &mut coder, true, true);
        assert!(!coder.pending().is_empty());
    }
}
