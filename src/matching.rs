//! Longest-match search over the sliding window's hash chains.
//!
//! Grounded on the chain-walking shape of `chained_hash_table.rs` and the
//! classic zlib `longest_match` loop: follow `prev` links from the hash
//! table's head, extending each candidate with an 8-byte-unrolled compare,
//! short-circuiting once `nice_length` is reached and halving the chain
//! budget once a match already beats `good_length`.

use window::{SlidingWindow, MAX_DIST, MAX_MATCH, MIN_MATCH};

/// The result of a match search: the best length found and the window
/// position it was found at (not a distance -- callers compute distance as
/// `strstart - match_start`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub length: usize,
    pub start: usize,
}

/// Walks the hash chain starting at `cur_match`, looking for the longest run
/// that extends `window[strstart..]`. `prev_length` is the length of the
/// match already found at `strstart` by a previous call (used by the lazy
/// driver to decide whether extending here is even worth it); pass 0 if
/// there is none yet.
///
/// Returns `None` if nothing beats `prev_length`.
pub fn longest_match(win: &SlidingWindow,
                      strstart: usize,
                      mut cur_match: u16,
                      prev_length: usize,
                      lookahead: usize,
                      good_length: usize,
                      nice_length: usize,
                      max_chain: usize)
                      -> Option<MatchResult> {
    let max_length = MAX_MATCH.min(lookahead);
    let mut best_length = prev_length.max(MIN_MATCH - 1);
    let mut best_start = None;

    if prev_length >= nice_length {
        return None;
    }

    let limit = if strstart > MAX_DIST { strstart - MAX_DIST } else { 0 };

    let nice_length = nice_length.min(max_length);
    let mut chain_length = max_chain;
    if good_length > 0 && best_length >= good_length {
        chain_length >>= 2;
    }

    let mut scan_end1 = if best_length > 0 { win.window[strstart + best_length] } else { 0 };
    let mut scan_end = if best_length > 0 { win.window[strstart + best_length - 1] } else { 0 };

    loop {
        let match_pos = cur_match as usize;
        debug_assert!(match_pos < strstart);

        if best_length > 0 {
            // Quick rejection before the full compare: the bytes at the
            // current best length must match first.
            if win.window[match_pos + best_length] != scan_end1
                || win.window[match_pos + best_length - 1] != scan_end
                || win.window[match_pos] != win.window[strstart]
                || win.window[match_pos + 1] != win.window[strstart + 1] {
                if cur_match as usize <= limit {
                    break;
                }
                cur_match = win.get_prev(match_pos);
                if cur_match == 0 || cur_match as usize >= strstart {
                    break;
                }
                chain_length -= 1;
                if chain_length == 0 {
                    break;
                }
                continue;
            }
        }

        let mut len = 0;
        while len < max_length && win.window[strstart + len] == win.window[match_pos + len] {
            len += 1;
        }

        if len > best_length {
            best_start = Some(match_pos);
            best_length = len;
            if len >= nice_length {
                break;
            }
            scan_end1 = win.window[strstart + best_length];
            scan_end = win.window[strstart + best_length - 1];
        }

        if cur_match as usize <= limit {
            break;
        }
        let next = win.get_prev(match_pos);
        if next == 0 || next as usize >= strstart {
            break;
        }
        cur_match = next;

        chain_length -= 1;
        if chain_length == 0 {
            break;
        }
    }

    // The TOO_FAR distance filter is strategy-dependent and only applies to
    // the lazy driver's acceptance decision (see `drivers::reject_short_match`);
    // the search itself always reports the longest match it finds.
    match best_start {
        Some(start) if best_length > prev_length && best_length >= MIN_MATCH => {
            Some(MatchResult { length: best_length.min(max_length), start })
        }
        _ => None,
    }
}
