//! Per-level compression tunables.
//!
//! `image-rs-deflate-rs`'s `compression_options.rs` only exposed a single
//! `max_hash_checks` knob alongside a `SpecialOptions` switch. This module
//! generalizes that into the five parallel tables a real DEFLATE engine
//! needs to support levels 0 through 9 and mid-stream level changes.

/// Which driver a given level selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFunction {
    /// Level 0: copy input straight into stored blocks.
    Stored,
    /// Levels 1..=3: greedy matching, no lazy lookahead.
    Fast,
    /// Levels 4..=9: lazy matching.
    Slow,
}

/// Match-acceptance policy, independent of level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Normal matching behavior.
    Default,
    /// Forces more aggressive rejection of short matches; intended for
    /// data with a small alphabet, such as PNG filtered scanlines.
    Filtered,
    /// Never emit length/distance tokens, only literals (and run-length
    /// matches at distance 1 implicitly disappear, since matches are never
    /// tallied at all).
    HuffmanOnly,
}

/// The tunables selected by [`set_level`](crate::engine::Engine::set_level).
#[derive(Debug, Clone, Copy)]
pub struct LevelTunables {
    pub good_length: u16,
    pub max_lazy: u16,
    pub nice_length: u16,
    pub max_chain: u16,
    pub compression_function: CompressionFunction,
}

// good_length, max_lazy, nice_length, max_chain, function -- indexed 0..=9.
const GOOD_LENGTH: [u16; 10] = [0, 4, 4, 4, 4, 8, 8, 32, 32, 32];
const MAX_LAZY: [u16; 10] = [0, 4, 5, 6, 4, 16, 16, 32, 128, 258];
const NICE_LENGTH: [u16; 10] = [0, 8, 16, 32, 16, 32, 128, 128, 258, 258];
const MAX_CHAIN: [u16; 10] = [0, 4, 8, 32, 16, 32, 128, 256, 1024, 4096];

fn function_for_level(level: u8) -> CompressionFunction {
    match level {
        0 => CompressionFunction::Stored,
        1..=3 => CompressionFunction::Fast,
        4..=9 => CompressionFunction::Slow,
        _ => unreachable!("level out of range"),
    }
}

/// Look up the tunables for `level`.
///
/// # Panics
///
/// Panics if `level > 9`; callers must validate the level first (see
/// `Engine::set_level`, which returns `CompressError::BadArgument` instead
/// of calling this with an out-of-range value).
pub fn tunables_for_level(level: u8) -> LevelTunables {
    let i = level as usize;
    LevelTunables {
        good_length: GOOD_LENGTH[i],
        max_lazy: MAX_LAZY[i],
        nice_length: NICE_LENGTH[i],
        max_chain: MAX_CHAIN[i],
        compression_function: function_for_level(level),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn level_zero_is_stored() {
        let t = tunables_for_level(0);
        assert_eq!(t.compression_function, CompressionFunction::Stored);
    }

    #[test]
    fn level_one_to_three_is_fast() {
        for level in 1..=3 {
            assert_eq!(tunables_for_level(level).compression_function, CompressionFunction::Fast);
        }
    }

    #[test]
    fn level_four_to_nine_is_slow() {
        for level in 4..=9 {
            assert_eq!(tunables_for_level(level).compression_function, CompressionFunction::Slow);
        }
    }

    #[test]
    fn level_nine_is_most_thorough() {
        let t = tunables_for_level(9);
        assert_eq!(t.max_chain, 4096);
        assert_eq!(t.nice_length, 258);
    }
}
