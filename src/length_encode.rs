//! Length-limited Huffman code length construction and run-length encoding
//! of the resulting length tables, as used to build the dynamic Huffman
//! block header (RFC 1951 section 3.2.7).

use huffman_table::FrequencyType;

/// A code-length-alphabet symbol, as emitted by `encode_lengths`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EncodedLength {
    /// A literal code length value (0..=15).
    Length(u8),
    /// Repeat the previous length value `n` times (3..=6).
    CopyPrevious(u8),
    /// `n` (3..=10) zero-length codes.
    RepeatZero3Bits(u8),
    /// `n` (11..=138) zero-length codes.
    RepeatZero7Bits(u8),
}

/// Position of each run-length symbol in the 19-entry code-length alphabet.
pub const COPY_PREVIOUS: usize = 16;
pub const REPEAT_ZERO_3_BITS: usize = 17;
pub const REPEAT_ZERO_7_BITS: usize = 18;

/// Number of symbols in the code-length alphabet.
pub const NUM_CODE_LENGTH_CODES: usize = 19;

/// Run-length encodes a sequence of Huffman code lengths using the three
/// repeat symbols from the DEFLATE code-length alphabet.
///
/// Returns the encoded symbol sequence along with the frequency of each of
/// the 19 code-length-alphabet symbols, which is what gets Huffman-coded to
/// build the header's own code table.
pub fn encode_lengths<I: Iterator<Item = u8>>(lengths: I) -> Option<(Vec<EncodedLength>, Vec<usize>)> {
    let lengths: Vec<u8> = lengths.collect();
    if lengths.is_empty() {
        return None;
    }

    let mut out = Vec::with_capacity(lengths.len());
    let mut freqs = vec![0usize; NUM_CODE_LENGTH_CODES];

    let mut i = 0;
    while i < lengths.len() {
        let value = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == value {
            run += 1;
        }

        if value == 0 {
            let mut remaining = run;
            while remaining > 0 {
                if remaining >= 11 {
                    let take = remaining.min(138);
                    out.push(EncodedLength::RepeatZero7Bits(take as u8));
                    freqs[REPEAT_ZERO_7_BITS] += 1;
                    remaining -= take;
                } else if remaining >= 3 {
                    let take = remaining.min(10);
                    out.push(EncodedLength::RepeatZero3Bits(take as u8));
                    freqs[REPEAT_ZERO_3_BITS] += 1;
                    remaining -= take;
                } else {
                    out.push(EncodedLength::Length(0));
                    freqs[0] += 1;
                    remaining -= 1;
                }
            }
        } else {
            out.push(EncodedLength::Length(value));
            freqs[value as usize] += 1;
            let mut remaining = run - 1;
            while remaining > 0 {
                if remaining >= 3 {
                    let take = remaining.min(6);
                    out.push(EncodedLength::CopyPrevious(take as u8));
                    freqs[COPY_PREVIOUS] += 1;
                    remaining -= take;
                } else {
                    out.push(EncodedLength::Length(value));
                    freqs[value as usize] += 1;
                    remaining -= 1;
                }
            }
        }

        i += run;
    }

    Some((out, freqs))
}

/// A node in the package-merge algorithm's Huffman-length construction.
#[derive(Copy, Clone, Debug)]
pub struct ChainNode {
    weight: usize,
    count: usize,
    tail: Option<usize>,
}

fn advance_lookahead(indexes: &mut [(usize, usize)], index: usize, next: usize) {
    indexes[index].0 = indexes[index].1;
    indexes[index].1 = next;
}

/// Implementation of the boundary package merge algorithm described by
/// Katajainen/Moffat/Turpin in "A Fast and Space-Economical Algorithm for
/// Length-Limited Coding".
pub fn boundary_package_merge(lookahead_indexes: &mut [(usize, usize)],
                               nodes: &mut Vec<ChainNode>,
                               index: usize,
                               num_leaves: usize,
                               last: bool) {
    let count = nodes[lookahead_indexes[index].1].count;
    let next_count = count + 1;

    if index == 0 && next_count >= num_leaves {
        return;
    }

    if index == 0 {
        advance_lookahead(lookahead_indexes, index, nodes.len());
        let new_weight = nodes[next_count].weight;
        nodes.push(ChainNode {
            weight: new_weight,
            count: next_count,
            tail: None,
        });
        return;
    }

    let sum = {
        let la = lookahead_indexes[index - 1];
        nodes[la.0].weight + nodes[la.1].weight
    };

    if next_count < num_leaves && sum > nodes[next_count].weight {
        let tail = nodes[lookahead_indexes[index].1].tail;
        advance_lookahead(lookahead_indexes, index, nodes.len());
        let next_weight = nodes[next_count].weight;
        nodes.push(ChainNode {
            weight: next_weight,
            count: next_count,
            tail: tail,
        });
    } else {
        advance_lookahead(lookahead_indexes, index, nodes.len());
        nodes.push(ChainNode {
            weight: sum,
            count: count,
            tail: Some(lookahead_indexes[index - 1].1),
        });
        if !last {
            // We might want to avoid recursion here, though we never go more than 15
            // levels deep since that's the maximum code length the format allows.
            boundary_package_merge(lookahead_indexes, nodes, index - 1, num_leaves, false);
            boundary_package_merge(lookahead_indexes, nodes, index - 1, num_leaves, false);
        }
    }
}

/// Builds length-limited Huffman code lengths (each `<= max_len`) for the
/// given symbol frequencies, using the boundary package-merge algorithm.
///
/// Symbols with a frequency of 0 get a code length of 0 (unused).
pub fn huffman_lengths_from_frequency(frequencies: &[FrequencyType], max_len: usize) -> Vec<u8> {
    let num_leaves = frequencies.len();
    if num_leaves <= 1 {
        return vec![0; num_leaves];
    }

    let mut nodes: Vec<_> = frequencies.iter()
        .enumerate()
        .map(|(n, &f)| ChainNode { weight: f as usize, count: n, tail: None })
        .collect();

    nodes.sort_by(|a, b| a.weight.cmp(&b.weight));

    let mut lookahead_ptrs = vec![(0, 1); max_len];

    let num_runs = (2 * num_leaves).saturating_sub(4);
    for i in 0..num_runs {
        let last = i == num_runs - 1;
        boundary_package_merge(&mut lookahead_ptrs, &mut nodes, max_len - 1, num_leaves, last);
    }

    let mut lengths = vec![0u8; num_leaves];
    let mut next_node = nodes.len() - 1;
    loop {
        let node = nodes[next_node];
        for item in lengths.iter_mut().take(node.count + 1) {
            *item += 1;
        }
        match node.tail {
            Some(n) => next_node = n,
            None => break,
        }
    }

    // Symbols with zero frequency should stay unused.
    for (length, &freq) in lengths.iter_mut().zip(frequencies.iter()) {
        if freq == 0 {
            *length = 0;
        }
    }

    lengths
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lengths_from_frequencies() {
        let frequencies: [FrequencyType; 6] = [1, 1, 5, 7, 10, 14];
        let lengths = huffman_lengths_from_frequency(&frequencies, 4);
        assert_eq!(lengths.len(), 6);
        // More frequent symbols should never end up with a longer code than
        // less frequent ones.
        for i in 1..lengths.len() {
            if frequencies[i] >= frequencies[i - 1] {
                assert!(lengths[i] <= lengths[i - 1] || lengths[i - 1] == 0);
            }
        }
        assert!(lengths.iter().all(|&l| l <= 4));
    }

    #[test]
    fn zero_frequency_gets_zero_length() {
        let frequencies: [FrequencyType; 4] = [0, 3, 0, 5];
        let lengths = huffman_lengths_from_frequency(&frequencies, 7);
        assert_eq!(lengths[0], 0);
        assert_eq!(lengths[2], 0);
    }

    #[test]
    fn encode_lengths_round_trips_runs() {
        let lengths = vec![3u8, 3, 3, 3, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 7];
        let (encoded, freqs) = encode_lengths(lengths.iter().cloned()).unwrap();

        // Reconstruct the original lengths from the encoded symbols.
        let mut decoded = Vec::new();
        let mut prev = 0u8;
        for symbol in &encoded {
            match *symbol {
                EncodedLength::Length(n) => {
                    decoded.push(n);
                    prev = n;
                }
                EncodedLength::CopyPrevious(n) => {
                    for _ in 0..n {
                        decoded.push(prev);
                    }
                }
                EncodedLength::RepeatZero3Bits(n) | EncodedLength::RepeatZero7Bits(n) => {
                    for _ in 0..n {
                        decoded.push(0);
                    }
                }
            }
        }
        assert_eq!(decoded, lengths);
        assert!(freqs.iter().sum::<usize>() == encoded.len());
    }

    #[test]
    fn long_zero_run_uses_seven_bit_repeat() {
        let lengths = vec![0u8; 130];
        let (encoded, _) = encode_lengths(lengths.iter().cloned()).unwrap();
        assert!(encoded.iter().any(|s| matches!(s, EncodedLength::RepeatZero7Bits(_))));
    }
}
