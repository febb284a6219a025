//! Hamming(12,8) codeword encoding and decoding for the optical line code.
//!
//! This module turns each payload byte into a 12-bit codeword carrying the
//! 8 data bits and 4 parity bits, and recovers bytes from received words,
//! correcting any single flipped bit.
//!
//! ## Bit Layout
//!
//! Positions are numbered 0 (most significant, sent first) through 11
//! (least significant, sent last). Parity bits sit at the power-of-two
//! positions `{0, 1, 3, 7}` (1-based `1, 2, 4, 8`) and the data bits fill the
//! remaining positions, most significant data bit first:
//!
//! | position | 0  | 1  | 2  | 3  | 4  | 5  | 6  | 7  | 8  | 9  | 10 | 11 |
//! |----------|----|----|----|----|----|----|----|----|----|----|----|----|
//! | content  | p0 | p1 | b7 | p3 | b6 | b5 | b4 | p7 | b3 | b2 | b1 | b0 |
//!
//! Each parity bit is the XOR of the data positions listed for it in
//! [`PARITY_COVERAGE`]. Re-running the four checks on a received word yields
//! a syndrome equal to `position + 1` of a single flipped bit, or zero when the
//! word is clean.
//!
//! ## Functions
//!
//! - [`encode_hamming`]: Converts a single byte into a 12-bit codeword
//! - [`syndrome`]: Re-runs the parity checks on a received word
//! - [`decode_hamming`]: Corrects a received word and recovers its byte
//! - [`encode_buffer`] / [`decode_buffer`]: slice-level conversions
//! - [`codeword_bits`] / [`bits_to_codeword`]: MSB-first bit order on the wire
//!
//! ## Limitations
//!
//! - Two flipped bits always produce a non-zero syndrome, but the code cannot
//!   tell them apart from a single error; they are either miscorrected or
//!   reported as [`DecodeError::Uncorrectable`].

use crate::consts::{CODEWORD_BITS, CODEWORD_MASK};
use crate::error::DecodeError;

/// Codeword positions of the data bits, listed from data bit 7 down to bit 0.
pub const DATA_POSITIONS: [u8; 8] = [2, 4, 5, 6, 8, 9, 10, 11];

/// Codeword positions of the four parity bits.
pub const PARITY_POSITIONS: [u8; 4] = [0, 1, 3, 7];

/// Data positions covered by each parity bit, in [`PARITY_POSITIONS`] order.
pub const PARITY_COVERAGE: [&[u8]; 4] = [
    &[2, 4, 6, 8, 10],
    &[2, 5, 6, 9, 10],
    &[4, 5, 6, 11],
    &[8, 9, 10, 11],
];

/// Parity-check masks: each parity position together with the positions it covers.
const CHECK_MASKS: [u16; 4] = check_masks();

/// Flipped position for every syndrome value. Syndromes 13..=15 point
/// outside the 12-bit word.
static SYNDROME_POSITIONS: [Option<u8>; 16] = [
    None,
    Some(0),
    Some(1),
    Some(2),
    Some(3),
    Some(4),
    Some(5),
    Some(6),
    Some(7),
    Some(8),
    Some(9),
    Some(10),
    Some(11),
    None,
    None,
    None,
];

/// Result of decoding one received codeword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Decoded {
    /// The recovered payload byte.
    pub byte: u8,
    /// Position of the bit that was flipped back, if any.
    pub corrected: Option<u8>,
}

const fn position_bit(position: u8) -> u16 {
    1u16 << (CODEWORD_BITS as u8 - 1 - position)
}

const fn check_masks() -> [u16; 4] {
    let mut masks = [0u16; 4];
    let mut check = 0;
    while check < PARITY_POSITIONS.len() {
        let mut mask = position_bit(PARITY_POSITIONS[check]);
        let covered = PARITY_COVERAGE[check];
        let mut i = 0;
        while i < covered.len() {
            mask |= position_bit(covered[i]);
            i += 1;
        }
        masks[check] = mask;
        check += 1;
    }
    masks
}

/// Encodes an 8-bit byte into a 12-bit Hamming codeword.
///
/// Only the low 12 bits of the result are meaningful.
pub fn encode_hamming(byte: u8) -> u16 {
    let mut word = 0u16;
    for (i, &position) in DATA_POSITIONS.iter().enumerate() {
        if byte & (0x80 >> i) != 0 {
            word |= position_bit(position);
        }
    }
    // The parity bit itself is still clear, so the full check mask works here.
    for (&parity, &mask) in PARITY_POSITIONS.iter().zip(CHECK_MASKS.iter()) {
        if (word & mask).count_ones() % 2 == 1 {
            word |= position_bit(parity);
        }
    }
    word
}

/// Computes the 4-bit syndrome of a received word.
///
/// Bit `k` holds the result of the parity check for `PARITY_POSITIONS[k]`.
/// A zero syndrome means every check passes.
pub fn syndrome(word: u16) -> u8 {
    CHECK_MASKS
        .iter()
        .enumerate()
        .fold(0, |acc, (k, &mask)| {
            acc | ((((word & mask).count_ones() & 1) as u8) << k)
        })
}

fn extract_data(word: u16) -> u8 {
    DATA_POSITIONS.iter().fold(0u8, |byte, &position| {
        (byte << 1) | u8::from(word & position_bit(position) != 0)
    })
}

/// Decodes a received codeword, correcting a single flipped bit.
///
/// Bits above the low 12 are ignored.
///
/// Returns [`DecodeError::Uncorrectable`] if the syndrome points outside the word.
pub fn decode_hamming(word: u16) -> Result<Decoded, DecodeError> {
    let mut word = word & CODEWORD_MASK;
    let syndrome = syndrome(word);
    let corrected = match syndrome {
        0 => None,
        s => {
            let position = SYNDROME_POSITIONS[usize::from(s)]
                .ok_or(DecodeError::Uncorrectable { syndrome: s })?;
            word ^= position_bit(position);
            Some(position)
        }
    };
    Ok(Decoded {
        byte: extract_data(word),
        corrected,
    })
}

/// Yields the 12 bits of a codeword in wire order, position 0 first.
pub fn codeword_bits(word: u16) -> impl Iterator<Item = bool> {
    (0..CODEWORD_BITS).map(move |i| word & (1u16 << (CODEWORD_BITS - 1 - i)) != 0)
}

/// Packs up to 12 wire-order bits back into a codeword, first bit most significant.
pub fn bits_to_codeword(bits: &[bool]) -> u16 {
    bits.iter()
        .take(CODEWORD_BITS)
        .fold(0u16, |word, &bit| (word << 1) | u16::from(bit))
}

/// Encodes an array of bytes into the array `output` as 12-bit codewords.
///
/// # Arguments
/// - `&[u8]` : The input buffer slice
/// - `&mut [u16]` : The output buffer
///
/// # Returns
/// The number of codewords written, which is the shorter of the two lengths.
pub fn encode_buffer(input: &[u8], output: &mut [u16]) -> usize {
    let mut i = 0;
    for (&byte, slot) in input.iter().zip(output.iter_mut()) {
        *slot = encode_hamming(byte);
        i += 1;
    }
    i
}

/// Decodes an array of received codewords back into bytes.
///
/// # Returns
/// The number of bytes written, or the first uncorrectable codeword's error.
pub fn decode_buffer(input: &[u16], output: &mut [u8]) -> Result<usize, DecodeError> {
    let mut i = 0;
    for (&word, slot) in input.iter().zip(output.iter_mut()) {
        *slot = decode_hamming(word)?.byte;
        i += 1;
    }
    Ok(i)
}
