//! Message recovery from captured symbol streams.
//!
//! A receiver that has turned light levels into symbols (see
//! [`crate::slicer`]) hands them to one of two decoders:
//!
//! - [`deframe`]: locates the preamble and postamble of the first frame and
//!   decodes every codeword between them, correcting single-bit errors.
//! - [`frames`]: walks every frame of a capture holding repeated frames.
//! - [`decode_unaligned`]: for captures where the markers were lost, tries
//!   every bit alignment and keeps the one yielding the most clean codewords.
//!
//! ## Marker Ambiguity
//!
//! Some codewords begin with the marker pattern (`'.'` encodes to
//! `0101 0101 1110`), so a postamble can appear to start inside the data.
//! [`deframe`] accepts the first codeword-aligned postamble that is followed
//! by a frame boundary:
//!
//! - the end of the capture, or symbols holding no preamble at all
//! - an idle run leading straight into the next preamble
//!
//! The tail of a `'.'` codeword is never an idle run running into a preamble
//! unless the following byte encodes to `1010 101x xxxx`, which no ASCII
//! character does.

use core::iter::FusedIterator;
#[cfg(not(feature = "std"))]
use heapless::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::consts::MAX_MESSAGE_LEN;
use crate::consts::{CODEWORD_BITS, POSTAMBLE, POSTAMBLE_LEN, PREAMBLE, PREAMBLE_LEN};
use crate::encoding::{bits_to_codeword, decode_hamming, syndrome};
use crate::error::{DecodeError, DeframeError};

/// Decoded message bytes.
#[cfg(not(feature = "std"))]
pub type Message = Vec<u8, MAX_MESSAGE_LEN>;

/// Decoded message bytes.
#[cfg(feature = "std")]
pub type Message = Vec<u8>;

/// A message recovered by [`deframe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    /// The payload bytes, in transmission order.
    pub message: Message,
    /// How many codewords needed a bit flipped back.
    pub corrected: usize,
    /// Index just past the postamble in the input.
    pub end: usize,
}

#[cfg(feature = "std")]
fn push_byte(message: &mut Message, byte: u8) -> Result<(), DeframeError> {
    message.push(byte);
    Ok(())
}

#[cfg(not(feature = "std"))]
fn push_byte(message: &mut Message, byte: u8) -> Result<(), DeframeError> {
    message.push(byte).map_err(|_| DeframeError::BufferFull)
}

/// Index of the first preamble in `symbols`.
pub fn find_preamble(symbols: &[bool]) -> Option<usize> {
    symbols
        .windows(PREAMBLE_LEN)
        .position(|window| *window == PREAMBLE)
}

/// Recovers the message carried by the first frame of a capture.
///
/// Leading and trailing idle symbols are skipped. Later frames are left for
/// [`frames`].
///
/// # Errors
/// - [`DeframeError::NoPreamble`]: the alternating preamble never appears
/// - [`DeframeError::NoPostamble`]: no postamble on a codeword boundary after it
/// - [`DeframeError::Codeword`]: a codeword had more than one flipped bit
/// - [`DeframeError::BufferFull`]: the message exceeds the `no_std` buffer
pub fn deframe(symbols: &[bool]) -> Result<Received, DeframeError> {
    let start = find_preamble(symbols).ok_or(DeframeError::NoPreamble)?;
    let data_start = start + PREAMBLE_LEN;
    let room = symbols.len().saturating_sub(data_start + POSTAMBLE_LEN);

    let data_end = (0..=room / CODEWORD_BITS)
        .map(|n| data_start + n * CODEWORD_BITS)
        .find(|&at| {
            symbols
                .get(at..at + POSTAMBLE_LEN)
                .is_some_and(|window| *window == POSTAMBLE)
                && is_frame_boundary(&symbols[at + POSTAMBLE_LEN..])
        })
        .ok_or_else(|| {
            warn!("preamble at {} but no postamble follows", start);
            DeframeError::NoPostamble
        })?;
    let mut message = Message::new();
    let mut corrected = 0;
    for (index, bits) in symbols[data_start..data_end]
        .chunks_exact(CODEWORD_BITS)
        .enumerate()
    {
        let decoded = match decode_hamming(bits_to_codeword(bits)) {
            Ok(decoded) => decoded,
            Err(DecodeError::Uncorrectable { syndrome }) => {
                warn!("codeword {} uncorrectable, syndrome {}", index, syndrome);
                return Err(DeframeError::Codeword { index, syndrome });
            }
        };
        if let Some(position) = decoded.corrected {
            debug!("codeword {}: corrected bit {}", index, position);
            corrected += 1;
        }
        push_byte(&mut message, decoded.byte)?;
    }

    Ok(Received {
        message,
        corrected,
        end: data_end + POSTAMBLE_LEN,
    })
}

/// Whether `rest` may follow a postamble: nothing, symbols without a
/// preamble, or an idle run ending where the next preamble starts.
fn is_frame_boundary(rest: &[bool]) -> bool {
    let Some(&idle) = rest.first() else {
        return true;
    };
    let run = rest.iter().take_while(|&&level| level == idle).count();
    match find_preamble(rest) {
        None => true,
        // A low idle run swallows the leading 0 of the preamble.
        Some(next) => next == run || (!idle && next + 1 == run),
    }
}

/// Iterator over the frames of a capture, see [`frames`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    symbols: &'a [bool],
    offset: usize,
    done: bool,
}

impl Iterator for Frames<'_> {
    type Item = Result<Received, DeframeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let rest = &self.symbols[self.offset..];
        match deframe(rest) {
            Ok(mut received) => {
                received.end += self.offset;
                self.offset = received.end;
                Some(Ok(received))
            }
            Err(DeframeError::NoPreamble) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Frames<'_> {}

/// Decodes every frame in `symbols`, e.g. a capture of
/// [`transmit_repeated`](crate::LedTransmitter::transmit_repeated).
///
/// Each [`Received::end`] indexes into `symbols`. Iteration ends when no
/// preamble is left, or after the first error (a frame cut off by the end of
/// the capture yields [`DeframeError::NoPostamble`]).
pub fn frames(symbols: &[bool]) -> Frames<'_> {
    Frames {
        symbols,
        offset: 0,
        done: false,
    }
}

fn clean_words(bits: &[bool], shift: usize) -> impl Iterator<Item = u16> + '_ {
    bits.get(shift..)
        .unwrap_or(&[])
        .chunks_exact(CODEWORD_BITS)
        .map(bits_to_codeword)
        .filter(|&word| syndrome(word) == 0)
}

/// Decodes a bit stream of unknown alignment.
///
/// Every shift from 0 to 11 is tried; words with a non-zero syndrome are
/// dropped rather than corrected, and the shift with the most clean words wins
/// (the earliest shift on a tie). Marker symbols never form a clean word at
/// the winning alignment of a well-formed capture, so they fall out as well.
///
/// Short captures are ambiguous: with only a couple of codewords another
/// shift can match as many clean words by chance.
pub fn decode_unaligned(bits: &[bool]) -> Message {
    let mut best_shift = 0;
    let mut best_count = 0;
    for shift in 0..CODEWORD_BITS {
        let count = clean_words(bits, shift).count();
        if count > best_count {
            best_count = count;
            best_shift = shift;
        }
    }
    trace!("unaligned: shift {} with {} clean words", best_shift, best_count);

    let mut message = Message::new();
    for word in clean_words(bits, best_shift) {
        if let Ok(decoded) = decode_hamming(word) {
            if push_byte(&mut message, decoded.byte).is_err() {
                break;
            }
        }
    }
    message
}
