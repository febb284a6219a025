//! Lazy symbol sequence for one frame.
//!
//! A frame is never stored: [`FrameSymbols`] walks the message and produces
//! each symbol on demand, encoding one byte at a time.

use crate::consts::{CODEWORD_BITS, FRAME_OVERHEAD, POSTAMBLE, PREAMBLE};
use crate::encoding::encode_hamming;

/// Number of symbols in the frame for a message of `message_len` bytes.
///
/// Saturates at `usize::MAX`.
pub const fn frame_len(message_len: usize) -> usize {
    FRAME_OVERHEAD.saturating_add(message_len.saturating_mul(CODEWORD_BITS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Data,
    Postamble,
    Done,
}

/// Iterator over the symbols of one frame, in transmission order.
///
/// Yields the preamble, then each byte's codeword from position 0 to 11,
/// then the postamble.
#[derive(Debug, Clone)]
pub struct FrameSymbols<'a> {
    message: &'a [u8],
    section: Section,
    /// Index of the byte being sent while in the data section.
    byte_index: usize,
    /// Codeword of the current byte.
    word: u16,
    /// Symbol index inside the current section or codeword.
    bit: usize,
    remaining: usize,
}

impl<'a> FrameSymbols<'a> {
    /// Creates the symbol sequence for `message`.
    pub fn new(message: &'a [u8]) -> Self {
        Self {
            message,
            section: Section::Preamble,
            byte_index: 0,
            word: 0,
            bit: 0,
            remaining: frame_len(message.len()),
        }
    }

    fn load_byte(&mut self) {
        match self.message.get(self.byte_index) {
            Some(&byte) => {
                self.word = encode_hamming(byte);
                self.section = Section::Data;
            }
            None => self.section = Section::Postamble,
        }
        self.bit = 0;
    }
}

impl Iterator for FrameSymbols<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        let symbol = match self.section {
            Section::Preamble => {
                let symbol = PREAMBLE[self.bit];
                self.bit += 1;
                if self.bit == PREAMBLE.len() {
                    self.load_byte();
                }
                symbol
            }
            Section::Data => {
                let symbol = self.word & (1 << (CODEWORD_BITS - 1 - self.bit)) != 0;
                self.bit += 1;
                if self.bit == CODEWORD_BITS {
                    self.byte_index += 1;
                    self.load_byte();
                }
                symbol
            }
            Section::Postamble => {
                let symbol = POSTAMBLE[self.bit];
                self.bit += 1;
                if self.bit == POSTAMBLE.len() {
                    self.section = Section::Done;
                }
                symbol
            }
            Section::Done => return None,
        };
        self.remaining -= 1;
        Some(symbol)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for FrameSymbols<'_> {}

impl core::iter::FusedIterator for FrameSymbols<'_> {}
