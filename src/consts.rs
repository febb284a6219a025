//! Constants used across the optical Hamming protocol.
//!
//! This module defines the protocol-wide values shared by the encoder,
//! the transmitter and the receive-side helpers: codeword geometry,
//! frame marker layout, default timing, and buffer sizing.
//!
//! ## Key Concepts
//!
//! - **Codeword**: every payload byte becomes exactly 12 transmitted bits.
//! - **Markers**: a frame opens and closes with the same 8 alternating symbols,
//!   which lets a receiver calibrate its bit clock and spot frame edges.
//! - **Timing**: a symbol is held for `1000 / rate` milliseconds; frames sent
//!   back to back are separated by an idle gap.
//! - **Buffer Sizing**: only the receive side buffers anything, and only in
//!   `no_std` builds where a fixed capacity is required.

/// Number of bits in one Hamming(12,8) codeword.
pub const CODEWORD_BITS: usize = 12;

/// Mask selecting the meaningful bits of a codeword held in a `u16`.
pub const CODEWORD_MASK: u16 = 0x0fff;

/// Length (in symbols) of the preamble sent before the first codeword.
pub const PREAMBLE_LEN: usize = 8;

/// Length (in symbols) of the postamble sent after the last codeword.
pub const POSTAMBLE_LEN: usize = 8;

/// Alternating marker pattern opening every frame.
///
/// The symbol at index `i` is `i % 2 == 1`, starting low.
pub const PREAMBLE: [bool; PREAMBLE_LEN] = [false, true, false, true, false, true, false, true];

/// Marker pattern closing every frame. Identical to [`PREAMBLE`].
pub const POSTAMBLE: [bool; POSTAMBLE_LEN] = PREAMBLE;

/// Number of symbols a frame carries on top of its codewords.
pub const FRAME_OVERHEAD: usize = PREAMBLE_LEN + POSTAMBLE_LEN;

/// Symbol rate (symbols per second) used when none is specified.
pub const DEFAULT_SYMBOL_RATE: u32 = 10;

/// Idle time (ms) inserted after each frame of a repeated transmission.
pub const DEFAULT_FRAME_GAP_MS: u32 = 300;

/// Milliseconds per second, the numerator of the bit duration.
pub const MILLIS_PER_SECOND: u32 = 1_000;

/// Maximum number of message bytes a `no_std` receiver buffers per frame.
pub const MAX_MESSAGE_LEN: usize = 128;
