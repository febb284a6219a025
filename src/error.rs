//! Error types for configuration, transmission and decoding.

use core::fmt::Debug;
use thiserror::Error;

/// Rejected construction parameters.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ConfigError {
    /// A symbol rate of zero has no bit duration.
    #[error("symbol rate must be at least 1 symbol per second")]
    ZeroSymbolRate,

    /// The rate is so high that the millisecond bit duration truncates to zero.
    #[error("symbol rate {0} exceeds 1000 symbols per second")]
    SymbolRateTooHigh(u32),

    /// Sample rate or samples-per-bit is not a positive, finite number.
    #[error("samples per bit must be positive and finite")]
    InvalidSampleRate,

    /// Threshold smoothing factor outside `(0, 1]`.
    #[error("smoothing factor must lie in (0, 1]")]
    InvalidSmoothing,
}

/// Failure while emitting a frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitError<E: Debug> {
    /// The output pin reported an error.
    #[error("output pin error: {0:?}")]
    Pin(E),

    /// The caller asked for the frame to be abandoned.
    #[error("transmission cancelled")]
    Cancelled,
}

/// A received codeword that cannot be corrected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DecodeError {
    /// The syndrome points outside the 12-bit word, so more than one bit flipped.
    #[error("uncorrectable codeword (syndrome {syndrome:#x})")]
    Uncorrectable {
        /// The 4-bit syndrome that was computed.
        syndrome: u8,
    },
}

/// Failure while recovering a message from a captured symbol stream.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DeframeError {
    /// The alternating preamble never appears.
    #[error("no preamble found")]
    NoPreamble,

    /// No postamble sits on a codeword boundary after the preamble.
    #[error("no postamble found after preamble")]
    NoPostamble,

    /// A codeword inside the frame could not be corrected.
    #[error("codeword {index} is uncorrectable (syndrome {syndrome:#x})")]
    Codeword {
        /// Zero-based position of the codeword in the message.
        index: usize,
        /// The 4-bit syndrome that was computed.
        syndrome: u8,
    },

    /// The message does not fit the fixed receive buffer.
    #[error("message exceeds the receive buffer")]
    BufferFull,
}
