//! Timing arithmetic for the optical line code.
//!
//! Every symbol is held for a whole number of milliseconds, derived from the
//! configured symbol rate by integer division, so the usable rates run from
//! 1 to 1000 symbols per second:
//!
//! | RATE (sym/s) | BIT DURATION | 5-byte frame |
//! |--------------|--------------|--------------|
//! |            1 |      1000 ms |         76 s |
//! |           10 |       100 ms |        7.6 s |
//! |           30 |        33 ms |       2.5 s  |
//! |          100 |        10 ms |       760 ms |
//!
//! Receivers that sample the light level (a camera at `fps` frames per second,
//! or a polled photosensor) need the number of samples per symbol, see
//! [`samples_per_bit`].

use crate::consts::{DEFAULT_SYMBOL_RATE, MILLIS_PER_SECOND};
use crate::error::ConfigError;
use crate::frame::frame_len;

/// Bit duration (ms) at [`DEFAULT_SYMBOL_RATE`].
pub const DEFAULT_BIT_DURATION_MS: u32 = MILLIS_PER_SECOND / DEFAULT_SYMBOL_RATE;

/// Computes how long each symbol is held, in milliseconds.
///
/// # Arguments
/// - `symbol_rate`: symbols per second
///
/// # Returns
/// - `1000 / symbol_rate`, truncated toward zero
/// - [`ConfigError::ZeroSymbolRate`] for a rate of 0
/// - [`ConfigError::SymbolRateTooHigh`] when the duration would truncate to 0 ms
pub fn bit_duration_ms(symbol_rate: u32) -> Result<u32, ConfigError> {
    if symbol_rate == 0 {
        return Err(ConfigError::ZeroSymbolRate);
    }
    match MILLIS_PER_SECOND / symbol_rate {
        0 => Err(ConfigError::SymbolRateTooHigh(symbol_rate)),
        duration => Ok(duration),
    }
}

/// Time (ms) the transmitter is busy sending one frame of `message_len` bytes.
///
/// Saturates at `u64::MAX`.
pub fn frame_airtime_ms(message_len: usize, symbol_rate: u32) -> Result<u64, ConfigError> {
    let bit_ms = u64::from(bit_duration_ms(symbol_rate)?);
    Ok((frame_len(message_len) as u64).saturating_mul(bit_ms))
}

/// Time (ms) a repeated transmission takes, including the gap after every frame.
///
/// Saturates at `u64::MAX`.
pub fn repeated_airtime_ms(
    message_len: usize,
    symbol_rate: u32,
    count: usize,
    frame_gap_ms: u32,
) -> Result<u64, ConfigError> {
    let per_frame =
        frame_airtime_ms(message_len, symbol_rate)?.saturating_add(u64::from(frame_gap_ms));
    Ok(per_frame.saturating_mul(count as u64))
}

/// Number of level samples covering one symbol.
///
/// # Arguments
/// - `sample_rate_hz`: how often the receiver samples the light level (e.g. camera fps)
/// - `symbol_rate`: symbols per second of the transmitter
///
/// # Returns
/// - The (fractional) samples per symbol
/// - [`ConfigError::InvalidSampleRate`] if the result is not positive and finite
pub fn samples_per_bit(sample_rate_hz: f32, symbol_rate: u32) -> Result<f32, ConfigError> {
    if symbol_rate == 0 {
        return Err(ConfigError::ZeroSymbolRate);
    }
    let samples = sample_rate_hz / symbol_rate as f32;
    if samples.is_finite() && samples > 0.0 {
        Ok(samples)
    } else {
        Err(ConfigError::InvalidSampleRate)
    }
}
