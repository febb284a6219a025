//! Blocking optical transmitter for LED links.
//!
//! This module provides the [`LedTransmitter`] struct, which drives a single
//! LED through an `embedded-hal` output pin and sends framed Hamming(12,8)
//! codewords at a fixed symbol rate.
//!
//! Timing comes from an injected [`DelayNs`] provider: every symbol sets the
//! pin and then blocks for one bit duration. There is no background work; a
//! call to [`transmit_once`](LedTransmitter::transmit_once) returns when the
//! last postamble symbol has been held for its full duration.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use hamlight::driver::LedTransmitter;
//!
//! # struct NoopDelay;
//! # impl embedded_hal::delay::DelayNs for NoopDelay {
//! #     fn delay_ns(&mut self, _ns: u32) {}
//! # }
//! # let mut expectations = vec![PinTransaction::set(PinState::Low)];
//! # for i in 0..16 {
//! #     expectations.push(PinTransaction::set(if i % 8 % 2 == 1 { PinState::High } else { PinState::Low }));
//! # }
//! # let led = Pin::new(&expectations);
//! let mut transmitter = LedTransmitter::new(led, NoopDelay, 10).unwrap();
//! transmitter.transmit_once(b"").unwrap();
//! # transmitter.tx.done();
//! ```
//!
//! ## Design Notes
//!
//! The pin is expected to be configured as a push-pull output by the HAL
//! before it is handed over. `HIGH` is LED on and logical `1`.
//!
//! For the symbol layout of a frame, see [`crate::frame::FrameSymbols`].

use crate::consts::{DEFAULT_FRAME_GAP_MS, DEFAULT_SYMBOL_RATE};
use crate::error::{ConfigError, TransmitError};
use crate::frame::{FrameSymbols, frame_len};
use crate::timer;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Timing configuration for an [`LedTransmitter`].
///
/// Fixed once the transmitter is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TransmitterConfig {
    /// Symbols per second. Each symbol is one raw bit.
    pub symbol_rate: u32,
    /// Idle time (ms) after each frame of a repeated transmission.
    pub frame_gap_ms: u32,
    /// Level forced during the idle gap. `None` leaves the last postamble level on the pin.
    pub gap_level: Option<bool>,
}

impl Default for TransmitterConfig {
    fn default() -> Self {
        Self {
            symbol_rate: DEFAULT_SYMBOL_RATE,
            frame_gap_ms: DEFAULT_FRAME_GAP_MS,
            gap_level: None,
        }
    }
}

impl TransmitterConfig {
    /// Sets the symbol rate.
    pub fn with_symbol_rate(mut self, symbol_rate: u32) -> Self {
        self.symbol_rate = symbol_rate;
        self
    }

    /// Sets the idle gap between repeated frames.
    pub fn with_frame_gap_ms(mut self, frame_gap_ms: u32) -> Self {
        self.frame_gap_ms = frame_gap_ms;
        self
    }

    /// Sets the level held during the idle gap.
    pub fn with_gap_level(mut self, gap_level: Option<bool>) -> Self {
        self.gap_level = gap_level;
        self
    }
}

/// A software-timed optical transmitter for a single LED.
///
/// `LedTransmitter` encodes each message byte as a 12-bit Hamming codeword
/// and sends it bit-serially with On-Off Keying, where:
/// - `HIGH` = LED on = logical `1`
/// - `LOW`  = LED off = logical `0`
///
/// A frame is the 8-symbol preamble `0,1,0,1,0,1,0,1`, the codewords of the
/// message (most significant bit first), and a postamble identical to the
/// preamble, for `16 + 12 * len` symbols in total.
///
/// ## Type Parameters
///
/// - `TX`: A type implementing [`embedded_hal::digital::OutputPin`] driving the LED
/// - `D`: A type implementing [`embedded_hal::delay::DelayNs`] used to hold each symbol
///
/// ## Notes
///
/// - Every transmit call blocks the calling thread for the whole frame.
/// - Transmitters on distinct pins are independent and may live on separate threads.
#[derive(Debug)]
pub struct LedTransmitter<TX, D>
where
    TX: OutputPin,
    D: DelayNs,
{
    /// LED pin
    pub tx: TX,
    /// Delay provider holding each symbol
    pub delay: D,
    bit_duration_ms: u32,
    frame_gap_ms: u32,
    gap_level: Option<bool>,
    /// Last level the pin accepted, `None` until a write has succeeded.
    level: Option<bool>,

    /// Counter of completed frames.
    /// Incremented after the last postamble symbol of a frame has been held.
    pub frames_sent: u32,
}

impl<TX, D> LedTransmitter<TX, D>
where
    TX: OutputPin,
    D: DelayNs,
{
    /// Creates a transmitter at `symbol_rate` symbols per second, with the
    /// default inter-frame gap.
    ///
    /// # Arguments
    /// - `tx`: The output pin driving the LED.
    /// - `delay`: The blocking delay used to hold each symbol.
    /// - `symbol_rate`: Symbols per second, 1 to 1000 ([`DEFAULT_SYMBOL_RATE`] is 10).
    ///
    /// # Notes
    /// TX is driven `LOW` initially (LED off).
    pub fn new(tx: TX, delay: D, symbol_rate: u32) -> Result<Self, ConfigError> {
        Self::with_config(
            tx,
            delay,
            TransmitterConfig::default().with_symbol_rate(symbol_rate),
        )
    }

    /// Creates a transmitter from a full [`TransmitterConfig`].
    ///
    /// # Returns
    /// [`ConfigError`] if the symbol rate has no whole-millisecond bit duration.
    pub fn with_config(tx: TX, delay: D, config: TransmitterConfig) -> Result<Self, ConfigError> {
        let bit_duration_ms = timer::bit_duration_ms(config.symbol_rate)?;
        let mut tx = tx;
        // Ensure idle. A failing pin surfaces on the first symbol instead.
        let level = tx.set_low().is_ok().then_some(false);
        debug!(
            "led tx: {} symbols/s, {} ms per symbol, {} ms frame gap",
            config.symbol_rate,
            bit_duration_ms,
            config.frame_gap_ms
        );
        Ok(Self {
            tx,
            delay,
            bit_duration_ms,
            frame_gap_ms: config.frame_gap_ms,
            gap_level: config.gap_level,
            level,
            frames_sent: 0,
        })
    }

    /// Time (ms) each symbol is held.
    pub fn bit_duration_ms(&self) -> u32 {
        self.bit_duration_ms
    }

    /// Idle time (ms) after each frame of a repeated transmission.
    pub fn frame_gap_ms(&self) -> u32 {
        self.frame_gap_ms
    }

    /// The level most recently written to the pin, if any write succeeded.
    pub fn level(&self) -> Option<bool> {
        self.level
    }

    /// Gives back the pin and the delay provider.
    pub fn release(self) -> (TX, D) {
        (self.tx, self.delay)
    }

    fn write_tx(&mut self, level: bool) -> Result<(), TransmitError<TX::Error>> {
        let result = if level {
            self.tx.set_high()
        } else {
            self.tx.set_low()
        };
        result.map_err(TransmitError::Pin)?;
        self.level = Some(level);
        Ok(())
    }

    /// Sets the LED to `value` and blocks for one bit duration.
    pub fn emit_symbol(&mut self, value: bool) -> Result<(), TransmitError<TX::Error>> {
        self.write_tx(value)?;
        self.delay.delay_ms(self.bit_duration_ms);
        Ok(())
    }

    /// Sends one frame carrying `message`.
    ///
    /// An empty message is valid and sends only the preamble and postamble.
    pub fn transmit_once(&mut self, message: &[u8]) -> Result<(), TransmitError<TX::Error>> {
        self.transmit_frame(message, || false)
    }

    /// Sends one frame, polling `should_cancel` before every symbol.
    ///
    /// When `should_cancel` returns `true` the rest of the frame is dropped and
    /// [`TransmitError::Cancelled`] is returned. The pin keeps the level of the
    /// last symbol that was sent.
    pub fn transmit_once_cancellable<F>(
        &mut self,
        message: &[u8],
        should_cancel: F,
    ) -> Result<(), TransmitError<TX::Error>>
    where
        F: FnMut() -> bool,
    {
        self.transmit_frame(message, should_cancel)
    }

    /// Sends `count` frames carrying `message`, each followed by the idle gap.
    ///
    /// A `count` of zero sends nothing.
    pub fn transmit_repeated(
        &mut self,
        message: &[u8],
        count: usize,
    ) -> Result<(), TransmitError<TX::Error>> {
        for _ in 0..count {
            self.transmit_once(message)?;
            self.idle_gap()?;
        }
        Ok(())
    }

    fn idle_gap(&mut self) -> Result<(), TransmitError<TX::Error>> {
        if let Some(level) = self.gap_level {
            self.write_tx(level)?;
        }
        self.delay.delay_ms(self.frame_gap_ms);
        Ok(())
    }

    fn transmit_frame<F>(
        &mut self,
        message: &[u8],
        mut should_cancel: F,
    ) -> Result<(), TransmitError<TX::Error>>
    where
        F: FnMut() -> bool,
    {
        trace!(
            "frame start: {} bytes, {} symbols",
            message.len(),
            frame_len(message.len())
        );
        for (sent, symbol) in FrameSymbols::new(message).enumerate() {
            if should_cancel() {
                warn!("frame cancelled after {} symbols", sent);
                return Err(TransmitError::Cancelled);
            }
            self.emit_symbol(symbol)?;
        }
        self.frames_sent = self.frames_sent.wrapping_add(1);
        trace!("frame done, {} sent", self.frames_sent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{POSTAMBLE, PREAMBLE};
    use crate::encoding::{codeword_bits, encode_hamming};
    use core::convert::Infallible;
    use embedded_hal::digital::{Error, ErrorKind, ErrorType};
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    #[derive(Debug, Default)]
    struct RecordingDelay {
        calls_ms: Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.calls_ms.push(ns / 1_000_000);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.calls_ms.push(ms);
        }
    }

    #[derive(Debug, Default)]
    struct RecordingPin {
        levels: Vec<bool>,
    }

    impl ErrorType for RecordingPin {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.levels.push(true);
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Broken;

    impl Error for Broken {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Accepts `allowed` writes, then fails every write after.
    #[derive(Debug)]
    struct FailingPin {
        allowed: usize,
    }

    impl ErrorType for FailingPin {
        type Error = Broken;
    }

    impl OutputPin for FailingPin {
        fn set_low(&mut self) -> Result<(), Broken> {
            self.set_high()
        }

        fn set_high(&mut self) -> Result<(), Broken> {
            if self.allowed == 0 {
                return Err(Broken);
            }
            self.allowed -= 1;
            Ok(())
        }
    }

    fn pin_states(levels: impl IntoIterator<Item = bool>) -> Vec<PinTransaction> {
        levels
            .into_iter()
            .map(|level| {
                PinTransaction::set(if level {
                    PinState::High
                } else {
                    PinState::Low
                })
            })
            .collect()
    }

    fn recording(symbol_rate: u32) -> LedTransmitter<RecordingPin, RecordingDelay> {
        LedTransmitter::new(
            RecordingPin::default(),
            RecordingDelay::default(),
            symbol_rate,
        )
        .unwrap()
    }

    #[test]
    fn test_transmitter_initialization() {
        let tx = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let mut transmitter = LedTransmitter::new(tx, RecordingDelay::default(), 10).unwrap();

        assert_eq!(transmitter.bit_duration_ms(), 100);
        assert_eq!(transmitter.frame_gap_ms(), 300);
        assert_eq!(transmitter.frames_sent, 0);
        assert_eq!(transmitter.level(), Some(false));
        transmitter.tx.done();
    }

    #[test]
    fn test_zero_symbol_rate_is_rejected() {
        let result = LedTransmitter::new(RecordingPin::default(), RecordingDelay::default(), 0);
        assert_eq!(result.err(), Some(ConfigError::ZeroSymbolRate));

        let result = LedTransmitter::new(RecordingPin::default(), RecordingDelay::default(), 5000);
        assert_eq!(result.err(), Some(ConfigError::SymbolRateTooHigh(5000)));
    }

    #[test]
    fn test_bit_duration_truncates() {
        assert_eq!(recording(3).bit_duration_ms(), 333);
        assert_eq!(recording(1).bit_duration_ms(), 1000);
    }

    #[test]
    fn test_emit_symbol_sets_then_waits() {
        let tx = PinMock::new(&pin_states([false, true]));
        let mut transmitter = LedTransmitter::new(tx, RecordingDelay::default(), 20).unwrap();

        transmitter.emit_symbol(true).unwrap();
        assert_eq!(transmitter.level(), Some(true));
        assert_eq!(transmitter.delay.calls_ms, vec![50]);
        transmitter.tx.done();
    }

    #[test]
    fn test_transmit_single_byte_frame() {
        // 'A' encodes to 0x891 = 1000 1001 0001.
        let mut levels = vec![false];
        levels.extend(PREAMBLE);
        levels.extend([
            true, false, false, false, true, false, false, true, false, false, false, true,
        ]);
        levels.extend(POSTAMBLE);
        let tx = PinMock::new(&pin_states(levels));

        let mut transmitter = LedTransmitter::new(tx, RecordingDelay::default(), 10).unwrap();
        transmitter.transmit_once(b"A").unwrap();

        assert_eq!(transmitter.delay.calls_ms, vec![100; 28]);
        assert_eq!(transmitter.frames_sent, 1);
        transmitter.tx.done();
    }

    #[test]
    fn test_empty_message_sends_markers_only() {
        let mut transmitter = recording(10);
        transmitter.transmit_once(b"").unwrap();

        let levels = &transmitter.tx.levels[1..];
        assert_eq!(levels.len(), 16);
        assert_eq!(&levels[..8], &PREAMBLE);
        assert_eq!(&levels[8..], &POSTAMBLE);
        assert_eq!(transmitter.delay.calls_ms.len(), 16);
    }

    #[test]
    fn test_frame_length_and_markers() {
        let messages: [&[u8]; 3] = [b"x", b"Hello, LED", &[0x00, 0xff, 0x7f, 0x80]];
        for message in messages {
            let mut transmitter = recording(10);
            transmitter.transmit_once(message).unwrap();

            let levels = &transmitter.tx.levels[1..];
            assert_eq!(levels.len(), 16 + 12 * message.len());
            assert_eq!(&levels[..8], &PREAMBLE);
            assert_eq!(&levels[levels.len() - 8..], &POSTAMBLE);
            for (i, &byte) in message.iter().enumerate() {
                let start = 8 + 12 * i;
                let expected: Vec<bool> = codeword_bits(encode_hamming(byte)).collect();
                assert_eq!(&levels[start..start + 12], &expected[..]);
            }
        }
    }

    #[test]
    fn test_transmit_repeated_sends_identical_frames_with_gaps() {
        let mut single = recording(10);
        single.transmit_once(b"ok").unwrap();
        let frame = single.tx.levels[1..].to_vec();

        let mut transmitter = recording(10);
        transmitter.transmit_repeated(b"ok", 3).unwrap();

        assert_eq!(transmitter.frames_sent, 3);
        assert_eq!(transmitter.tx.levels[1..], frame.repeat(3)[..]);

        let mut expected_delays = Vec::new();
        for _ in 0..3 {
            expected_delays.extend(vec![100; frame.len()]);
            expected_delays.push(300);
        }
        assert_eq!(transmitter.delay.calls_ms, expected_delays);
        // The gap leaves the last postamble level in place.
        assert_eq!(transmitter.level(), Some(true));
    }

    #[test]
    fn test_transmit_repeated_zero_is_noop() {
        let tx = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let mut transmitter = LedTransmitter::new(tx, RecordingDelay::default(), 10).unwrap();

        transmitter.transmit_repeated(b"never", 0).unwrap();
        assert_eq!(transmitter.frames_sent, 0);
        assert!(transmitter.delay.calls_ms.is_empty());
        transmitter.tx.done();
    }

    #[test]
    fn test_gap_level_is_forced_when_configured() {
        let config = TransmitterConfig::default()
            .with_frame_gap_ms(50)
            .with_gap_level(Some(false));
        let mut transmitter =
            LedTransmitter::with_config(RecordingPin::default(), RecordingDelay::default(), config)
                .unwrap();

        transmitter.transmit_repeated(b"", 2).unwrap();
        // init + (16 symbols + forced gap level) per frame
        assert_eq!(transmitter.tx.levels.len(), 1 + 2 * 17);
        assert_eq!(transmitter.tx.levels[17], false);
        assert_eq!(transmitter.delay.calls_ms[16], 50);
        assert_eq!(transmitter.level(), Some(false));
    }

    #[test]
    fn test_cancellation_abandons_frame() {
        let mut transmitter = recording(10);
        let mut polls = 0;
        let result = transmitter.transmit_once_cancellable(b"abc", || {
            polls += 1;
            polls > 5
        });

        assert_eq!(result, Err(TransmitError::Cancelled));
        assert_eq!(transmitter.tx.levels.len(), 1 + 5);
        assert_eq!(transmitter.frames_sent, 0);
    }

    #[test]
    fn test_cancellation_never_requested_completes() {
        let mut transmitter = recording(10);
        transmitter
            .transmit_once_cancellable(b"abc", || false)
            .unwrap();
        assert_eq!(transmitter.tx.levels.len(), 1 + 16 + 36);
        assert_eq!(transmitter.frames_sent, 1);
    }

    #[test]
    fn test_pin_error_propagates() {
        let mut transmitter =
            LedTransmitter::new(FailingPin { allowed: 4 }, RecordingDelay::default(), 10).unwrap();

        // One write went to the idle level at construction.
        let result = transmitter.transmit_once(b"z");
        assert_eq!(result, Err(TransmitError::Pin(Broken)));
        assert_eq!(transmitter.delay.calls_ms.len(), 3);
        // Preamble symbols 0, 1, 0 went out before the failure.
        assert_eq!(transmitter.level(), Some(false));
    }

    #[test]
    fn test_failed_idle_write_leaves_level_unknown() {
        let mut transmitter =
            LedTransmitter::new(FailingPin { allowed: 0 }, RecordingDelay::default(), 10).unwrap();
        assert_eq!(transmitter.level(), None);

        let result = transmitter.emit_symbol(false);
        assert_eq!(result, Err(TransmitError::Pin(Broken)));
        assert_eq!(transmitter.level(), None);
        assert!(transmitter.delay.calls_ms.is_empty());
    }

    #[test]
    fn test_release_returns_parts() {
        let mut transmitter = recording(10);
        transmitter.emit_symbol(true).unwrap();
        let (pin, delay) = transmitter.release();
        assert_eq!(pin.levels, vec![false, true]);
        assert_eq!(delay.calls_ms, vec![100]);
    }
}
