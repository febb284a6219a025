//! # hamlight
//!
//! A portable, no_std Rust driver for sending short text messages over a
//! single LED, read back by a photosensor or a camera.
//!
//! Each byte is protected by a Hamming(12,8) code, so any single flipped bit
//! per character can be corrected by the receiver. Codewords are framed by an
//! alternating preamble and postamble and sent bit-serially with On-Off Keying
//! at a fixed symbol rate.
//!
//! This crate implements:
//! - `embedded-hal` traits for the LED pin and for symbol timing
//! - a pure, table-driven Hamming(12,8) encoder and syndrome decoder
//! - frame recovery from captured symbol streams
//! - an edge-driven slicer turning oversampled light levels into symbols
//!
//! ## Crate features
//! | Feature     | Description |
//! |-------------|-------------|
//! | `std`       | Disables `#![no_std]` support and replaces `heapless::Vec`s with
//! `std::vec::Vec`s |
//! | `log`       | Uses `log` logging |
//! | `defmt-0-3` | Uses `defmt` logging |
//!
//! ## Protocol
//!
//! - A frame is `8 + 12 * len + 8` symbols: preamble `0,1,0,1,0,1,0,1`,
//!   one 12-bit codeword per byte (most significant bit first), postamble
//!   identical to the preamble
//! - Each symbol is held for `1000 / rate` ms; the default rate is 10 symbols/s
//! - Repeated frames are separated by an idle gap (300 ms by default)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hamlight::driver::LedTransmitter;
//!
//! let mut led = LedTransmitter::new(led_pin, delay, 10)?;
//! led.transmit_repeated(b"Hello", 3)?;
//! ```
//!
//! On the receiving side, with one sample per camera frame:
//!
//! ```rust,ignore
//! use hamlight::receiver::deframe;
//! use hamlight::slicer::{AdaptiveThreshold, EdgeSlicer};
//!
//! let mut threshold = AdaptiveThreshold::default();
//! let mut slicer = EdgeSlicer::for_rates(30.0, 10)?;
//! let mut symbols = Vec::new();
//! slicer.feed(intensities.map(|i| threshold.classify(i)), |run| symbols.extend(run.iter()));
//! let received = deframe(&symbols)?;
//! ```
//!
//! ## Integration Notes
//!
//! - Transmission blocks the calling thread for the whole frame
//! - Transmitters on separate pins are independent
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
pub use heapless;

#[macro_use]
mod fmt;

pub mod consts;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod receiver;
pub mod slicer;
pub mod timer;

pub use driver::{LedTransmitter, TransmitterConfig};
pub use encoding::{decode_hamming, encode_hamming};
pub use error::{ConfigError, DecodeError, DeframeError, TransmitError};
