//! Symbol recovery from oversampled light levels.
//!
//! A camera or photosensor sees the LED many times per symbol. This module
//! turns those samples back into symbols by measuring how long the level
//! stays put between edges and dividing by the expected samples per symbol,
//! rounding to the nearest whole symbol. Edges re-synchronise the count, so
//! small drift between the sample clock and the transmitter does not build up
//! across a frame.
//!
//! Raw intensities (e.g. the number of bright pixels in a frame) become levels
//! through an [`AdaptiveThreshold`], which follows slow changes in ambient light.

use embedded_hal::digital::InputPin;
use libm::roundf;

use crate::error::ConfigError;
use crate::timer;

/// Default smoothing factor of [`AdaptiveThreshold`].
pub const DEFAULT_SMOOTHING: f32 = 0.05;

/// A stretch of identical symbols recovered from one constant-level run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Run {
    /// Level of every symbol in the run.
    pub level: bool,
    /// Number of symbols.
    pub count: u32,
}

impl Run {
    /// The run expanded into individual symbols.
    pub fn iter(&self) -> impl Iterator<Item = bool> {
        core::iter::repeat(self.level).take(self.count as usize)
    }
}

#[derive(Debug, Clone)]
/// Edge-driven slicer converting level samples into symbol runs.
///
/// The line is assumed low before the first sample, matching an idle LED.
pub struct EdgeSlicer {
    /// Expected samples per symbol, possibly fractional.
    samples_per_bit: f32,

    /// Level of the run being measured.
    level: bool,

    /// Samples seen since the last edge.
    run_samples: u32,
}

impl EdgeSlicer {
    /// Creates a slicer for `samples_per_bit` samples per symbol.
    ///
    /// Returns [`ConfigError::InvalidSampleRate`] unless the value is positive and finite.
    pub fn new(samples_per_bit: f32) -> Result<Self, ConfigError> {
        if !(samples_per_bit.is_finite() && samples_per_bit > 0.0) {
            return Err(ConfigError::InvalidSampleRate);
        }
        Ok(Self {
            samples_per_bit,
            level: false,
            run_samples: 0,
        })
    }

    /// Creates a slicer from the sampling rate (e.g. camera fps) and the
    /// transmitter's symbol rate.
    pub fn for_rates(sample_rate_hz: f32, symbol_rate: u32) -> Result<Self, ConfigError> {
        Self::new(timer::samples_per_bit(sample_rate_hz, symbol_rate)?)
    }

    /// Expected samples per symbol.
    pub fn samples_per_bit(&self) -> f32 {
        self.samples_per_bit
    }

    fn close_run(&self) -> Option<Run> {
        let count = roundf(self.run_samples as f32 / self.samples_per_bit) as u32;
        (count > 0).then_some(Run {
            level: self.level,
            count,
        })
    }

    /// Feeds one sample.
    ///
    /// Returns the run that just ended when the level changes. Runs shorter
    /// than half a symbol round to nothing and are dropped.
    pub fn push(&mut self, level: bool) -> Option<Run> {
        if level == self.level {
            self.run_samples = self.run_samples.saturating_add(1);
            return None;
        }
        let run = self.close_run();
        self.level = level;
        self.run_samples = 1;
        run
    }

    /// Flushes the run in progress at the end of a capture.
    pub fn finish(&mut self) -> Option<Run> {
        let run = self.close_run();
        self.run_samples = 0;
        run
    }

    /// Samples `rx` once and feeds the level.
    ///
    /// Should be called at the sample rate the slicer was built for.
    pub fn update<RX: InputPin>(&mut self, rx: &mut RX) -> Result<Option<Run>, RX::Error> {
        let level = rx.is_high()?;
        Ok(self.push(level))
    }

    /// Feeds a whole capture, handing every run (including the final one) to `on_run`.
    pub fn feed<I, F>(&mut self, samples: I, mut on_run: F)
    where
        I: IntoIterator<Item = bool>,
        F: FnMut(Run),
    {
        for level in samples {
            if let Some(run) = self.push(level) {
                on_run(run);
            }
        }
        if let Some(run) = self.finish() {
            on_run(run);
        }
    }
}

/// Threshold that tracks the mean intensity of the signal.
///
/// The threshold is an exponential moving average seeded with the first
/// sample. A sample is high when it is strictly above the updated threshold.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveThreshold {
    alpha: f32,
    threshold: Option<f32>,
}

impl AdaptiveThreshold {
    /// Creates a threshold with smoothing factor `alpha` in `(0, 1]`.
    ///
    /// Small values follow the ambient light slowly; [`DEFAULT_SMOOTHING`] is 0.05.
    pub fn new(alpha: f32) -> Result<Self, ConfigError> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::InvalidSmoothing);
        }
        Ok(Self {
            alpha,
            threshold: None,
        })
    }

    /// Current threshold, once a sample has been seen.
    pub fn threshold(&self) -> Option<f32> {
        self.threshold
    }

    /// Updates the threshold with `intensity` and classifies it.
    pub fn classify(&mut self, intensity: f32) -> bool {
        let threshold = match self.threshold {
            None => intensity,
            Some(previous) => self.alpha * intensity + (1.0 - self.alpha) * previous,
        };
        self.threshold = Some(threshold);
        intensity > threshold
    }
}

impl Default for AdaptiveThreshold {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_SMOOTHING,
            threshold: None,
        }
    }
}
