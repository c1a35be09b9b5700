//! Analysis configuration
//!
//! Every numeric knob of the pipeline lives here rather than in constants, so
//! tests and the CLI can vary them freely. The defaults reproduce the classic
//! setup: 44.1 kHz audio, 5 Hz resolution up to 2 kHz, and a 0.5 amplitude
//! threshold against a 16-bit full scale.
//!
//! # Bin layout
//!
//! Bins are generated as `step, 2*step, ..., floor(max_frequency / step) * step`.
//! `max_frequency` does not need to be a multiple of `step`.
//!
//! # Window length
//!
//! The direct engine evaluates bin `w` at `w` cycles per window, so a window
//! of `sample_rate / step` samples makes bin `w` land on exactly `w * step` Hz.
//! The FFT methods round that length up to the next power of two.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_FREQUENCY_STEP: u32 = 5;
pub const DEFAULT_MAX_FREQUENCY: u32 = 2000;
pub const DEFAULT_AMPLITUDE_THRESHOLD: f64 = 0.5;
/// Full-scale reference for signed 16-bit samples
pub const DEFAULT_MAX_AMPLITUDE: f64 = 32768.0;
pub const DEFAULT_FADE_WIDTH: usize = 10;

/// How the repeater computes its splice ramp factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RampScaling {
    /// `i / K` as a real ratio: a true linear fade.
    #[default]
    Linear,
    /// `i / K` in integer arithmetic. Every sample inside the ramp is zeroed.
    /// Only useful for reproducing reports made with integer ramp factors.
    Truncated,
}

/// Which engine computes each window's spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpectrumMethod {
    /// Explicit summation at each configured frequency.
    #[default]
    Direct,
    /// Planned full transform over a power-of-two window.
    Fft,
    /// Recursive butterfly, one independent call per bin.
    FftPerBin,
}

impl SpectrumMethod {
    pub fn is_fft(self) -> bool {
        !matches!(self, SpectrumMethod::Direct)
    }
}

impl fmt::Display for SpectrumMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpectrumMethod::Direct => write!(f, "direct"),
            SpectrumMethod::Fft => write!(f, "fft"),
            SpectrumMethod::FftPerBin => write!(f, "fft-per-bin"),
        }
    }
}

impl FromStr for SpectrumMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "direct" | "dft" => Ok(SpectrumMethod::Direct),
            "fft" => Ok(SpectrumMethod::Fft),
            "fft-per-bin" | "per-bin" => Ok(SpectrumMethod::FftPerBin),
            other => Err(Error::InvalidConfig(format!("unknown method '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Samples per second of the analyzed stream
    pub sample_rate: u32,
    /// Highest analyzed frequency in Hz
    pub max_frequency: u32,
    /// Spacing between bins in Hz (delta)
    pub frequency_step: u32,
    /// Bins at or below this magnitude are dropped from the report
    pub amplitude_threshold: f64,
    /// Full-scale sample value used to normalize magnitudes
    pub max_amplitude: f64,
    /// Number of samples ramped on each side of a repeat seam
    pub fade_width: usize,
    pub ramp: RampScaling,
    pub method: SpectrumMethod,
    /// Stop once this many samples have been analyzed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_samples: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            frequency_step: DEFAULT_FREQUENCY_STEP,
            amplitude_threshold: DEFAULT_AMPLITUDE_THRESHOLD,
            max_amplitude: DEFAULT_MAX_AMPLITUDE,
            fade_width: DEFAULT_FADE_WIDTH,
            ramp: RampScaling::Linear,
            method: SpectrumMethod::Direct,
            max_samples: None,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_frequency_step(mut self, step: u32) -> Self {
        self.frequency_step = step;
        self
    }

    pub fn with_max_frequency(mut self, max_frequency: u32) -> Self {
        self.max_frequency = max_frequency;
        self
    }

    pub fn with_amplitude_threshold(mut self, threshold: f64) -> Self {
        self.amplitude_threshold = threshold;
        self
    }

    pub fn with_max_amplitude(mut self, max_amplitude: f64) -> Self {
        self.max_amplitude = max_amplitude;
        self
    }

    pub fn with_fade_width(mut self, fade_width: usize) -> Self {
        self.fade_width = fade_width;
        self
    }

    pub fn with_ramp(mut self, ramp: RampScaling) -> Self {
        self.ramp = ramp;
        self
    }

    pub fn with_method(mut self, method: SpectrumMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_max_samples(mut self, max_samples: Option<u64>) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Reject configurations that cannot produce a single valid window.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidConfig("sample rate must be positive".into()));
        }
        if self.frequency_step == 0 {
            return Err(Error::InvalidConfig(
                "frequency step must be positive".into(),
            ));
        }
        if self.frequency_step > self.sample_rate {
            return Err(Error::InvalidConfig(format!(
                "frequency step {} Hz leaves no samples per window at {} Hz",
                self.frequency_step, self.sample_rate
            )));
        }
        if !self.max_amplitude.is_finite() || self.max_amplitude <= 0.0 {
            return Err(Error::InvalidConfig(
                "full-scale amplitude must be positive".into(),
            ));
        }
        if self.amplitude_threshold.is_nan() {
            return Err(Error::InvalidConfig("amplitude threshold is NaN".into()));
        }
        if self.method.is_fft() && self.window_length() > self.sample_rate as usize {
            // FFT bins closer than 1 Hz would round onto the same report label
            return Err(Error::InvalidConfig(format!(
                "{}-point FFT at {} Hz spaces bins under 1 Hz apart; raise the frequency step",
                self.window_length(),
                self.sample_rate
            )));
        }
        if self.max_samples == Some(0) {
            return Err(Error::InvalidConfig(
                "maximum sample bound must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Number of bins evaluated by the direct engine.
    pub fn num_bins(&self) -> usize {
        if self.frequency_step == 0 {
            return 0;
        }
        (self.max_frequency / self.frequency_step) as usize
    }

    /// Bin frequencies in Hz, in report order.
    pub fn bin_frequencies(&self) -> Vec<u32> {
        (1..=self.num_bins() as u32)
            .map(|w| w * self.frequency_step)
            .collect()
    }

    /// Samples per analysis window for the configured method.
    pub fn window_length(&self) -> usize {
        let base = (self.sample_rate / self.frequency_step.max(1)).max(1) as usize;
        if self.method.is_fft() {
            base.next_power_of_two()
        } else {
            base
        }
    }
}
