//! Direct spectral estimation by explicit summation
//!
//! Instead of a transform, each requested frequency is evaluated on its own:
//!
//! ```text
//! real(w) = Σ s[t]·cos(w·2π·t/N)      imag(w) = Σ s[t]·sin(w·2π·t/N)
//! |X(w)|  = sqrt(real² + imag²) · (2π/N) / full_scale
//! ```
//!
//! Because bins are chosen freely, frequency resolution and window length are
//! independent knobs, which a power-of-two FFT cannot offer. The price is
//! `O(N × bins)` work per window: fine for offline batches, too slow for
//! live audio.
//!
//! Each bin's sum runs sequentially over `t`, so results are bit-identical no
//! matter how many threads share the bins.

use super::spectrum::{BinMagnitude, MagnitudeSpectrum};
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use rayon::prelude::*;
use std::f64::consts::PI;

#[derive(Debug, Clone)]
pub struct DirectSpectrumEngine {
    frequencies: Vec<u32>,
    max_amplitude: f64,
}

impl DirectSpectrumEngine {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            frequencies: config.bin_frequencies(),
            max_amplitude: config.max_amplitude,
        }
    }

    pub fn num_bins(&self) -> usize {
        self.frequencies.len()
    }

    /// Magnitude at every configured bin, treating the whole slice as the
    /// window (`num_samples == window.len()`).
    pub fn compute(&self, window: &[i16]) -> Result<MagnitudeSpectrum> {
        if window.is_empty() {
            return Err(Error::EmptyWindow);
        }

        let bins = self
            .frequencies
            .par_iter()
            .enumerate()
            .map(|(idx, &frequency)| {
                let magnitude = bin_magnitude(window, idx + 1, self.max_amplitude);
                BinMagnitude::new(frequency, magnitude)
            })
            .collect();

        Ok(MagnitudeSpectrum::new(bins))
    }
}

/// Normalized magnitude of `w` cycles per window.
pub fn bin_magnitude(window: &[i16], w: usize, max_amplitude: f64) -> f64 {
    let n = window.len() as f64;
    let s = 2.0 * PI / n;

    let mut real = 0.0;
    let mut imag = 0.0;
    for (t, &sample) in window.iter().enumerate() {
        let theta = w as f64 * s * t as f64;
        real += sample as f64 * theta.cos();
        imag += sample as f64 * theta.sin();
    }

    let scale = s / max_amplitude;
    real *= scale;
    imag *= scale;

    (real * real + imag * imag).sqrt()
}
