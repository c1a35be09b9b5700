//! Power-of-two fast transform, one bin at a time
//!
//! # The per-bin butterfly
//!
//! A radix-2 decimation-in-time FFT splits a length-`N` transform into two
//! half-length transforms at every stage and recombines them with a twiddle
//! factor. Written as a recursion over `(index, depth)`:
//!
//! ```text
//! stage(n, depth) = data[n]                                   depth == log2 N
//!                 = W · (stage(n - m, d+1) - stage(n, d+1))   n & m != 0
//!                 = stage(n, d+1) + stage(n + m, d+1)         otherwise
//!
//!   where m = 2^depth, W = exp(-2πi · (n mod m) / 2m)
//! ```
//!
//! The recursion emits coefficients in bit-reversed order, so the requested
//! bin is bit-reversed before descending.
//!
//! # Cost
//!
//! `compute_bin` shares nothing between calls: every bin walks its own
//! `2N - 1` node recursion tree, and scanning all bins through it is
//! quadratic. That is the reference behaviour and is kept as-is.
//! [`FastTransformEngine::transform`] is the shared-work variant, backed by a
//! planned rustfft transform, for when a whole spectrum is needed.

use super::spectrum::{BinMagnitude, MagnitudeSpectrum};
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Reverse the low `log2n` bits of `n`.
///
/// `bit_reverse(6, 3)`: `110` becomes `011`, i.e. 3.
pub fn bit_reverse(mut n: usize, log2n: u32) -> usize {
    let mut result = 0;
    for _ in 0..log2n {
        result = (result << 1) | (n & 1);
        n >>= 1;
    }
    result
}

/// `log2(len)` if `len` is a non-zero power of two.
pub fn log2_exact(len: usize) -> Result<u32> {
    if len.is_power_of_two() {
        Ok(len.trailing_zeros())
    } else {
        Err(Error::NotPowerOfTwo { len })
    }
}

/// Complex coefficient of bin `bin_index` of a `2^log2_length`-point signal.
///
/// The input contract is checked up front; nothing is computed for an
/// out-of-range bin or a buffer of the wrong size.
pub fn compute_bin(bin_index: usize, log2_length: u32, data: &[f64]) -> Result<Complex<f64>> {
    // No buffer of 2^log2_length samples can exist past the index width, so
    // whatever was passed is not the power-of-two length it claims to be
    if log2_length >= usize::BITS - 1 {
        return Err(Error::NotPowerOfTwo { len: data.len() });
    }
    let len = 1usize << log2_length;
    if data.len() != len {
        return Err(Error::LengthMismatch {
            expected: len,
            actual: data.len(),
        });
    }
    if bin_index >= len {
        return Err(Error::BinOutOfRange {
            bin: bin_index,
            len,
        });
    }

    let n = bit_reverse(bin_index, log2_length);
    Ok(stage(n, 0, log2_length, data))
}

fn stage(n: usize, depth: u32, log2_length: u32, data: &[f64]) -> Complex<f64> {
    if depth == log2_length {
        return Complex::new(data[n], 0.0);
    }

    let m = 1usize << depth;
    let m2 = m << 1;

    if n & m != 0 {
        let angle = -2.0 * PI * (n & (m - 1)) as f64 / m2 as f64;
        let twiddle = Complex::from_polar(1.0, angle);
        twiddle * (stage(n - m, depth + 1, log2_length, data) - stage(n, depth + 1, log2_length, data))
    } else {
        stage(n, depth + 1, log2_length, data) + stage(n + m, depth + 1, log2_length, data)
    }
}

/// Fixed-length fast transform with both the per-bin and the planned paths.
pub struct FastTransformEngine {
    log2_length: u32,
    fft: Arc<dyn Fft<f64>>,
}

impl FastTransformEngine {
    pub fn new(len: usize) -> Result<Self> {
        let log2_length = log2_exact(len)?;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(len);
        Ok(Self { log2_length, fft })
    }

    /// Number of points in the transform.
    pub fn size(&self) -> usize {
        1 << self.log2_length
    }

    pub fn log2_length(&self) -> u32 {
        self.log2_length
    }

    pub fn compute_bin(&self, bin_index: usize, data: &[f64]) -> Result<Complex<f64>> {
        compute_bin(bin_index, self.log2_length, data)
    }

    /// Every bin through [`compute_bin`], with no reuse between bins.
    pub fn spectrum_per_bin(&self, data: &[f64]) -> Result<Vec<Complex<f64>>> {
        (0..self.size())
            .map(|bin| self.compute_bin(bin, data))
            .collect()
    }

    /// Every bin through the planned transform.
    pub fn transform(&self, data: &[f64]) -> Result<Vec<Complex<f64>>> {
        if data.len() != self.size() {
            return Err(Error::LengthMismatch {
                expected: self.size(),
                actual: data.len(),
            });
        }
        let mut buffer: Vec<Complex<f64>> = data.iter().map(|&x| Complex::new(x, 0.0)).collect();
        self.fft.process(&mut buffer);
        Ok(buffer)
    }

    /// Report-ready magnitudes for bins `1..=N/2` up to `max_frequency`.
    ///
    /// Bin `k` is reported at `round(k · sample_rate / N)` Hz and scaled by
    /// `(2π/N) / full_scale`, the same normalization the direct engine uses,
    /// so the two methods are directly comparable.
    pub fn magnitude_spectrum(
        &self,
        window: &[i16],
        config: &AnalysisConfig,
        per_bin: bool,
    ) -> Result<MagnitudeSpectrum> {
        let n = self.size();
        if window.len() != n {
            return Err(Error::LengthMismatch {
                expected: n,
                actual: window.len(),
            });
        }

        let data: Vec<f64> = window.iter().map(|&s| s as f64).collect();
        let bins: Vec<(usize, u32)> = (1..=n / 2)
            .map(|k| (k, bin_frequency(k, config.sample_rate, n)))
            .take_while(|&(_, freq)| freq <= config.max_frequency)
            .collect();

        let coefficients: Vec<Complex<f64>> = if per_bin {
            bins.iter()
                .map(|&(k, _)| self.compute_bin(k, &data))
                .collect::<Result<_>>()?
        } else {
            let full = self.transform(&data)?;
            bins.iter().map(|&(k, _)| full[k]).collect()
        };

        let scale = 2.0 * PI / n as f64 / config.max_amplitude;
        let bins = bins
            .iter()
            .zip(coefficients)
            .map(|(&(_, freq), c)| BinMagnitude::new(freq, c.norm() * scale))
            .collect();

        Ok(MagnitudeSpectrum::new(bins))
    }
}

/// Frequency in Hz of FFT bin `k` for an `n`-point window.
pub fn bin_frequency(k: usize, sample_rate: u32, n: usize) -> u32 {
    (k as f64 * sample_rate as f64 / n as f64).round() as u32
}
