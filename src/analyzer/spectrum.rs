//! Magnitude spectrum types produced by the engines

use serde::{Deserialize, Serialize};

/// Magnitude at one analyzed frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinMagnitude {
    /// Frequency in Hz
    pub frequency: u32,
    /// Normalized magnitude (always >= 0)
    pub magnitude: f64,
}

impl BinMagnitude {
    pub fn new(frequency: u32, magnitude: f64) -> Self {
        Self {
            frequency,
            magnitude,
        }
    }
}

/// Magnitudes for every configured bin of one window, in ascending frequency.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MagnitudeSpectrum {
    pub bins: Vec<BinMagnitude>,
}

impl MagnitudeSpectrum {
    pub fn new(bins: Vec<BinMagnitude>) -> Self {
        Self { bins }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BinMagnitude> {
        self.bins.iter()
    }

    pub fn magnitude_at(&self, frequency: u32) -> Option<f64> {
        self.bins
            .iter()
            .find(|b| b.frequency == frequency)
            .map(|b| b.magnitude)
    }

    /// Bins strictly louder than `threshold`, order preserved.
    pub fn above(&self, threshold: f64) -> Vec<BinMagnitude> {
        self.bins
            .iter()
            .filter(|b| b.magnitude > threshold)
            .copied()
            .collect()
    }

    pub fn peak(&self) -> Option<BinMagnitude> {
        self.bins
            .iter()
            .copied()
            .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MagnitudeSpectrum {
        MagnitudeSpectrum::new(vec![
            BinMagnitude::new(5, 0.1),
            BinMagnitude::new(10, 2.5),
            BinMagnitude::new(15, 0.5),
            BinMagnitude::new(20, 0.51),
        ])
    }

    #[test]
    fn test_above_is_strict() {
        let kept = sample().above(0.5);
        let freqs: Vec<u32> = kept.iter().map(|b| b.frequency).collect();
        assert_eq!(freqs, vec![10, 20]);
    }

    #[test]
    fn test_peak() {
        assert_eq!(sample().peak(), Some(BinMagnitude::new(10, 2.5)));
        assert_eq!(MagnitudeSpectrum::default().peak(), None);
    }

    #[test]
    fn test_magnitude_lookup() {
        assert_eq!(sample().magnitude_at(15), Some(0.5));
        assert_eq!(sample().magnitude_at(25), None);
    }
}
