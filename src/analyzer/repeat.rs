//! Padding short windows by repetition
//!
//! When the last read from a file comes back shorter than the analysis window,
//! the direct engine would otherwise evaluate its bins against the wrong
//! length and report every frequency at the wrong place. Instead we tile the
//! short window until it fills the full length.
//!
//! ## Splice ramps
//!
//! Gluing copies end-to-start puts a step discontinuity at every seam, and a
//! step has energy at all frequencies. To keep that broadband energy out of
//! the spectrum, the `K` samples on each side of a seam are faded toward zero:
//!
//! ```text
//!   copy 1                 seam                 copy 2
//!   ... 1.0 1.0 0.2 0.1 0.0 | 0.0 0.1 0.2 1.0 1.0 ...
//!               `--- K ---'   `--- K ---'
//! ```
//!
//! The start of the first copy and the (possibly truncated) end of the last
//! copy are not seams and are left untouched.

use crate::config::{AnalysisConfig, RampScaling};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRepeater {
    fade_width: usize,
    ramp: RampScaling,
}

impl Default for SampleRepeater {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FADE_WIDTH, RampScaling::Linear)
    }
}

impl SampleRepeater {
    pub fn new(fade_width: usize, ramp: RampScaling) -> Self {
        Self { fade_width, ramp }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.fade_width, config.ramp)
    }

    pub fn fade_width(&self) -> usize {
        self.fade_width
    }

    /// Gain applied to the sample `distance` positions away from a seam.
    pub fn ramp_factor(&self, distance: usize) -> f64 {
        if distance >= self.fade_width {
            return 1.0;
        }
        match self.ramp {
            RampScaling::Linear => distance as f64 / self.fade_width as f64,
            RampScaling::Truncated => (distance / self.fade_width) as f64,
        }
    }

    /// Tile `source` into a buffer of exactly `target_len` samples.
    ///
    /// A source at least as long as the target is truncated to it unchanged.
    pub fn repeat(&self, source: &[i16], target_len: usize) -> Result<Vec<i16>> {
        if source.is_empty() {
            return Err(Error::EmptyWindow);
        }
        if target_len == 0 {
            return Err(Error::InvalidConfig(
                "repeat target length must be positive".into(),
            ));
        }
        if source.len() >= target_len {
            return Ok(source[..target_len].to_vec());
        }

        let mut out = Vec::with_capacity(target_len);
        let mut segments = Vec::new();
        while out.len() < target_len {
            let take = source.len().min(target_len - out.len());
            segments.push((out.len(), take));
            out.extend_from_slice(&source[..take]);
        }

        let last = segments.len() - 1;
        for (idx, &(start, len)) in segments.iter().enumerate() {
            let width = self.fade_width.min(len);
            if idx > 0 {
                for i in 0..width {
                    let pos = start + i;
                    out[pos] = self.scale(out[pos], i);
                }
            }
            if idx < last {
                for i in 0..width {
                    let pos = start + len - 1 - i;
                    out[pos] = self.scale(out[pos], i);
                }
            }
        }

        Ok(out)
    }

    fn scale(&self, sample: i16, distance: usize) -> i16 {
        // |sample * f| <= |sample| for f in [0, 1], so rounding stays in range
        (sample as f64 * self.ramp_factor(distance)).round() as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // LENGTH TESTS
    // ==========================================================================

    #[test]
    fn test_output_length_is_exact() {
        let repeater = SampleRepeater::default();
        for n in 1..40usize {
            let source: Vec<i16> = (0..n as i16).map(|i| i * 100 + 1).collect();
            for target in n..90 {
                let out = repeater.repeat(&source, target).unwrap();
                assert_eq!(out.len(), target, "n={} target={}", n, target);
            }
        }
    }

    #[test]
    fn test_equal_length_is_identity() {
        let source = vec![5, -7, 300, 12000, -32768];
        let out = SampleRepeater::default().repeat(&source, 5).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn test_longer_source_is_truncated() {
        let source = vec![1, 2, 3, 4, 5, 6];
        let out = SampleRepeater::default().repeat(&source, 4).unwrap();
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    // ==========================================================================
    // RAMP TESTS
    // ==========================================================================
    //
    // Inside a ramp region the output may only get quieter than the source;
    // everywhere else it must be an exact copy.
    // ==========================================================================

    #[test]
    fn test_ramp_only_attenuates() {
        let repeater = SampleRepeater::new(10, RampScaling::Linear);
        let source: Vec<i16> = (0..37).map(|i| ((i * 977) % 20000 - 10000) as i16).collect();
        let target = 200;
        let out = repeater.repeat(&source, target).unwrap();

        let n = source.len();
        for (i, &sample) in out.iter().enumerate() {
            let src = source[i % n];
            let offset = i % n;
            let seg_start = i - offset;
            let near_seam_before = seg_start > 0 && offset < 10;
            let has_seam_after = seg_start + n < target;
            let near_seam_after = has_seam_after && offset >= n - 10;

            if near_seam_before || near_seam_after {
                assert!(
                    (sample as i32).abs() <= (src as i32).abs(),
                    "sample {} grew: {} vs {}",
                    i,
                    sample,
                    src
                );
            } else {
                assert_eq!(sample, src, "sample {} outside ramp changed", i);
            }
        }
    }

    #[test]
    fn test_seam_samples_are_silenced() {
        let repeater = SampleRepeater::new(4, RampScaling::Linear);
        let source = vec![1000i16; 12];
        let out = repeater.repeat(&source, 24).unwrap();

        // Untouched start, ramp down into the seam, ramp back up after it
        assert_eq!(&out[..8], &[1000; 8]);
        assert_eq!(&out[8..12], &[750, 500, 250, 0]);
        assert_eq!(&out[12..16], &[0, 250, 500, 750]);
        assert_eq!(&out[16..], &[1000; 8]);
    }

    #[test]
    fn test_truncated_tail_keeps_its_end() {
        // The last partial copy ends at the buffer boundary, not at a seam
        let repeater = SampleRepeater::new(2, RampScaling::Linear);
        let source = vec![100i16; 6];
        let out = repeater.repeat(&source, 10).unwrap();
        assert_eq!(out, vec![100, 100, 100, 100, 50, 0, 0, 50, 100, 100]);
    }

    #[test]
    fn test_source_shorter_than_fade() {
        let repeater = SampleRepeater::new(10, RampScaling::Linear);
        let source = vec![-2000i16, 4000, 8000];
        let out = repeater.repeat(&source, 9).unwrap();
        assert_eq!(out.len(), 9);
        for (i, &s) in out.iter().enumerate() {
            assert!((s as i32).abs() <= (source[i % 3] as i32).abs());
        }
        // The whole first copy falls inside the fade-out before the first
        // seam: distances 2, 1, 0 give gains 0.2, 0.1, 0.0
        assert_eq!(&out[..3], &[-400, 400, 0]);
    }

    #[test]
    fn test_single_sample_source() {
        let out = SampleRepeater::default().repeat(&[1234], 5).unwrap();
        assert_eq!(out, vec![0, 0, 0, 0, 0]);

        let no_fade = SampleRepeater::new(0, RampScaling::Linear);
        assert_eq!(no_fade.repeat(&[1234], 3).unwrap(), vec![1234; 3]);
    }

    #[test]
    fn test_truncated_scaling_zeroes_ramp() {
        let repeater = SampleRepeater::new(3, RampScaling::Truncated);
        assert_eq!(repeater.ramp_factor(0), 0.0);
        assert_eq!(repeater.ramp_factor(2), 0.0);
        assert_eq!(repeater.ramp_factor(3), 1.0);

        let out = repeater.repeat(&[500i16; 8], 16).unwrap();
        assert_eq!(&out[..5], &[500; 5]);
        assert_eq!(&out[5..11], &[0; 6]);
        assert_eq!(&out[11..], &[500; 5]);
    }

    #[test]
    fn test_linear_factors() {
        let repeater = SampleRepeater::new(10, RampScaling::Linear);
        assert_eq!(repeater.ramp_factor(0), 0.0);
        assert!((repeater.ramp_factor(5) - 0.5).abs() < 1e-12);
        assert!((repeater.ramp_factor(9) - 0.9).abs() < 1e-12);
        assert_eq!(repeater.ramp_factor(10), 1.0);
    }

    // ==========================================================================
    // CONTRACT VIOLATIONS
    // ==========================================================================

    #[test]
    fn test_empty_source_rejected() {
        let err = SampleRepeater::default().repeat(&[], 10).unwrap_err();
        assert!(matches!(err, Error::EmptyWindow));
    }

    #[test]
    fn test_zero_target_rejected() {
        let err = SampleRepeater::default().repeat(&[1, 2], 0).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
