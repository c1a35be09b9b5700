//! Audio sample sources
//!
//! The analysis driver only needs three things from its input: the sample
//! rate, the total sample count (for the report header), and sequential reads
//! of fixed-size windows. A read returning `0` marks the end of the stream.
//!
//! - [`wav`]: 16-bit mono WAV files decoded through symphonia
//! - [`MemorySource`]: samples already in memory

pub mod wav;

pub use wav::WavSource;

use crate::error::Result;

/// Sequential reader of mono signed 16-bit samples.
pub trait SampleSource {
    fn sample_rate(&self) -> u32;

    /// Total samples in the stream, as declared up front.
    fn total_samples(&self) -> u64;

    /// Fill `buf` with the next samples and return how many were written.
    ///
    /// A short count only happens at the end of the stream; `0` means the
    /// stream is exhausted.
    fn read_window(&mut self, buf: &mut [i16]) -> Result<usize>;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn total_samples(&self) -> u64 {
        (**self).total_samples()
    }

    fn read_window(&mut self, buf: &mut [i16]) -> Result<usize> {
        (**self).read_window(buf)
    }
}

/// In-memory sample buffer.
#[derive(Debug, Clone)]
pub struct MemorySource {
    samples: Vec<i16>,
    sample_rate: u32,
    position: usize,
}

impl MemorySource {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }
}

impl SampleSource for MemorySource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_samples(&self) -> u64 {
        self.samples.len() as u64
    }

    fn read_window(&mut self, buf: &mut [i16]) -> Result<usize> {
        let count = buf.len().min(self.remaining());
        buf[..count].copy_from_slice(&self.samples[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_reads_in_windows() {
        let mut source = MemorySource::new((0..10).collect(), 8000);
        let mut buf = [0i16; 4];

        assert_eq!(source.read_window(&mut buf).unwrap(), 4);
        assert_eq!(buf, [0, 1, 2, 3]);
        assert_eq!(source.read_window(&mut buf).unwrap(), 4);
        assert_eq!(buf, [4, 5, 6, 7]);
        assert_eq!(source.read_window(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[8, 9]);
        assert_eq!(source.read_window(&mut buf).unwrap(), 0);
        assert_eq!(source.read_window(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_memory_source_metadata() {
        let source = MemorySource::new(vec![0; 300], 22050);
        assert_eq!(source.sample_rate(), 22050);
        assert_eq!(source.total_samples(), 300);
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn SampleSource> = Box::new(MemorySource::new(vec![7; 3], 100));
        let mut buf = [0i16; 8];
        assert_eq!(source.read_window(&mut buf).unwrap(), 3);
        assert_eq!(source.total_samples(), 3);
    }
}
