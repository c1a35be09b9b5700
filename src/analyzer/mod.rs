//! Windowed analysis driver
//!
//! The driver pulls fixed-length windows from a [`SampleSource`], pads the
//! short final window by repetition, runs the configured spectrum engine and
//! keeps the bins louder than the amplitude threshold:
//!
//! ```text
//! source ──▶ window ──▶ [repeat if short] ──▶ engine ──▶ threshold ──▶ block
//! ```
//!
//! Windows are processed strictly in stream order. The only state carried
//! between windows is the running sample offset, which advances by the number
//! of samples actually read (not the padded length).
//!
//! # Engines
//!
//! - [`direct`]: explicit summation at each configured frequency
//! - [`fast`]: radix-2 butterfly, per-bin recursion or planned transform
//! - [`repeat`]: tiling with splice ramps for short windows

pub mod direct;
pub mod fast;
pub mod repeat;
pub mod spectrum;

pub use direct::DirectSpectrumEngine;
pub use fast::{bit_reverse, compute_bin, FastTransformEngine};
pub use repeat::SampleRepeater;
pub use spectrum::{BinMagnitude, MagnitudeSpectrum};

use crate::audio::SampleSource;
use crate::config::{AnalysisConfig, SpectrumMethod};
use crate::error::{Error, Result};
use crate::report::text::TextReportWriter;
use crate::report::{Report, ReportBlock};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag, checked between windows.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum Engine {
    Direct(DirectSpectrumEngine),
    Fast {
        engine: FastTransformEngine,
        per_bin: bool,
    },
}

pub struct AnalysisDriver {
    config: AnalysisConfig,
    repeater: SampleRepeater,
    engine: Engine,
    cancel: Option<CancelToken>,
}

impl AnalysisDriver {
    /// Validate `config` and prepare the engine it selects.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let engine = match config.method {
            SpectrumMethod::Direct => Engine::Direct(DirectSpectrumEngine::new(&config)),
            SpectrumMethod::Fft | SpectrumMethod::FftPerBin => Engine::Fast {
                engine: FastTransformEngine::new(config.window_length())?,
                per_bin: config.method == SpectrumMethod::FftPerBin,
            },
        };

        Ok(Self {
            repeater: SampleRepeater::from_config(&config),
            config,
            engine,
            cancel: None,
        })
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn window_length(&self) -> usize {
        self.config.window_length()
    }

    /// Full (unfiltered) spectrum of one window, padding it if short.
    pub fn spectrum(&self, window: &[i16]) -> Result<MagnitudeSpectrum> {
        let window_len = self.window_length();
        if window.is_empty() {
            return Err(Error::EmptyWindow);
        }
        if window.len() > window_len {
            return Err(Error::LengthMismatch {
                expected: window_len,
                actual: window.len(),
            });
        }

        let padded;
        let samples = if window.len() < window_len {
            log::debug!(
                "padding {}-sample window to {} by repetition",
                window.len(),
                window_len
            );
            padded = self.repeater.repeat(window, window_len)?;
            &padded[..]
        } else {
            window
        };

        match &self.engine {
            Engine::Direct(engine) => engine.compute(samples),
            Engine::Fast { engine, per_bin } => {
                engine.magnitude_spectrum(samples, &self.config, *per_bin)
            }
        }
    }

    /// Report block for the window starting at `sample_offset`.
    pub fn analyze_window(&self, sample_offset: u64, window: &[i16]) -> Result<ReportBlock> {
        let spectrum = self.spectrum(window)?;
        Ok(ReportBlock {
            sample_offset,
            bins: spectrum.above(self.config.amplitude_threshold),
        })
    }

    /// Analyze the whole source, handing each finished block to `sink`.
    ///
    /// Returns the number of windows analyzed.
    pub fn run_with<S, F>(&self, source: &mut S, mut sink: F) -> Result<usize>
    where
        S: SampleSource + ?Sized,
        F: FnMut(ReportBlock) -> Result<()>,
    {
        if source.sample_rate() != self.config.sample_rate {
            return Err(Error::InvalidConfig(format!(
                "source is {} Hz but analysis is configured for {} Hz",
                source.sample_rate(),
                self.config.sample_rate
            )));
        }

        let window_len = self.window_length();
        let mut buffer = vec![0i16; window_len];
        let mut offset: u64 = 0;
        let mut windows = 0;

        loop {
            if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                log::info!("analysis cancelled at sample {}", offset);
                return Err(Error::Cancelled);
            }
            if let Some(max) = self.config.max_samples {
                if offset >= max {
                    log::debug!("reached sample bound {}", max);
                    break;
                }
            }

            let read = source.read_window(&mut buffer)?;
            if read == 0 {
                break;
            }

            let block = self.analyze_window(offset, &buffer[..read])?;
            log::debug!(
                "window #{} at {}: {} bins above threshold",
                windows,
                offset,
                block.bins.len()
            );
            sink(block)?;

            offset += read as u64;
            windows += 1;
        }

        Ok(windows)
    }

    /// Analyze the whole source into an in-memory report.
    pub fn run<S: SampleSource + ?Sized>(&self, source: &mut S) -> Result<Report> {
        let mut report = Report::new(source.total_samples(), self.window_length());
        self.run_with(source, |block| {
            report.blocks.push(block);
            Ok(())
        })?;
        Ok(report)
    }

    /// Stream the text report to `writer` as windows complete.
    pub fn run_to_writer<S, W>(&self, source: &mut S, writer: W) -> Result<usize>
    where
        S: SampleSource + ?Sized,
        W: Write,
    {
        let mut out = TextReportWriter::new(writer);
        out.write_header(source.total_samples(), self.window_length())?;
        let windows = self.run_with(source, |block| out.write_block(&block))?;
        out.flush()?;
        Ok(windows)
    }
}
