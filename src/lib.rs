//! Freqgraph - Windowed spectral analysis of 16-bit PCM audio
//!
//! Freqgraph walks a mono 16-bit audio stream in consecutive windows and, for
//! each window, reports every frequency bin whose normalized magnitude rises
//! above a threshold. The result is a plain text report that a spectrogram
//! viewer can load, or JSON for other tooling.
//!
//! # Overview
//!
//! Windows are sized so that one window spans exactly one period of the
//! frequency step (`sample_rate / step` samples). Bin `w` then sits at
//! `w * step` Hz and the direct transform lines up with whole periods. The
//! final window of a stream is usually short; it is filled out by tiling its
//! own samples with short linear ramps at the seams.
//!
//! # Spectrum Methods
//!
//! 1. **Direct** (default): a plain DFT evaluated only at the requested bins,
//!    in parallel. Works for any window length.
//!
//! 2. **Fft**: a planned radix-2 transform over the window length rounded up
//!    to a power of two.
//!
//! 3. **FftPerBin**: the same power-of-two layout, but each bin is computed
//!    independently by a recursive butterfly. Slow; kept as a reference for
//!    checking the planned transform.
//!
//! # Quick Start
//!
//! ```no_run
//! use freqgraph::{AnalysisConfig, AnalysisDriver, WavSource};
//!
//! let config = AnalysisConfig::default().with_max_frequency(1000);
//! let driver = AnalysisDriver::new(config)?;
//!
//! let mut source = WavSource::open("voice.wav")?;
//! let report = driver.run(&mut source)?;
//!
//! for block in &report.blocks {
//!     println!("#{}: {} bins", block.sample_offset, block.bins.len());
//! }
//! freqgraph::report::generate("voice.freq", &report)?;
//! # Ok::<(), freqgraph::Error>(())
//! ```
//!
//! # Magnitude Scale
//!
//! | Input | Magnitude at its bin |
//! |-------|----------------------|
//! | Silence | 0 |
//! | Half-scale sine | about π/2 |
//! | Full-scale sine | about π |
//!
//! Bins start at one step above DC, so a constant offset is never listed.
//!
//! # Modules
//!
//! - [`analyzer`]: Sample repeater, spectrum engines and the analysis driver
//! - [`audio`]: Sample sources (WAV files, in-memory buffers)
//! - [`report`]: Output formatters (text, JSON) and report summaries

pub mod analyzer;
pub mod audio;
pub mod config;
pub mod error;
pub mod report;

pub use analyzer::{AnalysisDriver, CancelToken};
pub use audio::{MemorySource, SampleSource, WavSource};
pub use config::{AnalysisConfig, RampScaling, SpectrumMethod};
pub use error::{Error, Result};
pub use report::{Report, ReportBlock, Summary};
