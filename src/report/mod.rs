//! Report generation for analysis results
//!
//! A report is a header (total sample count and window length) followed by
//! one block per analyzed window. Two output formats are supported:
//!
//! - **Text**: the line-oriented format read by the spectrogram viewer
//! - **JSON**: machine-readable, with a summary section
//!
//! # Usage
//!
//! ```ignore
//! use freqgraph::report;
//!
//! // Automatically picks format based on extension
//! report::generate("song.json", &report)?;  // JSON
//! report::generate("song.freq", &report)?;  // Text
//! ```

pub mod json;
pub mod text;

use crate::analyzer::BinMagnitude;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::BufWriter;
use std::path::Path;

/// Bins above the threshold for the window starting at `sample_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBlock {
    pub sample_offset: u64,
    pub bins: Vec<BinMagnitude>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Total samples declared by the source
    pub total_samples: u64,
    /// Samples per analysis window
    pub window_length: usize,
    pub blocks: Vec<ReportBlock>,
}

impl Report {
    pub fn new(total_samples: u64, window_length: usize) -> Self {
        Self {
            total_samples,
            window_length,
            blocks: Vec::new(),
        }
    }
}

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, report: &Report) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let file = BufWriter::new(std::fs::File::create(path)?);

    match ext.as_str() {
        "json" => json::write(file, report),
        _ => text::write(file, report),
    }
}

/// Loudest single bin in a report
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakBin {
    pub sample_offset: u64,
    pub frequency: u32,
    pub magnitude: f64,
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub windows: usize,
    /// Windows with no bin above the threshold
    pub silent_windows: usize,
    pub total_bins: usize,
    pub peak: Option<PeakBin>,
    /// Frequency present in the most windows (lowest wins ties)
    pub dominant_frequency: Option<u32>,
}

impl Summary {
    pub fn from_report(report: &Report) -> Self {
        let mut summary = Self {
            windows: report.blocks.len(),
            ..Self::default()
        };
        let mut hits: BTreeMap<u32, usize> = BTreeMap::new();

        for block in &report.blocks {
            if block.bins.is_empty() {
                summary.silent_windows += 1;
            }
            summary.total_bins += block.bins.len();

            for bin in &block.bins {
                *hits.entry(bin.frequency).or_insert(0) += 1;
                if summary.peak.map_or(true, |p| bin.magnitude > p.magnitude) {
                    summary.peak = Some(PeakBin {
                        sample_offset: block.sample_offset,
                        frequency: bin.frequency,
                        magnitude: bin.magnitude,
                    });
                }
            }
        }

        let mut best: Option<(u32, usize)> = None;
        for (&freq, &count) in &hits {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((freq, count));
            }
        }
        summary.dominant_frequency = best.map(|(freq, _)| freq);

        summary
    }
}
