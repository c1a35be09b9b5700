//! Line-oriented text report
//!
//! ```text
//! <total_sample_count>
//! <window_length_in_samples>
//! #<sample_offset>
//! <frequency> <magnitude>
//! ...
//! <blank line>
//! #<next_sample_offset>
//! ...
//! ```
//!
//! Magnitudes use six decimals. A window without qualifying bins is just its
//! `#` line followed by the blank terminator. Blocks are rendered in full
//! before they are written, so a failing analysis never leaves a header
//! without its terminator.

use super::{Report, ReportBlock};
use crate::analyzer::BinMagnitude;
use crate::error::{Error, Result};
use std::io::{BufRead, Write};

fn render_header(total_samples: u64, window_length: usize) -> String {
    format!("{}\n{}\n", total_samples, window_length)
}

fn render_block(block: &ReportBlock) -> String {
    let mut out = format!("#{}\n", block.sample_offset);
    for bin in &block.bins {
        out.push_str(&format!("{} {:.6}\n", bin.frequency, bin.magnitude));
    }
    out.push('\n');
    out
}

/// Render a complete report to a string.
pub fn render(report: &Report) -> String {
    let mut out = render_header(report.total_samples, report.window_length);
    for block in &report.blocks {
        out.push_str(&render_block(block));
    }
    out
}

pub fn write<W: Write>(writer: W, report: &Report) -> Result<()> {
    let mut out = TextReportWriter::new(writer);
    out.write_header(report.total_samples, report.window_length)?;
    for block in &report.blocks {
        out.write_block(block)?;
    }
    out.flush()
}

/// Incremental writer: the header once, then one whole block per window.
pub struct TextReportWriter<W: Write> {
    writer: W,
    header_written: bool,
}

impl<W: Write> TextReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
        }
    }

    pub fn write_header(&mut self, total_samples: u64, window_length: usize) -> Result<()> {
        if self.header_written {
            return Err(Error::InvalidConfig("report header already written".into()));
        }
        self.writer
            .write_all(render_header(total_samples, window_length).as_bytes())?;
        self.header_written = true;
        Ok(())
    }

    pub fn write_block(&mut self, block: &ReportBlock) -> Result<()> {
        if !self.header_written {
            return Err(Error::InvalidConfig(
                "report header must precede blocks".into(),
            ));
        }
        self.writer.write_all(render_block(block).as_bytes())?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Read a text report back.
///
/// Blank lines between blocks are tolerated, and the final block may end at
/// end of file without its blank terminator.
pub fn parse<R: BufRead>(reader: R) -> Result<Report> {
    let mut lines = reader.lines().enumerate().map(|(i, line)| (i + 1, line));

    let total_samples = header_value(lines.next(), 1, "total sample count")?;
    let window_length = header_value(lines.next(), 2, "window length")?;
    let mut report = Report::new(total_samples, window_length);

    let mut current: Option<ReportBlock> = None;
    for (line_no, line) in lines {
        let line = line?;
        let line = line.trim_end_matches('\r');

        match current.as_mut() {
            None => {
                if line.is_empty() {
                    continue;
                }
                let offset = line
                    .strip_prefix('#')
                    .ok_or_else(|| parse_error(line_no, format!("expected '#<offset>', got '{}'", line)))?;
                let sample_offset = offset
                    .trim()
                    .parse()
                    .map_err(|_| parse_error(line_no, format!("bad sample offset '{}'", offset)))?;
                current = Some(ReportBlock {
                    sample_offset,
                    bins: Vec::new(),
                });
            }
            Some(block) => {
                if line.is_empty() {
                    report.blocks.extend(current.take());
                    continue;
                }
                block.bins.push(parse_bin(line, line_no)?);
            }
        }
    }
    report.blocks.extend(current);

    Ok(report)
}

fn header_value<T: std::str::FromStr>(
    line: Option<(usize, std::io::Result<String>)>,
    line_no: usize,
    what: &str,
) -> Result<T> {
    let (_, line) = line.ok_or_else(|| parse_error(line_no, format!("missing {}", what)))?;
    let line = line?;
    line.trim()
        .parse()
        .map_err(|_| parse_error(line_no, format!("bad {} '{}'", what, line.trim())))
}

fn parse_bin(line: &str, line_no: usize) -> Result<BinMagnitude> {
    let (freq, mag) = line
        .split_once(' ')
        .ok_or_else(|| parse_error(line_no, format!("expected '<frequency> <magnitude>', got '{}'", line)))?;
    let frequency = freq
        .parse()
        .map_err(|_| parse_error(line_no, format!("bad frequency '{}'", freq)))?;
    let magnitude = mag
        .trim()
        .parse()
        .map_err(|_| parse_error(line_no, format!("bad magnitude '{}'", mag)))?;
    Ok(BinMagnitude::new(frequency, magnitude))
}

fn parse_error(line: usize, message: String) -> Error {
    Error::ReportParse { line, message }
}
