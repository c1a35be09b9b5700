//! JSON report output
//!
//! The report fields are written at the top level next to a `summary`
//! object, so downstream tools get the aggregate without re-scanning blocks.

use super::{Report, Summary};
use crate::error::Result;
use serde::Serialize;
use std::io::{Read, Write};

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: Summary,
    #[serde(flatten)]
    report: &'a Report,
}

pub fn write<W: Write>(mut writer: W, report: &Report) -> Result<()> {
    let doc = JsonReport {
        summary: Summary::from_report(report),
        report,
    };
    serde_json::to_writer_pretty(&mut writer, &doc)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Read a JSON report back. The `summary` section is ignored.
pub fn read<R: Read>(reader: R) -> Result<Report> {
    Ok(serde_json::from_reader(reader)?)
}
