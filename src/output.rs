//! Output formatting for dorina results.
//!
//! Results are written as a tab-separated table, a JSON array, the annotated
//! genome rows themselves, or one summary row per annotated feature.

use std::io::Write;
use std::str::FromStr;

use crate::error::{DorinaError, Result};
use crate::parser::gff::format_annotated_line;
use crate::types::{AnnotatedFeature, ResultEntry};

pub const HEADER: &str = "track\tgene\tdata_source\tscore\tsite\tlocation\tstrand";

pub const SUMMARY_HEADER: &str = "gene\tlocation\tscore\tregulators";

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Tsv,
    Json,
    Gff,
    Summary,
}

impl FromStr for OutputFormat {
    type Err = DorinaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            "gff" => Ok(OutputFormat::Gff),
            "summary" => Ok(OutputFormat::Summary),
            _ => Err(DorinaError::Configuration(format!(
                "Invalid output format: {:?} (expected tsv, json, gff or summary)",
                s
            ))),
        }
    }
}

/// Write the output header.
pub fn write_header<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", HEADER)?;
    Ok(())
}

/// Format a single result entry as a table row.
pub fn format_output_line(entry: &ResultEntry) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        entry.track,
        entry.gene,
        entry.data_source,
        entry.score,
        entry.site,
        entry.location,
        entry.strand
    )
}

/// Write entries as a table with header; returns the number of rows.
pub fn write_tsv<W: Write>(writer: &mut W, entries: &[ResultEntry]) -> Result<usize> {
    write_header(writer)?;
    for entry in entries {
        writeln!(writer, "{}", format_output_line(entry))?;
    }
    Ok(entries.len())
}

/// Write entries as a pretty-printed JSON array.
pub fn write_json<W: Write>(writer: &mut W, entries: &[ResultEntry]) -> Result<usize> {
    serde_json::to_writer_pretty(&mut *writer, entries)?;
    writeln!(writer)?;
    Ok(entries.len())
}

/// Write annotated features with their provenance encoded.
pub fn write_gff<W: Write>(writer: &mut W, features: &[AnnotatedFeature]) -> Result<usize> {
    for feature in features {
        writeln!(writer, "{}", format_annotated_line(feature)?)?;
    }
    Ok(features.len())
}

/// Format one feature as `gene, consensus location, consensus score, tags`.
pub fn format_summary_line(feature: &AnnotatedFeature) -> String {
    let regulators = feature
        .annotation
        .tags()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join("~");

    format!(
        "{}\t{}:{}-{}\t{}\t{}",
        feature.gene,
        feature.feature.seqid,
        feature.consensus.start,
        feature.consensus.end,
        feature.consensus.score,
        regulators
    )
}

/// Write one summary row per feature, with header.
pub fn write_summary<W: Write>(writer: &mut W, features: &[AnnotatedFeature]) -> Result<usize> {
    writeln!(writer, "{}", SUMMARY_HEADER)?;
    for feature in features {
        writeln!(writer, "{}", format_summary_line(feature))?;
    }
    Ok(features.len())
}
