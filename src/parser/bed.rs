//! BED file parser with gzip support.
//!
//! Parses regulator binding-site files. The name column holds one or more
//! `source#track*site` tags. The caller declares the column layout: dataset
//! files are read narrow, so any extra columns (thickStart, blocks, ...) are
//! ignored; merged "all" output is read wide, with two trailing columns
//! holding the original bounds.

use std::io::BufRead;
use std::path::Path;

use crate::error::{DorinaError, Result};
use crate::parser::annotation::decode_regulator_list;
use crate::parser::util::{is_skippable, open_reader, parse_int};
use crate::types::{BedRecord, RecordLayout, Strand};

/// Parse a BED file into records, in file order.
///
/// Supports both plain text and gzip-compressed BED files.
pub fn parse_bed(path: &Path, layout: RecordLayout) -> Result<Vec<BedRecord>> {
    let reader = open_reader(path)?;
    parse_bed_reader(reader, layout)
}

/// Parse BED data from a reader.
pub fn parse_bed_reader<R: BufRead>(reader: R, layout: RecordLayout) -> Result<Vec<BedRecord>> {
    let mut records = Vec::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let trimmed = line.trim_end();
        if is_skippable(trimmed) {
            continue;
        }
        records.push(parse_bed_line(trimmed, idx + 1, layout)?);
    }

    Ok(records)
}

/// Parse a single BED line with the declared layout.
pub fn parse_bed_line(line: &str, line_no: usize, layout: RecordLayout) -> Result<BedRecord> {
    let fields: Vec<&str> = line.split('\t').collect();

    let required = match layout {
        RecordLayout::Narrow => 6,
        RecordLayout::Wide => 8,
    };
    if fields.len() < required {
        return Err(DorinaError::Parse(format!(
            "line {}: expected at least {} BED columns, found {}",
            line_no,
            required,
            fields.len()
        )));
    }

    let start = parse_int(fields[1], "start", line_no)?;
    let end = parse_int(fields[2], "end", line_no)?;
    let tags = decode_regulator_list(fields[3])?;
    let score = parse_int(fields[4], "score", line_no)?;
    let strand = fields[5]
        .parse::<Strand>()
        .map_err(|e| DorinaError::Parse(format!("line {}: {}", line_no, e)))?;

    let trailing = match layout {
        RecordLayout::Narrow => None,
        RecordLayout::Wide => Some((
            parse_int(fields[6], "original start", line_no)?,
            parse_int(fields[7], "original end", line_no)?,
        )),
    };

    Ok(BedRecord::new(
        fields[0].to_string(),
        start,
        end,
        tags,
        score,
        strand,
        trailing,
    ))
}

/// Render a record back into its BED columns.
pub fn format_bed_line(record: &BedRecord) -> String {
    let mut line = format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        record.chrom,
        record.start,
        record.end,
        record.name(),
        record.score,
        record.strand
    );
    if record.layout() == RecordLayout::Wide {
        let (orig_start, orig_end) = record.orig_bounds();
        line.push_str(&format!("\t{}\t{}", orig_start, orig_end));
    }
    line
}
