//! GFF file parser with gzip support.
//!
//! Genome annotation files hold one feature per row. The ninth column is the
//! `key=value;...` attribute text and must carry an `ID` attribute.

use std::io::BufRead;
use std::path::Path;

use crate::error::{DorinaError, Result};
use crate::parser::annotation::{encode_feature_attributes, gene_id};
use crate::parser::util::{open_reader, parse_int};
use crate::types::{AnnotatedFeature, GffRecord, Strand};

/// Parse a GFF file into records, in file order.
///
/// Supports both plain text and gzip-compressed GFF files.
pub fn parse_gff(path: &Path) -> Result<Vec<GffRecord>> {
    let reader = open_reader(path)?;
    parse_gff_reader(reader)
}

/// Parse GFF data from a reader.
pub fn parse_gff_reader<R: BufRead>(reader: R) -> Result<Vec<GffRecord>> {
    let mut records = Vec::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        records.push(parse_gff_line(trimmed, idx + 1)?);
    }

    Ok(records)
}

/// Parse a single GFF line.
pub fn parse_gff_line(line: &str, line_no: usize) -> Result<GffRecord> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() < 9 {
        return Err(DorinaError::Parse(format!(
            "line {}: expected 9 GFF columns, found {}",
            line_no,
            fields.len()
        )));
    }

    let strand = fields[6]
        .parse::<Strand>()
        .map_err(|e| DorinaError::Parse(format!("line {}: {}", line_no, e)))?;

    Ok(GffRecord {
        seqid: fields[0].to_string(),
        source: fields[1].to_string(),
        feature: fields[2].to_string(),
        start: parse_int(fields[3], "start", line_no)?,
        end: parse_int(fields[4], "end", line_no)?,
        score: fields[5].to_string(),
        strand,
        frame: fields[7].to_string(),
        attributes: fields[8].to_string(),
    })
}

/// Collect the `ID` of every row, in file order.
///
/// Rows without an `ID` attribute are skipped.
pub fn gene_ids<R: BufRead>(reader: R) -> Result<Vec<String>> {
    Ok(parse_gff_reader(reader)?
        .iter()
        .filter_map(|record| gene_id(&record.attributes).ok())
        .collect())
}

/// The eight positional columns of a GFF row, tab-joined, with `score` in
/// the score column.
fn positional_columns(record: &GffRecord, score: &str) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        record.seqid,
        record.source,
        record.feature,
        record.start,
        record.end,
        score,
        record.strand,
        record.frame
    )
}

/// Format a plain GFF row.
pub fn format_gff_line(record: &GffRecord) -> String {
    format!(
        "{}\t{}",
        positional_columns(record, &record.score),
        record.attributes
    )
}

/// Format an annotated feature with its provenance encoded in column nine.
///
/// The score column holds the consensus score of every merged match.
pub fn format_annotated_line(feature: &AnnotatedFeature) -> Result<String> {
    Ok(format!(
        "{}\t{}",
        positional_columns(&feature.feature, &feature.consensus.score.to_string()),
        encode_feature_attributes(feature)?
    ))
}
