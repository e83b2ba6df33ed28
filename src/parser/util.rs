//! Utility functions for file parsing.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{DorinaError, Result};

/// Creates a buffered reader that automatically handles gzip-compressed files.
///
/// This function checks if the file path ends with ".gz" and wraps the file
/// in a GzDecoder if so. Otherwise, it returns a plain buffered reader.
pub fn create_buffered_reader(file: File, path: &Path) -> Box<dyn BufRead + Send> {
    if path.to_string_lossy().ends_with(".gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    }
}

/// Open a (possibly gzipped) file for buffered line reading.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    Ok(create_buffered_reader(file, path))
}

/// Parse an integer column, naming the column and line on failure.
pub fn parse_int(value: &str, column: &str, line_no: usize) -> Result<i64> {
    value.parse::<i64>().map_err(|_| {
        DorinaError::Parse(format!(
            "line {}: {} is not an integer: {:?}",
            line_no, column, value
        ))
    })
}

/// True for lines that carry no record (blank, comments, UCSC headers).
pub fn is_skippable(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
}
