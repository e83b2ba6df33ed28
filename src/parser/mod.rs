//! Parsers for genomic file formats and the compound annotation grammar.

pub mod annotation;
pub mod bed;
pub mod gff;
pub mod util;

pub use bed::parse_bed;
pub use gff::parse_gff;
