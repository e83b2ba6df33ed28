//! dorina - regulatory genomics queries.
//!
//! This library answers questions of the form "which genes have regions
//! overlapping the binding sites of regulator set A (and optionally set B)?"
//! for RNA-binding protein and miRNA binding-site collections.
//!
//! # Features
//!
//! - Discover genomes and regulators in a data directory
//! - Merge ("any") or intersect ("all") the members of a regulator set
//! - Restrict genome annotation to CDS, UTRs, introns or intergenic regions
//! - Combine two result sets with or/and/xor/not
//! - Keep per-match provenance and read/write it in the legacy text grammar
//!
//! # Example
//!
//! ```ignore
//! use dorina::catalog::DataDir;
//! use dorina::config::{Query, RegulatorSet};
//! use dorina::intervals::InMemoryIntervals;
//! use dorina::run::analyse;
//! use std::path::Path;
//!
//! let catalog = DataDir::open(Path::new("data"))?;
//! let query = Query::new("hg19", RegulatorSet::new(["scifi"]));
//! for entry in analyse(&query, &catalog, &InMemoryIntervals)? {
//!     println!("{} {} {}", entry.gene, entry.track, entry.location);
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod intervals;
pub mod output;
pub mod parser;
pub mod run;
pub mod types;

pub use catalog::{DataDir, MetadataProvider};
pub use config::{Query, RegulatorSet};
pub use error::{DorinaError, Result};
pub use intervals::{InMemoryIntervals, IntervalArithmetic};
pub use run::analyse;
pub use types::{
    AnnotatedFeature, CombineMode, CompoundAnnotation, MatchMode, RegionClass, RegulatorTag,
    ResultEntry, Strand,
};
