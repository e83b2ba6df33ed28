//! Core data structures for dorina.
//!
//! This module contains the query vocabulary (region classes, match and
//! combine modes), the interval records flowing through a query, and the
//! structured provenance carried on annotated genome features.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::DorinaError;

/// Strand orientation for genomic features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Positive,
    Negative,
    /// `.` - no strand information.
    Unknown,
}

/// Error type for parsing strand from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrandError;

impl fmt::Display for ParseStrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid strand: expected '+', '-' or '.'")
    }
}

impl std::error::Error for ParseStrandError {}

impl FromStr for Strand {
    type Err = ParseStrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Positive),
            "-" => Ok(Strand::Negative),
            "." => Ok(Strand::Unknown),
            _ => Err(ParseStrandError),
        }
    }
}

impl Strand {
    /// Convert strand to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Positive => "+",
            Strand::Negative => "-",
            Strand::Unknown => ".",
        }
    }

    /// The strand two merged records share, `.` when they disagree.
    pub fn shared(self, other: Strand) -> Strand {
        if self == other {
            self
        } else {
            Strand::Unknown
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Functional partition of a genome annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionClass {
    Any,
    Cds,
    ThreePrime,
    FivePrime,
    Intron,
    Intergenic,
}

pub const REGION_CLASSES: [RegionClass; 6] = [
    RegionClass::Any,
    RegionClass::Cds,
    RegionClass::ThreePrime,
    RegionClass::FivePrime,
    RegionClass::Intron,
    RegionClass::Intergenic,
];

impl FromStr for RegionClass {
    type Err = DorinaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(RegionClass::Any),
            "CDS" => Ok(RegionClass::Cds),
            "3prime" => Ok(RegionClass::ThreePrime),
            "5prime" => Ok(RegionClass::FivePrime),
            "intron" => Ok(RegionClass::Intron),
            "intergenic" => Ok(RegionClass::Intergenic),
            _ => Err(DorinaError::Configuration(format!("Invalid region: {:?}", s))),
        }
    }
}

impl RegionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionClass::Any => "any",
            RegionClass::Cds => "CDS",
            RegionClass::ThreePrime => "3prime",
            RegionClass::FivePrime => "5prime",
            RegionClass::Intron => "intron",
            RegionClass::Intergenic => "intergenic",
        }
    }

    /// Stem of the annotation file holding this region class.
    pub fn file_stem(&self) -> &'static str {
        match self {
            RegionClass::Any => "all",
            RegionClass::Cds => "cds",
            RegionClass::ThreePrime => "3_utr",
            RegionClass::FivePrime => "5_utr",
            RegionClass::Intron => "intron",
            RegionClass::Intergenic => "intergenic",
        }
    }
}

impl fmt::Display for RegionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a feature must overlap at least one or every member of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Any,
    All,
}

impl FromStr for MatchMode {
    type Err = DorinaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(MatchMode::Any),
            "all" => Ok(MatchMode::All),
            _ => Err(DorinaError::Configuration(format!(
                "Invalid match mode: {:?}",
                s
            ))),
        }
    }
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Any => "any",
            MatchMode::All => "all",
        }
    }
}

/// Set algebra between two overlap result sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineMode {
    #[default]
    Or,
    And,
    Xor,
    Not,
}

impl FromStr for CombineMode {
    type Err = DorinaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "or" => Ok(CombineMode::Or),
            "and" => Ok(CombineMode::And),
            "xor" => Ok(CombineMode::Xor),
            "not" => Ok(CombineMode::Not),
            _ => Err(DorinaError::Configuration(format!(
                "Invalid combine mode: {:?}",
                s
            ))),
        }
    }
}

impl CombineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CombineMode::Or => "or",
            CombineMode::And => "and",
            CombineMode::Xor => "xor",
            CombineMode::Not => "not",
        }
    }
}

/// Identifies one regulator match: `data_source#track*site` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegulatorTag {
    pub data_source: String,
    pub track: String,
    pub site: String,
}

impl RegulatorTag {
    pub fn new(data_source: &str, track: &str, site: &str) -> Self {
        RegulatorTag {
            data_source: data_source.to_string(),
            track: track.to_string(),
            site: site.to_string(),
        }
    }
}

impl fmt::Display for RegulatorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}*{}", self.data_source, self.track, self.site)
    }
}

/// A single regulator match with its own score and bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegulatorMatch {
    pub tag: RegulatorTag,
    pub score: i64,
    pub start: i64,
    pub end: i64,
}

/// Ordered per-match provenance carried on a record.
///
/// Holding tuples keeps the regulator, score, start and end sublists of the
/// text form parallel by construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundAnnotation {
    pub matches: Vec<RegulatorMatch>,
}

impl CompoundAnnotation {
    pub fn new(matches: Vec<RegulatorMatch>) -> Self {
        CompoundAnnotation { matches }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RegulatorMatch> {
        self.matches.iter()
    }

    pub fn tags(&self) -> impl Iterator<Item = &RegulatorTag> {
        self.matches.iter().map(|m| &m.tag)
    }

    /// Concatenate two annotations, left matches first.
    pub fn concat(&self, other: &CompoundAnnotation) -> CompoundAnnotation {
        let mut matches = Vec::with_capacity(self.len() + other.len());
        matches.extend(self.matches.iter().cloned());
        matches.extend(other.matches.iter().cloned());
        CompoundAnnotation { matches }
    }

    /// Left fold of the pairwise consensus over all matches.
    pub fn consensus(&self) -> Option<Consensus> {
        let mut iter = self.matches.iter().map(Consensus::from);
        let first = iter.next()?;
        Some(iter.fold(first, |acc, c| acc.merge(&c)))
    }
}

/// Floor division of the sum of two scores by two.
pub fn average_score(left: i64, right: i64) -> i64 {
    (left + right).div_euclid(2)
}

/// Summary score and bounds of everything merged into a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consensus {
    pub score: i64,
    pub start: i64,
    pub end: i64,
}

impl Consensus {
    /// Pairwise merge: floored mean score, intersected bounds.
    pub fn merge(&self, other: &Consensus) -> Consensus {
        Consensus {
            score: average_score(self.score, other.score),
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        }
    }
}

impl From<&RegulatorMatch> for Consensus {
    fn from(m: &RegulatorMatch) -> Self {
        Consensus {
            score: m.score,
            start: m.start,
            end: m.end,
        }
    }
}

/// Column layout a BED record was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLayout {
    /// chrom, start, end, name, score, strand
    Narrow,
    /// Narrow plus trailing original start/end.
    Wide,
}

/// A regulator interval record (BED-like, 0-based half-open coordinates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedRecord {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub score: i64,
    pub strand: Strand,
    /// Trailing original bounds; present for the wide layout only.
    pub trailing: Option<(i64, i64)>,
    pub annotation: CompoundAnnotation,
}

impl BedRecord {
    /// Build a fresh record whose every tag matched with the record's own
    /// score and original bounds.
    pub fn new(
        chrom: String,
        start: i64,
        end: i64,
        tags: Vec<RegulatorTag>,
        score: i64,
        strand: Strand,
        trailing: Option<(i64, i64)>,
    ) -> Self {
        let (orig_start, orig_end) = trailing.unwrap_or((start, end));
        let matches = tags
            .into_iter()
            .map(|tag| RegulatorMatch {
                tag,
                score,
                start: orig_start,
                end: orig_end,
            })
            .collect();

        BedRecord {
            chrom,
            start,
            end,
            score,
            strand,
            trailing,
            annotation: CompoundAnnotation::new(matches),
        }
    }

    pub fn layout(&self) -> RecordLayout {
        if self.trailing.is_some() {
            RecordLayout::Wide
        } else {
            RecordLayout::Narrow
        }
    }

    /// Original bounds: the trailing columns, or the record span itself.
    pub fn orig_bounds(&self) -> (i64, i64) {
        self.trailing.unwrap_or((self.start, self.end))
    }

    /// The name column: every tag joined with `~`.
    pub fn name(&self) -> String {
        self.annotation
            .tags()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join("~")
    }
}

/// A genome annotation row (GFF, 1-based closed coordinates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GffRecord {
    pub seqid: String,
    pub source: String,
    pub feature: String,
    pub start: i64,
    pub end: i64,
    pub score: String,
    pub strand: Strand,
    pub frame: String,
    pub attributes: String,
}

/// A genome feature with the regulator matches it overlaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedFeature {
    pub feature: GffRecord,
    pub gene: String,
    pub annotation: CompoundAnnotation,
    pub consensus: Consensus,
}

/// Final output unit: one regulator match within a genome feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    pub track: String,
    pub gene: String,
    pub data_source: String,
    pub score: i64,
    pub site: String,
    pub location: String,
    pub strand: String,
}
