//! Regulator set resolution.
//!
//! Turns the members of a regulator set into a single interval source:
//! "any" concatenates them, "all" folds them left to right, keeping only
//! stretches covered by every member.

use log::debug;

use crate::error::{DorinaError, Result};
use crate::intervals::IntervalArithmetic;
use crate::types::{average_score, BedRecord, MatchMode};

/// One joined pair from an intersect pass, tagged with the left record's
/// declared layout.
#[derive(Debug, Clone, Copy)]
pub enum RecordPair<'a> {
    /// Left record carries trailing original bounds.
    Wide {
        left: &'a BedRecord,
        right: &'a BedRecord,
        original: (i64, i64),
    },
    /// Left record is plain BED6; its own span is its original extent.
    Narrow {
        left: &'a BedRecord,
        right: &'a BedRecord,
    },
}

impl<'a> RecordPair<'a> {
    pub fn new(left: &'a BedRecord, right: &'a BedRecord) -> Self {
        match left.trailing {
            Some(original) => RecordPair::Wide {
                left,
                right,
                original,
            },
            None => RecordPair::Narrow { left, right },
        }
    }

    fn sides(&self) -> (&'a BedRecord, &'a BedRecord) {
        match *self {
            RecordPair::Wide { left, right, .. } | RecordPair::Narrow { left, right } => {
                (left, right)
            }
        }
    }

    /// Original bounds carried forward: always the left operand's.
    fn left_original(&self) -> (i64, i64) {
        match *self {
            RecordPair::Wide { original, .. } => original,
            RecordPair::Narrow { left, .. } => (left.start, left.end),
        }
    }
}

/// Merge one overlapping pair into the record covering their intersection.
pub fn merge_record_pair(pair: RecordPair<'_>) -> BedRecord {
    let (left, right) = pair.sides();

    BedRecord {
        chrom: left.chrom.clone(),
        start: left.start.max(right.start),
        end: left.end.min(right.end),
        score: average_score(left.score, right.score),
        strand: left.strand.shared(right.strand),
        trailing: Some(pair.left_original()),
        annotation: left.annotation.concat(&right.annotation),
    }
}

/// Merge every joined pair of an intersect pass, in order.
pub fn cleanup_intersect_bed(pairs: &[(&BedRecord, &BedRecord)]) -> Vec<BedRecord> {
    pairs
        .iter()
        .map(|&(left, right)| merge_record_pair(RecordPair::new(left, right)))
        .collect()
}

/// "any": every member's records one after another.
pub fn merge_regulators<P: IntervalArithmetic>(
    provider: &P,
    members: &[Vec<BedRecord>],
) -> Vec<BedRecord> {
    provider.concatenate(members)
}

/// "all": left fold of intersect-and-merge over the members.
pub fn intersect_regulators<P: IntervalArithmetic>(
    provider: &P,
    members: Vec<Vec<BedRecord>>,
) -> Result<Vec<BedRecord>> {
    let mut members = members.into_iter();
    let first = members
        .next()
        .ok_or_else(|| DorinaError::Configuration("regulator set is empty".to_string()))?;

    Ok(members.enumerate().fold(first, |acc, (i, member)| {
        debug!("intersect regulator {} ({} records)", i + 2, member.len());
        let pairs = provider.intersect(&acc, &member);
        cleanup_intersect_bed(&pairs)
    }))
}

/// Resolve a set of loaded members into one regulator source.
pub fn resolve_set<P: IntervalArithmetic>(
    provider: &P,
    members: Vec<Vec<BedRecord>>,
    mode: MatchMode,
) -> Result<Vec<BedRecord>> {
    if members.is_empty() {
        return Err(DorinaError::Configuration("regulator set is empty".to_string()));
    }

    match mode {
        MatchMode::Any => {
            debug!("merging {} regulators", members.len());
            Ok(merge_regulators(provider, &members))
        }
        MatchMode::All => intersect_regulators(provider, members),
    }
}
