//! Genome-vs-regulator overlaps.

use crate::error::Result;
use crate::intervals::IntervalArithmetic;
use crate::parser::annotation::gene_id;
use crate::types::{AnnotatedFeature, BedRecord, Consensus, GffRecord};

/// Attach a regulator's provenance to the genome feature it overlaps.
///
/// The feature's own columns are kept unchanged.
pub fn annotate_feature(feature: &GffRecord, regulator: &BedRecord) -> Result<AnnotatedFeature> {
    let (orig_start, orig_end) = regulator.orig_bounds();

    Ok(AnnotatedFeature {
        feature: feature.clone(),
        gene: gene_id(&feature.attributes)?,
        annotation: regulator.annotation.clone(),
        consensus: Consensus {
            score: regulator.score,
            start: orig_start,
            end: orig_end,
        },
    })
}

/// One annotated feature per joined pair; multiplicity is preserved.
pub fn cleanup_intersect_gff(pairs: &[(&GffRecord, &BedRecord)]) -> Result<Vec<AnnotatedFeature>> {
    pairs
        .iter()
        .map(|&(feature, regulator)| annotate_feature(feature, regulator))
        .collect()
}

/// Overlap a genome source with a resolved regulator source.
pub fn compute_overlaps<P: IntervalArithmetic>(
    provider: &P,
    genome: &[GffRecord],
    regulator: &[BedRecord],
) -> Result<Vec<AnnotatedFeature>> {
    let pairs = provider.intersect(genome, regulator);
    cleanup_intersect_gff(&pairs)
}
