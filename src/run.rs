//! Query orchestration.
//!
//! Evaluates each regulator set against its genome region, combines the two
//! sides when a second set is given and projects the result.

use log::{debug, info};

use crate::catalog::MetadataProvider;
use crate::config::{Query, RegulatorSet};
use crate::engine::{combine, compute_overlaps, project, resolve_set};
use crate::error::Result;
use crate::intervals::IntervalArithmetic;
use crate::types::{AnnotatedFeature, ResultEntry};

/// Run a query and return one entry per regulator match.
pub fn analyse<M, P>(query: &Query, catalog: &M, provider: &P) -> Result<Vec<ResultEntry>>
where
    M: MetadataProvider + Sync,
    P: IntervalArithmetic + Sync,
{
    let features = analyse_features(query, catalog, provider)?;
    Ok(project(&features))
}

/// Run a query up to, but not including, projection.
pub fn analyse_features<M, P>(
    query: &Query,
    catalog: &M,
    provider: &P,
) -> Result<Vec<AnnotatedFeature>>
where
    M: MetadataProvider + Sync,
    P: IntervalArithmetic + Sync,
{
    query.validate()?;
    info!(
        "analyse({:?}, {:?}({}))",
        query.genome,
        query.set_a.regulators,
        query.set_a.match_mode.as_str()
    );

    let Some(set_b) = &query.set_b else {
        return evaluate_set(&query.genome, &query.set_a, catalog, provider);
    };

    // Both sides are independent; combine waits for both
    let (result_a, result_b) = rayon::join(
        || evaluate_set(&query.genome, &query.set_a, catalog, provider),
        || evaluate_set(&query.genome, set_b, catalog, provider),
    );

    Ok(combine(provider, result_a?, result_b?, query.combine_mode()))
}

/// Overlap one regulator set with its genome region.
pub fn evaluate_set<M, P>(
    genome: &str,
    set: &RegulatorSet,
    catalog: &M,
    provider: &P,
) -> Result<Vec<AnnotatedFeature>>
where
    M: MetadataProvider,
    P: IntervalArithmetic,
{
    let mut genome_records = catalog.load_genome_region(genome, set.region)?;
    if let Some(window) = set.window {
        let sizes = catalog.chrom_sizes(genome)?;
        genome_records = provider.window_slop(&genome_records, &sizes, window);
    }

    let members = set
        .regulators
        .iter()
        .map(|name| catalog.load_regulator(name))
        .collect::<Result<Vec<_>>>()?;
    let regulator = resolve_set(provider, members, set.match_mode)?;

    let result = compute_overlaps(provider, &genome_records, &regulator)?;
    debug!(
        "{} {:?} over {} regions: {} rows",
        set.match_mode.as_str(),
        set.regulators,
        set.region,
        result.len()
    );
    Ok(result)
}
