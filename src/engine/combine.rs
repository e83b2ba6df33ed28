//! Set algebra between two annotated result sets.
//!
//! Rows are compared on their genome feature spans. For `xor` and `not` a
//! row touching any row on the other side is dropped whole.

use log::debug;

use crate::intervals::IntervalArithmetic;
use crate::types::{AnnotatedFeature, CombineMode, GffRecord};

/// Merge two overlapping annotated features.
///
/// The left feature's identity wins; the right side only contributes its
/// regulator matches.
pub fn merge_feature_pair(left: &AnnotatedFeature, right: &AnnotatedFeature) -> AnnotatedFeature {
    AnnotatedFeature {
        feature: GffRecord {
            attributes: format!("ID={}", left.gene),
            ..left.feature.clone()
        },
        gene: left.gene.clone(),
        annotation: left.annotation.concat(&right.annotation),
        consensus: left.consensus.merge(&right.consensus),
    }
}

/// Combine result sets `a` and `b`.
pub fn combine<P: IntervalArithmetic>(
    provider: &P,
    a: Vec<AnnotatedFeature>,
    b: Vec<AnnotatedFeature>,
    mode: CombineMode,
) -> Vec<AnnotatedFeature> {
    debug!("combining {} and {} rows with '{}'", a.len(), b.len(), mode.as_str());

    match mode {
        CombineMode::Or => provider.concatenate(&[a, b]),
        CombineMode::And => provider
            .intersect(&a, &b)
            .into_iter()
            .map(|(left, right)| merge_feature_pair(left, right))
            .collect(),
        CombineMode::Xor => {
            let mut result: Vec<AnnotatedFeature> = provider
                .intersect_non_matches(&a, &b)
                .into_iter()
                .cloned()
                .collect();
            result.extend(provider.intersect_non_matches(&b, &a).into_iter().cloned());
            result
        }
        CombineMode::Not => provider
            .intersect_non_matches(&a, &b)
            .into_iter()
            .cloned()
            .collect(),
    }
}
