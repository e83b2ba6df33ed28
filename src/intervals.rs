//! Interval arithmetic.
//!
//! The query engine only needs three primitives: pairwise overlap detection
//! (reporting both sides, or reporting non-matches only), concatenation and
//! window expansion. They sit behind [`IntervalArithmetic`] so another
//! provider can be swapped in; [`InMemoryIntervals`] is the bundled one.
//!
//! Overlaps are computed on 0-based half-open spans. GFF rows are 1-based
//! closed and are shifted by one on the start.

use ahash::AHashMap;

use crate::types::{AnnotatedFeature, BedRecord, GffRecord};

/// Anything with a chromosome and a span.
pub trait Interval: Clone {
    fn chrom(&self) -> &str;

    /// 0-based half-open span.
    fn span(&self) -> (i64, i64);

    /// A copy of `self` moved to a new 0-based half-open span.
    fn with_span(&self, start: i64, end: i64) -> Self;
}

impl Interval for BedRecord {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn span(&self) -> (i64, i64) {
        (self.start, self.end)
    }

    fn with_span(&self, start: i64, end: i64) -> Self {
        BedRecord {
            start,
            end,
            ..self.clone()
        }
    }
}

impl Interval for GffRecord {
    fn chrom(&self) -> &str {
        &self.seqid
    }

    fn span(&self) -> (i64, i64) {
        (self.start - 1, self.end)
    }

    fn with_span(&self, start: i64, end: i64) -> Self {
        GffRecord {
            start: start + 1,
            end,
            ..self.clone()
        }
    }
}

impl Interval for AnnotatedFeature {
    fn chrom(&self) -> &str {
        self.feature.chrom()
    }

    fn span(&self) -> (i64, i64) {
        self.feature.span()
    }

    fn with_span(&self, start: i64, end: i64) -> Self {
        AnnotatedFeature {
            feature: self.feature.with_span(start, end),
            ..self.clone()
        }
    }
}

/// Interval-arithmetic provider used by the query engine.
pub trait IntervalArithmetic {
    /// Every overlapping `(a, b)` pair: `a` in source order, the hits of each
    /// `a` in `b`'s source order.
    fn intersect<'a, A: Interval, B: Interval>(
        &self,
        a: &'a [A],
        b: &'a [B],
    ) -> Vec<(&'a A, &'a B)>;

    /// Records of `a` without any overlapping record in `b`.
    fn intersect_non_matches<'a, A: Interval, B: Interval>(
        &self,
        a: &'a [A],
        b: &[B],
    ) -> Vec<&'a A>;

    /// All sources one after another; no merging, no dedup.
    fn concatenate<T: Clone>(&self, sources: &[Vec<T>]) -> Vec<T> {
        sources.iter().flatten().cloned().collect()
    }

    /// Expand every record by `bp` on both sides, clipped to `[0, length]`.
    ///
    /// Chromosomes missing from `chrom_lengths` are only clipped at zero.
    fn window_slop<T: Interval>(
        &self,
        source: &[T],
        chrom_lengths: &AHashMap<String, i64>,
        bp: i64,
    ) -> Vec<T> {
        source
            .iter()
            .map(|record| {
                let (start, end) = record.span();
                let new_start = start.saturating_sub(bp).max(0);
                let mut new_end = end.saturating_add(bp);
                if let Some(&length) = chrom_lengths.get(record.chrom()) {
                    new_end = new_end.min(length);
                }
                record.with_span(new_start, new_end.max(new_start))
            })
            .collect()
    }
}

/// Per-chromosome view of one source, sorted by start.
struct ChromIndex {
    /// Source positions, sorted by span start.
    order: Vec<usize>,
    starts: Vec<i64>,
    /// Longest interval on the chromosome, bounds the lookback.
    max_length: i64,
}

impl ChromIndex {
    /// Source positions overlapping `[start, end)`, in source order.
    fn hits<B: Interval>(&self, source: &[B], start: i64, end: i64) -> Vec<usize> {
        let (start, end) = effective_span((start, end));
        let search_start = start.saturating_sub(self.max_length);
        let first = find_search_start_index(&self.starts, search_start);

        let mut hits: Vec<usize> = self.order[first..]
            .iter()
            .zip(&self.starts[first..])
            .take_while(|&(_, &s)| s < end)
            .filter(|&(&idx, _)| overlaps((start, end), source[idx].span()))
            .map(|(&idx, _)| idx)
            .collect();

        hits.sort_unstable();
        hits
    }
}

/// Index of the first interval with `start >= search_start`.
pub fn find_search_start_index(starts: &[i64], search_start: i64) -> usize {
    starts.partition_point(|&s| s < search_start)
}

/// A zero-length span counts as the single base at its start, like an
/// insertion point in bedtools.
fn effective_span((start, end): (i64, i64)) -> (i64, i64) {
    if end == start {
        (start, start.saturating_add(1))
    } else {
        (start, end)
    }
}

/// Half-open overlap test.
///
/// A zero-length span overlaps the intervals containing its position.
pub fn overlaps(a: (i64, i64), b: (i64, i64)) -> bool {
    let (a, b) = (effective_span(a), effective_span(b));
    a.0 < b.1 && b.0 < a.1
}

fn build_index<B: Interval>(source: &[B]) -> AHashMap<&str, ChromIndex> {
    let mut by_chrom: AHashMap<&str, Vec<usize>> = AHashMap::new();
    for (idx, record) in source.iter().enumerate() {
        by_chrom.entry(record.chrom()).or_default().push(idx);
    }

    by_chrom
        .into_iter()
        .map(|(chrom, mut order)| {
            order.sort_by_key(|&idx| (source[idx].span().0, idx));
            let starts = order.iter().map(|&idx| source[idx].span().0).collect();
            let max_length = order
                .iter()
                .map(|&idx| {
                    let (s, e) = effective_span(source[idx].span());
                    e - s
                })
                .max()
                .unwrap_or(0);
            (
                chrom,
                ChromIndex {
                    order,
                    starts,
                    max_length,
                },
            )
        })
        .collect()
}

/// Bundled provider holding everything in memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryIntervals;

impl InMemoryIntervals {
    pub fn new() -> Self {
        InMemoryIntervals
    }
}

impl IntervalArithmetic for InMemoryIntervals {
    fn intersect<'a, A: Interval, B: Interval>(
        &self,
        a: &'a [A],
        b: &'a [B],
    ) -> Vec<(&'a A, &'a B)> {
        let index = build_index(b);
        let mut pairs = Vec::new();

        for left in a {
            let Some(chrom_index) = index.get(left.chrom()) else {
                continue;
            };
            let (start, end) = left.span();
            for idx in chrom_index.hits(b, start, end) {
                pairs.push((left, &b[idx]));
            }
        }

        pairs
    }

    fn intersect_non_matches<'a, A: Interval, B: Interval>(
        &self,
        a: &'a [A],
        b: &[B],
    ) -> Vec<&'a A> {
        let index = build_index(b);

        a.iter()
            .filter(|left| match index.get(left.chrom()) {
                Some(chrom_index) => {
                    let (start, end) = left.span();
                    chrom_index.hits(b, start, end).is_empty()
                }
                None => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RegulatorTag, Strand};

    fn bed(chrom: &str, start: i64, end: i64, site: &str) -> BedRecord {
        BedRecord::new(
            chrom.to_string(),
            start,
            end,
            vec![RegulatorTag::new("SRC", "track", site)],
            0,
            Strand::Positive,
            None,
        )
    }

    fn site(record: &BedRecord) -> &str {
        &record.annotation.matches[0].tag.site
    }

    #[test]
    fn test_overlaps_half_open() {
        assert!(overlaps((0, 10), (9, 20)));
        assert!(!overlaps((0, 10), (10, 20)));
        assert!(overlaps((5, 6), (0, 100)));
    }

    #[test]
    fn test_intersect_reports_both_sides_in_source_order() {
        let a = vec![bed("chr1", 100, 200, "a1"), bed("chr1", 500, 600, "a2")];
        let b = vec![
            bed("chr1", 150, 160, "b1"),
            bed("chr1", 0, 1000, "b2"),
            bed("chr2", 100, 200, "b3"),
        ];

        let pairs = InMemoryIntervals.intersect(&a, &b);
        let names: Vec<(&str, &str)> = pairs.iter().map(|(l, r)| (site(l), site(r))).collect();
        assert_eq!(names, vec![("a1", "b1"), ("a1", "b2"), ("a2", "b2")]);
    }

    #[test]
    fn test_intersect_long_interval_lookback() {
        // b2 starts long before a but still reaches into it
        let a = vec![bed("chr1", 9000, 9100, "a")];
        let b = vec![bed("chr1", 8990, 8995, "b1"), bed("chr1", 10, 9050, "b2")];
        let pairs = InMemoryIntervals.intersect(&a, &b);
        assert_eq!(pairs.len(), 1);
        assert_eq!(site(pairs[0].1), "b2");
    }

    #[test]
    fn test_gff_span_is_shifted() {
        let gff = GffRecord {
            seqid: "chr1".into(),
            source: "x".into(),
            feature: "CDS".into(),
            start: 201,
            end: 300,
            score: ".".into(),
            strand: Strand::Positive,
            frame: "0".into(),
            attributes: "ID=g".into(),
        };
        assert_eq!(gff.span(), (200, 300));

        // BED 300-310 touches the GFF end only in 1-based terms
        let touching = vec![bed("chr1", 300, 310, "b")];
        assert!(InMemoryIntervals.intersect(&[gff.clone()], &touching).is_empty());
        let inside = vec![bed("chr1", 299, 310, "b")];
        assert_eq!(InMemoryIntervals.intersect(&[gff], &inside).len(), 1);
    }

    #[test]
    fn test_intersect_non_matches() {
        let a = vec![
            bed("chr1", 100, 200, "hit"),
            bed("chr1", 300, 400, "miss"),
            bed("chrX", 100, 200, "other_chrom"),
        ];
        let b = vec![bed("chr1", 190, 210, "b")];
        let kept: Vec<&str> = InMemoryIntervals
            .intersect_non_matches(&a, &b)
            .into_iter()
            .map(site)
            .collect();
        assert_eq!(kept, vec!["miss", "other_chrom"]);
    }

    #[test]
    fn test_concatenate_keeps_duplicates() {
        let a = vec![bed("chr1", 1, 2, "x")];
        let merged = InMemoryIntervals.concatenate(&[a.clone(), a.clone()]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], merged[1]);
    }

    #[test]
    fn test_window_slop_clips() {
        let mut lengths = AHashMap::new();
        lengths.insert("chr1".to_string(), 1000);
        let source = vec![
            bed("chr1", 50, 100, "a"),
            bed("chr1", 950, 990, "b"),
            bed("chr9", 5, 10, "c"),
        ];

        let slopped = InMemoryIntervals.window_slop(&source, &lengths, 100);
        assert_eq!(slopped[0].span(), (0, 200));
        assert_eq!(slopped[1].span(), (850, 1000));
        assert_eq!(slopped[2].span(), (0, 110));
    }

    #[test]
    fn test_window_slop_huge_window_saturates() {
        let source = vec![bed("chr9", 5, 10, "a")];
        let slopped = InMemoryIntervals.window_slop(&source, &AHashMap::new(), i64::MAX);
        assert_eq!(slopped[0].span(), (0, i64::MAX));
    }

    #[test]
    fn test_zero_length_overlaps_containing_interval() {
        assert!(overlaps((255, 255), (250, 260)));
        assert!(overlaps((250, 250), (250, 260)));
        assert!(!overlaps((260, 260), (250, 260)));
        assert!(overlaps((7, 7), (7, 7)));
        assert!(!overlaps((7, 7), (8, 8)));
    }

    #[test]
    fn test_intersect_zero_length_records() {
        let genes = vec![bed("chr1", 0, 1000, "gene"), bed("chr1", 2000, 3000, "other")];
        let points = vec![bed("chr1", 255, 255, "p1"), bed("chr1", 1000, 1000, "p2")];

        let pairs = InMemoryIntervals.intersect(&genes, &points);
        let names: Vec<(&str, &str)> = pairs.iter().map(|(l, r)| (site(l), site(r))).collect();
        assert_eq!(names, vec![("gene", "p1")]);

        // Points as the query side
        let pairs = InMemoryIntervals.intersect(&points, &genes);
        assert_eq!(pairs.len(), 1);
        assert_eq!(site(pairs[0].0), "p1");
    }
}
