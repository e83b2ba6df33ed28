//! Flatten annotated features into result entries.

use std::io::BufRead;

use crate::error::Result;
use crate::parser::annotation::decode_feature;
use crate::parser::gff::parse_gff_reader;
use crate::types::{AnnotatedFeature, ResultEntry};

/// One entry per regulator match of the feature.
///
/// Locations use each match's own bounds; the strand is the feature's.
pub fn project_feature(feature: &AnnotatedFeature) -> Vec<ResultEntry> {
    feature
        .annotation
        .iter()
        .map(|m| ResultEntry {
            track: m.tag.track.clone(),
            gene: feature.gene.clone(),
            data_source: m.tag.data_source.clone(),
            score: m.score,
            site: m.tag.site.clone(),
            location: format!("{}:{}-{}", feature.feature.seqid, m.start, m.end),
            strand: feature.feature.strand.as_str().to_string(),
        })
        .collect()
}

/// Project every feature, in order.
pub fn project(features: &[AnnotatedFeature]) -> Vec<ResultEntry> {
    features.iter().flat_map(project_feature).collect()
}

/// Project rows that carry their provenance as encoded attribute text.
pub fn parse_results<R: BufRead>(reader: R) -> Result<Vec<ResultEntry>> {
    let mut entries = Vec::new();
    for record in parse_gff_reader(reader)? {
        let feature = decode_feature(record)?;
        entries.extend(project_feature(&feature));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DorinaError;
    use std::io::BufReader;

    #[test]
    fn test_parse_results_single() {
        let text = "chr1\tdoRiNA2\tgene\t2001\t3000\t.\t+\t.\tID=gene01.02;regulator=PARCLIP#scifi*scifi_intron;score=5;start=2350;end=2360\n";
        let entries = parse_results(BufReader::new(text.as_bytes())).unwrap();

        assert_eq!(
            entries,
            vec![ResultEntry {
                track: "scifi".into(),
                gene: "gene01.02".into(),
                data_source: "PARCLIP".into(),
                score: 5,
                site: "scifi_intron".into(),
                location: "chr1:2350-2360".into(),
                strand: "+".into(),
            }]
        );
    }

    #[test]
    fn test_parse_results_compound() {
        let text = "chr1\tdoRiNA2\tgene\t1\t1000\t.\t-\t.\tID=g;regulator=A#t1*s1~B#t2*s2;score=5~9;start=250~255;end=260~265\n";
        let entries = parse_results(BufReader::new(text.as_bytes())).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].track, "t2");
        assert_eq!(entries[1].data_source, "B");
        assert_eq!(entries[1].score, 9);
        assert_eq!(entries[1].location, "chr1:255-265");
        assert_eq!(entries[1].strand, "-");
    }

    #[test]
    fn test_parse_results_length_mismatch() {
        let text = "chr1\tx\tgene\t1\t1000\t.\t+\t.\tID=g;regulator=A#t1*s1~B#t2*s2;score=5;start=250;end=260\n";
        let err = parse_results(BufReader::new(text.as_bytes())).unwrap_err();
        assert!(matches!(err, DorinaError::Format(_)));
    }
}
