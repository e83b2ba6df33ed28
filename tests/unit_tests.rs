//! Library-level tests against the fixture data directory in `tests/data`.
//!
//! The fixture genome `hg19` has two genes on chr1 (gene01.01 at 1-1000 and
//! gene01.02 at 2001-3000) and one intergenic stretch between them. The
//! `scifi` regulator has one site in the CDS of gene01.01 and one in the
//! intron of gene01.02; `fake01` overlaps the first `scifi` site.

use std::io::BufReader;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

use dorina::catalog::{DataDir, MetadataProvider};
use dorina::config::{Query, RegulatorSet};
use dorina::engine::{parse_results, project};
use dorina::error::{DorinaError, LookupKind};
use dorina::intervals::InMemoryIntervals;
use dorina::output::{format_summary_line, write_gff};
use dorina::run::{analyse, analyse_features};
use dorina::types::{CombineMode, MatchMode, RegionClass, ResultEntry};

// -------------------------------------------------------------------------
// Helper functions
// -------------------------------------------------------------------------

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

#[fixture]
fn catalog() -> DataDir {
    DataDir::open(&data_dir()).unwrap()
}

fn entry(
    track: &str,
    gene: &str,
    source: &str,
    score: i64,
    site: &str,
    location: &str,
) -> ResultEntry {
    ResultEntry {
        track: track.into(),
        gene: gene.into(),
        data_source: source.into(),
        score,
        site: site.into(),
        location: location.into(),
        strand: "+".into(),
    }
}

fn scifi_cds() -> ResultEntry {
    entry("scifi", "gene01.01", "PARCLIP", 5, "scifi_cds", "chr1:250-260")
}

fn scifi_intron() -> ResultEntry {
    entry("scifi", "gene01.02", "PARCLIP", 5, "scifi_intron", "chr1:2350-2360")
}

fn fake01_cds() -> ResultEntry {
    entry("fake01", "gene01.01", "PICTAR", 7, "fake01_cds", "chr1:255-265")
}

fn combined(combine: CombineMode) -> Query {
    Query::new("hg19", RegulatorSet::new(["scifi"]))
        .with_set_b(RegulatorSet::new(["fake01"]), combine)
}

// -------------------------------------------------------------------------
// Catalog
// -------------------------------------------------------------------------

mod test_catalog {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn test_genomes(catalog: DataDir) {
        let species = &catalog.genomes["h_sapiens"];
        let description = species.description.as_ref().unwrap();
        assert_eq!(description.scientific, "Homo sapiens");
        assert_eq!(description.weight, 10);

        let hg19 = &species.assemblies["hg19"];
        assert_eq!(hg19.regions.len(), 6);
    }

    #[rstest]
    fn test_regulators(catalog: DataDir) {
        let hg19 = &catalog.regulators["h_sapiens"]["hg19"];
        let ids: Vec<&str> = hg19.keys().map(|k| k.as_str()).collect();
        assert_eq!(ids, vec!["scifi", "fake01", "fake02"]);

        let scifi = catalog.regulator("scifi").unwrap();
        assert_eq!(scifi.experiment.experiment, "PARCLIP");
        assert_eq!(scifi.experiment.references[0].year, "1870");
        assert!(!scifi.shared);
        assert!(catalog.regulator("fake02").unwrap().shared);
    }

    #[rstest]
    fn test_genes(catalog: DataDir) {
        assert_eq!(catalog.genes("hg19").unwrap(), vec!["gene01.01", "gene01.02"]);
    }

    #[rstest]
    fn test_unknown_genome(catalog: DataDir) {
        let err = catalog.genes("invalid").unwrap_err();
        assert!(matches!(err, DorinaError::NotFound { kind: LookupKind::Genome, .. }));
    }

    #[rstest]
    fn test_shared_file_filtered_by_track(catalog: DataDir) {
        let fake01 = catalog.load_regulator("fake01").unwrap();
        assert_eq!(fake01.len(), 1);
        assert_eq!(fake01[0].name(), "PICTAR#fake01*fake01_cds");

        let scifi = catalog.load_regulator("scifi").unwrap();
        assert_eq!(scifi.len(), 2);
    }

    #[rstest]
    fn test_manual_regulator(catalog: DataDir) {
        let manual = data_dir().join("regulators/h_sapiens/hg19/PARCLIP_scifi");
        let records = catalog.load_regulator(manual.to_str().unwrap()).unwrap();
        assert_eq!(records.len(), 2);
    }
}

// -------------------------------------------------------------------------
// Single-set queries
// -------------------------------------------------------------------------

mod test_single_set {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn test_any_region(catalog: DataDir) {
        let query = Query::new("hg19", RegulatorSet::new(["scifi"]));
        let result = analyse(&query, &catalog, &InMemoryIntervals).unwrap();

        assert_eq!(result, vec![scifi_cds(), scifi_intron()]);
    }

    #[rstest]
    fn test_cds_region(catalog: DataDir) {
        let query = Query::new("hg19", RegulatorSet::new(["scifi"]).with_region(RegionClass::Cds));
        let result = analyse(&query, &catalog, &InMemoryIntervals).unwrap();

        assert_eq!(result, vec![scifi_cds()]);
    }

    #[rstest]
    #[case(RegionClass::Intron, 1)]
    #[case(RegionClass::ThreePrime, 0)]
    #[case(RegionClass::FivePrime, 0)]
    #[case(RegionClass::Intergenic, 0)]
    fn test_region_classes(
        catalog: DataDir,
        #[case] region: RegionClass,
        #[case] expected: usize,
    ) {
        let query = Query::new("hg19", RegulatorSet::new(["scifi"]).with_region(region));
        let result = analyse(&query, &catalog, &InMemoryIntervals).unwrap();
        assert_eq!(result.len(), expected);
    }

    #[rstest]
    fn test_match_all(catalog: DataDir) {
        let set = RegulatorSet::new(["scifi", "fake01"]).with_match(MatchMode::All);
        let result = analyse(&Query::new("hg19", set), &catalog, &InMemoryIntervals).unwrap();

        // Each member keeps its own score and bounds
        assert_eq!(result, vec![scifi_cds(), fake01_cds()]);
    }

    #[rstest]
    fn test_match_any_multiple(catalog: DataDir) {
        let set = RegulatorSet::new(["scifi", "fake01"]);
        let result = analyse(&Query::new("hg19", set), &catalog, &InMemoryIntervals).unwrap();

        assert_eq!(result, vec![scifi_cds(), fake01_cds(), scifi_intron()]);
    }

    #[rstest]
    fn test_window_reaches_neighbouring_site(catalog: DataDir) {
        let set = RegulatorSet::new(["scifi"]).with_region(RegionClass::Intergenic);
        let query = Query::new("hg19", set.clone());
        let plain = analyse(&query, &catalog, &InMemoryIntervals).unwrap();
        assert!(plain.is_empty());

        let windowed = Query::new("hg19", set.with_window(Some(400)));
        let result = analyse(&windowed, &catalog, &InMemoryIntervals).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].gene, "intergenic01.01");
        assert_eq!(result[0].site, "scifi_intron");
        assert_eq!(result[0].strand, ".");
    }

    #[rstest]
    fn test_unknown_regulator(catalog: DataDir) {
        let query = Query::new("hg19", RegulatorSet::new(["no_such_regulator"]));
        let err = analyse(&query, &catalog, &InMemoryIntervals).unwrap_err();
        assert!(matches!(err, DorinaError::NotFound { kind: LookupKind::Regulator, .. }));
    }

    #[rstest]
    fn test_negative_window_rejected(catalog: DataDir) {
        let set = RegulatorSet::new(["scifi"]).with_window(Some(-1));
        let err = analyse(&Query::new("hg19", set), &catalog, &InMemoryIntervals).unwrap_err();
        assert!(err.is_configuration());
    }
}

// -------------------------------------------------------------------------
// Two-set queries
// -------------------------------------------------------------------------

mod test_combine {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn test_or(catalog: DataDir) {
        let features =
            analyse_features(&combined(CombineMode::Or), &catalog, &InMemoryIntervals).unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(project(&features), vec![scifi_cds(), scifi_intron(), fake01_cds()]);
    }

    #[rstest]
    fn test_and(catalog: DataDir) {
        let features =
            analyse_features(&combined(CombineMode::And), &catalog, &InMemoryIntervals).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].gene, "gene01.01");
        assert_eq!(features[0].annotation.len(), 2);
        assert_eq!(project(&features), vec![scifi_cds(), fake01_cds()]);
    }

    #[rstest]
    fn test_and_consensus(catalog: DataDir) {
        let features =
            analyse_features(&combined(CombineMode::And), &catalog, &InMemoryIntervals).unwrap();

        // Averaged score, intersected bounds of the two sides
        let consensus = features[0].consensus;
        assert_eq!(consensus.score, 6);
        assert_eq!((consensus.start, consensus.end), (255, 260));
        assert_eq!(
            format_summary_line(&features[0]),
            "gene01.01\tchr1:255-260\t6\tPARCLIP#scifi*scifi_cds~PICTAR#fake01*fake01_cds"
        );
    }

    #[rstest]
    fn test_xor(catalog: DataDir) {
        let result = analyse(&combined(CombineMode::Xor), &catalog, &InMemoryIntervals).unwrap();
        assert_eq!(result, vec![scifi_intron()]);
    }

    #[rstest]
    fn test_not(catalog: DataDir) {
        let result = analyse(&combined(CombineMode::Not), &catalog, &InMemoryIntervals).unwrap();
        assert_eq!(result, vec![scifi_intron()]);
    }

    #[rstest]
    fn test_regions_per_side(catalog: DataDir) {
        // A restricted to CDS, B anywhere
        let query = Query::new("hg19", RegulatorSet::new(["scifi"]).with_region(RegionClass::Cds))
            .with_set_b(RegulatorSet::new(["fake02"]), CombineMode::Or);
        let result = analyse(&query, &catalog, &InMemoryIntervals).unwrap();

        let sites: Vec<&str> = result.iter().map(|e| e.site.as_str()).collect();
        assert_eq!(sites, vec!["scifi_cds", "fake02_intron"]);
    }

    #[rstest]
    fn test_combine_without_second_set(catalog: DataDir) {
        let mut query = Query::new("hg19", RegulatorSet::new(["scifi"]));
        query.combine = Some(CombineMode::And);
        let err = analyse(&query, &catalog, &InMemoryIntervals).unwrap_err();
        assert!(err.is_configuration());
    }
}

// -------------------------------------------------------------------------
// Encoded results
// -------------------------------------------------------------------------

mod test_encoded_results {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn test_written_rows_parse_back(catalog: DataDir) {
        let set = RegulatorSet::new(["scifi", "fake01"]).with_match(MatchMode::All);
        let features =
            analyse_features(&Query::new("hg19", set), &catalog, &InMemoryIntervals).unwrap();

        let mut output = Vec::new();
        write_gff(&mut output, &features).unwrap();
        let text = String::from_utf8(output.clone()).unwrap();
        assert_eq!(
            text,
            "chr1\tdoRiNA2\tgene\t1\t1000\t6\t+\t.\tID=gene01.01;\
             regulator=PARCLIP#scifi*scifi_cds~PICTAR#fake01*fake01_cds;\
             score=5~7;start=250~255;end=260~265\n"
        );

        let entries = parse_results(BufReader::new(output.as_slice())).unwrap();
        assert_eq!(entries, project(&features));
    }

    #[test]
    fn test_invalid_region_name() {
        let err = "bogus".parse::<RegionClass>().unwrap_err();
        assert!(err.is_configuration());
    }
}
