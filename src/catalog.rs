//! Genome and regulator catalog.
//!
//! A data directory is laid out as
//!
//! ```text
//! <datadir>/genomes/<species>/description.json
//! <datadir>/genomes/<species>/<assembly>/{all,cds,3_utr,5_utr,intron,intergenic}.gff
//! <datadir>/genomes/<species>/<assembly>/<assembly>.chrom.sizes
//! <datadir>/regulators/<species>/<assembly>/<name>.json
//! <datadir>/regulators/<species>/<assembly>/<name>.bed
//! ```
//!
//! Each regulator JSON file holds a list of experiments sharing the BED file
//! with the same stem.

use ahash::AHashMap;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::error::{DorinaError, LookupKind, Result};
use crate::parser::bed::parse_bed;
use crate::parser::gff::{gene_ids, parse_gff};
use crate::parser::util::{open_reader, parse_int};
use crate::types::{BedRecord, GffRecord, RecordLayout, RegionClass, REGION_CLASSES};

/// Species-level `description.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesDescription {
    pub id: String,
    pub label: String,
    pub scientific: String,
    pub weight: i64,
}

/// A publication attached to an experiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    pub title: String,
    pub authors: Vec<String>,
    pub pages: String,
    pub journal: String,
    pub year: String,
    pub pubmed: String,
}

/// One entry of a regulator JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experiment {
    pub id: String,
    pub experiment: String,
    pub summary: String,
    pub description: String,
    pub methods: String,
    pub credits: String,
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub name: String,
    pub path: PathBuf,
    /// Region classes with an annotation file present.
    pub regions: Vec<RegionClass>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub name: String,
    pub description: Option<SpeciesDescription>,
    pub assemblies: IndexMap<String, Assembly>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Regulator {
    pub experiment: Experiment,
    pub species: String,
    pub assembly: String,
    pub bed: PathBuf,
    /// The BED file also holds other experiments' sites.
    pub shared: bool,
}

/// Where a regulator's records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegulatorSource {
    pub path: PathBuf,
    /// Column layout the file is read with.
    pub layout: RecordLayout,
    /// Keep only records tagged with this track.
    pub track: Option<String>,
}

/// Name resolution used by the query orchestrator.
pub trait MetadataProvider {
    /// Annotation file of `genome` for the region class.
    fn resolve_genome_region_file(&self, genome: &str, region: RegionClass) -> Result<PathBuf>;

    /// Binding-site source of the regulator called `name`.
    fn resolve_regulator_file(&self, name: &str) -> Result<RegulatorSource>;

    /// Chromosome lengths of `genome`; empty when unknown.
    fn chrom_sizes(&self, genome: &str) -> Result<AHashMap<String, i64>>;

    fn load_genome_region(&self, genome: &str, region: RegionClass) -> Result<Vec<GffRecord>> {
        let path = self.resolve_genome_region_file(genome, region)?;
        debug!("reading {} regions of {} from {}", region, genome, path.display());
        parse_gff(&path)
    }

    fn load_regulator(&self, name: &str) -> Result<Vec<BedRecord>> {
        let source = self.resolve_regulator_file(name)?;
        debug!("reading regulator {} from {}", name, source.path.display());
        let records = parse_bed(&source.path, source.layout)?;

        Ok(match source.track {
            Some(track) => records
                .into_iter()
                .filter(|r| r.annotation.tags().any(|t| t.track == track))
                .collect(),
            None => records,
        })
    }
}

/// Catalog discovered by walking a data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    pub root: PathBuf,
    pub genomes: IndexMap<String, Species>,
    /// species -> assembly -> experiment id -> regulator
    pub regulators: IndexMap<String, IndexMap<String, IndexMap<String, Regulator>>>,
}

/// Sorted subdirectories of `path`; a missing directory is empty.
fn subdirectories(path: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !path.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            dirs.push((entry.file_name().to_string_lossy().into_owned(), entry_path));
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// An existing plain or gzipped file `<dir>/<stem>.<ext>`.
fn find_file(dir: &Path, stem: &str, ext: &str) -> Option<PathBuf> {
    let plain = dir.join(format!("{}.{}", stem, ext));
    if plain.is_file() {
        return Some(plain);
    }
    let gz = dir.join(format!("{}.{}.gz", stem, ext));
    gz.is_file().then_some(gz)
}

impl DataDir {
    /// Walk `root` and build the catalog.
    pub fn open(root: &Path) -> Result<Self> {
        let genomes = Self::walk_genomes(&root.join("genomes"))?;
        let regulators = Self::walk_regulators(&root.join("regulators"))?;

        debug!(
            "catalog {}: {} species with genomes, {} with regulators",
            root.display(),
            genomes.len(),
            regulators.len()
        );

        Ok(DataDir {
            root: root.to_path_buf(),
            genomes,
            regulators,
        })
    }

    fn walk_genomes(root: &Path) -> Result<IndexMap<String, Species>> {
        let mut genomes = IndexMap::new();

        for (species, species_path) in subdirectories(root)? {
            let description_file = species_path.join("description.json");
            let description = if description_file.is_file() {
                let text = fs::read_to_string(&description_file)?;
                Some(serde_json::from_str::<SpeciesDescription>(&text)?)
            } else {
                None
            };

            let mut assemblies = IndexMap::new();
            for (assembly, assembly_path) in subdirectories(&species_path)? {
                let regions = REGION_CLASSES
                    .iter()
                    .copied()
                    .filter(|class| find_file(&assembly_path, class.file_stem(), "gff").is_some())
                    .collect();
                assemblies.insert(
                    assembly.clone(),
                    Assembly {
                        name: assembly,
                        path: assembly_path,
                        regions,
                    },
                );
            }

            genomes.insert(
                species.clone(),
                Species {
                    name: species,
                    description,
                    assemblies,
                },
            );
        }

        Ok(genomes)
    }

    fn walk_regulators(
        root: &Path,
    ) -> Result<IndexMap<String, IndexMap<String, IndexMap<String, Regulator>>>> {
        let mut regulators = IndexMap::new();

        for (species, species_path) in subdirectories(root)? {
            let mut by_assembly = IndexMap::new();

            for (assembly, assembly_path) in subdirectories(&species_path)? {
                let mut json_files: Vec<PathBuf> = fs::read_dir(&assembly_path)?
                    .filter_map(|e| e.ok().map(|e| e.path()))
                    .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                    .collect();
                json_files.sort();

                let mut experiments = IndexMap::new();
                for json in json_files {
                    let parsed = parse_experiments(&json)?;
                    let stem = json
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let Some(bed) = find_file(&assembly_path, &stem, "bed") else {
                        warn!("no BED file next to {}, skipping", json.display());
                        continue;
                    };
                    let shared = parsed.len() > 1;
                    for experiment in parsed {
                        experiments.insert(
                            experiment.id.clone(),
                            Regulator {
                                experiment,
                                species: species.clone(),
                                assembly: assembly.clone(),
                                bed: bed.clone(),
                                shared,
                            },
                        );
                    }
                }
                by_assembly.insert(assembly, experiments);
            }
            regulators.insert(species, by_assembly);
        }

        Ok(regulators)
    }

    /// Look up an assembly by name across all species.
    pub fn genome(&self, name: &str) -> Option<&Assembly> {
        self.genomes
            .values()
            .find_map(|species| species.assemblies.get(name))
    }

    /// Look up a regulator by experiment id across all species and assemblies.
    pub fn regulator(&self, name: &str) -> Option<&Regulator> {
        self.regulators
            .values()
            .flat_map(|assemblies| assemblies.values())
            .find_map(|experiments| experiments.get(name))
    }

    /// Gene identifiers of a genome, from its `all` annotation file.
    pub fn genes(&self, genome: &str) -> Result<Vec<String>> {
        let path = self.resolve_genome_region_file(genome, RegionClass::Any)?;
        gene_ids(open_reader(&path)?)
    }
}

impl MetadataProvider for DataDir {
    fn resolve_genome_region_file(&self, genome: &str, region: RegionClass) -> Result<PathBuf> {
        let assembly = self
            .genome(genome)
            .ok_or_else(|| DorinaError::not_found(LookupKind::Genome, genome))?;

        find_file(&assembly.path, region.file_stem(), "gff").ok_or_else(|| {
            DorinaError::not_found(
                LookupKind::RegionFile,
                format!("{}/{}.gff", genome, region.file_stem()),
            )
        })
    }

    fn resolve_regulator_file(&self, name: &str) -> Result<RegulatorSource> {
        if let Some(regulator) = self.regulator(name) {
            return Ok(RegulatorSource {
                path: regulator.bed.clone(),
                layout: RecordLayout::Narrow,
                track: regulator.shared.then(|| regulator.experiment.id.clone()),
            });
        }

        // Manual regulators are given as a path, with or without `.bed`
        let manual = PathBuf::from(format!("{}.bed", name));
        if manual.is_file() {
            return Ok(RegulatorSource {
                path: manual,
                layout: RecordLayout::Narrow,
                track: None,
            });
        }
        let direct = PathBuf::from(name);
        if name.ends_with(".bed") && direct.is_file() {
            return Ok(RegulatorSource {
                path: direct,
                layout: RecordLayout::Narrow,
                track: None,
            });
        }

        Err(DorinaError::not_found(LookupKind::Regulator, name))
    }

    fn chrom_sizes(&self, genome: &str) -> Result<AHashMap<String, i64>> {
        let assembly = self
            .genome(genome)
            .ok_or_else(|| DorinaError::not_found(LookupKind::Genome, genome))?;

        match find_file(&assembly.path, &assembly.name, "chrom.sizes") {
            Some(path) => parse_chrom_sizes(open_reader(&path)?),
            None => Ok(AHashMap::new()),
        }
    }
}

/// Parse an experiment list (a single object is accepted too).
pub fn parse_experiments(path: &Path) -> Result<Vec<Experiment>> {
    let text = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}

/// Parse `name<TAB>length` lines.
pub fn parse_chrom_sizes<R: BufRead>(reader: R) -> Result<AHashMap<String, i64>> {
    let mut sizes = AHashMap::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, length) = line.split_once('\t').ok_or_else(|| {
            DorinaError::Parse(format!("line {}: expected 'name<TAB>length'", idx + 1))
        })?;
        sizes.insert(name.to_string(), parse_int(length, "length", idx + 1)?);
    }
    Ok(sizes)
}
