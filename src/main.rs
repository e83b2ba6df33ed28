//! CLI entry point for dorina.

use anyhow::{Context, Result};
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use log::{info, LevelFilter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use dorina::catalog::DataDir;
use dorina::config::{Query, RegulatorSet};
use dorina::engine::project;
use dorina::intervals::InMemoryIntervals;
use dorina::output::{write_gff, write_json, write_summary, write_tsv, OutputFormat};
use dorina::run::analyse_features;
use dorina::types::{CombineMode, MatchMode, RegionClass};

/// Regulatory genomics queries.
///
/// Finds genes whose regions overlap RNA-binding protein or miRNA binding
/// sites, optionally combining two regulator sets.
#[derive(Parser, Debug)]
#[command(name = "dorina")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data directory holding genomes/ and regulators/
    #[arg(short = 'd', long = "datadir", env = "DORINA_DATA", default_value = ".", global = true)]
    datadir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available genomes
    Genomes,
    /// List available regulators
    Regulators,
    /// List the genes of a genome
    Genes {
        /// Genome assembly, e.g. hg19
        genome: String,
    },
    /// Run an analysis
    Run(RunArgs),
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    /// Genome assembly, e.g. hg19
    genome: String,

    /// Regulators of the first set
    #[arg(short = 'a', long = "set-a", required = true, num_args = 1..)]
    set_a: Vec<String>,

    /// Match mode of the first set: any or all
    #[arg(long = "match-a", default_value = "any")]
    match_a: String,

    /// Region of the first set: any, CDS, 3prime, 5prime, intron or intergenic
    #[arg(long = "region-a", default_value = "any")]
    region_a: String,

    /// Expand genome regions of the first set by this many bp
    #[arg(long = "window-a")]
    window_a: Option<i64>,

    /// Regulators of the second set
    #[arg(short = 'b', long = "set-b", num_args = 1..)]
    set_b: Vec<String>,

    /// Match mode of the second set: any or all
    #[arg(long = "match-b", default_value = "any")]
    match_b: String,

    /// Region of the second set
    #[arg(long = "region-b", default_value = "any")]
    region_b: String,

    /// Expand genome regions of the second set by this many bp
    #[arg(long = "window-b")]
    window_b: Option<i64>,

    /// How to combine the sets: or, and, xor or not
    #[arg(short = 'c', long = "combine")]
    combine: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output format: tsv, json, gff or summary
    #[arg(short = 'f', long = "format", default_value = "tsv")]
    format: String,

    /// Number of worker threads (0 = auto-detect)
    #[arg(short = 'j', long = "threads", default_value = "0")]
    threads: usize,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let catalog = DataDir::open(&args.datadir)
        .with_context(|| format!("Failed to read data directory {}", args.datadir.display()))?;

    let stdout = io::stdout();
    match args.command {
        Command::Genomes => list_genomes(&catalog, &mut stdout.lock())?,
        Command::Regulators => list_regulators(&catalog, &mut stdout.lock())?,
        Command::Genes { genome } => {
            let mut out = stdout.lock();
            for gene in catalog.genes(&genome)? {
                writeln!(out, "{}", gene)?;
            }
        }
        Command::Run(run_args) => run(&run_args, &catalog)?,
    }

    Ok(())
}

fn list_genomes<W: Write>(catalog: &DataDir, out: &mut W) -> Result<()> {
    for species in catalog.genomes.values() {
        let label = species
            .description
            .as_ref()
            .map(|d| d.label.as_str())
            .unwrap_or("");
        for assembly in species.assemblies.values() {
            let regions: Vec<&str> = assembly.regions.iter().map(|r| r.as_str()).collect();
            writeln!(out, "{}\t{}\t{}\t{}", species.name, label, assembly.name, regions.join(","))?;
        }
    }
    Ok(())
}

fn list_regulators<W: Write>(catalog: &DataDir, out: &mut W) -> Result<()> {
    for (species, assemblies) in &catalog.regulators {
        for (assembly, experiments) in assemblies {
            for (id, regulator) in experiments {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    species,
                    assembly,
                    id,
                    regulator.experiment.experiment,
                    regulator.experiment.summary
                )?;
            }
        }
    }
    Ok(())
}

/// Map the command line onto a query.
fn build_query(args: &RunArgs) -> Result<Query> {
    let set_a = RegulatorSet::new(args.set_a.iter().cloned())
        .with_match(args.match_a.parse::<MatchMode>()?)
        .with_region(args.region_a.parse::<RegionClass>()?)
        .with_window(args.window_a);

    let mut query = Query::new(&args.genome, set_a);
    if !args.set_b.is_empty() {
        query.set_b = Some(
            RegulatorSet::new(args.set_b.iter().cloned())
                .with_match(args.match_b.parse::<MatchMode>()?)
                .with_region(args.region_b.parse::<RegionClass>()?)
                .with_window(args.window_b),
        );
    }
    query.combine = args
        .combine
        .as_deref()
        .map(str::parse::<CombineMode>)
        .transpose()?;

    query.validate()?;
    Ok(query)
}

fn run(args: &RunArgs, catalog: &DataDir) -> Result<()> {
    let query = build_query(args)?;
    let format = args.format.parse::<OutputFormat>()?;

    let num_threads = if args.threads == 0 {
        num_cpus::get()
    } else {
        args.threads
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .context("Failed to create thread pool")?;

    let features = analyse_features(&query, catalog, &InMemoryIntervals)?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).context("Failed to create output file")?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let written = match format {
        OutputFormat::Gff => write_gff(&mut writer, &features)?,
        OutputFormat::Tsv => write_tsv(&mut writer, &project(&features))?,
        OutputFormat::Json => write_json(&mut writer, &project(&features))?,
        OutputFormat::Summary => write_summary(&mut writer, &features)?,
    };
    writer.flush()?;

    info!("{} rows written", written);
    Ok(())
}
