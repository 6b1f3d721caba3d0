use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::SieveConfig;
use crate::filter::{FeatureFilter, FilterOutcome, KeepKeys};
use crate::sinks::GeoJsonSink;
use crate::source::read_feature_collection;
use crate::utils::prefixed_path;
use crate::vocabulary::{self, TagVocabulary};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// GeoJSON data extract to clean
    #[arg(short, long, required_unless_present = "dump_vocabulary")]
    pub infile: Option<PathBuf>,

    /// Data-model spreadsheet (.xlsx, .xls, .ods, or a .csv export of the tag sheet)
    #[arg(short = 'x', long)]
    pub xform: PathBuf,

    /// Output file (default: input file name prefixed with "new-")
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (YAML)
    #[arg(short, long, env = "TAGSIEVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the loaded vocabulary as YAML and exit
    #[arg(long)]
    pub dump_vocabulary: bool,
}

pub fn load_config(path: Option<&Path>) -> Result<SieveConfig> {
    match path {
        Some(path) => {
            tracing::info!("Config: loading {:?}", path);
            SieveConfig::load(path).with_context(|| format!("Config: failed to load {:?}", path))
        }
        None => Ok(SieveConfig::default()),
    }
}

pub fn output_path(cli: &Cli, input: &Path, config: &SieveConfig) -> Result<PathBuf> {
    match &cli.output {
        Some(path) => Ok(path.clone()),
        None => prefixed_path(input, &config.output_prefix),
    }
}

/// Log every dropped property, then a one-line summary.
pub fn report(outcome: &FilterOutcome) {
    for violation in &outcome.violations {
        tracing::warn!(feature = violation.feature(), key = violation.key(), "{}", violation);
    }
    let stats = &outcome.stats;
    tracing::info!(
        "Filter: {} features, {} properties kept, {} dropped",
        stats.features,
        stats.kept,
        stats.dropped
    );
}

/// Filter `input` into a new file at `output`.
///
/// Nothing is written unless the whole collection was read and filtered.
pub fn clean_file(
    input: &Path,
    output: &Path,
    vocabulary: &TagVocabulary,
    keep: &KeepKeys,
) -> Result<FilterOutcome> {
    if output.exists() {
        bail!("Sink: {:?} already exists, refusing to overwrite", output);
    }

    let collection = read_feature_collection(input)?;
    let outcome = FeatureFilter::new(vocabulary, keep).filter(&collection);

    GeoJsonSink::create_new(output)?.write_collection(&outcome.collection)?;
    Ok(outcome)
}

pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let vocabulary = vocabulary::load(&cli.xform, &config.vocabulary)?;
    if vocabulary.is_empty() {
        tracing::warn!(
            "Vocabulary: no enumerated tags found in {:?}; only identity keys will survive",
            cli.xform
        );
    }

    if cli.dump_vocabulary {
        print!("{}", vocabulary.to_yaml()?);
        return Ok(());
    }

    let Some(input) = cli.infile.as_deref() else {
        bail!("CLI: --infile is required");
    };
    let output = output_path(cli, input, &config)?;
    let keep = KeepKeys::new(config.keep.iter().cloned());

    let outcome = clean_file(input, &output, &vocabulary, &keep)?;
    report(&outcome);
    tracing::info!("Sink: wrote {:?}", output);

    Ok(())
}
