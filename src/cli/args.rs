//! Command line argument parsing for the Phrasaurus CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Phrasaurus - build multi-word thesauri from embeddings and n-gram counts
#[derive(Parser, Debug, Clone)]
#[command(name = "phrasaurus")]
#[command(about = "Collocation detection and thesaurus construction from corpus statistics")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PhrasaurusArgs {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "PHRASAURUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PhrasaurusArgs {
    /// Get the effective verbosity level: 0 quiet, 1 normal, one more per `-v`.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Normalize a text corpus with the configured text processor
    Preprocess(PreprocessArgs),

    /// Drop rare and dummy-token lines from an n-gram count file
    #[command(name = "prune-ngrams")]
    PruneNgrams(PruneNgramsArgs),

    /// Detect collocations from n-gram count files
    Collocations(CollocationsArgs),

    /// Join collocations in a corpus with underscores
    #[command(name = "apply-collocations")]
    ApplyCollocations(ApplyCollocationsArgs),

    /// Build a thesaurus from word2vec embeddings
    Thesaurus(ThesaurusArgs),

    /// Remove thesaurus entries below an overall score
    Trim(TrimArgs),

    /// Compute normalized distances for a file of phrase pairs
    Distances(DistancesArgs),
}

/// Arguments for corpus preprocessing
#[derive(Parser, Debug, Clone)]
pub struct PreprocessArgs {
    /// Raw text file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Normalized output file
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

/// Arguments for n-gram pruning
#[derive(Parser, Debug, Clone)]
pub struct PruneNgramsArgs {
    /// `phrase<TAB>count` file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Pruned output file
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// N-gram order of the file, used to pick the configured minimum count
    #[arg(long, default_value = "1")]
    pub order: usize,

    /// Minimum count, overriding the configuration
    #[arg(long)]
    pub min_count: Option<u64>,
}

/// Arguments for collocation detection
#[derive(Parser, Debug, Clone)]
pub struct CollocationsArgs {
    /// Where to write the collocations
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// One count file per order, unigrams first
    #[arg(value_name = "NGRAM_FILE", required = true, num_args = 1..)]
    pub ngram_files: Vec<PathBuf>,
}

/// Arguments for applying collocations to a corpus
#[derive(Parser, Debug, Clone)]
pub struct ApplyCollocationsArgs {
    /// Collocations file written by the `collocations` command
    #[arg(value_name = "COLLOCATIONS")]
    pub collocations: PathBuf,

    /// Corpus to rewrite
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Rewritten corpus
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

/// Arguments for thesaurus construction
#[derive(Parser, Debug, Clone)]
pub struct ThesaurusArgs {
    /// word2vec embeddings file
    #[arg(value_name = "EMBEDDINGS")]
    pub embeddings: PathBuf,

    /// Where to write the thesaurus
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Read the binary word2vec format instead of text
    #[arg(long)]
    pub binary: bool,

    /// Number of threads to use, overriding the configuration
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Arguments for thesaurus trimming
#[derive(Parser, Debug, Clone)]
pub struct TrimArgs {
    /// Thesaurus file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Trimmed thesaurus file
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Minimum overall score to keep
    #[arg(value_name = "MIN_SCORE", allow_negative_numbers = true)]
    pub min_score: f64,
}

/// Arguments for bulk distance computation
#[derive(Parser, Debug, Clone)]
pub struct DistancesArgs {
    /// `phrase<TAB>phrase` file
    #[arg(value_name = "PAIRS")]
    pub pairs: PathBuf,

    /// Output file with a distance appended to every pair
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Use the abbreviation regime, first phrase as the abbreviation
    #[arg(long)]
    pub abbreviation: bool,

    /// Number of threads to use, overriding the configuration
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
