//! Command implementations for the Phrasaurus CLI.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::analysis::TextProcessor;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::collocation::{CollocationDetector, Collocations, prune_ngram_counts};
use crate::config::PhrasaurusConfig;
use crate::embedding::{read_binary_file, read_text_file};
use crate::error::Result;
use crate::orthography::PhraseScorer;
use crate::orthography::batch::{
    abbreviation_distances, orthographic_distances, read_pairs, write_distances,
};
use crate::thesaurus::{Thesaurus, ThesaurusBuilder};
use crate::util::partition::Partitioner;

/// Execute a CLI command.
pub fn execute_command(args: PhrasaurusArgs) -> Result<()> {
    let config = load_config(&args)?;
    match &args.command {
        Command::Preprocess(preprocess_args) => {
            preprocess(preprocess_args.clone(), &config, &args)
        }
        Command::PruneNgrams(prune_args) => prune_ngrams(prune_args.clone(), &config, &args),
        Command::Collocations(collocation_args) => {
            detect_collocations(collocation_args.clone(), &config, &args)
        }
        Command::ApplyCollocations(apply_args) => {
            apply_collocations(apply_args.clone(), &config, &args)
        }
        Command::Thesaurus(thesaurus_args) => {
            build_thesaurus(thesaurus_args.clone(), &config, &args)
        }
        Command::Trim(trim_args) => trim_thesaurus(trim_args.clone(), &args),
        Command::Distances(distance_args) => {
            compute_distances(distance_args.clone(), &config, &args)
        }
    }
}

/// Load the configuration file named on the command line, or the defaults.
fn load_config(cli_args: &PhrasaurusArgs) -> Result<PhrasaurusConfig> {
    match &cli_args.config {
        Some(path) => {
            if cli_args.verbosity() > 1 {
                println!("Loading configuration from: {}", path.display());
            }
            PhrasaurusConfig::from_file(path)
        }
        None => Ok(PhrasaurusConfig::default()),
    }
}

fn open_reader(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Normalize a corpus with the configured text processor.
fn preprocess(
    args: PreprocessArgs,
    config: &PhrasaurusConfig,
    cli_args: &PhrasaurusArgs,
) -> Result<()> {
    let processor = TextProcessor::new(config.text_processor);
    if cli_args.verbosity() > 0 {
        println!(
            "Preprocessing {} with the {} text processor",
            args.input.display(),
            processor.name()
        );
    }

    let start_time = Instant::now();
    let lines_written =
        processor.process_corpus(open_reader(&args.input)?, create_writer(&args.output)?)?;

    output_result(
        "Corpus preprocessed successfully",
        &PreprocessResult {
            input: path_string(&args.input),
            output: path_string(&args.output),
            text_processor: processor.name().to_string(),
            lines_written,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Drop rare and dummy-token n-grams from a count file.
fn prune_ngrams(
    args: PruneNgramsArgs,
    config: &PhrasaurusConfig,
    cli_args: &PhrasaurusArgs,
) -> Result<()> {
    let min_count = args
        .min_count
        .unwrap_or_else(|| config.collocations.min_count(args.order));
    if cli_args.verbosity() > 0 {
        println!(
            "Pruning {} with minimum count {min_count}",
            args.input.display()
        );
    }

    let processor = TextProcessor::new(config.text_processor);
    let (kept, dropped) = prune_ngram_counts(
        open_reader(&args.input)?,
        create_writer(&args.output)?,
        min_count,
        &processor,
    )?;

    output_result(
        "N-gram counts pruned successfully",
        &PruneResult {
            output: path_string(&args.output),
            min_count,
            kept,
            dropped,
        },
        cli_args,
    )
}

/// Detect collocations and bootstrap them to the configured length.
fn detect_collocations(
    args: CollocationsArgs,
    config: &PhrasaurusConfig,
    cli_args: &PhrasaurusArgs,
) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!(
            "Detecting collocations from {} n-gram files",
            args.ngram_files.len()
        );
    }

    let start_time = Instant::now();
    let mut detector = CollocationDetector::new(
        config.collocations.clone(),
        args.ngram_files.len(),
        TextProcessor::new(config.text_processor),
    )?;
    let detected = detector.generate_from_files(&args.ngram_files)?.len();
    let bootstrapped = detector.bootstrap_to(config.collocations.max_phrase_length)?;
    let total_tokens = detector.total_tokens();
    let collocations = detector.into_collocations();
    collocations.save_plaintext(create_writer(&args.output)?)?;

    let mut by_length = BTreeMap::new();
    for (phrase, _) in collocations.iter() {
        *by_length.entry(phrase.size()).or_insert(0) += 1;
    }
    info!(collocations = collocations.len(), "Saved collocations");

    output_result(
        "Collocations detected successfully",
        &CollocationResult {
            output: path_string(&args.output),
            orders: args.ngram_files.len(),
            total_tokens,
            detected,
            bootstrapped,
            collocations: collocations.len(),
            by_length,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Join collocations in a corpus.
fn apply_collocations(
    args: ApplyCollocationsArgs,
    config: &PhrasaurusConfig,
    cli_args: &PhrasaurusArgs,
) -> Result<()> {
    let collocations = Collocations::load_plaintext(open_reader(&args.collocations)?)?;
    let case_sensitive = config.thesaurus.case_sensitive;
    if cli_args.verbosity() > 0 {
        println!(
            "Applying {} collocations to {}",
            collocations.len(),
            args.input.display()
        );
    }

    let lines_written = collocations.apply_to_corpus(
        open_reader(&args.input)?,
        create_writer(&args.output)?,
        case_sensitive,
    )?;

    output_result(
        "Collocations applied successfully",
        &ApplyCollocationsResult {
            output: path_string(&args.output),
            collocations: collocations.len(),
            case_sensitive,
            lines_written,
        },
        cli_args,
    )
}

/// Build and save a thesaurus from an embeddings file.
fn build_thesaurus(
    args: ThesaurusArgs,
    config: &PhrasaurusConfig,
    cli_args: &PhrasaurusArgs,
) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!("Reading embeddings from: {}", args.embeddings.display());
    }

    let start_time = Instant::now();
    let store = if args.binary {
        read_binary_file(&args.embeddings)?
    } else {
        read_text_file(&args.embeddings)?
    };

    let mut thesaurus_config = config.thesaurus.clone();
    if args.threads.is_some() {
        thesaurus_config.threads = args.threads;
    }
    let builder = ThesaurusBuilder::new(
        store,
        &thesaurus_config,
        TextProcessor::new(config.text_processor),
    )?;
    let thesaurus = builder.build()?;
    thesaurus.save(create_writer(&args.output)?)?;

    output_result(
        "Thesaurus built successfully",
        &ThesaurusResult {
            output: path_string(&args.output),
            lexicon_size: builder.store().size(),
            dimension: builder.store().dimension(),
            headwords: thesaurus.num_headwords(),
            entries: thesaurus.num_entries(),
            unique_pairings: thesaurus.unique_pairings().len(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Remove low-scoring entries from a saved thesaurus.
fn trim_thesaurus(args: TrimArgs, cli_args: &PhrasaurusArgs) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!(
            "Trimming {} below score {}",
            args.input.display(),
            args.min_score
        );
    }

    let mut thesaurus = Thesaurus::load(open_reader(&args.input)?)?;
    let entries_removed = thesaurus.remove_entries_below(args.min_score);
    thesaurus.save(create_writer(&args.output)?)?;

    output_result(
        "Thesaurus trimmed successfully",
        &TrimResult {
            output: path_string(&args.output),
            min_score: args.min_score,
            entries_removed,
            headwords_remaining: thesaurus.num_headwords(),
            entries_remaining: thesaurus.num_entries(),
        },
        cli_args,
    )
}

/// Score every pair in a pairs file.
fn compute_distances(
    args: DistancesArgs,
    config: &PhrasaurusConfig,
    cli_args: &PhrasaurusArgs,
) -> Result<()> {
    let pairs = read_pairs(open_reader(&args.pairs)?)?;
    if cli_args.verbosity() > 0 {
        println!("Scoring {} phrase pairs", pairs.len());
    }

    let start_time = Instant::now();
    let threads = args.threads.or(config.thesaurus.threads);
    let partitioner = match threads {
        Some(threads) => Partitioner::new(threads)?,
        None => Partitioner::with_available_parallelism()?,
    };
    let scorer = PhraseScorer::new(
        config.thesaurus.orthographic_costs,
        config.thesaurus.abbreviation_costs,
        config.thesaurus.permutation_penalty,
    );
    let (regime, distances) = if args.abbreviation {
        (
            "abbreviation",
            abbreviation_distances(&pairs, &scorer, &partitioner),
        )
    } else {
        (
            "orthographic",
            orthographic_distances(&pairs, &scorer, &partitioner),
        )
    };
    write_distances(create_writer(&args.output)?, &pairs, &distances)?;

    let mean_distance = if distances.is_empty() {
        None
    } else {
        Some(distances.iter().sum::<f64>() / distances.len() as f64)
    };

    output_result(
        "Distances computed successfully",
        &DistanceResult {
            output: path_string(&args.output),
            regime: regime.to_string(),
            pairs: pairs.len(),
            mean_distance,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}
