use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use phrasaurus::analysis::TextProcessor;
use phrasaurus::config::ThesaurusConfig;
use phrasaurus::embedding::{read_binary_file, read_text_file};
use phrasaurus::error::Result;
use phrasaurus::phrase::Phrase;
use phrasaurus::thesaurus::{Thesaurus, ThesaurusBuilder};

const VECTORS: &[(&str, [f32; 3])] = &[
    ("mi", [1.0, 0.0, 0.0]),
    ("myocardial_infarction", [0.6, 0.8, 0.0]),
    ("fracture", [0.0, 1.0, 0.0]),
    ("color", [0.0, 0.0, 1.0]),
    ("colour", [0.0, 0.1, 0.995]),
    ("zxzxpzdate", [1.0, 0.0, 0.0]),
    ("1234", [1.0, 0.0, 0.0]),
];

fn phrase(text: &str) -> Phrase {
    Phrase::parse(text).unwrap()
}

fn write_text_embeddings(path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{} 3", VECTORS.len())?;
    for (token, vector) in VECTORS {
        writeln!(writer, "{token} {} {} {}", vector[0], vector[1], vector[2])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_binary_embeddings(path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{} 3", VECTORS.len())?;
    for (token, vector) in VECTORS {
        write!(writer, "{token} ")?;
        for v in vector {
            writer.write_f32::<LittleEndian>(*v)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

fn config() -> ThesaurusConfig {
    ThesaurusConfig {
        threads: Some(2),
        ..Default::default()
    }
}

fn build(path: &Path, binary: bool) -> Result<Thesaurus> {
    let store = if binary {
        read_binary_file(path)?
    } else {
        read_text_file(path)?
    };
    assert_eq!(store.size(), VECTORS.len());
    let builder = ThesaurusBuilder::new(store, &config(), TextProcessor::moderate())?;
    assert_eq!(builder.store().size(), VECTORS.len() - 1);
    builder.build()
}

#[test]
fn thesaurus_pairs_abbreviations_and_spelling_variants() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("vectors.txt");
    write_text_embeddings(&path)?;
    let thesaurus = build(&path, false)?;

    let mi = thesaurus.equivalents("MI");
    assert_eq!(mi.len(), 1);
    assert_eq!(mi[0].candidate, phrase("myocardial infarction"));
    assert!((mi[0].overall_score - 0.8).abs() < 1e-5);

    let reverse = thesaurus.equivalents("Myocardial Infarction");
    assert_eq!(reverse.len(), 1);
    assert_eq!(reverse[0].candidate, phrase("mi"));

    let colour = thesaurus.equivalents("colour");
    assert_eq!(colour.len(), 1);
    assert_eq!(colour[0].candidate, phrase("color"));
    assert!(colour[0].overall_score > 0.9);

    assert!(thesaurus.equivalents("fracture").is_empty());
    assert!(!thesaurus.has_phrase(&phrase("zxzxpzdate")));
    assert_eq!(thesaurus.num_headwords(), 4);
    assert_eq!(thesaurus.unique_pairings().len(), 2);
    Ok(())
}

#[test]
fn binary_and_text_embeddings_build_the_same_thesaurus() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let text_path = dir.path().join("vectors.txt");
    let binary_path = dir.path().join("vectors.bin");
    write_text_embeddings(&text_path)?;
    write_binary_embeddings(&binary_path)?;

    let from_text = build(&text_path, false)?;
    let from_binary = build(&binary_path, true)?;
    assert_eq!(from_text.headwords(), from_binary.headwords());
    assert_eq!(from_text.num_entries(), from_binary.num_entries());
    Ok(())
}

#[test]
fn saved_thesaurus_reloads_and_trims() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let vectors = dir.path().join("vectors.txt");
    write_text_embeddings(&vectors)?;
    let thesaurus = build(&vectors, false)?;

    let saved = dir.path().join("thesaurus.txt");
    thesaurus.save(BufWriter::new(File::create(&saved)?))?;
    let text = fs::read_to_string(&saved)?;
    assert!(text.starts_with("non-case-sensitive thesaurus\nmoderate\n"));

    let mut loaded = Thesaurus::load(BufReader::new(File::open(&saved)?))?;
    assert_eq!(loaded.num_headwords(), thesaurus.num_headwords());
    assert_eq!(loaded.num_entries(), thesaurus.num_entries());

    let removed = loaded.remove_entries_below(0.9);
    assert_eq!(removed, 2);
    assert_eq!(loaded.num_headwords(), 2);
    assert!(loaded.equivalents("mi").is_empty());
    assert_eq!(loaded.equivalents("color").len(), 1);
    Ok(())
}

#[test]
fn overall_threshold_limits_entries() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("vectors.txt");
    write_text_embeddings(&path)?;

    let strict = ThesaurusConfig {
        overall_threshold: Some(0.9),
        ..config()
    };
    let store = read_text_file(&path)?;
    let thesaurus = ThesaurusBuilder::new(store, &strict, TextProcessor::moderate())?.build()?;
    assert_eq!(thesaurus.num_headwords(), 2);
    assert!(thesaurus.equivalents("mi").is_empty());
    Ok(())
}
