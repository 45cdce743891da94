//! Readers for word2vec text and binary embedding files.
//!
//! Both formats start with a `count dimension` header line. Multi-word
//! phrases appear with their tokens joined by `_` and are split back into
//! [`Phrase`] tokens on load.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{info, warn};

use crate::embedding::store::EmbeddingStore;
use crate::error::{PhrasaurusError, Result};
use crate::phrase::{Phrase, TOKEN_JOINER};

fn parse_header(line: &str) -> Result<(usize, usize)> {
    let mut fields = line.split_whitespace();
    let mut next = |name: &str| -> Result<usize> {
        fields
            .next()
            .ok_or_else(|| PhrasaurusError::parse(1, format!("missing {name} in header")))?
            .parse::<usize>()
            .map_err(|e| PhrasaurusError::parse(1, format!("bad {name} in header: {e}")))
    };
    let count = next("vector count")?;
    let dimension = next("dimension")?;
    Ok((count, dimension))
}

/// Insert unless the token has no usable phrase form (e.g. only `_`).
fn insert_token(store: &mut EmbeddingStore, token: &str, vector: Vec<f32>) -> Result<()> {
    match Phrase::from_joined(token, TOKEN_JOINER) {
        Ok(phrase) => store.insert(phrase, vector),
        Err(_) => {
            warn!(token, "Skipping embedding with no phrase tokens");
            Ok(())
        }
    }
}

/// Read the word2vec text format: one `token v1 ... vd` line per entry.
pub fn read_text<R: BufRead>(reader: R) -> Result<EmbeddingStore> {
    let mut lines = reader.lines();
    let header = lines
        .next()
        .ok_or_else(|| PhrasaurusError::parse(1, "empty embedding file"))??;
    let (count, dimension) = parse_header(&header)?;
    let mut store = EmbeddingStore::new(dimension)?;

    for (i, line) in lines.enumerate() {
        let line_no = i + 2;
        let line = line?;
        let mut fields = line.split_whitespace();
        let Some(token) = fields.next() else {
            continue;
        };
        let vector = fields
            .map(|f| {
                f.parse::<f32>()
                    .map_err(|e| PhrasaurusError::parse(line_no, format!("bad component: {e}")))
            })
            .collect::<Result<Vec<f32>>>()?;
        if vector.len() != dimension {
            return Err(PhrasaurusError::parse(
                line_no,
                format!("expected {dimension} components, found {}", vector.len()),
            ));
        }
        insert_token(&mut store, token, vector)?;
    }

    if store.size() != count {
        warn!(expected = count, read = store.size(), "Embedding count differs from header");
    }
    info!(size = store.size(), dimension, "Read text embeddings");
    Ok(store)
}

/// Read the word2vec binary format: `token ` followed by `dimension`
/// little-endian `f32` values, optionally followed by a newline.
pub fn read_binary<R: BufRead>(mut reader: R) -> Result<EmbeddingStore> {
    let mut header = String::new();
    if reader.read_line(&mut header)? == 0 {
        return Err(PhrasaurusError::parse(1, "empty embedding file"));
    }
    let (count, dimension) = parse_header(&header)?;
    let mut store = EmbeddingStore::new(dimension)?;

    let mut token = Vec::new();
    for entry in 0..count {
        token.clear();
        reader.read_until(b' ', &mut token)?;
        if token.last() != Some(&b' ') {
            return Err(PhrasaurusError::parse(
                entry + 2,
                format!("truncated file: {entry} of {count} vectors read"),
            ));
        }
        token.pop();
        let text = String::from_utf8_lossy(&token);
        let text = text.trim_start_matches('\n');

        let mut vector = vec![0.0f32; dimension];
        reader.read_f32_into::<LittleEndian>(&mut vector)?;
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(PhrasaurusError::parse(
                entry + 2,
                format!("non-finite vector for '{text}'"),
            ));
        }
        insert_token(&mut store, text, vector)?;
    }
    info!(size = store.size(), dimension, "Read binary embeddings");
    Ok(store)
}

pub fn read_text_file<P: AsRef<Path>>(path: P) -> Result<EmbeddingStore> {
    read_text(BufReader::new(File::open(path)?))
}

pub fn read_binary_file<P: AsRef<Path>>(path: P) -> Result<EmbeddingStore> {
    read_binary(BufReader::new(File::open(path)?))
}
