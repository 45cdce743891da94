//! Output formatting for CLI commands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, PhrasaurusArgs};
use crate::error::Result;

/// Result structure for corpus preprocessing.
#[derive(Debug, Serialize, Deserialize)]
pub struct PreprocessResult {
    pub input: String,
    pub output: String,
    pub text_processor: String,
    pub lines_written: usize,
    pub duration_ms: u64,
}

/// Result structure for n-gram pruning.
#[derive(Debug, Serialize, Deserialize)]
pub struct PruneResult {
    pub output: String,
    pub min_count: u64,
    pub kept: usize,
    pub dropped: usize,
}

/// Result structure for collocation detection.
#[derive(Debug, Serialize, Deserialize)]
pub struct CollocationResult {
    pub output: String,
    pub orders: usize,
    pub total_tokens: u64,
    pub detected: usize,
    pub bootstrapped: usize,
    pub collocations: usize,
    /// Collocation count keyed by phrase length.
    pub by_length: BTreeMap<usize, usize>,
    pub duration_ms: u64,
}

/// Result structure for applying collocations to a corpus.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApplyCollocationsResult {
    pub output: String,
    pub collocations: usize,
    pub case_sensitive: bool,
    pub lines_written: usize,
}

/// Result structure for thesaurus construction.
#[derive(Debug, Serialize, Deserialize)]
pub struct ThesaurusResult {
    pub output: String,
    pub lexicon_size: usize,
    pub dimension: usize,
    pub headwords: usize,
    pub entries: usize,
    pub unique_pairings: usize,
    pub duration_ms: u64,
}

/// Result structure for thesaurus trimming.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrimResult {
    pub output: String,
    pub min_score: f64,
    pub entries_removed: usize,
    pub headwords_remaining: usize,
    pub entries_remaining: usize,
}

/// Result structure for bulk distance computation.
#[derive(Debug, Serialize, Deserialize)]
pub struct DistanceResult {
    pub output: String,
    pub regime: String,
    pub pairs: usize,
    pub mean_distance: Option<f64>,
    pub duration_ms: u64,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(
    message: &str,
    result: &T,
    args: &PhrasaurusArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &PhrasaurusArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    // Convert to JSON value for easier manipulation
    let value = serde_json::to_value(result)?;
    output_generic_human(&value);
    Ok(())
}

/// Output any result as `key: value` lines.
fn output_generic_human(value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let formatted_val = format_value(val);
                println!("{key}: {formatted_val}");
            }
        }
        _ => {
            let formatted_value = format_value(value);
            println!("{formatted_value}");
        }
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &PhrasaurusArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for human output.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(obj) => {
            let formatted_values = obj
                .iter()
                .map(|(k, v)| format!("{k}={}", format_value(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{formatted_values}}}")
        }
        serde_json::Value::Null => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!("mi")), "mi");
        assert_eq!(format_value(&json!(3)), "3");
        assert_eq!(format_value(&json!(null)), "-");
        assert_eq!(format_value(&json!([1, 2])), "[1, 2]");
        assert_eq!(format_value(&json!({"2": 10, "3": 4})), "{2=10, 3=4}");
    }

    #[test]
    fn test_collocation_result_serializes_lengths() {
        let result = CollocationResult {
            output: "out.txt".to_string(),
            orders: 2,
            total_tokens: 100,
            detected: 3,
            bootstrapped: 1,
            collocations: 4,
            by_length: BTreeMap::from([(2, 3), (3, 1)]),
            duration_ms: 5,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["by_length"]["2"], json!(3));
        assert_eq!(value["collocations"], json!(4));
    }
}
