//! Error types for the Phrasaurus library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`PhrasaurusError`] enum. Setup problems (unreadable corpus files,
//! malformed n-gram lines, broken embedding files) surface here and are meant
//! to abort a run; per-record anomalies during scoring are logged and skipped
//! by the callers instead.
//!
//! # Examples
//!
//! ```
//! use phrasaurus::error::{PhrasaurusError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PhrasaurusError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Phrasaurus operations.
#[derive(Error, Debug)]
pub enum PhrasaurusError {
    /// I/O errors (file operations, broken pipes, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A corpus, thesaurus or embedding record could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument passed to an operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not valid in the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Worker pool construction errors
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with PhrasaurusError.
pub type Result<T> = std::result::Result<T, PhrasaurusError>;

impl PhrasaurusError {
    /// Create a new parse error for the given (1-based) line.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        PhrasaurusError::Parse {
            line,
            message: msg.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PhrasaurusError::Config(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        PhrasaurusError::InvalidArgument(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        PhrasaurusError::InvalidOperation(msg.into())
    }
}

impl From<rayon::ThreadPoolBuildError> for PhrasaurusError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        PhrasaurusError::ThreadPool(err.to_string())
    }
}
