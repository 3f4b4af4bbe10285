//! Error types for the data-loader crate.
//!
//! Every variant here is fatal for a load: the run aborts before the first
//! document is written. Missing genome labels are not errors (they are
//! logged and dropped by the aggregator).

use thiserror::Error;

use crate::types::MovieId;

/// Errors that can occur while reading and joining the source tables
///
/// Rust concept: The `#[derive(Error)]` macro from thiserror implements
/// `std::error::Error` and `Display` from the `#[error(...)]` attributes.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// One of the six source files is not present in the source folder
    #[error("Missing source file: {path}")]
    MissingFile { path: String },

    /// I/O error occurred while opening or reading a file
    #[error("I/O error in {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// The header row lacks a column the row schema requires
    #[error("Parse error in {file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    /// A row couldn't be read or one of its fields failed type coercion
    ///
    /// `line` is the 1-based physical line in the file (the header is line 1)
    #[error("Parse error at line {line} in {file}: {reason}")]
    Parse {
        file: String,
        line: u64,
        reason: String,
    },

    /// The same join key appears twice in a dimension table
    #[error("Merge error in {file}: duplicate {key} {id}")]
    DuplicateKey {
        file: String,
        key: &'static str,
        id: u32,
    },
}

impl DataLoadError {
    /// Shorthand for the duplicate movie key case raised by the dimension merger
    pub fn duplicate_movie(file: &str, id: MovieId) -> Self {
        DataLoadError::DuplicateKey {
            file: file.to_string(),
            key: "movieId",
            id,
        }
    }

    /// True for errors raised by a join step rather than by parsing
    pub fn is_merge_error(&self) -> bool {
        matches!(self, DataLoadError::DuplicateKey { .. })
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
