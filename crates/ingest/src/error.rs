//! Errors of a whole load, tagged by the phase that failed

use data_loader::DataLoadError;
use store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    /// Reading, parsing or joining the CSV files failed; nothing was written
    #[error("Loading source files failed: {0}")]
    Data(#[from] DataLoadError),

    /// The target couldn't be checked or wasn't empty; nothing was written
    #[error("Target check failed: {0}")]
    Preflight(#[source] StoreError),

    /// An insert batch failed; earlier batches remain in the store
    #[error("Writing documents failed: {0}")]
    Write(#[source] StoreError),

    /// All documents were written but some indexes could not be built
    #[error("All {documents} documents were written, but index build failed: {source}")]
    Index {
        documents: u64,
        #[source]
        source: StoreError,
    },

    /// A blocking worker panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IngestError {
    /// True when the store was not modified by the failed run
    pub fn is_before_write(&self) -> bool {
        matches!(self, IngestError::Data(_) | IngestError::Preflight(_))
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
