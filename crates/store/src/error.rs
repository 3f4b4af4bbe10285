//! Errors raised while writing to the document store

use data_loader::MovieId;
use thiserror::Error;

/// Errors that can occur when talking to the document store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to connect to document store at {uri}: {reason}")]
    Connection { uri: String, reason: String },

    #[error("Failed to query {target}: {reason}")]
    Query { target: String, reason: String },

    /// The target must start empty, a load is a full materialization
    #[error("{target} already holds {count} documents; drop it before loading")]
    NotEmpty { target: String, count: u64 },

    #[error("Failed to encode document for movie {movie_id}: {reason}")]
    Encode { movie_id: MovieId, reason: String },

    #[error("Failed to decode stored document: {reason}")]
    Decode { reason: String },

    /// An ordered insert stopped part way; the first `persisted` documents
    /// of the batch are stored
    #[error("Store rejected insert after {persisted} documents: {reason}")]
    Insert { reason: String, persisted: usize },

    /// A batch failed mid-load. Earlier batches, and whatever part of this
    /// one the store accepted, stay in the store.
    #[error(
        "Batch {batch} (movieIds {first_movie_id}..{last_movie_id}) failed with {written} documents already persisted: {source}"
    )]
    Batch {
        batch: usize,
        first_movie_id: MovieId,
        last_movie_id: MovieId,
        written: u64,
        #[source]
        source: Box<StoreError>,
    },

    #[error("Failed to create index {name}: {reason}")]
    Index { name: String, reason: String },

    /// Some indexes failed after a complete load; the documents are kept
    #[error("{failed} of {total} indexes failed: {details}")]
    Indexes {
        failed: usize,
        total: usize,
        details: String,
    },
}

impl StoreError {
    /// The failing batch number, for errors raised mid-load
    pub fn failed_batch(&self) -> Option<usize> {
        match self {
            StoreError::Batch { batch, .. } => Some(*batch),
            _ => None,
        }
    }

    /// Documents the failed operation left behind in the store
    pub fn persisted(&self) -> u64 {
        match self {
            StoreError::Insert { persisted, .. } => *persisted as u64,
            StoreError::Batch { written, .. } => *written,
            _ => 0,
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
