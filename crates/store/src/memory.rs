//! In-memory sink for tests and dry runs.
//!
//! Documents are encoded to BSON exactly as the MongoDB driver would, so
//! assertions see real field names. Like a collection with a unique
//! `movieId`, it rejects a batch that repeats a movie.

use crate::error::{Result, StoreError};
use crate::indexes::IndexSpec;
use crate::traits::DocumentSink;
use async_trait::async_trait;
use data_loader::{MovieDocument, MovieId};
use mongodb::bson::{self, Document};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: Vec<Document>,
    movie_ids: HashSet<MovieId>,
    indexes: Vec<IndexSpec>,
    batches: usize,
    fail_on_batch: Option<usize>,
    keep_on_failure: usize,
    fail_on_index: Option<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the n-th insert batch (1-based)
    pub fn fail_on_batch(mut self, batch: usize) -> Self {
        self.fail_on_batch = Some(batch);
        self
    }

    /// Keep the first `documents` of the failing batch, the way an ordered
    /// insert keeps everything before the document that failed
    pub fn keep_on_failure(mut self, documents: usize) -> Self {
        self.keep_on_failure = documents;
        self
    }

    /// Reject creation of the index with this name
    pub fn fail_on_index(mut self, name: impl Into<String>) -> Self {
        self.fail_on_index = Some(name.into());
        self
    }

    /// Stored documents in insertion order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Decode the stored documents back into typed form
    pub fn movie_documents(&self) -> Result<Vec<MovieDocument>> {
        self.documents
            .iter()
            .map(|d| {
                bson::from_document(d.clone()).map_err(|e| StoreError::Decode {
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    pub fn indexes(&self) -> &[IndexSpec] {
        &self.indexes
    }

    /// Number of insert batches accepted
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Store `documents`, validating the whole slice before applying any of it
    fn apply(&mut self, documents: &[MovieDocument]) -> Result<()> {
        let mut seen = HashSet::with_capacity(documents.len());
        let mut encoded = Vec::with_capacity(documents.len());
        for document in documents {
            if self.movie_ids.contains(&document.movie_id) || !seen.insert(document.movie_id) {
                return Err(StoreError::Insert {
                    reason: format!("duplicate key movieId {}", document.movie_id),
                    persisted: 0,
                });
            }
            let bson = bson::to_document(document).map_err(|e| StoreError::Encode {
                movie_id: document.movie_id,
                reason: e.to_string(),
            })?;
            encoded.push(bson);
        }

        self.movie_ids.extend(seen);
        self.documents.extend(encoded);
        Ok(())
    }
}

#[async_trait]
impl DocumentSink for InMemoryStore {
    fn target(&self) -> String {
        "memory.movie".to_string()
    }

    async fn count_documents(&self) -> Result<u64> {
        Ok(self.documents.len() as u64)
    }

    async fn insert_batch(&mut self, documents: &[MovieDocument]) -> Result<()> {
        let batch = self.batches + 1;
        if self.fail_on_batch == Some(batch) {
            let kept = self.keep_on_failure.min(documents.len());
            self.apply(&documents[..kept])?;
            return Err(StoreError::Insert {
                reason: format!("injected failure on batch {}", batch),
                persisted: kept,
            });
        }

        self.apply(documents)?;
        self.batches = batch;
        Ok(())
    }

    async fn create_index(&mut self, index: &IndexSpec) -> Result<()> {
        if self.fail_on_index.as_deref() == Some(index.name().as_str()) {
            return Err(StoreError::Index {
                name: index.name(),
                reason: "injected failure".to_string(),
            });
        }
        self.indexes.push(*index);
        Ok(())
    }
}
