//! The seam between the bulk writer and a concrete store.
//!
//! The writer and index builder only ever see a [`DocumentSink`], so the
//! whole write phase runs unchanged against MongoDB or an in-memory store.

use crate::error::Result;
use crate::indexes::IndexSpec;
use async_trait::async_trait;
use data_loader::MovieDocument;

/// A collection that movie documents can be bulk-inserted into.
///
/// ## Design Note
/// - `Send` so the writer can run on any tokio worker
/// - `insert_batch` borrows the batch; the writer reuses its buffer
#[async_trait]
pub trait DocumentSink: Send {
    /// Where documents go, for logs and errors (e.g. "Movies.movie")
    fn target(&self) -> String;

    /// Number of documents already in the target
    async fn count_documents(&self) -> Result<u64>;

    /// Insert every document of the batch as an independent document
    async fn insert_batch(&mut self, documents: &[MovieDocument]) -> Result<()>;

    /// Create one secondary index
    async fn create_index(&mut self, index: &IndexSpec) -> Result<()>;
}
