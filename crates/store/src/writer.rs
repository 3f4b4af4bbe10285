//! Batched bulk writer.
//!
//! Documents are buffered and handed to the sink `batch_size` at a time.
//! The batch size only affects throughput; the stored result is the same
//! for any value.

use crate::error::{Result, StoreError};
use crate::traits::DocumentSink;
use data_loader::MovieDocument;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default number of documents per insert
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// How often (in batches) progress is logged at info level
const PROGRESS_EVERY: usize = 100;

/// What a completed write phase did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub documents: u64,
    pub batches: usize,
    pub elapsed: Duration,
}

/// Buffers documents and inserts them batch by batch.
pub struct BulkWriter<'a, S: ?Sized> {
    sink: &'a mut S,
    batch_size: usize,
    buffer: Vec<MovieDocument>,
    batches: usize,
    written: u64,
    started: Instant,
}

impl<'a, S> BulkWriter<'a, S>
where
    S: DocumentSink + ?Sized,
{
    pub fn new(sink: &'a mut S, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            sink,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            batches: 0,
            written: 0,
            started: Instant::now(),
        }
    }

    /// Queue one document, inserting the batch when it is full
    pub async fn push(&mut self, document: MovieDocument) -> Result<()> {
        self.buffer.push(document);
        if self.buffer.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// Insert whatever is buffered
    pub async fn flush(&mut self) -> Result<()> {
        let (Some(first), Some(last)) = (self.buffer.first(), self.buffer.last()) else {
            return Ok(());
        };
        let (first_movie_id, last_movie_id) = (first.movie_id, last.movie_id);
        let batch = self.batches + 1;

        if let Err(e) = self.sink.insert_batch(&self.buffer).await {
            return Err(StoreError::Batch {
                batch,
                first_movie_id,
                last_movie_id,
                written: self.written + e.persisted(),
                source: Box::new(e),
            });
        }

        self.written += self.buffer.len() as u64;
        self.batches = batch;
        self.buffer.clear();

        debug!("Batch {} written ({} documents total)", batch, self.written);
        if batch % PROGRESS_EVERY == 0 {
            info!(
                "Written {} documents in {} batches ({:.2?})",
                self.written,
                batch,
                self.started.elapsed()
            );
        }
        Ok(())
    }

    /// Flush the tail and report what was written
    pub async fn finish(mut self) -> Result<WriteSummary> {
        self.flush().await?;
        let summary = WriteSummary {
            documents: self.written,
            batches: self.batches,
            elapsed: self.started.elapsed(),
        };
        info!(
            "Wrote {} documents to {} in {} batches ({:.2?})",
            summary.documents,
            self.sink.target(),
            summary.batches,
            summary.elapsed
        );
        Ok(summary)
    }

    /// Drain an iterator of documents through the writer
    pub async fn write_all<I>(mut self, documents: I) -> Result<WriteSummary>
    where
        I: IntoIterator<Item = MovieDocument>,
    {
        for document in documents {
            self.push(document).await?;
        }
        self.finish().await
    }
}
