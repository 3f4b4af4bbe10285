//! # Load Orchestrator
//!
//! This module coordinates a full load:
//! 1. Check the target collection is empty
//! 2. Parse, group and join the CSV files (blocking pool, rayon inside)
//! 3. Stream assembled documents through a bounded channel
//! 4. Insert them in batches from a single writer
//! 5. Build the secondary indexes once every document is in
//!
//! Steps 1-2 can only fail before anything is written. Step 4 can fail
//! mid-way and leaves earlier batches in place; a full reload is the
//! recovery.
//!
//! ## Learning Goals
//!
//! - Using spawn_blocking for CPU-bound work inside an async program
//! - A bounded mpsc channel as producer/consumer backpressure
//! - Stopping a producer by dropping the receiving end

use std::path::Path;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info};

use data_loader::{Dataset, DatasetCounts, MovieDocument};
use store::{
    BulkWriter, DocumentSink, MOVIE_INDEXES, StoreError, WriteSummary, build_indexes,
};

use crate::config::LoadConfig;
use crate::error::{IngestError, Result};

/// What a successful load did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub counts: DatasetCounts,
    pub write: WriteSummary,
    pub indexes: usize,
    pub elapsed: Duration,
}

/// Load the six CSV files in `source_dir` into `sink`.
///
/// # Arguments
/// * `source_dir` - Folder holding ratings.csv, tags.csv, links.csv, movies.csv,
///   genome-scores.csv and genome-tags.csv
/// * `sink` - Target collection, must be empty
/// * `config` - Batch size and channel capacity
pub async fn populate<S>(
    source_dir: &Path,
    sink: &mut S,
    config: &LoadConfig,
) -> Result<LoadSummary>
where
    S: DocumentSink + ?Sized,
{
    let start = Instant::now();

    ensure_empty(sink).await?;

    // Parsing and joining are CPU-bound; keep them off the async workers
    let dir = source_dir.to_path_buf();
    let dataset = tokio::task::spawn_blocking(move || Dataset::load_from_dir(&dir)).await??;
    let counts = dataset.counts();

    let (tx, mut rx) = mpsc::channel::<MovieDocument>(config.channel_capacity.max(1));

    let producer = tokio::task::spawn_blocking(move || {
        let mut produced: u64 = 0;
        for document in dataset.into_documents() {
            if tx.blocking_send(document).is_err() {
                // The writer gave up; stop assembling
                debug!("Writer closed the channel after {} documents", produced);
                break;
            }
            produced += 1;
        }
        produced
    });

    let written = drain(&mut rx, sink, config.batch_size).await;
    // Closing the receiver unblocks a producer waiting on a full channel
    drop(rx);
    let produced = producer.await?;
    let write = written.map_err(IngestError::Write)?;
    debug!("Assembled {} documents, wrote {}", produced, write.documents);

    let indexes = build_indexes(sink, &MOVIE_INDEXES)
        .await
        .map_err(|source| IngestError::Index {
            documents: write.documents,
            source,
        })?;

    let summary = LoadSummary {
        counts,
        write,
        indexes,
        elapsed: start.elapsed(),
    };
    info!(
        "Load complete: {} documents, {} indexes in {:.2?}",
        summary.write.documents, summary.indexes, summary.elapsed
    );
    Ok(summary)
}

/// A load is a full materialization; refuse to mix with existing data
async fn ensure_empty<S>(sink: &S) -> Result<()>
where
    S: DocumentSink + ?Sized,
{
    let count = sink.count_documents().await.map_err(IngestError::Preflight)?;
    if count > 0 {
        return Err(IngestError::Preflight(StoreError::NotEmpty {
            target: sink.target(),
            count,
        }));
    }
    Ok(())
}

/// Single consumer: batch everything the assembler sends
async fn drain<S>(
    rx: &mut mpsc::Receiver<MovieDocument>,
    sink: &mut S,
    batch_size: usize,
) -> store::Result<WriteSummary>
where
    S: DocumentSink + ?Sized,
{
    let mut writer = BulkWriter::new(sink, batch_size);
    while let Some(document) = rx.recv().await {
        writer.push(document).await?;
    }
    writer.finish().await
}
