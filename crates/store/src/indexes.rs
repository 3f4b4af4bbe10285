//! Secondary indexes built after a load.
//!
//! Indexes are created only once every document is in, never between
//! insert batches.

use crate::error::{Result, StoreError};
use crate::traits::DocumentSink;
use mongodb::bson::Document;
use std::time::Instant;
use tracing::{error, info};

/// An ascending index over one or more document paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub keys: &'static [&'static str],
}

impl IndexSpec {
    pub const fn ascending(keys: &'static [&'static str]) -> Self {
        Self { keys }
    }

    /// MongoDB's default index name: `field_1` joined by `_`
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|key| format!("{}_1", key))
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Key document, e.g. `{ "genomeTags.tag": 1, "genomeTags.relevance": 1 }`
    pub fn keys_document(&self) -> Document {
        let mut keys = Document::new();
        for key in self.keys {
            keys.insert(*key, 1);
        }
        keys
    }
}

/// The indexes the read side relies on
pub const MOVIE_INDEXES: [IndexSpec; 5] = [
    IndexSpec::ascending(&["title"]),
    IndexSpec::ascending(&["movieId"]),
    IndexSpec::ascending(&["genres"]),
    IndexSpec::ascending(&["ratings.rating"]),
    IndexSpec::ascending(&["genomeTags.tag", "genomeTags.relevance"]),
];

/// Create every index in order.
///
/// A failing index doesn't stop the others; all failures are returned
/// together. Nothing already written is touched.
pub async fn build_indexes<S>(sink: &mut S, specs: &[IndexSpec]) -> Result<usize>
where
    S: DocumentSink + ?Sized,
{
    let mut failures = Vec::new();

    for spec in specs {
        let start = Instant::now();
        match sink.create_index(spec).await {
            Ok(()) => info!("Built index {} in {:.2?}", spec.name(), start.elapsed()),
            Err(e) => {
                error!("Index {} failed: {}", spec.name(), e);
                failures.push(e);
            }
        }
    }

    if failures.is_empty() {
        return Ok(specs.len());
    }

    Err(StoreError::Indexes {
        failed: failures.len(),
        total: specs.len(),
        details: failures
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; "),
    })
}
