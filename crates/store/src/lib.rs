//! Document store side of a MovieLens load.
//!
//! This crate provides:
//! - The [`DocumentSink`] trait, the only thing the write phase depends on
//! - [`MongoStore`], the production sink over the `mongodb` driver
//! - [`InMemoryStore`], a BSON-encoding sink for tests
//! - [`BulkWriter`] for batched inserts
//! - [`build_indexes`] and the five [`MOVIE_INDEXES`] the read side expects
//!
//! ## Example Usage
//! ```ignore
//! use store::{BulkWriter, MongoStore, StoreConfig, build_indexes, MOVIE_INDEXES};
//!
//! let mut store = MongoStore::connect(StoreConfig::default()).await?;
//! let summary = BulkWriter::new(&mut store, 1000).write_all(documents).await?;
//! build_indexes(&mut store, &MOVIE_INDEXES).await?;
//! store.close().await;
//! ```

pub mod error;
pub mod traits;
pub mod indexes;
pub mod writer;
pub mod mongo;
pub mod memory;

// Re-export main types
pub use error::{Result, StoreError};
pub use traits::DocumentSink;
pub use indexes::{IndexSpec, MOVIE_INDEXES, build_indexes};
pub use writer::{BulkWriter, DEFAULT_BATCH_SIZE, WriteSummary};
pub use mongo::{MongoStore, StoreConfig};
pub use memory::InMemoryStore;
