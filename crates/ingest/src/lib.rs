//! Ingest crate: runs a full MovieLens load into a document store.
//!
//! Ties the CPU-bound dataset building from `data-loader` to the batched
//! writer and index builder from `store`.
//!
//! ## Example Usage
//! ```ignore
//! use ingest::{LoadConfig, populate};
//! use store::{MongoStore, StoreConfig};
//!
//! let mut store = MongoStore::connect(StoreConfig::default()).await?;
//! let result = populate(Path::new("data/ml-25m"), &mut store, &LoadConfig::default()).await;
//! store.close().await;
//! let summary = result?;
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;

pub use config::LoadConfig;
pub use error::{IngestError, Result};
pub use orchestrator::{LoadSummary, populate};
