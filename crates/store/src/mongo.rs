//! MongoDB-backed sink.
//!
//! Handles:
//! - Connection management (connect + ping, explicit shutdown)
//! - Batched `insert_many` into the movie collection
//! - Index creation with the driver's default index names

use crate::error::{Result, StoreError};
use crate::indexes::IndexSpec;
use crate::traits::DocumentSink;
use async_trait::async_trait;
use data_loader::MovieDocument;
use mongodb::bson::doc;
use mongodb::error::ErrorKind;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use tracing::{debug, info};

/// Where the movie collection lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "Movies".to_string(),
            collection: "movie".to_string(),
        }
    }
}

/// Client handle plus the target collection.
///
/// Constructed once at startup and passed to the loader; call
/// [`MongoStore::close`] when done, whether the load succeeded or not.
pub struct MongoStore {
    client: Client,
    collection: Collection<MovieDocument>,
    config: StoreConfig,
}

impl MongoStore {
    /// Connect and ping the server.
    ///
    /// The driver connects lazily, so the ping makes an unreachable server
    /// fail here instead of after the CSV files have been parsed.
    pub async fn connect(config: StoreConfig) -> Result<Self> {
        info!("Connecting to MongoDB at {}", config.uri);

        let connection_error = |e: mongodb::error::Error| StoreError::Connection {
            uri: config.uri.clone(),
            reason: e.to_string(),
        };

        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(connection_error)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(connection_error)?;

        let collection = client
            .database(&config.database)
            .collection::<MovieDocument>(&config.collection);

        info!("Connected, target collection {}.{}", config.database, config.collection);
        Ok(Self {
            client,
            collection,
            config,
        })
    }

    /// Shut the client down, releasing its connection pool
    pub async fn close(self) {
        self.client.shutdown().await;
        info!("Closed MongoDB connection to {}", self.config.uri);
    }
}

#[async_trait]
impl DocumentSink for MongoStore {
    fn target(&self) -> String {
        format!("{}.{}", self.config.database, self.config.collection)
    }

    async fn count_documents(&self) -> Result<u64> {
        self.collection
            .count_documents(None, None)
            .await
            .map_err(|e| StoreError::Query {
                target: self.target(),
                reason: e.to_string(),
            })
    }

    async fn insert_batch(&mut self, documents: &[MovieDocument]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let result = self
            .collection
            .insert_many(documents, None)
            .await
            .map_err(|e| StoreError::Insert {
                persisted: persisted_before_failure(&e, documents.len()),
                reason: e.to_string(),
            })?;

        debug!("Inserted {} documents", result.inserted_ids.len());
        Ok(())
    }

    async fn create_index(&mut self, index: &IndexSpec) -> Result<()> {
        let model = IndexModel::builder()
            .keys(index.keys_document())
            .options(IndexOptions::builder().name(index.name()).build())
            .build();

        self.collection
            .create_index(model, None)
            .await
            .map_err(|e| StoreError::Index {
                name: index.name(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

/// Documents an ordered `insert_many` stored before it stopped.
///
/// Ordered inserts halt at the first write error, so everything before its
/// index is in the collection. A write concern error alone means every
/// document was applied. Any other failure gives no count, so 0.
fn persisted_before_failure(err: &mongodb::error::Error, batch_len: usize) -> usize {
    match err.kind.as_ref() {
        ErrorKind::BulkWrite(failure) => failure
            .write_errors
            .as_ref()
            .and_then(|errors| errors.iter().map(|e| e.index).min())
            .unwrap_or(batch_len),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target_matches_read_side() {
        let config = StoreConfig::default();
        assert_eq!(config.uri, "mongodb://localhost:27017");
        assert_eq!(config.database, "Movies");
        assert_eq!(config.collection, "movie");
    }

    #[test]
    fn test_unknown_failure_persists_nothing() {
        let err = mongodb::error::Error::custom("connection reset");
        assert_eq!(persisted_before_failure(&err, 1000), 0);
    }
}
