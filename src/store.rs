//! Store connector.
//!
//! Owns the single MongoDB client for the process and exposes the two read
//! operations the bridge needs: a filtered, bounded find and a full collection
//! scan. Connection state is tracked explicitly so callers hitting the store
//! outside the `Ready` state get a `NotConnected` error instead of driver
//! surprises.

use std::sync::RwLock;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{McpError, Result};
use crate::query::CatalogFilter;

/// Author metadata embedded in a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    /// Display name.
    pub name: String,
    /// Avatar image URI.
    pub image: String,
}

/// One blog post document.
///
/// Created and mutated by systems outside this bridge; the bridge only ever
/// reads. Tag order is display-relevant and preserved as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Store-assigned identifier, serialized as a hex string.
    #[serde(
        rename = "_id",
        serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    /// Post title.
    pub title: String,
    /// Post description.
    pub description: String,
    /// Cover image URI.
    pub image: String,
    /// Display tags, in stored order.
    pub tags: Vec<String>,
    /// Post author.
    pub author: Author,
}

/// Where the catalog lives.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// MongoDB connection string.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// Collection name.
    pub collection: String,
}

/// Connector lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// Initial state; no I/O has happened.
    Disconnected,
    /// `connect()` is in flight.
    Connecting,
    /// Connected and serving reads.
    Ready,
    /// `connect()` failed; terminal apart from `close()`.
    Failed,
    /// Closed; terminal.
    Closed,
}

struct Inner {
    state: ConnState,
    client: Option<Client>,
    collection: Option<Collection<CatalogEntry>>,
}

/// Read access to the catalog.
///
/// The seam between the registries and the store: production code goes through
/// [`StoreConnector`], tests substitute an in-memory catalog.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Filtered read, returning at most `limit` entries in store order.
    async fn find_filtered(&self, filter: &CatalogFilter, limit: i64) -> Result<Vec<CatalogEntry>>;

    /// Unfiltered, unbounded read of the whole collection.
    async fn find_all(&self) -> Result<Vec<CatalogEntry>>;
}

/// The single store connection for the process.
///
/// One client, no pooling beyond the driver's own, no retry. Invariant: the
/// collection handle is `Some` exactly when the state is [`ConnState::Ready`].
pub struct StoreConnector {
    config: StoreConfig,
    inner: RwLock<Inner>,
}

impl StoreConnector {
    /// Create a connector in the `Disconnected` state. Performs no I/O.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(Inner {
                state: ConnState::Disconnected,
                client: None,
                collection: None,
            }),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnState {
        self.inner.read().expect("connector lock poisoned").state
    }

    /// Establish the connection and bind the collection handle.
    ///
    /// Valid only from `Disconnected`. Reachability is verified with a `ping`
    /// command so an unreachable store fails here, at startup, rather than on
    /// the first tool call. On failure the connector moves to `Failed` and the
    /// error is fatal to startup.
    pub async fn connect(&self) -> Result<()> {
        {
            let mut inner = self.inner.write().expect("connector lock poisoned");
            if inner.state != ConnState::Disconnected {
                return Err(McpError::NotConnected(format!(
                    "connect() is only valid from Disconnected, state is {:?}",
                    inner.state
                )));
            }
            inner.state = ConnState::Connecting;
        }

        let connected = async {
            let client = Client::with_uri_str(&self.config.uri)
                .await
                .map_err(McpError::Connection)?;
            client
                .database(&self.config.database)
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(McpError::Connection)?;
            Ok::<_, McpError>(client)
        }
        .await;

        let mut inner = self.inner.write().expect("connector lock poisoned");
        match connected {
            Ok(client) => {
                let collection = client
                    .database(&self.config.database)
                    .collection::<CatalogEntry>(&self.config.collection);
                inner.client = Some(client);
                inner.collection = Some(collection);
                inner.state = ConnState::Ready;
                info!(
                    database = %self.config.database,
                    collection = %self.config.collection,
                    "connected to store"
                );
                Ok(())
            }
            Err(e) => {
                inner.state = ConnState::Failed;
                Err(e)
            }
        }
    }

    /// Release the connection.
    ///
    /// Idempotent and valid from any state; shutdown must always complete, so
    /// nothing on this path propagates an error.
    pub async fn close(&self) {
        let (client, prior) = {
            let mut inner = self.inner.write().expect("connector lock poisoned");
            if inner.state == ConnState::Closed {
                debug!("close() called on an already closed connector");
                return;
            }
            let prior = inner.state;
            inner.state = ConnState::Closed;
            inner.collection = None;
            (inner.client.take(), prior)
        };
        if let Some(client) = client {
            client.shutdown().await;
        }
        info!(from = ?prior, "store connection closed");
    }

    fn collection(&self) -> Result<Collection<CatalogEntry>> {
        let inner = self.inner.read().expect("connector lock poisoned");
        match inner.state {
            ConnState::Ready => inner
                .collection
                .clone()
                .ok_or_else(|| McpError::Internal("Ready connector without a collection".into())),
            state => Err(McpError::NotConnected(format!(
                "operation requires Ready state, connector is {:?}",
                state
            ))),
        }
    }
}

#[async_trait]
impl CatalogReader for StoreConnector {
    async fn find_filtered(&self, filter: &CatalogFilter, limit: i64) -> Result<Vec<CatalogEntry>> {
        if limit < 0 {
            return Err(McpError::InvalidArg {
                name: "limit".into(),
                reason: format!("must be a non-negative integer, got {}", limit),
            });
        }
        let collection = self.collection()?;
        // The driver reads limit 0 as "no limit"; the contract here is "at
        // most 0", so skip the round trip entirely.
        if limit == 0 {
            return Ok(Vec::new());
        }
        let cursor = collection
            .find(filter.to_document())
            .limit(limit)
            .await
            .map_err(McpError::Store)?;
        cursor.try_collect().await.map_err(McpError::Store)
    }

    async fn find_all(&self) -> Result<Vec<CatalogEntry>> {
        let collection = self.collection()?;
        let cursor = collection
            .find(Document::new())
            .await
            .map_err(McpError::Store)?;
        cursor.try_collect().await.map_err(McpError::Store)
    }
}
