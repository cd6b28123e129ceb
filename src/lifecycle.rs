//! Bridge lifecycle.
//!
//! Owns the single store connector, sequences startup (connect, then attach
//! the transport) and guarantees the connector is closed on every exit path:
//! normal shutdown, startup failure, and transport errors alike.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use crate::error::Result;
use crate::server::McpServer;
use crate::store::{CatalogReader, StoreConfig, StoreConnector};

/// Bridge lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Constructed, nothing started.
    Created,
    /// Awaiting the store connection.
    Connecting,
    /// Transport attached, requests being serviced.
    Serving,
    /// Shutdown in progress; the connector is being released.
    ShuttingDown,
    /// Terminal.
    Terminated,
}

/// The bridge process, from startup to termination.
pub struct Bridge {
    connector: Arc<StoreConnector>,
    state: BridgeState,
}

impl Bridge {
    /// Create a bridge for the given store location.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            connector: Arc::new(StoreConnector::new(config)),
            state: BridgeState::Created,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// The connector owned by this bridge.
    pub fn connector(&self) -> &Arc<StoreConnector> {
        &self.connector
    }

    /// Run the bridge until the transport ends or the shutdown channel fires.
    ///
    /// If the store connection fails, the transport is never attached and the
    /// error propagates to the caller after cleanup; the process should exit
    /// non-zero. In every case the connector is closed before returning.
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) -> Result<()> {
        self.state = BridgeState::Connecting;
        if let Err(e) = self.connector.connect().await {
            error!(error = %e, "startup failed, transport never attached");
            self.release().await;
            return Err(e);
        }

        let catalog: Arc<dyn CatalogReader> = self.connector.clone();
        let server = McpServer::new(catalog);
        self.state = BridgeState::Serving;
        info!("bridge serving");

        let served = server.run(shutdown).await;
        self.release().await;
        served
    }

    /// Close the connector and terminate. Close never propagates errors, so
    /// shutdown always completes.
    async fn release(&mut self) {
        self.state = BridgeState::ShuttingDown;
        self.connector.close().await;
        self.state = BridgeState::Terminated;
    }
}
