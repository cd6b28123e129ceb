//! Error types for the MCP bridge.

use thiserror::Error;

/// Errors surfaced by the bridge.
///
/// Per-invocation errors (`NotConnected`, `MissingArg`, `InvalidArg`, `Store`,
/// `UnknownTool`, `UnknownResource`) are reported back to the caller as failed
/// results and never terminate the process. `Connection` is fatal during
/// startup; `Io` and `Json` belong to the transport loop.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to establish the store connection.
    #[error("store connection failed: {0}")]
    Connection(#[source] mongodb::error::Error),

    /// A store operation was attempted outside the `Ready` state.
    #[error("store not connected: {0}")]
    NotConnected(String),

    /// A find operation failed after a successful connection.
    #[error("store operation failed: {0}")]
    Store(#[source] mongodb::error::Error),

    /// A required argument is missing from the tool call.
    #[error("missing required argument: {0}")]
    MissingArg(String),

    /// An argument is present but fails its contract.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArg {
        /// Argument name as declared in the input schema.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Tool name not present in the registry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// JSON-RPC method the server does not implement.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// Resource URI not present in the registry.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// JSON serialization failure on the protocol edge.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport read/write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invariant violation inside the bridge.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, McpError>;
