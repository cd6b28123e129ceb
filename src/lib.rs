//! # blog-catalog-mcp
//!
//! MCP (Model Context Protocol) server exposing a MongoDB blog catalog.
//!
//! This crate provides a read-only bridge between the MCP protocol and a
//! MongoDB collection of blog posts. It implements the MCP protocol over
//! stdin/stdout using JSON-RPC 2.0 and offers:
//!
//! - one tool, `list-blog` — query posts by author-name substring with a
//!   result limit (default 20)
//! - one resource, `catalog://posts` — the full catalog as a JSON snapshot
//!
//! ## Usage
//!
//! The server is typically run as an executable and configured in AI tools
//! like Claude Desktop:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "blog-catalog": {
//!       "command": "/path/to/blog-catalog-mcp",
//!       "args": ["--uri", "mongodb://localhost:27017"]
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! For testing or embedding, the server can be driven over any transport:
//!
//! ```no_run
//! use blog_catalog_mcp::{Bridge, StoreConfig};
//! use tokio::sync::watch;
//!
//! # async fn run() -> blog_catalog_mcp::Result<()> {
//! let mut bridge = Bridge::new(StoreConfig {
//!     uri: "mongodb://localhost:27017".into(),
//!     database: "blog".into(),
//!     collection: "posts".into(),
//! });
//! let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//! bridge.run(shutdown_rx).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod convert;
mod error;
mod lifecycle;
mod query;
mod resources;
mod server;
mod store;
mod tools;

pub use convert::{entries_to_pretty_json, get_optional_i64, get_optional_string};
pub use error::{McpError, Result};
pub use lifecycle::{Bridge, BridgeState};
pub use query::{CatalogFilter, DEFAULT_LIMIT};
pub use resources::{ResourceDef, ResourceRegistry, CATALOG_URI};
pub use server::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer};
pub use store::{Author, CatalogEntry, CatalogReader, ConnState, StoreConfig, StoreConnector};
pub use tools::{blog::ListBlogRequest, ToolDef, ToolRegistry};
