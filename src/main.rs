//! blog-catalog-mcp server binary.

use std::process::ExitCode;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use blog_catalog_mcp::{Bridge, StoreConfig};

/// MCP server exposing a MongoDB blog catalog.
#[derive(Parser)]
#[command(name = "blog-catalog-mcp", version, about)]
struct Args {
    /// MongoDB connection string.
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    uri: String,

    /// Database holding the catalog.
    #[arg(long, default_value = "blog")]
    database: String,

    /// Collection holding the catalog entries.
    #[arg(long, default_value = "posts")]
    collection: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // stdout carries the MCP transport; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %args.database,
        collection = %args.collection,
        "starting blog catalog bridge"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut bridge = Bridge::new(StoreConfig {
        uri: args.uri,
        database: args.database,
        collection: args.collection,
    });

    match bridge.run(shutdown_rx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "bridge terminated with error");
            ExitCode::FAILURE
        }
    }
}
