//! Mongo snapshot tool
//!
//! Dumps every collection of the app database into a snapshot directory,
//! one length-prefixed file per collection.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use mongo_migrate::cli::{init_tracing, DumpCli};
use mongo_migrate::{MongoSource, SnapshotEngine};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = DumpCli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {:?}", e);
        std::process::exit(1);
    }
}

async fn run(cli: DumpCli) -> Result<()> {
    init_tracing(cli.mongo.verbose)?;

    let config = cli.to_config();
    info!("Starting mongo snapshot");
    info!("Output: {}", config.snapshot_dir.display());

    let password = config.mongo.load_password()?;
    let source = MongoSource::connect(&config.mongo, password)?;

    let engine = SnapshotEngine::new(config, source);
    engine.run().await?;

    engine.into_source().shutdown().await;
    info!("Snapshot tool completed successfully");
    Ok(())
}
