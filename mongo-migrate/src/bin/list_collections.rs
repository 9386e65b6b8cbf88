//! Print the collection names of the app database, one per line.

use anyhow::Result;
use clap::Parser;

use mongo_migrate::cli::{init_tracing, ListCli};
use mongo_migrate::{list_collections, MongoSource};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = ListCli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {:?}", e);
        std::process::exit(1);
    }
}

async fn run(cli: ListCli) -> Result<()> {
    init_tracing(cli.mongo.verbose)?;

    let config = cli.mongo.to_config();
    let password = config.load_password()?;
    let source = MongoSource::connect(&config, password)?;

    list_collections(&source, std::io::stdout().lock()).await?;

    source.shutdown().await;
    Ok(())
}
