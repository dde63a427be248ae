//! `stockroom` binary entry point.

use anyhow::Context;
use clap::Parser;
use stockroom_cli::{init_logging, run, AppConfig, Command};
use stockroom_db::Database;
use stockroom_inventory::InventoryService;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "stockroom", version, about = "Stock, purchases and sales ledger")]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long, default_value = "stockroom.toml")]
    config: String,

    /// Database file, overriding the configuration
    #[arg(long)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config))?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }

    init_logging(&config.log.level);
    info!(database = %config.database.path, "Starting stockroom");

    let db = Database::new(config.db_config())
        .await
        .context("opening database")?;
    let service = InventoryService::from_database(db.clone());

    let response = run(&service, cli.command).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    db.close().await;

    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
