pub mod catalog;
pub mod config;
pub mod history;
pub mod key;
pub mod prices;
pub mod status;

use clap::Subcommand;
use rusqlite::Connection;

use tcgwatch_api::TcgplayerClient;
use tcgwatch_auth::{resolve_private_key, KeyringStore};
use tcgwatch_core::config::WatchConfig;
use tcgwatch_core::models::sync_run::{RunStatus, SyncRun};

#[derive(Subcommand)]
pub enum Command {
    /// Initialize and show tcgwatch configuration
    Config {
        #[command(subcommand)]
        action: config::ConfigAction,
    },
    /// Manage the API key pair
    Key {
        #[command(subcommand)]
        action: key::KeyAction,
    },
    /// Sync the card catalog (groups, rarities, products, SKUs)
    Catalog(catalog::CatalogArgs),
    /// Fetch current prices for every stored SKU
    Prices(prices::PricesArgs),
    /// Show catalog size and latest price snapshot
    Status,
    /// Show pipeline run history
    History(history::HistoryArgs),
}

pub async fn run(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Config { action } => config::run(action),
        Command::Key { action } => key::run(action),
        Command::Catalog(args) => catalog::run(args).await,
        Command::Prices(args) => prices::run(args).await,
        Command::Status => status::run(),
        Command::History(args) => history::run(args),
    }
}

/// Load the config and open the database it points to.
fn open_store() -> anyhow::Result<(WatchConfig, Connection)> {
    let config = WatchConfig::load()?;
    let conn = tcgwatch_db::open_db(&config.db_path()?)?;
    Ok((config, conn))
}

/// Authenticate against the marketplace with the configured key pair.
async fn connect(config: &WatchConfig) -> anyhow::Result<TcgplayerClient> {
    let private_key = resolve_private_key(&config.api, &KeyringStore::new())?;
    let client = TcgplayerClient::connect(&config.api, &private_key).await?;
    Ok(client)
}

/// Store the outcome of a pipeline run in the run history.
fn record_run(
    conn: &Connection,
    mut run: SyncRun,
    status: RunStatus,
    rows_written: u64,
    error: Option<&anyhow::Error>,
) -> anyhow::Result<()> {
    run.rows_written = rows_written;
    if let Some(e) = error {
        run.errors.push(format!("{e:#}"));
    }
    run.finish(status);
    tcgwatch_db::ops::insert_sync_run(conn, &run)?;
    tracing::debug!(id = %run.id, kind = %run.kind, status = %run.status, "recorded run");
    Ok(())
}
