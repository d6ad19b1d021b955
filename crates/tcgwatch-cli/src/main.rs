mod commands;

use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "tcgwatch",
    version,
    about = "Trading-card catalog sync and price ingest"
)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    commands::run(cli.command).await
}
