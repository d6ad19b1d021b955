use clap::Args;
use tcgwatch_core::models::sync_run::{RunKind, RunStatus, SyncRun};
use tcgwatch_db::ops;
use tcgwatch_sync::ingest_prices;

use super::{connect, open_store, record_run};

#[derive(Args)]
pub struct PricesArgs {
    /// Pause between price lookups, overriding prices.batch_delay_ms
    #[arg(long)]
    batch_delay_ms: Option<u64>,
}

pub async fn run(args: PricesArgs) -> anyhow::Result<()> {
    let (mut config, conn) = open_store()?;
    if let Some(delay) = args.batch_delay_ms {
        config.prices.batch_delay_ms = delay;
    }

    let counts = ops::catalog_counts(&conn)?;
    if counts.skus == 0 {
        println!("No SKUs stored. Run `tcgwatch catalog` first.");
        return Ok(());
    }

    let run = SyncRun::new(RunKind::Prices);
    let result = match connect(&config).await {
        Ok(api) => ingest_prices(&conn, &api, &config.prices).await,
        Err(e) => Err(e),
    };
    let written = ops::catalog_counts(&conn)?.prices.saturating_sub(counts.prices);

    match result {
        Ok(report) => {
            record_run(&conn, run, RunStatus::Success, written, None)?;
            println!(
                "Ingested {} prices for {} SKUs in {} batches",
                report.inserted, report.requested, report.batches
            );
            if report.unknown > 0 {
                println!("  {} prices for unknown SKUs skipped", report.unknown);
            }
            Ok(())
        }
        Err(e) => {
            record_run(&conn, run, RunStatus::Failed, written, Some(&e))?;
            if written > 0 {
                eprintln!("{written} prices from earlier batches were kept");
            }
            Err(e)
        }
    }
}
