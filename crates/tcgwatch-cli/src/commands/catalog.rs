use clap::Args;
use tcgwatch_core::models::sync_run::{RunKind, RunStatus, SyncRun};
use tcgwatch_sync::{sync_catalog, ResetDecision};

use super::{connect, open_store, record_run};

#[derive(Args)]
pub struct CatalogArgs {
    /// Truncate and rebuild even if the stored groups are current
    #[arg(long)]
    force: bool,
    /// Override the configured category id
    #[arg(long)]
    category: Option<u32>,
}

pub async fn run(args: CatalogArgs) -> anyhow::Result<()> {
    let (mut config, mut conn) = open_store()?;
    if let Some(category) = args.category {
        config.catalog.category_id = category;
    }

    let run = SyncRun::new(RunKind::Catalog);
    let result = match connect(&config).await {
        Ok(api) => sync_catalog(&mut conn, &api, &config.catalog, args.force).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => {
            let status = if report.decision == ResetDecision::Skip {
                RunStatus::Skipped
            } else {
                RunStatus::Success
            };
            record_run(&conn, run, status, report.rows_written(), None)?;

            if report.decision == ResetDecision::Skip {
                println!("Catalog already current; nothing to do (use --force to rebuild)");
                return Ok(());
            }
            println!(
                "Catalog {} for category {}:",
                if report.decision == ResetDecision::Rebuild {
                    "rebuilt"
                } else {
                    "synced"
                },
                config.catalog.category_id
            );
            println!("  groups:     {}", report.groups);
            println!("  rarities:   {}", report.rarities);
            println!("  printings:  {}", report.printings);
            println!("  conditions: {}", report.conditions);
            println!("  languages:  {}", report.languages);
            println!("  details:    {}", report.details);
            println!("  products:   {}", report.products);
            println!(
                "  skus:       {} ({} skipped by language)",
                report.skus, report.skipped_skus
            );
            Ok(())
        }
        Err(e) => {
            record_run(&conn, run, RunStatus::Failed, 0, Some(&e))?;
            Err(e)
        }
    }
}
