use clap::Args;
use tcgwatch_core::models::sync_run::RunKind;

use super::open_store;

#[derive(Args)]
pub struct HistoryArgs {
    /// Only show runs of one pipeline (catalog, prices)
    #[arg(long)]
    kind: Option<String>,
    /// Number of records to show
    #[arg(long, default_value = "20")]
    limit: u32,
}

pub fn run(args: HistoryArgs) -> anyhow::Result<()> {
    let kind = args
        .kind
        .as_deref()
        .map(|k| k.parse::<RunKind>().map_err(|e| anyhow::anyhow!(e)))
        .transpose()?;

    let (_, conn) = open_store()?;
    let runs = tcgwatch_db::ops::list_sync_runs(&conn, kind, args.limit)?;

    if runs.is_empty() {
        println!("No run history found.");
        return Ok(());
    }

    println!(
        "{:<20} {:<8} {:<8} {:>8} {:>9} {}",
        "STARTED", "KIND", "STATUS", "ROWS", "DURATION", "ERRORS"
    );
    for run in &runs {
        let errors_str = match run.errors.first() {
            None => "-".to_string(),
            Some(first) => first.clone(),
        };
        let secs = (run.finished_at - run.started_at).num_milliseconds() as f64 / 1000.0;
        println!(
            "{:<20} {:<8} {:<8} {:>8} {:>8.1}s {}",
            run.started_at.format("%Y-%m-%d %H:%M:%S"),
            run.kind.to_string(),
            run.status.to_string(),
            run.rows_written,
            secs,
            errors_str,
        );
    }

    Ok(())
}
