use comfy_table::{Cell, Color, Table};
use tcgwatch_core::models::sync_run::{RunKind, RunStatus};
use tcgwatch_db::ops;

use super::open_store;

pub fn run() -> anyhow::Result<()> {
    let (config, conn) = open_store()?;
    let counts = ops::catalog_counts(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["TABLE", "ROWS"]);
    for (name, rows) in [
        ("groups", counts.groups),
        ("rarities", counts.rarities),
        ("printings", counts.printings),
        ("conditions", counts.conditions),
        ("languages", counts.languages),
        ("details", counts.details),
        ("products", counts.products),
        ("skus", counts.skus),
        ("sku_prices", counts.prices),
    ] {
        let color = if rows == 0 { Color::Yellow } else { Color::White };
        table.add_row(vec![Cell::new(name), Cell::new(rows.to_string()).fg(color)]);
    }

    println!("Database: {}", config.db_path()?.display());
    println!("Category: {}", config.catalog.category_id);
    println!("{table}");

    match ops::latest_price_at(&conn)? {
        Some(at) => println!("Latest price snapshot: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Latest price snapshot: never"),
    }

    for kind in [RunKind::Catalog, RunKind::Prices] {
        let last = ops::list_sync_runs(&conn, Some(kind), 1)?;
        match last.first() {
            Some(run) => {
                let marker = if run.status == RunStatus::Failed { " (!)" } else { "" };
                println!(
                    "Last {kind} run: {} at {}{marker}",
                    run.status,
                    run.started_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
            None => println!("Last {kind} run: never"),
        }
    }

    Ok(())
}
