use std::collections::HashSet;

use anyhow::Context;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;

use tcgwatch_api::MarketplaceApi;
use tcgwatch_core::config::PriceConfig;
use tcgwatch_core::error::WatchError;
use tcgwatch_core::models::price::SkuPrice;
use tcgwatch_db::ops;

/// Summary of one price ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub batches: usize,
    /// SKU ids sent upstream.
    pub requested: usize,
    pub inserted: usize,
    /// Price records for SKU ids that are not stored locally.
    pub unknown: usize,
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::with_template("{spinner:.green} [{bar:30}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    pb.set_style(style);
    pb
}

/// Fetch current prices for every stored SKU and append one snapshot row each.
///
/// Rows are keyed by the SKU's marketplace id, so earlier snapshots stay
/// readable after a catalog rebuild assigns new local ids.
///
/// SKUs are looked up `cfg.batch_size` at a time with `cfg.batch_delay()`
/// between lookups. Each batch is committed as soon as it is written, so a
/// failing batch leaves the earlier ones in place.
pub async fn ingest_prices(
    conn: &Connection,
    api: &dyn MarketplaceApi,
    cfg: &PriceConfig,
) -> anyhow::Result<IngestReport> {
    if cfg.batch_size == 0 {
        return Err(WatchError::Config {
            message: "prices.batch_size must be greater than zero".into(),
        }
        .into());
    }

    let keys = ops::list_sku_keys(conn).context("loading stored skus")?;
    let remote_ids: Vec<i64> = keys.iter().map(|k| k.remote_id).collect();
    let stored: HashSet<i64> = remote_ids.iter().copied().collect();
    let total = remote_ids.len().div_ceil(cfg.batch_size);
    tracing::info!(skus = remote_ids.len(), batches = total, "ingesting prices");

    let pb = progress_bar(total as u64);
    let mut report = IngestReport::default();
    for (index, batch) in remote_ids.chunks(cfg.batch_size).enumerate() {
        if index > 0 && !cfg.batch_delay().is_zero() {
            tokio::time::sleep(cfg.batch_delay()).await;
        }

        let step = format!("fetching price batch {}/{total}", index + 1);
        pb.set_message(step.clone());
        let prices = match api.list_sku_prices(batch).await.context(step) {
            Ok(prices) => prices,
            Err(e) => {
                pb.abandon_with_message(format!("failed at batch {}/{total}", index + 1));
                return Err(e);
            }
        };

        let ingested_at = Utc::now();
        let mut rows = Vec::with_capacity(prices.len());
        for price in prices {
            if !stored.contains(&price.sku_remote_id) {
                report.unknown += 1;
                tracing::warn!(sku = price.sku_remote_id, "price for unknown SKU skipped");
                continue;
            }
            rows.push(SkuPrice {
                sku_remote_id: price.sku_remote_id,
                price: price.low_price.unwrap_or_default() as f32,
                shipping: price.lowest_shipping.unwrap_or_default() as f32,
                ingested_at,
            });
        }

        let inserted = ops::insert_sku_prices(conn, &rows)
            .with_context(|| format!("writing price batch {}/{total}", index + 1))?;
        report.batches += 1;
        report.requested += batch.len();
        report.inserted += inserted;
        tracing::debug!(batch = index + 1, requested = batch.len(), inserted, "price batch done");
        pb.inc(1);
    }

    pb.finish_with_message("done");
    tracing::info!(
        batches = report.batches,
        inserted = report.inserted,
        unknown = report.unknown,
        "price ingest complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::store_skus;
    use tcgwatch_api::{RemoteSkuPrice, StaticMarketplace};
    use tcgwatch_db::open_memory_db;

    fn no_delay(batch_size: usize) -> PriceConfig {
        PriceConfig {
            batch_size,
            batch_delay_ms: 0,
        }
    }

    fn priced(api: &mut StaticMarketplace, remote_ids: impl IntoIterator<Item = i64>) {
        for id in remote_ids {
            api.prices.insert(
                id,
                RemoteSkuPrice {
                    sku_remote_id: id,
                    low_price: Some(1.25),
                    lowest_shipping: Some(0.99),
                },
            );
        }
    }

    #[tokio::test]
    async fn test_250_skus_in_three_batches() {
        let conn = open_memory_db().unwrap();
        store_skus(&conn, 1..=250);
        let mut api = StaticMarketplace::new();
        priced(&mut api, 1..=250);

        let report = ingest_prices(&conn, &api, &no_delay(100)).await.unwrap();

        let sizes: Vec<usize> = api.price_batches().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(
            report,
            IngestReport {
                batches: 3,
                requested: 250,
                inserted: 250,
                unknown: 0
            }
        );
        assert_eq!(ops::catalog_counts(&conn).unwrap().prices, 250);
    }

    #[tokio::test]
    async fn test_prices_keyed_by_sku_remote_id() {
        let conn = open_memory_db().unwrap();
        store_skus(&conn, [9001, 9002]);
        let mut api = StaticMarketplace::new();
        api.prices.insert(
            9002,
            RemoteSkuPrice {
                sku_remote_id: 9002,
                low_price: None,
                lowest_shipping: Some(0.5),
            },
        );

        let report = ingest_prices(&conn, &api, &no_delay(100)).await.unwrap();
        assert_eq!(report.inserted, 1);

        let history = ops::list_prices_for_sku(&conn, 9002).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sku_remote_id, 9002);
        assert_eq!(history[0].price, 0.0);
        assert_eq!(history[0].shipping, 0.5);
        assert!(ops::list_prices_for_sku(&conn, 9001).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_batch_keeps_earlier_batches() {
        let conn = open_memory_db().unwrap();
        store_skus(&conn, 1..=5);
        let mut api = StaticMarketplace::new();
        priced(&mut api, 1..=5);
        api.fail_price_call = Some(2);

        let err = ingest_prices(&conn, &api, &no_delay(2)).await.unwrap_err();

        assert!(err.to_string().contains("fetching price batch 2/3"));
        assert_eq!(api.price_batches().len(), 2);
        assert_eq!(ops::catalog_counts(&conn).unwrap().prices, 2);
    }

    #[tokio::test]
    async fn test_no_skus_makes_no_calls() {
        let conn = open_memory_db().unwrap();
        let api = StaticMarketplace::new();

        let report = ingest_prices(&conn, &api, &no_delay(100)).await.unwrap();
        assert_eq!(report, IngestReport::default());
        assert!(api.calls().is_empty());
    }
}
