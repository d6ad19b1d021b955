use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;

use tcgwatch_api::{
    MarketplaceApi, RemoteCondition, RemoteGroup, RemoteLanguage, RemotePrinting, RemoteProduct,
    RemoteRarity,
};
use tcgwatch_core::config::CatalogConfig;
use tcgwatch_db::ops;

use crate::pagination::fetch_all_pages;
use crate::products::sync_products;
use crate::reference;
use crate::reset::{decide_reset, ResetDecision};
use crate::skus::sync_skus;

/// Rows written by one catalog sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogReport {
    pub decision: ResetDecision,
    pub groups: usize,
    pub rarities: usize,
    pub printings: usize,
    pub conditions: usize,
    pub languages: usize,
    pub details: usize,
    pub products: usize,
    pub skus: usize,
    /// SKUs dropped by the language filter.
    pub skipped_skus: usize,
}

impl CatalogReport {
    fn skipped() -> Self {
        Self {
            decision: ResetDecision::Skip,
            groups: 0,
            rarities: 0,
            printings: 0,
            conditions: 0,
            languages: 0,
            details: 0,
            products: 0,
            skus: 0,
            skipped_skus: 0,
        }
    }

    pub fn rows_written(&self) -> u64 {
        [
            self.groups,
            self.rarities,
            self.printings,
            self.conditions,
            self.languages,
            self.details,
            self.products,
            self.skus,
        ]
        .iter()
        .sum::<usize>() as u64
    }
}

/// Everything the catalog needs from upstream apart from groups.
struct RemoteCatalog {
    rarities: Vec<RemoteRarity>,
    printings: Vec<RemotePrinting>,
    conditions: Vec<RemoteCondition>,
    languages: Vec<RemoteLanguage>,
    products: Vec<RemoteProduct>,
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn fetch_remote(api: &dyn MarketplaceApi, cfg: &CatalogConfig) -> anyhow::Result<RemoteCatalog> {
    let category = cfg.category_id;
    let rarities = api.list_rarities(category).await.context("fetching rarities")?;
    let printings = api.list_printings(category).await.context("fetching printings")?;
    let conditions = api.list_conditions(category).await.context("fetching conditions")?;
    let languages = api.list_languages(category).await.context("fetching languages")?;

    let pb = spinner();
    let progress = &pb;
    let fetched = fetch_all_pages(cfg.page_size, cfg.page_delay(), move |offset, limit| {
        progress.set_message(format!("fetching products from offset {offset}"));
        api.list_products(category, limit, offset)
    })
    .await;
    let mut products = match fetched {
        Ok(products) => products,
        Err(e) => {
            pb.abandon_with_message("product fetch failed");
            return Err(e).context("fetching products");
        }
    };
    pb.finish_with_message(format!("fetched {} products", products.len()));

    let delay = cfg.page_delay();
    for (index, product) in products.iter_mut().filter(|p| p.skus.is_empty()).enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        product.skus = api
            .list_product_skus(product.remote_id)
            .await
            .with_context(|| format!("fetching skus of product {}", product.remote_id))?;
    }

    Ok(RemoteCatalog {
        rarities,
        printings,
        conditions,
        languages,
        products,
    })
}

/// Run the catalog sync.
///
/// Fetches all upstream data first, then writes (and truncates, on rebuild)
/// in one transaction. A failure leaves the stored catalog as it was.
pub async fn sync_catalog(
    conn: &mut Connection,
    api: &dyn MarketplaceApi,
    cfg: &CatalogConfig,
    force: bool,
) -> anyhow::Result<CatalogReport> {
    let category = cfg.category_id;
    let remote_groups: Vec<RemoteGroup> =
        fetch_all_pages(cfg.page_size, Duration::ZERO, move |offset, limit| {
            api.list_groups(category, limit, offset)
        })
        .await
        .context("fetching groups")?;

    let stored = ops::list_group_remote_ids(conn).context("loading stored groups")?;
    let decision = decide_reset(&stored, &remote_groups, cfg.reset_trigger, force);
    tracing::info!(
        %decision,
        stored = stored.len(),
        remote = remote_groups.len(),
        trigger = %cfg.reset_trigger,
        force,
        "catalog reset decision"
    );
    if decision == ResetDecision::Skip {
        tracing::info!("catalog already current");
        return Ok(CatalogReport::skipped());
    }

    let remote = fetch_remote(api, cfg).await?;

    let tx = conn.transaction()?;
    if decision == ResetDecision::Rebuild {
        ops::truncate_catalog(&tx).context("truncating catalog")?;
    }

    let groups = reference::sync_groups(&tx, &remote_groups).context("syncing groups")?;
    let rarities = reference::sync_rarities(&tx, &remote.rarities).context("syncing rarities")?;
    let printings =
        reference::sync_printings(&tx, &remote.printings).context("syncing printings")?;
    let conditions =
        reference::sync_conditions(&tx, &remote.conditions).context("syncing conditions")?;
    let languages =
        reference::sync_languages(&tx, &remote.languages).context("syncing languages")?;

    let products =
        sync_products(&tx, &remote.products, &groups, cfg).context("syncing products")?;
    let skus = sync_skus(
        &tx,
        &remote.products,
        &products.products,
        &printings,
        &conditions,
        &languages,
        cfg,
    )
    .context("syncing skus")?;

    tx.commit().context("committing catalog")?;

    let report = CatalogReport {
        decision,
        groups: groups.len(),
        rarities: rarities.len(),
        printings: printings.len(),
        conditions: conditions.len(),
        languages: languages.len(),
        details: products.details.len(),
        products: products.products.len(),
        skus: skus.skus.len(),
        skipped_skus: skus.skipped_language,
    };
    tracing::info!(rows = report.rows_written(), "catalog sync complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prices::ingest_prices;
    use crate::testutil::{marketplace, product, sku};
    use tcgwatch_api::memory::Call;
    use tcgwatch_api::RemoteSkuPrice;
    use tcgwatch_core::config::PriceConfig;
    use tcgwatch_db::open_memory_db;

    fn no_delay() -> CatalogConfig {
        CatalogConfig {
            page_delay_ms: 0,
            ..CatalogConfig::default()
        }
    }

    #[tokio::test]
    async fn test_end_to_end_single_card() {
        let mut conn = open_memory_db().unwrap();
        let api = marketplace();

        let report = sync_catalog(&mut conn, &api, &no_delay(), false).await.unwrap();
        assert_eq!(report.decision, ResetDecision::FreshSync);
        assert_eq!(report.details, 1);
        assert_eq!(report.products, 1);
        assert_eq!(report.skus, 1);
        assert_eq!(report.skipped_skus, 1);

        let common = ops::find_rarity_by_name(&conn, "Common / Short Print")
            .unwrap()
            .unwrap();
        let stored_product = &ops::list_products(&conn).unwrap()[0];
        assert_eq!(stored_product.rarity_id, common.id);
        assert_eq!(stored_product.group_id, Some(ops::list_groups(&conn).unwrap()[0].id));

        let english = ops::list_languages(&conn)
            .unwrap()
            .into_iter()
            .find(|l| l.remote_id == 1)
            .unwrap();
        let stored_sku = &ops::list_skus(&conn).unwrap()[0];
        assert_eq!(stored_sku.remote_id, 500);
        assert_eq!(stored_sku.language_id, english.id);
        assert_eq!(stored_sku.product_id, Some(stored_product.id));
    }

    #[tokio::test]
    async fn test_unchanged_groups_skip() {
        let mut conn = open_memory_db().unwrap();
        let api = marketplace();
        sync_catalog(&mut conn, &api, &no_delay(), false).await.unwrap();
        let before = ops::catalog_counts(&conn).unwrap();

        let report = sync_catalog(&mut conn, &api, &no_delay(), false).await.unwrap();
        assert_eq!(report.decision, ResetDecision::Skip);
        assert_eq!(report.rows_written(), 0);
        assert_eq!(ops::catalog_counts(&conn).unwrap(), before);
    }

    #[tokio::test]
    async fn test_new_group_rebuilds_with_fresh_ids() {
        let mut conn = open_memory_db().unwrap();
        let mut api = marketplace();
        sync_catalog(&mut conn, &api, &no_delay(), false).await.unwrap();
        let old_product = ops::list_products(&conn).unwrap().remove(0);

        api.groups.push(RemoteGroup {
            remote_id: 11,
            name: "Metal Raiders".into(),
        });
        let report = sync_catalog(&mut conn, &api, &no_delay(), false).await.unwrap();

        assert_eq!(report.decision, ResetDecision::Rebuild);
        let counts = ops::catalog_counts(&conn).unwrap();
        assert_eq!(counts.groups, 2);
        assert_eq!(counts.products, 1);
        assert_eq!(counts.details, 1);
        assert!(ops::list_products(&conn).unwrap()[0].id > old_product.id);
    }

    #[tokio::test]
    async fn test_rebuild_keeps_price_history() {
        let mut conn = open_memory_db().unwrap();
        let mut api = marketplace();
        api.prices.insert(
            500,
            RemoteSkuPrice {
                sku_remote_id: 500,
                low_price: Some(3.0),
                lowest_shipping: Some(0.99),
            },
        );
        let price_cfg = PriceConfig {
            batch_size: 100,
            batch_delay_ms: 0,
        };
        sync_catalog(&mut conn, &api, &no_delay(), false).await.unwrap();
        ingest_prices(&conn, &api, &price_cfg).await.unwrap();
        ingest_prices(&conn, &api, &price_cfg).await.unwrap();

        api.groups.push(RemoteGroup {
            remote_id: 11,
            name: "Metal Raiders".into(),
        });
        let report = sync_catalog(&mut conn, &api, &no_delay(), false).await.unwrap();

        assert_eq!(report.decision, ResetDecision::Rebuild);
        assert_eq!(ops::catalog_counts(&conn).unwrap().prices, 2);
        assert_eq!(ops::list_prices_for_sku(&conn, 500).unwrap().len(), 2);

        ingest_prices(&conn, &api, &price_cfg).await.unwrap();
        assert_eq!(ops::list_prices_for_sku(&conn, 500).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_catalog_intact() {
        let mut conn = open_memory_db().unwrap();
        let mut api = marketplace();
        sync_catalog(&mut conn, &api, &no_delay(), false).await.unwrap();
        let before = ops::catalog_counts(&conn).unwrap();

        api.fail_products = true;
        let err = sync_catalog(&mut conn, &api, &no_delay(), true).await.unwrap_err();

        assert!(format!("{err:#}").contains("fetching products"));
        assert_eq!(ops::catalog_counts(&conn).unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back() {
        let mut conn = open_memory_db().unwrap();
        let api = marketplace();
        let strict = CatalogConfig {
            ensure_sentinel_rarities: false,
            ..no_delay()
        };

        let err = sync_catalog(&mut conn, &api, &strict, false).await.unwrap_err();
        assert!(format!("{err:#}").contains("syncing products"));
        assert_eq!(
            ops::catalog_counts(&conn).unwrap(),
            ops::CatalogCounts::default()
        );
    }

    #[tokio::test]
    async fn test_products_paged_and_missing_skus_fetched() {
        let mut conn = open_memory_db().unwrap();
        let mut api = marketplace();
        api.products.push(product(101, 10, "Card Y", Some("Ultra Rare")));
        api.products.push(product(102, 10, "Card Z", None));
        api.products[2].skus = vec![sku(700, 102, 7, 1, 1)];
        api.product_skus.insert(101, vec![sku(600, 101, 7, 1, 1)]);
        let cfg = CatalogConfig {
            page_size: 2,
            ..no_delay()
        };

        let report = sync_catalog(&mut conn, &api, &cfg, false).await.unwrap();

        let product_pages: Vec<Call> = api
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Products { .. }))
            .collect();
        assert_eq!(
            product_pages,
            vec![
                Call::Products { limit: 2, offset: 0 },
                Call::Products { limit: 2, offset: 2 }
            ]
        );
        assert!(api.calls().contains(&Call::ProductSkus(101)));
        assert!(!api.calls().contains(&Call::ProductSkus(102)));
        assert_eq!(report.products, 3);
        assert_eq!(report.skus, 3);
    }

    #[tokio::test]
    async fn test_product_sku_fetches_are_throttled() {
        let mut conn = open_memory_db().unwrap();
        let mut api = marketplace();
        api.products[0].skus.clear();
        api.products.push(product(101, 10, "Card Y", None));
        api.products.push(product(102, 10, "Card Z", None));
        for id in [100, 101, 102] {
            api.product_skus.insert(id, vec![sku(id * 10, id, 7, 1, 1)]);
        }
        let cfg = CatalogConfig {
            page_delay_ms: 30,
            ..CatalogConfig::default()
        };

        let started = std::time::Instant::now();
        let report = sync_catalog(&mut conn, &api, &cfg, false).await.unwrap();

        // One product page, so both pauses come from the SKU lookups.
        assert!(started.elapsed() >= Duration::from_millis(60));
        assert_eq!(report.skus, 3);
        let sku_calls = api
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::ProductSkus(_)))
            .count();
        assert_eq!(sku_calls, 3);
    }

    #[tokio::test]
    async fn test_legacy_trigger_rebuilds_on_overlap() {
        let mut conn = open_memory_db().unwrap();
        let api = marketplace();
        let legacy = CatalogConfig {
            reset_trigger: tcgwatch_core::config::ResetTrigger::StoredGroupPresent,
            ..no_delay()
        };
        sync_catalog(&mut conn, &api, &legacy, false).await.unwrap();

        let report = sync_catalog(&mut conn, &api, &legacy, false).await.unwrap();
        assert_eq!(report.decision, ResetDecision::Rebuild);
        assert_eq!(ops::catalog_counts(&conn).unwrap().products, 1);
    }
}
