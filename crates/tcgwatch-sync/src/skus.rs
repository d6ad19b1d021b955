use std::collections::HashMap;

use anyhow::Context;
use rusqlite::Connection;

use tcgwatch_api::RemoteProduct;
use tcgwatch_core::config::CatalogConfig;
use tcgwatch_core::models::catalog::{Condition, Language, Printing};
use tcgwatch_core::models::product::{Product, Sku};
use tcgwatch_db::ops;

/// Rows written by [`sync_skus`].
#[derive(Debug, Default)]
pub struct SkuSync {
    pub skus: Vec<Sku>,
    /// SKUs dropped because they are not in the target language.
    pub skipped_language: usize,
    /// Kept SKUs with at least one foreign key stored as NULL.
    pub unresolved: usize,
}

/// Remote id to local id, first row wins.
fn id_map<T>(rows: &[T], key: impl Fn(&T) -> (i64, i64)) -> HashMap<i64, i64> {
    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        let (remote_id, id) = key(row);
        map.entry(remote_id).or_insert(id);
    }
    map
}

/// Persist the SKUs nested under `remote`, keeping only the target language.
///
/// Each SKU is filtered on its own. Unresolved product, printing or
/// condition references are stored as NULL.
pub fn sync_skus(
    conn: &Connection,
    remote: &[RemoteProduct],
    products: &[Product],
    printings: &[Printing],
    conditions: &[Condition],
    languages: &[Language],
    cfg: &CatalogConfig,
) -> anyhow::Result<SkuSync> {
    let product_ids = id_map(products, |p| (p.remote_id, p.id));
    let printing_ids = id_map(printings, |p| (p.remote_id, p.id));
    let condition_ids = id_map(conditions, |c| (c.remote_id, c.id));
    let language_ids = id_map(languages, |l| (l.remote_id, l.id));

    let mut sync = SkuSync::default();
    let mut rows = Vec::new();
    for sku in remote.iter().flat_map(|p| &p.skus) {
        let language_id = match language_ids.get(&sku.language_remote_id) {
            Some(&id) if sku.language_remote_id == cfg.language_remote_id => id,
            _ => {
                sync.skipped_language += 1;
                continue;
            }
        };

        let product_id = product_ids.get(&sku.product_remote_id).copied();
        let printing_id = printing_ids.get(&sku.printing_remote_id).copied();
        let condition_id = condition_ids.get(&sku.condition_remote_id).copied();
        if product_id.is_none() || printing_id.is_none() || condition_id.is_none() {
            sync.unresolved += 1;
            tracing::warn!(
                sku = sku.remote_id,
                product = ?product_id,
                printing = ?printing_id,
                condition = ?condition_id,
                "unresolved SKU reference stored as NULL"
            );
        }

        rows.push(Sku {
            id: 0,
            remote_id: sku.remote_id,
            product_id,
            printing_id,
            condition_id,
            language_id,
        });
    }

    sync.skus = ops::insert_skus(conn, rows, cfg.sku_batch_size).context("inserting skus")?;
    tracing::info!(
        skus = sync.skus.len(),
        skipped_language = sync.skipped_language,
        unresolved = sync.unresolved,
        "synced skus"
    );
    Ok(sync)
}
