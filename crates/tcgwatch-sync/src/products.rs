use std::collections::HashMap;

use anyhow::Context;
use rusqlite::Connection;

use tcgwatch_api::RemoteProduct;
use tcgwatch_core::config::CatalogConfig;
use tcgwatch_core::models::catalog::Group;
use tcgwatch_core::models::product::{Detail, Product};
use tcgwatch_db::ops;

use crate::details::sync_details;
use crate::rarity::{sentinel_rarity, RarityMatch, RarityResolver};

/// Rows written by [`sync_products`].
#[derive(Debug, Default)]
pub struct ProductSync {
    pub details: Vec<Detail>,
    pub products: Vec<Product>,
    /// How many products each rarity rule resolved.
    pub rarity_matches: HashMap<RarityMatch, usize>,
    /// Products whose group was not found locally.
    pub unresolved_groups: usize,
}

/// Persist details and products.
///
/// Details and both sentinel rarities are settled before the first product
/// is written. Products whose group is unknown are kept with no group.
pub fn sync_products(
    conn: &Connection,
    remote: &[RemoteProduct],
    groups: &[Group],
    cfg: &CatalogConfig,
) -> anyhow::Result<ProductSync> {
    let details = sync_details(conn, remote, cfg.detail_batch_size).context("syncing details")?;

    let fallback = sentinel_rarity(conn, &cfg.fallback_rarity, cfg.ensure_sentinel_rarities)?;
    let common = sentinel_rarity(conn, &cfg.common_rarity, cfg.ensure_sentinel_rarities)?;
    let rarities = ops::list_rarities(conn)?;
    let resolver = RarityResolver::new(&rarities, fallback.id, common.id);

    let mut group_ids: HashMap<i64, i64> = HashMap::with_capacity(groups.len());
    for group in groups {
        group_ids.entry(group.remote_id).or_insert(group.id);
    }
    let detail_ids: HashMap<&str, i64> = details.iter().map(|d| (d.name.as_str(), d.id)).collect();

    let mut sync = ProductSync::default();
    let mut rows = Vec::with_capacity(remote.len());
    for p in remote {
        let group_id = group_ids.get(&p.group_remote_id).copied();
        if group_id.is_none() {
            sync.unresolved_groups += 1;
            tracing::warn!(
                product = p.remote_id,
                group = p.group_remote_id,
                "group not found, storing product without group"
            );
        }

        let detail_id = detail_ids
            .get(p.clean_name.as_str())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no detail for product {}", p.remote_id))?;

        let (rarity_id, matched) = resolver.resolve(p.rarity_label());
        match matched {
            RarityMatch::Missing => {
                tracing::debug!(product = %p.name, "product has no rarity, using fallback")
            }
            RarityMatch::Fallback => tracing::debug!(
                product = %p.name,
                label = p.rarity_label().unwrap_or_default(),
                "unknown rarity, using fallback"
            ),
            RarityMatch::CommonAlias | RarityMatch::Exact => {}
        }
        *sync.rarity_matches.entry(matched).or_default() += 1;

        rows.push(Product {
            id: 0,
            remote_id: p.remote_id,
            name: p.name.clone(),
            url: p.url.clone(),
            image_url: p.image_url.clone(),
            detail_id,
            group_id,
            rarity_id,
        });
    }

    sync.products =
        ops::insert_products(conn, rows, cfg.product_batch_size).context("inserting products")?;
    sync.details = details;
    tracing::info!(
        products = sync.products.len(),
        unresolved_groups = sync.unresolved_groups,
        "synced products"
    );
    Ok(sync)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::product;
    use tcgwatch_api::{RemoteGroup, RemoteRarity};
    use tcgwatch_core::error::WatchError;
    use tcgwatch_db::open_memory_db;

    use crate::reference::{sync_groups, sync_rarities};

    fn setup(conn: &Connection) -> Vec<Group> {
        sync_rarities(
            conn,
            &[
                RemoteRarity {
                    remote_id: 1,
                    name: "Ultra Rare".into(),
                },
                RemoteRarity {
                    remote_id: 2,
                    name: "Common".into(),
                },
            ],
        )
        .unwrap();
        sync_groups(
            conn,
            &[RemoteGroup {
                remote_id: 10,
                name: "Set A".into(),
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_products_share_details_and_resolve_rarity() {
        let conn = open_memory_db().unwrap();
        let groups = setup(&conn);
        let remote = vec![
            product(100, 10, "Dark Magician", Some("Ultra Rare")),
            product(101, 10, "Dark Magician", Some("Common")),
            product(102, 10, "Kuriboh", None),
        ];

        let sync = sync_products(&conn, &remote, &groups, &CatalogConfig::default()).unwrap();
        assert_eq!(sync.details.len(), 2);
        assert_eq!(sync.products.len(), 3);
        assert_eq!(sync.products[0].detail_id, sync.products[1].detail_id);
        assert_ne!(sync.products[0].detail_id, sync.products[2].detail_id);

        let common = ops::find_rarity_by_name(&conn, "Common / Short Print")
            .unwrap()
            .unwrap();
        let fallback = ops::find_rarity_by_name(&conn, "Unconfirmed").unwrap().unwrap();
        assert_eq!(sync.products[1].rarity_id, common.id);
        assert_eq!(sync.products[2].rarity_id, fallback.id);
        assert_eq!(sync.rarity_matches[&RarityMatch::Exact], 1);
        assert_eq!(sync.rarity_matches[&RarityMatch::Missing], 1);
    }

    #[test]
    fn test_unknown_group_stored_as_null() {
        let conn = open_memory_db().unwrap();
        let groups = setup(&conn);
        let remote = vec![product(100, 99, "Stray Card", Some("Ultra Rare"))];

        let sync = sync_products(&conn, &remote, &groups, &CatalogConfig::default()).unwrap();
        assert_eq!(sync.unresolved_groups, 1);
        assert_eq!(ops::list_products(&conn).unwrap()[0].group_id, None);
    }

    #[test]
    fn test_missing_sentinel_fails_before_products() {
        let conn = open_memory_db().unwrap();
        let groups = setup(&conn);
        let cfg = CatalogConfig {
            ensure_sentinel_rarities: false,
            ..CatalogConfig::default()
        };

        let err = sync_products(&conn, &[product(100, 10, "Card", None)], &groups, &cfg)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WatchError>(),
            Some(WatchError::MissingSentinelRarity { .. })
        ));
        assert!(ops::list_products(&conn).unwrap().is_empty());
    }
}
