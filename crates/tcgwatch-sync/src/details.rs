use std::collections::HashSet;

use anyhow::Context;
use rusqlite::Connection;

use tcgwatch_api::RemoteProduct;
use tcgwatch_core::models::product::Detail;
use tcgwatch_db::ops;

/// Distinct clean names of `products`, in first-seen order. Case-sensitive.
pub fn distinct_detail_names(products: &[RemoteProduct]) -> Vec<String> {
    let mut seen = HashSet::new();
    products
        .iter()
        .filter(|p| seen.insert(p.clean_name.as_str()))
        .map(|p| p.clean_name.clone())
        .collect()
}

/// Persist one detail per distinct clean name.
pub fn sync_details(
    conn: &Connection,
    products: &[RemoteProduct],
    batch_size: usize,
) -> anyhow::Result<Vec<Detail>> {
    let details = distinct_detail_names(products)
        .into_iter()
        .map(Detail::new)
        .collect();
    let created = ops::insert_details(conn, details, batch_size).context("inserting details")?;
    tracing::info!(
        products = products.len(),
        details = created.len(),
        "synced details"
    );
    Ok(created)
}
