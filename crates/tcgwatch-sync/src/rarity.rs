use std::collections::HashMap;

use anyhow::Context;
use rusqlite::Connection;

use tcgwatch_core::error::WatchError;
use tcgwatch_core::models::catalog::Rarity;
use tcgwatch_db::ops;

/// Upstream label folded into the canonical common rarity.
const COMMON_LABEL: &str = "Common";

/// Which rule picked a product's rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RarityMatch {
    /// The product has no rarity label; fallback used.
    Missing,
    /// Bare "Common", mapped to the canonical common row.
    CommonAlias,
    Exact,
    /// The label matched no stored rarity; fallback used.
    Fallback,
}

/// Maps free-text rarity labels to local rarity ids.
#[derive(Debug, Clone)]
pub struct RarityResolver {
    by_name: HashMap<String, i64>,
    fallback_id: i64,
    common_id: i64,
}

impl RarityResolver {
    /// `rarities` should include the sentinel rows. When two rows share a
    /// name the first one wins.
    pub fn new(rarities: &[Rarity], fallback_id: i64, common_id: i64) -> Self {
        let mut by_name = HashMap::with_capacity(rarities.len());
        for rarity in rarities {
            by_name.entry(rarity.name.clone()).or_insert(rarity.id);
        }
        Self {
            by_name,
            fallback_id,
            common_id,
        }
    }

    /// Resolve a label to a rarity id. Always returns a valid id.
    pub fn resolve(&self, label: Option<&str>) -> (i64, RarityMatch) {
        match label {
            None => (self.fallback_id, RarityMatch::Missing),
            Some(COMMON_LABEL) => (self.common_id, RarityMatch::CommonAlias),
            Some(name) => match self.by_name.get(name) {
                Some(&id) => (id, RarityMatch::Exact),
                None => (self.fallback_id, RarityMatch::Fallback),
            },
        }
    }
}

/// Look up a sentinel rarity by exact name, creating it when `ensure` is set.
pub fn sentinel_rarity(conn: &Connection, name: &str, ensure: bool) -> anyhow::Result<Rarity> {
    if let Some(rarity) = ops::find_rarity_by_name(conn, name)? {
        return Ok(rarity);
    }
    if !ensure {
        return Err(WatchError::MissingSentinelRarity {
            name: name.to_string(),
        }
        .into());
    }

    let mut created = ops::insert_rarities(conn, vec![Rarity::sentinel(name)])
        .with_context(|| format!("creating sentinel rarity '{name}'"))?;
    tracing::info!(name, "created sentinel rarity");
    created
        .pop()
        .ok_or_else(|| anyhow::anyhow!("sentinel rarity '{name}' was not inserted"))
}
