//! Catalog sync and price ingest pipelines.
//!
//! Both pipelines read from a [`tcgwatch_api::MarketplaceApi`] and write
//! through [`tcgwatch_db::ops`] on a single connection. Every call is awaited
//! in order; nothing runs concurrently.

pub mod catalog;
pub mod details;
pub mod pagination;
pub mod prices;
pub mod products;
pub mod rarity;
pub mod reference;
pub mod reset;
pub mod skus;

#[cfg(test)]
pub(crate) mod testutil;

pub use catalog::{sync_catalog, CatalogReport};
pub use prices::{ingest_prices, IngestReport};
pub use reset::ResetDecision;
