use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One price observation for a SKU, keyed by the SKU's marketplace id so the
/// history outlives catalog rebuilds. Rows are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuPrice {
    pub sku_remote_id: i64,
    pub price: f32,
    pub shipping: f32,
    pub ingested_at: DateTime<Utc>,
}
