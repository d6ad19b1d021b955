use serde::{Deserialize, Serialize};

/// Base card name shared by every product printed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub id: i64,
    pub name: String,
}

impl Detail {
    pub fn new(name: String) -> Self {
        Self { id: 0, name }
    }
}

/// A catalog product, linked to its detail, group and resolved rarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub remote_id: i64,
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub detail_id: i64,
    /// `None` when the upstream group id did not match a stored group.
    pub group_id: Option<i64>,
    pub rarity_id: i64,
}

/// One purchasable variant of a product (printing x condition x language).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub id: i64,
    pub remote_id: i64,
    pub product_id: Option<i64>,
    pub printing_id: Option<i64>,
    pub condition_id: Option<i64>,
    pub language_id: i64,
}

/// Local and remote id of a stored SKU, as needed by the price pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkuKey {
    pub id: i64,
    pub remote_id: i64,
}
