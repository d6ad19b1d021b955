pub mod memory;
pub mod tcgplayer;

use async_trait::async_trait;
use tcgwatch_core::error::WatchError;

pub use memory::StaticMarketplace;
pub use tcgplayer::TcgplayerClient;

/// A group (set) as returned by the marketplace.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteGroup {
    pub remote_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRarity {
    pub remote_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemotePrinting {
    pub remote_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCondition {
    pub remote_id: i64,
    pub name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteLanguage {
    pub remote_id: i64,
    pub name: String,
    pub abbreviation: String,
}

/// A named extended attribute attached to a product, e.g. `Rarity`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedData {
    pub name: String,
    pub value: String,
}

/// A SKU nested under a product.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSku {
    pub remote_id: i64,
    pub product_remote_id: i64,
    pub printing_remote_id: i64,
    pub condition_remote_id: i64,
    pub language_remote_id: i64,
}

/// A product as returned by the marketplace, with its SKUs and extended data.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteProduct {
    pub remote_id: i64,
    pub group_remote_id: i64,
    pub name: String,
    pub clean_name: String,
    pub image_url: String,
    pub url: String,
    pub extended_data: Vec<ExtendedData>,
    pub skus: Vec<RemoteSku>,
}

impl RemoteProduct {
    /// Value of the first extended attribute with this name.
    pub fn extended_value(&self, name: &str) -> Option<&str> {
        self.extended_data
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    /// The product's rarity label, if it carries one.
    pub fn rarity_label(&self) -> Option<&str> {
        self.extended_value("Rarity")
    }
}

/// Current price of one SKU.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSkuPrice {
    pub sku_remote_id: i64,
    pub low_price: Option<f64>,
    pub lowest_shipping: Option<f64>,
}

/// Operations the pipelines need from the marketplace.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// One page of groups in a category.
    async fn list_groups(
        &self,
        category_id: u32,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RemoteGroup>, WatchError>;

    async fn list_rarities(&self, category_id: u32) -> Result<Vec<RemoteRarity>, WatchError>;

    async fn list_printings(&self, category_id: u32) -> Result<Vec<RemotePrinting>, WatchError>;

    async fn list_conditions(&self, category_id: u32) -> Result<Vec<RemoteCondition>, WatchError>;

    async fn list_languages(&self, category_id: u32) -> Result<Vec<RemoteLanguage>, WatchError>;

    /// One page of products, with SKUs and extended data included.
    async fn list_products(
        &self,
        category_id: u32,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RemoteProduct>, WatchError>;

    /// SKUs of a single product.
    async fn list_product_skus(&self, product_remote_id: i64) -> Result<Vec<RemoteSku>, WatchError>;

    /// Current prices for a set of SKUs.
    async fn list_sku_prices(&self, sku_remote_ids: &[i64]) -> Result<Vec<RemoteSkuPrice>, WatchError>;
}
