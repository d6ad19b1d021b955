use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tcgwatch_core::error::WatchError;

use crate::{
    MarketplaceApi, RemoteCondition, RemoteGroup, RemoteLanguage, RemotePrinting, RemoteProduct,
    RemoteRarity, RemoteSku, RemoteSkuPrice,
};

/// A call made against [`StaticMarketplace`], in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Groups { limit: u32, offset: u32 },
    Rarities,
    Printings,
    Conditions,
    Languages,
    Products { limit: u32, offset: u32 },
    ProductSkus(i64),
    SkuPrices(Vec<i64>),
}

/// In-memory marketplace for testing. Serves fixed data and records calls.
#[derive(Default)]
pub struct StaticMarketplace {
    pub groups: Vec<RemoteGroup>,
    pub rarities: Vec<RemoteRarity>,
    pub printings: Vec<RemotePrinting>,
    pub conditions: Vec<RemoteCondition>,
    pub languages: Vec<RemoteLanguage>,
    pub products: Vec<RemoteProduct>,
    /// Served by `list_product_skus`, keyed by product remote id.
    pub product_skus: HashMap<i64, Vec<RemoteSku>>,
    /// Served by `list_sku_prices`, keyed by SKU remote id.
    pub prices: HashMap<i64, RemoteSkuPrice>,
    /// 1-based index of the price lookup that should fail.
    pub fail_price_call: Option<usize>,
    /// Fail every product page request.
    pub fail_products: bool,
    calls: Mutex<Vec<Call>>,
}

impl StaticMarketplace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// The id batches passed to `list_sku_prices`, in order.
    pub fn price_batches(&self) -> Vec<Vec<i64>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SkuPrices(ids) => Some(ids),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn page<T: Clone>(items: &[T], limit: u32, offset: u32) -> Vec<T> {
    items
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl MarketplaceApi for StaticMarketplace {
    async fn list_groups(
        &self,
        _category_id: u32,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RemoteGroup>, WatchError> {
        self.record(Call::Groups { limit, offset });
        Ok(page(&self.groups, limit, offset))
    }

    async fn list_rarities(&self, _category_id: u32) -> Result<Vec<RemoteRarity>, WatchError> {
        self.record(Call::Rarities);
        Ok(self.rarities.clone())
    }

    async fn list_printings(&self, _category_id: u32) -> Result<Vec<RemotePrinting>, WatchError> {
        self.record(Call::Printings);
        Ok(self.printings.clone())
    }

    async fn list_conditions(&self, _category_id: u32) -> Result<Vec<RemoteCondition>, WatchError> {
        self.record(Call::Conditions);
        Ok(self.conditions.clone())
    }

    async fn list_languages(&self, _category_id: u32) -> Result<Vec<RemoteLanguage>, WatchError> {
        self.record(Call::Languages);
        Ok(self.languages.clone())
    }

    async fn list_products(
        &self,
        _category_id: u32,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RemoteProduct>, WatchError> {
        self.record(Call::Products { limit, offset });
        if self.fail_products {
            return Err(WatchError::ApiError {
                status: 500,
                message: "products unavailable".to_string(),
            });
        }
        Ok(page(&self.products, limit, offset))
    }

    async fn list_product_skus(&self, product_remote_id: i64) -> Result<Vec<RemoteSku>, WatchError> {
        self.record(Call::ProductSkus(product_remote_id));
        Ok(self
            .product_skus
            .get(&product_remote_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_sku_prices(&self, sku_remote_ids: &[i64]) -> Result<Vec<RemoteSkuPrice>, WatchError> {
        self.record(Call::SkuPrices(sku_remote_ids.to_vec()));
        if self.fail_price_call == Some(self.price_batches().len()) {
            return Err(WatchError::ApiError {
                status: 503,
                message: "unable to get prices".to_string(),
            });
        }
        Ok(sku_remote_ids
            .iter()
            .filter_map(|id| self.prices.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_by_offset() {
        let api = StaticMarketplace {
            groups: (1..=5)
                .map(|i| RemoteGroup {
                    remote_id: i,
                    name: format!("Set {i}"),
                })
                .collect(),
            ..StaticMarketplace::default()
        };

        let second = api.list_groups(2, 2, 2).await.unwrap();
        assert_eq!(
            second.iter().map(|g| g.remote_id).collect::<Vec<_>>(),
            vec![3, 4]
        );
        assert!(api.list_groups(2, 2, 6).await.unwrap().is_empty());
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fail_price_call() {
        let api = StaticMarketplace {
            fail_price_call: Some(2),
            ..StaticMarketplace::default()
        };
        assert!(api.list_sku_prices(&[1]).await.is_ok());
        assert!(api.list_sku_prices(&[2]).await.is_err());
        assert_eq!(api.price_batches(), vec![vec![1], vec![2]]);
    }
}
