use rusqlite::Connection;

use tcgwatch_api::{
    ExtendedData, RemoteCondition, RemoteGroup, RemoteLanguage, RemotePrinting, RemoteProduct,
    RemoteRarity, RemoteSku, StaticMarketplace,
};
use tcgwatch_core::models::catalog::Language;
use tcgwatch_core::models::product::Sku;
use tcgwatch_db::ops;

pub fn product(
    remote_id: i64,
    group_remote_id: i64,
    clean_name: &str,
    rarity: Option<&str>,
) -> RemoteProduct {
    RemoteProduct {
        remote_id,
        group_remote_id,
        name: clean_name.to_string(),
        clean_name: clean_name.to_string(),
        image_url: format!("https://images.example.test/{remote_id}.jpg"),
        url: format!("https://shop.example.test/product/{remote_id}"),
        extended_data: rarity
            .map(|value| ExtendedData {
                name: "Rarity".to_string(),
                value: value.to_string(),
            })
            .into_iter()
            .collect(),
        skus: Vec::new(),
    }
}

pub fn sku(
    remote_id: i64,
    product_remote_id: i64,
    printing_remote_id: i64,
    condition_remote_id: i64,
    language_remote_id: i64,
) -> RemoteSku {
    RemoteSku {
        remote_id,
        product_remote_id,
        printing_remote_id,
        condition_remote_id,
        language_remote_id,
    }
}

/// Store bare SKUs (English, no product) with the given remote ids.
pub fn store_skus(conn: &Connection, remote_ids: impl IntoIterator<Item = i64>) -> Vec<Sku> {
    let english = ops::insert_languages(conn, vec![Language::new("English".into(), "EN".into(), 1)])
        .unwrap()
        .remove(0);
    let skus = remote_ids
        .into_iter()
        .map(|remote_id| Sku {
            id: 0,
            remote_id,
            product_id: None,
            printing_id: None,
            condition_id: None,
            language_id: english.id,
        })
        .collect();
    ops::insert_skus(conn, skus, 3000).unwrap()
}

/// One group, rarity, printing, condition and language; two languages so the
/// English filter has something to drop.
pub fn marketplace() -> StaticMarketplace {
    let mut api = StaticMarketplace::new();
    api.groups = vec![RemoteGroup {
        remote_id: 10,
        name: "Legend of Blue Eyes White Dragon".into(),
    }];
    api.rarities = vec![RemoteRarity {
        remote_id: 1,
        name: "Common".into(),
    }];
    api.printings = vec![RemotePrinting {
        remote_id: 7,
        name: "1st Edition".into(),
    }];
    api.conditions = vec![RemoteCondition {
        remote_id: 1,
        name: "Near Mint".into(),
        abbreviation: "NM".into(),
    }];
    api.languages = vec![
        RemoteLanguage {
            remote_id: 1,
            name: "English".into(),
            abbreviation: "EN".into(),
        },
        RemoteLanguage {
            remote_id: 7,
            name: "Japanese".into(),
            abbreviation: "JP".into(),
        },
    ];
    let mut card = product(100, 10, "Card X", Some("Common"));
    card.skus = vec![sku(500, 100, 7, 1, 1), sku(501, 100, 7, 1, 7)];
    api.products = vec![card];
    api
}
