use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use uuid::Uuid;

use tcgwatch_core::models::catalog::{Condition, Group, Language, Printing, Rarity};
use tcgwatch_core::models::price::SkuPrice;
use tcgwatch_core::models::product::{Detail, Product, Sku, SkuKey};
use tcgwatch_core::models::sync_run::{RunKind, RunStatus, SyncRun};

/// Upper bound on bound parameters in one statement (SQLite >= 3.32).
const MAX_VARIABLES: usize = 32_766;

/// Batch size for writes that should go out in as few statements as possible.
pub const UNBOUNDED_BATCH: usize = usize::MAX;

// ── Helpers ──

fn parse_dt(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn fmt_dt(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Run `f` inside a savepoint: everything it wrote is kept or nothing is.
///
/// Works both at top level (where the savepoint is its own transaction) and
/// nested inside a caller's transaction.
pub fn with_savepoint<T>(
    conn: &Connection,
    name: &str,
    f: impl FnOnce(&Connection) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    conn.execute_batch(&format!("SAVEPOINT {name}"))?;
    match f(conn) {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE {name}"))?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = conn.execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name}")) {
                tracing::error!(savepoint = name, error = %rollback, "rollback failed");
            }
            Err(e)
        }
    }
}

/// Insert `rows` with multi-row `INSERT` statements of at most `batch_size`
/// rows each, all inside one savepoint. Returns the assigned ids in input order.
///
/// Ids within one statement are consecutive: tables use AUTOINCREMENT and the
/// connection is the only writer.
fn bulk_insert<T>(
    conn: &Connection,
    table: &str,
    columns: &[&str],
    rows: &[T],
    batch_size: usize,
    bind: impl Fn(&T) -> Vec<Value>,
) -> anyhow::Result<Vec<i64>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let batch_size = batch_size.clamp(1, MAX_VARIABLES / columns.len());
    let row_placeholder = format!("({})", vec!["?"; columns.len()].join(", "));

    with_savepoint(conn, "bulk_insert", |conn| {
        let mut ids = Vec::with_capacity(rows.len());
        for chunk in rows.chunks(batch_size) {
            let sql = format!(
                "INSERT INTO {table} ({}) VALUES {}",
                columns.join(", "),
                vec![row_placeholder.as_str(); chunk.len()].join(", ")
            );
            let values: Vec<Value> = chunk.iter().flat_map(&bind).collect();
            let inserted = conn.execute(&sql, params_from_iter(values))?;
            anyhow::ensure!(
                inserted == chunk.len(),
                "{table}: expected {} rows inserted, got {inserted}",
                chunk.len()
            );

            let last = conn.last_insert_rowid();
            ids.extend(last - chunk.len() as i64 + 1..=last);
            tracing::debug!(table, rows = chunk.len(), total = ids.len(), "inserted batch");
        }
        Ok(ids)
    })
}

fn count(conn: &Connection, table: &str) -> anyhow::Result<u64> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(n as u64)
}

// ── Reference tables ──

pub fn insert_groups(conn: &Connection, mut groups: Vec<Group>) -> anyhow::Result<Vec<Group>> {
    let ids = bulk_insert(
        conn,
        "card_groups",
        &["name", "tcgplayer_id"],
        &groups,
        UNBOUNDED_BATCH,
        |g| vec![g.name.clone().into(), g.remote_id.into()],
    )?;
    for (group, id) in groups.iter_mut().zip(ids) {
        group.id = id;
    }
    Ok(groups)
}

pub fn list_groups(conn: &Connection) -> anyhow::Result<Vec<Group>> {
    let mut stmt = conn.prepare("SELECT id, name, tcgplayer_id FROM card_groups ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Group {
            id: row.get(0)?,
            name: row.get(1)?,
            remote_id: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Remote ids of every stored group.
pub fn list_group_remote_ids(conn: &Connection) -> anyhow::Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT tcgplayer_id FROM card_groups")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_rarities(conn: &Connection, mut rarities: Vec<Rarity>) -> anyhow::Result<Vec<Rarity>> {
    let ids = bulk_insert(
        conn,
        "rarities",
        &["name", "tcgplayer_id"],
        &rarities,
        UNBOUNDED_BATCH,
        |r| vec![r.name.clone().into(), r.remote_id.into()],
    )?;
    for (rarity, id) in rarities.iter_mut().zip(ids) {
        rarity.id = id;
    }
    Ok(rarities)
}

pub fn list_rarities(conn: &Connection) -> anyhow::Result<Vec<Rarity>> {
    let mut stmt = conn.prepare("SELECT id, name, tcgplayer_id FROM rarities ORDER BY id")?;
    let rows = stmt.query_map([], row_to_rarity)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// First rarity (lowest id) with exactly this name.
pub fn find_rarity_by_name(conn: &Connection, name: &str) -> anyhow::Result<Option<Rarity>> {
    let rarity = conn
        .query_row(
            "SELECT id, name, tcgplayer_id FROM rarities WHERE name = ?1 ORDER BY id LIMIT 1",
            params![name],
            row_to_rarity,
        )
        .optional()?;
    Ok(rarity)
}

fn row_to_rarity(row: &rusqlite::Row) -> rusqlite::Result<Rarity> {
    Ok(Rarity {
        id: row.get(0)?,
        name: row.get(1)?,
        remote_id: row.get(2)?,
    })
}

pub fn insert_printings(
    conn: &Connection,
    mut printings: Vec<Printing>,
) -> anyhow::Result<Vec<Printing>> {
    let ids = bulk_insert(
        conn,
        "printings",
        &["name", "tcgplayer_id"],
        &printings,
        UNBOUNDED_BATCH,
        |p| vec![p.name.clone().into(), p.remote_id.into()],
    )?;
    for (printing, id) in printings.iter_mut().zip(ids) {
        printing.id = id;
    }
    Ok(printings)
}

pub fn list_printings(conn: &Connection) -> anyhow::Result<Vec<Printing>> {
    let mut stmt = conn.prepare("SELECT id, name, tcgplayer_id FROM printings ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Printing {
            id: row.get(0)?,
            name: row.get(1)?,
            remote_id: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_conditions(
    conn: &Connection,
    mut conditions: Vec<Condition>,
) -> anyhow::Result<Vec<Condition>> {
    let ids = bulk_insert(
        conn,
        "conditions",
        &["name", "abbreviation", "tcgplayer_id"],
        &conditions,
        UNBOUNDED_BATCH,
        |c| {
            vec![
                c.name.clone().into(),
                c.abbreviation.clone().into(),
                c.remote_id.into(),
            ]
        },
    )?;
    for (condition, id) in conditions.iter_mut().zip(ids) {
        condition.id = id;
    }
    Ok(conditions)
}

pub fn list_conditions(conn: &Connection) -> anyhow::Result<Vec<Condition>> {
    let mut stmt =
        conn.prepare("SELECT id, name, abbreviation, tcgplayer_id FROM conditions ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Condition {
            id: row.get(0)?,
            name: row.get(1)?,
            abbreviation: row.get(2)?,
            remote_id: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_languages(
    conn: &Connection,
    mut languages: Vec<Language>,
) -> anyhow::Result<Vec<Language>> {
    let ids = bulk_insert(
        conn,
        "languages",
        &["name", "abbreviation", "tcgplayer_id"],
        &languages,
        UNBOUNDED_BATCH,
        |l| {
            vec![
                l.name.clone().into(),
                l.abbreviation.clone().into(),
                l.remote_id.into(),
            ]
        },
    )?;
    for (language, id) in languages.iter_mut().zip(ids) {
        language.id = id;
    }
    Ok(languages)
}

pub fn list_languages(conn: &Connection) -> anyhow::Result<Vec<Language>> {
    let mut stmt =
        conn.prepare("SELECT id, name, abbreviation, tcgplayer_id FROM languages ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Language {
            id: row.get(0)?,
            name: row.get(1)?,
            abbreviation: row.get(2)?,
            remote_id: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

// ── Details, products, SKUs ──

pub fn insert_details(
    conn: &Connection,
    mut details: Vec<Detail>,
    batch_size: usize,
) -> anyhow::Result<Vec<Detail>> {
    let ids = bulk_insert(conn, "details", &["name"], &details, batch_size, |d| {
        vec![d.name.clone().into()]
    })?;
    for (detail, id) in details.iter_mut().zip(ids) {
        detail.id = id;
    }
    Ok(details)
}

pub fn list_details(conn: &Connection) -> anyhow::Result<Vec<Detail>> {
    let mut stmt = conn.prepare("SELECT id, name FROM details ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Detail {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_products(
    conn: &Connection,
    mut products: Vec<Product>,
    batch_size: usize,
) -> anyhow::Result<Vec<Product>> {
    let ids = bulk_insert(
        conn,
        "products",
        &[
            "tcgplayer_id",
            "name",
            "tcgplayer_url",
            "image_url",
            "detail_id",
            "group_id",
            "rarity_id",
        ],
        &products,
        batch_size,
        |p| {
            vec![
                p.remote_id.into(),
                p.name.clone().into(),
                p.url.clone().into(),
                p.image_url.clone().into(),
                p.detail_id.into(),
                p.group_id.into(),
                p.rarity_id.into(),
            ]
        },
    )?;
    for (product, id) in products.iter_mut().zip(ids) {
        product.id = id;
    }
    Ok(products)
}

pub fn list_products(conn: &Connection) -> anyhow::Result<Vec<Product>> {
    let mut stmt = conn.prepare(
        "SELECT id, tcgplayer_id, name, tcgplayer_url, image_url, detail_id, group_id, rarity_id
         FROM products ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Product {
            id: row.get(0)?,
            remote_id: row.get(1)?,
            name: row.get(2)?,
            url: row.get(3)?,
            image_url: row.get(4)?,
            detail_id: row.get(5)?,
            group_id: row.get(6)?,
            rarity_id: row.get(7)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

pub fn insert_skus(conn: &Connection, mut skus: Vec<Sku>, batch_size: usize) -> anyhow::Result<Vec<Sku>> {
    let ids = bulk_insert(
        conn,
        "skus",
        &[
            "tcgplayer_id",
            "product_id",
            "printing_id",
            "condition_id",
            "language_id",
        ],
        &skus,
        batch_size,
        |s| {
            vec![
                s.remote_id.into(),
                s.product_id.into(),
                s.printing_id.into(),
                s.condition_id.into(),
                s.language_id.into(),
            ]
        },
    )?;
    for (sku, id) in skus.iter_mut().zip(ids) {
        sku.id = id;
    }
    Ok(skus)
}

pub fn list_skus(conn: &Connection) -> anyhow::Result<Vec<Sku>> {
    let mut stmt = conn.prepare(
        "SELECT id, tcgplayer_id, product_id, printing_id, condition_id, language_id
         FROM skus ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Sku {
            id: row.get(0)?,
            remote_id: row.get(1)?,
            product_id: row.get(2)?,
            printing_id: row.get(3)?,
            condition_id: row.get(4)?,
            language_id: row.get(5)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Local and remote ids of every stored SKU.
pub fn list_sku_keys(conn: &Connection) -> anyhow::Result<Vec<SkuKey>> {
    let mut stmt = conn.prepare("SELECT id, tcgplayer_id FROM skus ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(SkuKey {
            id: row.get(0)?,
            remote_id: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Empty every catalog table. Price history is left alone.
pub fn truncate_catalog(conn: &Connection) -> anyhow::Result<()> {
    with_savepoint(conn, "truncate_catalog", |conn| {
        conn.execute_batch(
            "DELETE FROM skus;
             DELETE FROM products;
             DELETE FROM details;
             DELETE FROM card_groups;
             DELETE FROM rarities;
             DELETE FROM conditions;
             DELETE FROM languages;
             DELETE FROM printings;",
        )?;
        Ok(())
    })?;
    tracing::info!("catalog truncated");
    Ok(())
}

// ── Prices ──

/// Append one batch of price rows in a single statement.
pub fn insert_sku_prices(conn: &Connection, prices: &[SkuPrice]) -> anyhow::Result<usize> {
    let ids = bulk_insert(
        conn,
        "sku_prices",
        &["tcgplayer_id", "price", "shipping", "ingested_at"],
        prices,
        UNBOUNDED_BATCH,
        |p| {
            vec![
                p.sku_remote_id.into(),
                f64::from(p.price).into(),
                f64::from(p.shipping).into(),
                fmt_dt(&p.ingested_at).into(),
            ]
        },
    )?;
    Ok(ids.len())
}

/// Price history of one SKU by marketplace id, oldest first.
pub fn list_prices_for_sku(conn: &Connection, sku_remote_id: i64) -> anyhow::Result<Vec<SkuPrice>> {
    let mut stmt = conn.prepare(
        "SELECT tcgplayer_id, price, shipping, ingested_at
         FROM sku_prices WHERE tcgplayer_id = ?1 ORDER BY ingested_at, id",
    )?;
    let rows = stmt.query_map(params![sku_remote_id], |row| {
        let price: f64 = row.get(1)?;
        let shipping: f64 = row.get(2)?;
        let ingested: String = row.get(3)?;
        Ok(SkuPrice {
            sku_remote_id: row.get(0)?,
            price: price as f32,
            shipping: shipping as f32,
            ingested_at: parse_dt(&ingested),
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Time of the most recent price snapshot, if any.
pub fn latest_price_at(conn: &Connection) -> anyhow::Result<Option<DateTime<Utc>>> {
    let latest: Option<String> =
        conn.query_row("SELECT MAX(ingested_at) FROM sku_prices", [], |row| row.get(0))?;
    Ok(latest.map(|s| parse_dt(&s)))
}

// ── Counts ──

/// Row counts of every catalog and price table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogCounts {
    pub groups: u64,
    pub rarities: u64,
    pub printings: u64,
    pub conditions: u64,
    pub languages: u64,
    pub details: u64,
    pub products: u64,
    pub skus: u64,
    pub prices: u64,
}

pub fn catalog_counts(conn: &Connection) -> anyhow::Result<CatalogCounts> {
    Ok(CatalogCounts {
        groups: count(conn, "card_groups")?,
        rarities: count(conn, "rarities")?,
        printings: count(conn, "printings")?,
        conditions: count(conn, "conditions")?,
        languages: count(conn, "languages")?,
        details: count(conn, "details")?,
        products: count(conn, "products")?,
        skus: count(conn, "skus")?,
        prices: count(conn, "sku_prices")?,
    })
}

// ── Run history ──

pub fn insert_sync_run(conn: &Connection, run: &SyncRun) -> anyhow::Result<()> {
    let errors_json = serde_json::to_string(&run.errors)?;
    conn.execute(
        "INSERT INTO sync_runs (id, kind, status, rows_written, errors, started_at, finished_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            run.id.to_string(),
            run.kind.to_string(),
            run.status.to_string(),
            run.rows_written as i64,
            errors_json,
            fmt_dt(&run.started_at),
            fmt_dt(&run.finished_at),
        ],
    )?;
    Ok(())
}

/// Most recent runs first, optionally restricted to one pipeline.
pub fn list_sync_runs(
    conn: &Connection,
    kind: Option<RunKind>,
    limit: u32,
) -> anyhow::Result<Vec<SyncRun>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, status, rows_written, errors, started_at, finished_at
         FROM sync_runs WHERE (?1 IS NULL OR kind = ?1)
         ORDER BY started_at DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![kind.map(|k| k.to_string()), limit], row_to_sync_run)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

fn row_to_sync_run(row: &rusqlite::Row) -> rusqlite::Result<SyncRun> {
    let id_str: String = row.get(0)?;
    let kind_str: String = row.get(1)?;
    let status_str: String = row.get(2)?;
    let rows_written: i64 = row.get(3)?;
    let errors_str: String = row.get(4)?;
    let started_str: String = row.get(5)?;
    let finished_str: String = row.get(6)?;

    Ok(SyncRun {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        kind: kind_str.parse().unwrap_or(RunKind::Catalog),
        status: status_str.parse().unwrap_or(RunStatus::Failed),
        rows_written: rows_written as u64,
        errors: serde_json::from_str(&errors_str).unwrap_or_default(),
        started_at: parse_dt(&started_str),
        finished_at: parse_dt(&finished_str),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::open_memory_db;

    fn seed_reference(conn: &Connection) -> (Group, Rarity, Printing, Condition, Language) {
        let group = insert_groups(conn, vec![Group::new("Set A".into(), 10)]).unwrap().remove(0);
        let rarity = insert_rarities(conn, vec![Rarity::new("Rare".into(), 20)]).unwrap().remove(0);
        let printing = insert_printings(conn, vec![Printing::new("1st Edition".into(), 30)])
            .unwrap()
            .remove(0);
        let condition =
            insert_conditions(conn, vec![Condition::new("Near Mint".into(), "NM".into(), 1)])
                .unwrap()
                .remove(0);
        let language =
            insert_languages(conn, vec![Language::new("English".into(), "EN".into(), 1)])
                .unwrap()
                .remove(0);
        (group, rarity, printing, condition, language)
    }

    #[test]
    fn test_bulk_insert_assigns_ids_in_order() {
        let conn = open_memory_db().unwrap();
        let details: Vec<Detail> = (0..25).map(|i| Detail::new(format!("card-{i}"))).collect();
        let created = insert_details(&conn, details, 10).unwrap();

        assert_eq!(created.len(), 25);
        let stored = list_details(&conn).unwrap();
        for (c, s) in created.iter().zip(&stored) {
            assert_eq!(c.id, s.id);
            assert_eq!(c.name, s.name);
        }
    }

    #[test]
    fn test_bulk_insert_is_all_or_nothing() {
        let conn = open_memory_db().unwrap();
        // Second batch violates the UNIQUE constraint on details.name.
        let details = vec![
            Detail::new("a".into()),
            Detail::new("b".into()),
            Detail::new("c".into()),
            Detail::new("a".into()),
        ];
        assert!(insert_details(&conn, details, 2).is_err());
        assert!(list_details(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_empty_insert_is_noop() {
        let conn = open_memory_db().unwrap();
        assert!(insert_groups(&conn, Vec::new()).unwrap().is_empty());
        assert_eq!(insert_sku_prices(&conn, &[]).unwrap(), 0);
    }

    #[test]
    fn test_find_rarity_by_name() {
        let conn = open_memory_db().unwrap();
        insert_rarities(
            &conn,
            vec![Rarity::new("Rare".into(), 1), Rarity::sentinel("Unconfirmed")],
        )
        .unwrap();

        let found = find_rarity_by_name(&conn, "Unconfirmed").unwrap().unwrap();
        assert_eq!(found.remote_id, None);
        assert!(find_rarity_by_name(&conn, "unconfirmed").unwrap().is_none());
    }

    #[test]
    fn test_truncate_catalog_keeps_prices_and_ids_fresh() {
        let conn = open_memory_db().unwrap();
        let (group, rarity, printing, condition, language) = seed_reference(&conn);
        let detail = insert_details(&conn, vec![Detail::new("Card".into())], 1000)
            .unwrap()
            .remove(0);
        let product = insert_products(
            &conn,
            vec![Product {
                id: 0,
                remote_id: 100,
                name: "Card".into(),
                url: "https://example.test/100".into(),
                image_url: "https://example.test/100.jpg".into(),
                detail_id: detail.id,
                group_id: Some(group.id),
                rarity_id: rarity.id,
            }],
            1000,
        )
        .unwrap()
        .remove(0);
        let sku = insert_skus(
            &conn,
            vec![Sku {
                id: 0,
                remote_id: 500,
                product_id: Some(product.id),
                printing_id: Some(printing.id),
                condition_id: Some(condition.id),
                language_id: language.id,
            }],
            3000,
        )
        .unwrap()
        .remove(0);
        insert_sku_prices(
            &conn,
            &[SkuPrice {
                sku_remote_id: sku.remote_id,
                price: 1.5,
                shipping: 0.25,
                ingested_at: Utc::now(),
            }],
        )
        .unwrap();

        truncate_catalog(&conn).unwrap();
        assert_eq!(
            catalog_counts(&conn).unwrap(),
            CatalogCounts {
                prices: 1,
                ..CatalogCounts::default()
            }
        );
        assert_eq!(list_prices_for_sku(&conn, 500).unwrap().len(), 1);

        let regrouped = insert_groups(&conn, vec![Group::new("Set A".into(), 10)]).unwrap();
        assert!(regrouped[0].id > group.id);
    }

    #[test]
    fn test_prices_roundtrip_and_latest() {
        let conn = open_memory_db().unwrap();
        let (_, _, _, _, language) = seed_reference(&conn);
        let sku = insert_skus(
            &conn,
            vec![Sku {
                id: 0,
                remote_id: 7,
                product_id: None,
                printing_id: None,
                condition_id: None,
                language_id: language.id,
            }],
            3000,
        )
        .unwrap()
        .remove(0);
        assert!(latest_price_at(&conn).unwrap().is_none());

        let at = Utc::now();
        insert_sku_prices(
            &conn,
            &[SkuPrice {
                sku_remote_id: sku.remote_id,
                price: 2.5,
                shipping: 0.5,
                ingested_at: at,
            }],
        )
        .unwrap();

        let history = list_prices_for_sku(&conn, 7).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sku_remote_id, 7);
        assert_eq!(history[0].price, 2.5);
        assert_eq!(history[0].shipping, 0.5);
        assert!(latest_price_at(&conn).unwrap().is_some());
        assert_eq!(
            list_sku_keys(&conn).unwrap(),
            vec![SkuKey { id: sku.id, remote_id: 7 }]
        );
    }

    #[test]
    fn test_sync_run_history() {
        let conn = open_memory_db().unwrap();
        let mut catalog = SyncRun::new(RunKind::Catalog);
        catalog.rows_written = 12;
        catalog.finish(RunStatus::Success);
        insert_sync_run(&conn, &catalog).unwrap();

        let mut prices = SyncRun::new(RunKind::Prices);
        prices.errors.push("fetching price batch 1/1: boom".to_string());
        prices.finish(RunStatus::Failed);
        insert_sync_run(&conn, &prices).unwrap();

        assert_eq!(list_sync_runs(&conn, None, 10).unwrap().len(), 2);
        let only_prices = list_sync_runs(&conn, Some(RunKind::Prices), 10).unwrap();
        assert_eq!(only_prices.len(), 1);
        assert_eq!(only_prices[0].status, RunStatus::Failed);
        assert_eq!(only_prices[0].errors.len(), 1);
        assert_eq!(list_sync_runs(&conn, None, 1).unwrap().len(), 1);
    }
}
