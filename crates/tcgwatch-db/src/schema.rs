/// SQL statements for creating the tcgwatch database schema.

pub const CREATE_SCHEMA_VERSION: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL
)";

pub const CREATE_GROUPS: &str = "
CREATE TABLE IF NOT EXISTS card_groups (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    tcgplayer_id    INTEGER NOT NULL
)";

pub const CREATE_RARITIES: &str = "
CREATE TABLE IF NOT EXISTS rarities (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    tcgplayer_id    INTEGER
)";

pub const CREATE_PRINTINGS: &str = "
CREATE TABLE IF NOT EXISTS printings (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    tcgplayer_id    INTEGER NOT NULL
)";

pub const CREATE_CONDITIONS: &str = "
CREATE TABLE IF NOT EXISTS conditions (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    abbreviation    TEXT NOT NULL,
    tcgplayer_id    INTEGER NOT NULL
)";

pub const CREATE_LANGUAGES: &str = "
CREATE TABLE IF NOT EXISTS languages (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    abbreviation    TEXT NOT NULL,
    tcgplayer_id    INTEGER NOT NULL
)";

pub const CREATE_DETAILS: &str = "
CREATE TABLE IF NOT EXISTS details (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL UNIQUE
)";

pub const CREATE_PRODUCTS: &str = "
CREATE TABLE IF NOT EXISTS products (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    tcgplayer_id    INTEGER NOT NULL,
    name            TEXT NOT NULL,
    tcgplayer_url   TEXT NOT NULL,
    image_url       TEXT NOT NULL,
    detail_id       INTEGER NOT NULL,
    group_id        INTEGER,
    rarity_id       INTEGER NOT NULL,
    FOREIGN KEY (detail_id) REFERENCES details(id) ON DELETE CASCADE,
    FOREIGN KEY (group_id) REFERENCES card_groups(id) ON DELETE CASCADE,
    FOREIGN KEY (rarity_id) REFERENCES rarities(id) ON DELETE CASCADE
)";

pub const CREATE_SKUS: &str = "
CREATE TABLE IF NOT EXISTS skus (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    tcgplayer_id    INTEGER NOT NULL,
    product_id      INTEGER,
    printing_id     INTEGER,
    condition_id    INTEGER,
    language_id     INTEGER NOT NULL,
    FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE,
    FOREIGN KEY (printing_id) REFERENCES printings(id) ON DELETE CASCADE,
    FOREIGN KEY (condition_id) REFERENCES conditions(id) ON DELETE CASCADE,
    FOREIGN KEY (language_id) REFERENCES languages(id) ON DELETE CASCADE
)";

pub const CREATE_SKU_PRICES: &str = "
CREATE TABLE IF NOT EXISTS sku_prices (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    tcgplayer_id    INTEGER NOT NULL,
    price           REAL NOT NULL,
    shipping        REAL NOT NULL,
    ingested_at     TEXT NOT NULL
)";

pub const CREATE_SYNC_RUNS: &str = "
CREATE TABLE IF NOT EXISTS sync_runs (
    id              TEXT PRIMARY KEY,
    kind            TEXT NOT NULL,
    status          TEXT NOT NULL,
    rows_written    INTEGER NOT NULL DEFAULT 0,
    errors          TEXT NOT NULL DEFAULT '[]',
    started_at      TEXT NOT NULL,
    finished_at     TEXT NOT NULL
)";

pub const CREATE_INDEXES: &str = "
CREATE INDEX IF NOT EXISTS idx_card_groups_tcgplayer_id ON card_groups(tcgplayer_id);
CREATE INDEX IF NOT EXISTS idx_rarities_name ON rarities(name);
CREATE INDEX IF NOT EXISTS idx_products_detail_id ON products(detail_id);
CREATE INDEX IF NOT EXISTS idx_skus_product_id ON skus(product_id);
CREATE INDEX IF NOT EXISTS idx_sku_prices_tcgplayer_id ON sku_prices(tcgplayer_id, ingested_at);
";

/// All table creation statements in order.
pub const ALL_TABLES: &[&str] = &[
    CREATE_SCHEMA_VERSION,
    CREATE_GROUPS,
    CREATE_RARITIES,
    CREATE_PRINTINGS,
    CREATE_CONDITIONS,
    CREATE_LANGUAGES,
    CREATE_DETAILS,
    CREATE_PRODUCTS,
    CREATE_SKUS,
    CREATE_SKU_PRICES,
    CREATE_SYNC_RUNS,
];
