use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::WatchError;
use crate::models::catalog::{COMMON_RARITY_NAME, ENGLISH_REMOTE_ID, FALLBACK_RARITY_NAME};

/// Yu-Gi-Oh! on the marketplace.
pub const DEFAULT_CATEGORY_ID: u32 = 2;

/// Top-level configuration, stored at `~/.tcgwatch/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub prices: PriceConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file. Defaults to `~/.tcgwatch/tcgwatch.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: url::Url,

    /// Version segment prepended to every catalog/pricing path.
    #[serde(default = "default_api_version")]
    pub version: String,

    #[serde(default)]
    pub public_key: String,

    /// Private key. When absent it is read from the OS keychain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

fn default_base_url() -> url::Url {
    url::Url::parse("https://api.tcgplayer.com").expect("static url is valid")
}

fn default_api_version() -> String {
    "v1.39.0".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            version: default_api_version(),
            public_key: String::new(),
            private_key: None,
        }
    }
}

/// When an existing catalog is truncated and rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetTrigger {
    /// Rebuild when any stored remote group id also appears upstream.
    StoredGroupPresent,
    /// Rebuild when the stored and upstream group id sets differ.
    GroupSetChanged,
}

impl std::fmt::Display for ResetTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetTrigger::StoredGroupPresent => write!(f, "stored_group_present"),
            ResetTrigger::GroupSetChanged => write!(f, "group_set_changed"),
        }
    }
}

impl std::str::FromStr for ResetTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stored_group_present" | "stored-group-present" => Ok(ResetTrigger::StoredGroupPresent),
            "group_set_changed" | "group-set-changed" => Ok(ResetTrigger::GroupSetChanged),
            _ => Err(format!("unknown reset trigger: {s}")),
        }
    }
}

/// Settings for the catalog ("immutable data") sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_category_id")]
    pub category_id: u32,

    /// Items requested per page for groups and products.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pause between product pages.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    #[serde(default = "default_detail_batch_size")]
    pub detail_batch_size: usize,

    #[serde(default = "default_product_batch_size")]
    pub product_batch_size: usize,

    #[serde(default = "default_sku_batch_size")]
    pub sku_batch_size: usize,

    #[serde(default = "default_reset_trigger")]
    pub reset_trigger: ResetTrigger,

    /// Create the fallback and common rarity rows if upstream does not send them.
    #[serde(default = "default_true")]
    pub ensure_sentinel_rarities: bool,

    #[serde(default = "default_fallback_rarity")]
    pub fallback_rarity: String,

    #[serde(default = "default_common_rarity")]
    pub common_rarity: String,

    /// Only SKUs in this language are kept.
    #[serde(default = "default_language_remote_id")]
    pub language_remote_id: i64,
}

fn default_category_id() -> u32 {
    DEFAULT_CATEGORY_ID
}

fn default_page_size() -> u32 {
    100
}

fn default_page_delay_ms() -> u64 {
    200
}

fn default_detail_batch_size() -> usize {
    1000
}

fn default_product_batch_size() -> usize {
    1000
}

fn default_sku_batch_size() -> usize {
    3000
}

fn default_reset_trigger() -> ResetTrigger {
    ResetTrigger::GroupSetChanged
}

fn default_true() -> bool {
    true
}

fn default_fallback_rarity() -> String {
    FALLBACK_RARITY_NAME.to_string()
}

fn default_common_rarity() -> String {
    COMMON_RARITY_NAME.to_string()
}

fn default_language_remote_id() -> i64 {
    ENGLISH_REMOTE_ID
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            category_id: default_category_id(),
            page_size: default_page_size(),
            page_delay_ms: default_page_delay_ms(),
            detail_batch_size: default_detail_batch_size(),
            product_batch_size: default_product_batch_size(),
            sku_batch_size: default_sku_batch_size(),
            reset_trigger: default_reset_trigger(),
            ensure_sentinel_rarities: true,
            fallback_rarity: default_fallback_rarity(),
            common_rarity: default_common_rarity(),
            language_remote_id: default_language_remote_id(),
        }
    }
}

impl CatalogConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

/// Settings for the recurring price ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    /// SKU ids per price lookup.
    #[serde(default = "default_price_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

fn default_price_batch_size() -> usize {
    100
}

fn default_batch_delay_ms() -> u64 {
    100
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            batch_size: default_price_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
        }
    }
}

impl PriceConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl WatchConfig {
    /// Returns the tcgwatch home directory (`~/.tcgwatch/`).
    pub fn home_dir() -> Result<PathBuf, WatchError> {
        let base = dirs::home_dir().ok_or_else(|| WatchError::Config {
            message: "could not determine home directory".into(),
        })?;
        Ok(base.join(".tcgwatch"))
    }

    /// Returns the path to the config file.
    pub fn config_path() -> Result<PathBuf, WatchError> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Returns the configured database path, or the default one under the home dir.
    pub fn db_path(&self) -> Result<PathBuf, WatchError> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::home_dir()?.join("tcgwatch.db")),
        }
    }

    /// Load config from the default location, or return defaults if not found.
    pub fn load() -> Result<Self, WatchError> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, WatchError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| WatchError::Serialization(e.to_string()))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), WatchError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| WatchError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Initialize the home directory with a default config.
    pub fn init() -> Result<PathBuf, WatchError> {
        let home = Self::home_dir()?;
        std::fs::create_dir_all(&home)?;

        let config_path = Self::config_path()?;
        if !config_path.exists() {
            Self::default().save_to(&config_path)?;
        }

        Ok(home)
    }

    /// Reject settings that would make a pipeline loop or write nothing.
    pub fn validate(&self) -> Result<(), WatchError> {
        let zero = [
            ("catalog.page_size", self.catalog.page_size as usize),
            ("catalog.detail_batch_size", self.catalog.detail_batch_size),
            ("catalog.product_batch_size", self.catalog.product_batch_size),
            ("catalog.sku_batch_size", self.catalog.sku_batch_size),
            ("prices.batch_size", self.prices.batch_size),
        ]
        .into_iter()
        .find(|(_, v)| *v == 0);

        if let Some((name, _)) = zero {
            return Err(WatchError::Config {
                message: format!("{name} must be greater than zero"),
            });
        }
        Ok(())
    }
}
