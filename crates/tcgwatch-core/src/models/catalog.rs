//! Reference tables of the catalog.
//!
//! Every row carries the locally assigned `id` (0 until persisted) and the
//! `remote_id` the marketplace uses for the same entity.

use serde::{Deserialize, Serialize};

/// Remote id of the English language on the marketplace.
pub const ENGLISH_REMOTE_ID: i64 = 1;

/// Rarity used when a product's label is missing or unknown.
pub const FALLBACK_RARITY_NAME: &str = "Unconfirmed";

/// Rarity that the bare upstream label "Common" is folded into.
pub const COMMON_RARITY_NAME: &str = "Common / Short Print";

/// A release or set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub remote_id: i64,
}

impl Group {
    pub fn new(name: String, remote_id: i64) -> Self {
        Self {
            id: 0,
            name,
            remote_id,
        }
    }
}

/// A rarity label. Sentinel rows created locally have no remote id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rarity {
    pub id: i64,
    pub name: String,
    pub remote_id: Option<i64>,
}

impl Rarity {
    pub fn new(name: String, remote_id: i64) -> Self {
        Self {
            id: 0,
            name,
            remote_id: Some(remote_id),
        }
    }

    /// A rarity row that does not come from the marketplace.
    pub fn sentinel(name: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            remote_id: None,
        }
    }
}

/// An edition or print-run variant, e.g. "1st Edition".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Printing {
    pub id: i64,
    pub name: String,
    pub remote_id: i64,
}

impl Printing {
    pub fn new(name: String, remote_id: i64) -> Self {
        Self {
            id: 0,
            name,
            remote_id,
        }
    }
}

/// Physical grading category, e.g. "Near Mint" / "NM".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    pub name: String,
    pub abbreviation: String,
    pub remote_id: i64,
}

impl Condition {
    pub fn new(name: String, abbreviation: String, remote_id: i64) -> Self {
        Self {
            id: 0,
            name,
            abbreviation,
            remote_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: i64,
    pub name: String,
    pub abbreviation: String,
    pub remote_id: i64,
}

impl Language {
    pub fn new(name: String, abbreviation: String, remote_id: i64) -> Self {
        Self {
            id: 0,
            name,
            abbreviation,
            remote_id,
        }
    }
}
