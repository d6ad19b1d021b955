use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which pipeline a run executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Catalog,
    Prices,
}

impl std::fmt::Display for RunKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunKind::Catalog => write!(f, "catalog"),
            RunKind::Prices => write!(f, "prices"),
        }
    }
}

impl std::str::FromStr for RunKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "catalog" => Ok(RunKind::Catalog),
            "prices" => Ok(RunKind::Prices),
            _ => Err(format!("unknown run kind: {s}")),
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    /// The catalog was already current and nothing was written.
    Skipped,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Skipped => write!(f, "skipped"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(RunStatus::Success),
            "skipped" => Ok(RunStatus::Skipped),
            "failed" => Ok(RunStatus::Failed),
            _ => Err(format!("unknown run status: {s}")),
        }
    }
}

/// Record of one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRun {
    pub id: Uuid,
    pub kind: RunKind,
    pub status: RunStatus,
    pub rows_written: u64,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncRun {
    pub fn new(kind: RunKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            kind,
            status: RunStatus::Success,
            rows_written: 0,
            errors: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Stamp the finish time and record the outcome.
    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.finished_at = Utc::now();
    }
}
