use std::collections::HashSet;

use tcgwatch_api::RemoteGroup;
use tcgwatch_core::config::ResetTrigger;

/// What the catalog pipeline does with the stored catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDecision {
    /// Nothing stored yet; sync without truncating.
    FreshSync,
    /// Truncate every catalog table and sync from scratch.
    Rebuild,
    /// The stored catalog is current.
    Skip,
}

impl std::fmt::Display for ResetDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetDecision::FreshSync => write!(f, "fresh sync"),
            ResetDecision::Rebuild => write!(f, "rebuild"),
            ResetDecision::Skip => write!(f, "skip"),
        }
    }
}

/// Comparison of stored and upstream group ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDiff {
    /// Present both locally and upstream.
    pub matched: usize,
    pub stored_only: usize,
    pub remote_only: usize,
}

impl GroupDiff {
    pub fn new(stored: &[i64], remote: &[RemoteGroup]) -> Self {
        let stored: HashSet<i64> = stored.iter().copied().collect();
        let remote: HashSet<i64> = remote.iter().map(|g| g.remote_id).collect();
        let matched = stored.intersection(&remote).count();
        Self {
            matched,
            stored_only: stored.len() - matched,
            remote_only: remote.len() - matched,
        }
    }

    pub fn is_identical(&self) -> bool {
        self.stored_only == 0 && self.remote_only == 0
    }
}

/// Decide whether to sync, rebuild or skip, given the stored group ids.
pub fn decide_reset(
    stored: &[i64],
    remote: &[RemoteGroup],
    trigger: ResetTrigger,
    force: bool,
) -> ResetDecision {
    if stored.is_empty() {
        return ResetDecision::FreshSync;
    }
    if force {
        return ResetDecision::Rebuild;
    }

    let diff = GroupDiff::new(stored, remote);
    tracing::debug!(?diff, %trigger, "compared stored and upstream groups");
    let fires = match trigger {
        ResetTrigger::StoredGroupPresent => diff.matched > 0,
        ResetTrigger::GroupSetChanged => !diff.is_identical(),
    };

    if fires {
        ResetDecision::Rebuild
    } else {
        ResetDecision::Skip
    }
}
