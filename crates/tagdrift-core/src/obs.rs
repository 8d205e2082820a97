//! Structured observability hooks for mining runs.
//!
//! This module provides:
//! - Commit-scoped tracing spans via the `CommitSpan` RAII guard
//! - Emission functions for key events: commit classified, file degraded,
//!   mining finished
//!
//! Events go through `tracing`; filtering and format are set up by
//! [`crate::telemetry::init_tracing`].

use tracing::{info, warn};

use crate::domain::CommitCategory;
use crate::metrics::TallySnapshot;

/// RAII guard that enters a commit-scoped span while the commit is being
/// classified.
///
/// # Example
///
/// ```ignore
/// let _span = CommitSpan::enter("7051049221c9");
/// // every event emitted now carries commit = "7051049221c9"
/// ```
pub struct CommitSpan {
    _span: tracing::span::EnteredSpan,
}

impl CommitSpan {
    pub fn enter(commit_id: &str) -> Self {
        let span = tracing::info_span!("tagdrift.commit", commit = %commit_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a commit received its category.
pub fn emit_commit_classified(
    commit_id: &str,
    category: CommitCategory,
    files: usize,
    events: usize,
) {
    info!(
        event = "commit.classified",
        commit = %commit_id,
        category = ?category,
        files = files,
        events = events,
    );
}

/// Emit event: a file fell back to the neutral verdict (warning level).
pub fn emit_file_degraded(commit_id: &str, file: &str, error: &dyn std::fmt::Display) {
    warn!(
        event = "file.degraded",
        commit = %commit_id,
        file = %file,
        error = %error,
        "skipping bad patch"
    );
}

/// Emit event: a mining run completed.
pub fn emit_mining_finished(duration_ms: u64, classified: usize, tally: &TallySnapshot) {
    info!(
        event = "mining.finished",
        duration_ms = duration_ms,
        classified = classified,
        total_commits = tally.total_commits,
        tracked_commits = tally.tracked_commits,
        tag_change_commits = tally.tag_change_commits(),
    );
}
