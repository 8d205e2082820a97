//! Commit tallies by taxonomy category.
//!
//! A [`CommitTally`] is created per mining run and passed by reference to
//! whoever classifies commits. Counters are atomic, so parallel workers can
//! share one tally. Call [`CommitTally::flush`] to emit current values as a
//! single `tracing::info!` event at the end of a run.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::domain::{CommitCategory, CommitLog};

/// Per-run commit counters.
#[derive(Debug, Default)]
pub struct CommitTally {
    total_commits: AtomicU64,
    tracked_commits: AtomicU64,
    mixed_everywhere: AtomicU64,
    pure_tag_some_files: AtomicU64,
    pure_tag_all_files: AtomicU64,
}

/// Point-in-time copy of a [`CommitTally`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TallySnapshot {
    pub total_commits: u64,
    pub tracked_commits: u64,
    pub mixed_everywhere: u64,
    pub pure_tag_some_files: u64,
    pub pure_tag_all_files: u64,
}

impl TallySnapshot {
    /// Commits with any documentation tag change.
    pub fn tag_change_commits(&self) -> u64 {
        self.mixed_everywhere + self.pure_tag_some_files + self.pure_tag_all_files
    }
}

impl CommitTally {
    pub const fn new() -> Self {
        Self {
            total_commits: AtomicU64::new(0),
            tracked_commits: AtomicU64::new(0),
            mixed_everywhere: AtomicU64::new(0),
            pure_tag_some_files: AtomicU64::new(0),
            pure_tag_all_files: AtomicU64::new(0),
        }
    }

    /// Count the commits an enumeration produced.
    pub fn record_enumeration(&self, log: &CommitLog) {
        self.total_commits.fetch_add(log.total_commits, Ordering::Relaxed);
        self.tracked_commits
            .fetch_add(log.commits.len() as u64, Ordering::Relaxed);
        tracing::trace!(
            metric = "enumeration",
            total = log.total_commits,
            tracked = log.commits.len(),
            "counters incremented"
        );
    }

    /// Count one classified commit. `NoTagChange` has no counter.
    pub fn record(&self, category: CommitCategory) {
        let counter = match category {
            CommitCategory::NoTagChange => return,
            CommitCategory::MixedEverywhere => &self.mixed_everywhere,
            CommitCategory::PureTagSomeFiles => &self.pure_tag_some_files,
            CommitCategory::PureTagAllFiles => &self.pure_tag_all_files,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = ?category, "counter incremented");
    }

    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            total_commits: self.total_commits.load(Ordering::Relaxed),
            tracked_commits: self.tracked_commits.load(Ordering::Relaxed),
            mixed_everywhere: self.mixed_everywhere.load(Ordering::Relaxed),
            pure_tag_some_files: self.pure_tag_some_files.load(Ordering::Relaxed),
            pure_tag_all_files: self.pure_tag_all_files.load(Ordering::Relaxed),
        }
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        let s = self.snapshot();
        tracing::info!(
            metric = "flush",
            total_commits = s.total_commits,
            tracked_commits = s.tracked_commits,
            mixed_everywhere = s.mixed_everywhere,
            pure_tag_some_files = s.pure_tag_some_files,
            pure_tag_all_files = s.pure_tag_all_files,
        );
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.total_commits.store(0, Ordering::Relaxed);
        self.tracked_commits.store(0, Ordering::Relaxed);
        self.mixed_everywhere.store(0, Ordering::Relaxed);
        self.pure_tag_some_files.store(0, Ordering::Relaxed);
        self.pure_tag_all_files.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommitMeta;
    use chrono::Utc;

    #[test]
    fn counters_increment() {
        let t = CommitTally::new();
        t.record(CommitCategory::MixedEverywhere);
        t.record(CommitCategory::PureTagSomeFiles);
        t.record(CommitCategory::PureTagSomeFiles);
        t.record(CommitCategory::PureTagAllFiles);
        t.record(CommitCategory::NoTagChange);

        let s = t.snapshot();
        assert_eq!(s.mixed_everywhere, 1);
        assert_eq!(s.pure_tag_some_files, 2);
        assert_eq!(s.pure_tag_all_files, 1);
        assert_eq!(s.tag_change_commits(), 4);
    }

    #[test]
    fn enumeration_counts_total_and_tracked() {
        let t = CommitTally::new();
        let log = CommitLog {
            commits: vec![CommitMeta::new("a", Utc::now(), vec!["A.java".to_string()])],
            total_commits: 3,
        };
        t.record_enumeration(&log);
        let s = t.snapshot();
        assert_eq!(s.total_commits, 3);
        assert_eq!(s.tracked_commits, 1);
    }

    #[test]
    fn reset_zeroes_all() {
        let t = CommitTally::new();
        t.record(CommitCategory::PureTagAllFiles);
        t.record_enumeration(&CommitLog {
            commits: vec![],
            total_commits: 5,
        });
        t.reset();
        assert_eq!(t.snapshot(), TallySnapshot::default());
    }
}
