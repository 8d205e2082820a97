//! Commits before and after classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::modification::ModificationEvent;
use super::verdict::FileClassification;

/// Commit-level taxonomy derived from the per-file verdicts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CommitCategory {
    /// No file changed a documentation tag.
    NoTagChange,
    /// Tags changed, but every such file also changed code or prose.
    MixedEverywhere,
    /// At least one file, but not all, changed only tags.
    PureTagSomeFiles,
    /// Every file changed only tags.
    PureTagAllFiles,
}

impl CommitCategory {
    pub const ALL: [CommitCategory; 4] = [
        CommitCategory::NoTagChange,
        CommitCategory::MixedEverywhere,
        CommitCategory::PureTagSomeFiles,
        CommitCategory::PureTagAllFiles,
    ];

    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            CommitCategory::NoTagChange => "Commit doesn't have JavaDoc tag changes",
            CommitCategory::MixedEverywhere => "Arbitrary Java / JavaDoc changes",
            CommitCategory::PureTagSomeFiles => "Some files have only JavaDoc tag changes",
            CommitCategory::PureTagAllFiles => "Whole commit has only JavaDoc tag changes",
        }
    }

    /// Whether modification events are kept for commits of this category.
    pub fn retains_events(&self) -> bool {
        matches!(
            self,
            CommitCategory::PureTagSomeFiles | CommitCategory::PureTagAllFiles
        )
    }
}

impl std::fmt::Display for CommitCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An enumerated, not yet classified commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitMeta {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Changed files with the tracked extension, in log order.
    pub changed_files: Vec<String>,
}

impl CommitMeta {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>, changed_files: Vec<String>) -> Self {
        Self {
            id: id.into(),
            timestamp,
            changed_files,
        }
    }

    /// Abbreviated commit id for log lines.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(12) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }
}

/// Output of commit enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitLog {
    /// Commits with at least one tracked file, in log order.
    pub commits: Vec<CommitMeta>,
    /// Every commit seen in the log, tracked files or not.
    pub total_commits: u64,
}

/// A classified commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub changed_files: Vec<String>,
    pub taxonomy: CommitCategory,
    pub file_classifications: Vec<FileClassification>,
    /// Only non-empty for pure-tag categories, and only from pure-tag files.
    pub modification_events: Vec<ModificationEvent>,
}

impl CommitRecord {
    pub(crate) fn classified(
        meta: CommitMeta,
        taxonomy: CommitCategory,
        file_classifications: Vec<FileClassification>,
        modification_events: Vec<ModificationEvent>,
    ) -> Self {
        Self {
            id: meta.id,
            timestamp: meta.timestamp,
            changed_files: meta.changed_files,
            taxonomy,
            file_classifications,
            modification_events,
        }
    }
}
