//! In-memory fakes for the history collaborators (testing only)
//!
//! Provides `MemoryCommitLog`, `MemoryDiffProvider` and `FixedResolver`
//! that satisfy the collaborator contracts without running git.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::domain::{CommitLog, CommitMeta, HistoryError};
use crate::history::{CommitEnumerator, DiffProvider, HeaderQuery, HistoryResult, OffsetResolver};

// ---------------------------------------------------------------------------
// MemoryCommitLog
// ---------------------------------------------------------------------------

/// Fixed list of commits.
#[derive(Debug, Default)]
pub struct MemoryCommitLog {
    commits: Vec<CommitMeta>,
    untracked_commits: u64,
}

impl MemoryCommitLog {
    pub fn new(commits: Vec<CommitMeta>) -> Self {
        Self {
            commits,
            untracked_commits: 0,
        }
    }

    /// Also count `n` commits that touched no tracked file.
    pub fn with_untracked(mut self, n: u64) -> Self {
        self.untracked_commits = n;
        self
    }
}

impl CommitEnumerator for MemoryCommitLog {
    fn enumerate(&self, only_commit: Option<&str>) -> HistoryResult<CommitLog> {
        match only_commit {
            Some(id) => {
                let commits: Vec<CommitMeta> =
                    self.commits.iter().filter(|c| c.id == id).cloned().collect();
                Ok(CommitLog {
                    total_commits: commits.len() as u64,
                    commits,
                })
            }
            None => Ok(CommitLog {
                commits: self.commits.clone(),
                total_commits: self.commits.len() as u64 + self.untracked_commits,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryDiffProvider
// ---------------------------------------------------------------------------

/// Patches keyed by `(commit id, path)`. Unknown keys fail like git would.
#[derive(Debug, Default)]
pub struct MemoryDiffProvider {
    patches: HashMap<(String, String), Vec<u8>>,
}

impl MemoryDiffProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patch(mut self, commit_id: &str, path: &str, patch: impl Into<Vec<u8>>) -> Self {
        self.patches
            .insert((commit_id.to_string(), path.to_string()), patch.into());
        self
    }
}

impl DiffProvider for MemoryDiffProvider {
    fn file_patch(&self, commit_id: &str, path: &str) -> HistoryResult<Vec<u8>> {
        self.patches
            .get(&(commit_id.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| HistoryError::GitFailed {
                command: format!("format-patch {commit_id} -- {path}"),
                stderr: "unknown revision or path".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// FixedResolver
// ---------------------------------------------------------------------------

/// Owned copy of a [`HeaderQuery`], for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub file_path: String,
    pub signature: String,
    pub line_count: usize,
    pub commit_id: String,
    pub before: DateTime<Utc>,
}

/// Answers every query with the same timestamp and records the queries.
#[derive(Debug, Default)]
pub struct FixedResolver {
    answer: Option<DateTime<Utc>>,
    queries: Mutex<Vec<RecordedQuery>>,
}

impl FixedResolver {
    pub fn new(answer: Option<DateTime<Utc>>) -> Self {
        Self {
            answer,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl OffsetResolver for FixedResolver {
    fn last_change_before(&self, query: &HeaderQuery<'_>) -> HistoryResult<Option<DateTime<Utc>>> {
        self.queries.lock().unwrap().push(RecordedQuery {
            file_path: query.file_path.to_string(),
            signature: query.signature().to_string(),
            line_count: query.line_count,
            commit_id: query.commit_id.to_string(),
            before: query.before,
        });
        Ok(self.answer.filter(|t| *t < query.before))
    }
}
