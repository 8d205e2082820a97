//! Collaborator interfaces over version-control history.
//!
//! - `CommitEnumerator`: which commits and files to look at
//! - `DiffProvider`: the full-context patch for one file in one commit
//! - `OffsetResolver`: when a code construct was last changed before a cutoff
//!
//! Git-backed implementations live in [`crate::git`]; in-memory fakes in
//! [`crate::fakes`].

use chrono::{DateTime, Utc};

use crate::domain::{CommitLog, HistoryError};

/// Result type for history collaborators.
pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// Produces the commits to classify.
pub trait CommitEnumerator: Send + Sync {
    /// Commits touching tracked files, in log order. With `only_commit` set,
    /// just that commit.
    fn enumerate(&self, only_commit: Option<&str>) -> HistoryResult<CommitLog>;
}

/// Produces the raw unified diff of one file in one commit, with unlimited
/// context.
pub trait DiffProvider: Send + Sync {
    fn file_patch(&self, commit_id: &str, path: &str) -> HistoryResult<Vec<u8>>;
}

/// A request for the last change to a header before a cutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderQuery<'a> {
    pub file_path: &'a str,
    /// First line of the matched header window, as it appeared in the patch.
    pub first_line: &'a str,
    /// Number of lines in the matched header window.
    pub line_count: usize,
    pub commit_id: &'a str,
    /// Only changes strictly before this instant qualify.
    pub before: DateTime<Utc>,
}

impl HeaderQuery<'_> {
    /// The first header line without its diff marker or surrounding
    /// whitespace.
    pub fn signature(&self) -> &str {
        let line = self.first_line;
        let body = if line.starts_with(['+', '-', ' ']) {
            &line[1..]
        } else {
            line
        };
        body.trim()
    }
}

/// Looks up when a code construct was last changed.
pub trait OffsetResolver: Send + Sync {
    /// Timestamp of the most recent commit strictly before `query.before`
    /// that touched the header, or `None`.
    fn last_change_before(&self, query: &HeaderQuery<'_>) -> HistoryResult<Option<DateTime<Utc>>>;
}

/// Resolver for offline scans: history never has an answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl OffsetResolver for NoHistory {
    fn last_change_before(&self, _query: &HeaderQuery<'_>) -> HistoryResult<Option<DateTime<Utc>>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(first_line: &str) -> HeaderQuery<'_> {
        HeaderQuery {
            file_path: "A.java",
            first_line,
            line_count: 1,
            commit_id: "abc",
            before: Utc::now(),
        }
    }

    #[test]
    fn test_signature_strips_marker_and_whitespace() {
        assert_eq!(query("   public void run() {").signature(), "public void run() {");
        assert_eq!(query("+  void f();").signature(), "void f();");
        assert_eq!(query("-\tint g() {").signature(), "int g() {");
        assert_eq!(query("").signature(), "");
    }

    #[test]
    fn test_no_history_resolves_nothing() {
        assert_eq!(NoHistory.last_change_before(&query(" void f();")).unwrap(), None);
    }
}
