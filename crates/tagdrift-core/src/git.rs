//! Git-backed history collaborators.
//!
//! [`GitHistory`] implements [`CommitEnumerator`], [`DiffProvider`] and
//! [`OffsetResolver`] by running the `git` binary inside a repository.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{CommitLog, CommitMeta, HistoryError};
use crate::history::{CommitEnumerator, DiffProvider, HeaderQuery, HistoryResult, OffsetResolver};

/// Unified diff context wide enough to cover any source file.
pub const DEFAULT_DIFF_CONTEXT: usize = 100_000;

const COMMIT_PREFIX: &str = "commit ";
const DATE_PREFIX: &str = "Date: ";
const LOG_FORMAT: &str = "--format=commit %H%nDate: %aI";
const RESOLVER_DATE_PREFIX: &str = "tagdrift-date ";
const RESOLVER_FORMAT: &str = "--format=tagdrift-date %aI";

/// A git repository on disk.
#[derive(Debug, Clone)]
pub struct GitHistory {
    repo_dir: PathBuf,
    extension: String,
    diff_context: usize,
}

impl GitHistory {
    /// Track files ending in `.{extension}` inside `repo_dir`.
    pub fn new(repo_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            extension: extension.into(),
            diff_context: DEFAULT_DIFF_CONTEXT,
        }
    }

    pub fn with_diff_context(mut self, lines: usize) -> Self {
        self.diff_context = lines;
        self
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    fn run_git(&self, args: &[&str]) -> HistoryResult<Vec<u8>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .map_err(HistoryError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HistoryError::GitFailed {
                command: args.first().copied().unwrap_or_default().to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl CommitEnumerator for GitHistory {
    fn enumerate(&self, only_commit: Option<&str>) -> HistoryResult<CommitLog> {
        let stdout = match only_commit {
            Some(sha) => self.run_git(&["show", "--name-status", LOG_FORMAT, sha])?,
            None => self.run_git(&["log", "--name-status", LOG_FORMAT, "--all"])?,
        };
        let log = parse_name_status_log(&String::from_utf8_lossy(&stdout), &self.extension)?;
        debug!(
            total = log.total_commits,
            tracked = log.commits.len(),
            "history enumerated"
        );
        Ok(log)
    }
}

impl DiffProvider for GitHistory {
    fn file_patch(&self, commit_id: &str, path: &str) -> HistoryResult<Vec<u8>> {
        let unified = format!("--unified={}", self.diff_context);
        self.run_git(&[
            "format-patch",
            "-1",
            "--stdout",
            &unified,
            commit_id,
            "--",
            path,
        ])
    }
}

impl OffsetResolver for GitHistory {
    fn last_change_before(&self, query: &HeaderQuery<'_>) -> HistoryResult<Option<DateTime<Utc>>> {
        let range = format!(
            "-L/{}/,+{}:{}",
            escape_line_pattern(query.signature()),
            query.line_count,
            query.file_path
        );
        let stdout = self.run_git(&["log", query.commit_id, RESOLVER_FORMAT, &range])?;
        let text = String::from_utf8_lossy(&stdout);

        for line in text.lines() {
            let Some(raw) = line.strip_prefix(RESOLVER_DATE_PREFIX) else {
                continue;
            };
            let when = parse_git_date(raw.trim())?;
            if when < query.before {
                return Ok(Some(when));
            }
        }
        Ok(None)
    }
}

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Parse `git log --name-status` output produced with `LOG_FORMAT`.
///
/// Only modified files (`M` status) ending in `.{extension}` are tracked.
/// Commits without tracked files are counted but not returned.
pub fn parse_name_status_log(text: &str, extension: &str) -> HistoryResult<CommitLog> {
    let suffix = format!(".{extension}");
    let mut log = CommitLog::default();
    let mut current: Option<(String, Option<String>, Vec<String>)> = None;

    for line in text.lines() {
        if let Some(sha) = line.strip_prefix(COMMIT_PREFIX).filter(|s| is_object_id(s)) {
            log.total_commits += 1;
            release(&mut log, current.take())?;
            current = Some((sha.to_string(), None, Vec::new()));
        } else if let Some(date) = line.strip_prefix(DATE_PREFIX) {
            if let Some((_, slot, _)) = current.as_mut() {
                *slot = Some(date.trim().to_string());
            }
        } else if let Some(path) = line.strip_prefix("M\t") {
            if path.ends_with(&suffix) && path.len() > suffix.len() {
                if let Some((_, _, files)) = current.as_mut() {
                    files.push(path.to_string());
                }
            }
        }
    }
    release(&mut log, current.take())?;
    Ok(log)
}

fn release(
    log: &mut CommitLog,
    pending: Option<(String, Option<String>, Vec<String>)>,
) -> HistoryResult<()> {
    let Some((sha, date, files)) = pending else {
        return Ok(());
    };
    if files.is_empty() {
        return Ok(());
    }
    let date = date.ok_or_else(|| HistoryError::MissingDate(sha.clone()))?;
    log.commits.push(CommitMeta::new(sha, parse_git_date(&date)?, files));
    Ok(())
}

fn is_object_id(s: &str) -> bool {
    matches!(s.len(), 40 | 64) && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a strict ISO 8601 git date. Dates without an offset are taken as
/// UTC.
pub fn parse_git_date(raw: &str) -> HistoryResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            warn!(raw = %raw, "unparseable git date");
            HistoryError::BadTimestamp(raw.to_string())
        })
}

/// Escape a source line for use as a `git log -L/<regex>/` pattern.
pub fn escape_line_pattern(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        if matches!(c, '\\' | '[' | ']' | '/' | '*' | '.' | '^' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
