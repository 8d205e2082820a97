//! End-to-end mining against scratch git repositories.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tagdrift_core::{
    report_rows, write_commits_json, write_statistics_json, write_summary_md, CommitCategory,
    CommitEnumerator, CommitRecord, CommitTally, GitHistory, HistoryMiner, MinerConfig,
    StatisticsArtifact,
};

const ORIGINAL: &str = "\
package demo;

public class Calc {
    /**
     * Runs the thing.
     * @param x the input
     */
    public void run(int x) {
        System.out.println(x);
    }

    int twice(int v) {
        return v * 2;
    }
}
";

const PARAM_DROPPED: &str = "\
package demo;

public class Calc {
    /**
     * Runs the thing.
     */
    public void run(int x) {
        System.out.println(x);
    }

    int twice(int v) {
        return v * 2;
    }
}
";

const CODE_EDITED: &str = "\
package demo;

public class Calc {
    /**
     * Runs the thing.
     */
    public void run(int x) {
        System.out.println(x);
    }

    int twice(int v) {
        return v + v;
    }
}
";

fn git(repo: &Path, date: &str, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn commit_file(repo: &Path, date: &str, path: &str, content: &str, message: &str) {
    std::fs::write(repo.join(path), content).unwrap();
    git(repo, date, &["add", path]);
    git(repo, date, &["commit", "-q", "-m", message]);
}

/// Three commits: the file is added, a `@param` line is dropped, then code
/// changes. Plus one commit touching only a non-tracked file.
fn demo_repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path();
    let date = "2020-01-01T00:00:00Z";
    git(repo, date, &["init", "-q"]);
    git(repo, date, &["config", "user.name", "test-user"]);
    git(repo, date, &["config", "user.email", "test@example.com"]);
    git(repo, date, &["config", "commit.gpgsign", "false"]);

    commit_file(repo, date, "Calc.java", ORIGINAL, "add calc");
    commit_file(repo, "2020-02-01T00:00:00Z", "NOTES.md", "notes\n", "notes");
    commit_file(repo, "2020-03-01T12:00:00Z", "Calc.java", PARAM_DROPPED, "drop param");
    commit_file(repo, "2020-04-01T00:00:00Z", "Calc.java", CODE_EDITED, "edit code");
    dir
}

fn dropped_and_edited(records: &[CommitRecord]) -> (&CommitRecord, &CommitRecord) {
    // Log order is newest first.
    assert_eq!(records.len(), 2);
    (&records[1], &records[0])
}

#[test]
fn enumeration_tracks_only_modified_java_files() {
    let repo = demo_repo();
    let log = GitHistory::new(repo.path(), "java")
        .enumerate(None)
        .unwrap();

    assert_eq!(log.total_commits, 4);
    assert_eq!(log.commits.len(), 2);
    assert!(log
        .commits
        .iter()
        .all(|c| c.changed_files == vec!["Calc.java".to_string()]));
    assert_eq!(
        log.commits[0].timestamp,
        Utc.with_ymd_and_hms(2020, 4, 1, 0, 0, 0).unwrap()
    );
}

#[test]
fn mining_classifies_and_links_history() {
    let repo = demo_repo();
    let tally = CommitTally::new();
    let records = HistoryMiner::for_git_repo(repo.path(), &MinerConfig::default())
        .mine(&tally)
        .unwrap();

    let (dropped, edited) = dropped_and_edited(&records);
    assert_eq!(dropped.taxonomy, CommitCategory::PureTagAllFiles);
    assert_eq!(edited.taxonomy, CommitCategory::NoTagChange);

    assert_eq!(dropped.modification_events.len(), 1);
    let ev = &dropped.modification_events[0];
    assert_eq!(ev.removed_tag_text, "-     * @param x the input");
    assert!(ev
        .header_text
        .as_deref()
        .unwrap()
        .contains("public void run(int x) {"));
    assert_eq!(
        ev.prior_change,
        Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(ev.offset_days(), Some(60));
    assert_eq!(ev.offset_hours(), Some(60 * 24 + 12));

    let s = tally.snapshot();
    assert_eq!(s.total_commits, 4);
    assert_eq!(s.tracked_commits, 2);
    assert_eq!(s.pure_tag_all_files, 1);
    assert_eq!(s.tag_change_commits(), 1);
}

#[test]
fn only_commit_filter_mines_single_commit() {
    let repo = demo_repo();
    let log = GitHistory::new(repo.path(), "java").enumerate(None).unwrap();
    let newest = log.commits[0].id.clone();

    let config = MinerConfig {
        only_commit: Some(newest.clone()),
        ..MinerConfig::default()
    };
    let records = HistoryMiner::for_git_repo(repo.path(), &config)
        .mine(&CommitTally::new())
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, newest);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn parallel_mining_matches_sequential() {
    let repo = demo_repo();
    let config = MinerConfig {
        jobs: 3,
        ..MinerConfig::default()
    };
    let miner = HistoryMiner::for_git_repo(repo.path(), &config);

    let sequential = miner.mine(&CommitTally::new()).unwrap();
    let parallel = miner
        .mine_parallel(Arc::new(CommitTally::new()))
        .await
        .unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn reports_are_written() {
    let repo = demo_repo();
    let out = tempfile::tempdir().unwrap();
    let tally = CommitTally::new();
    let records = HistoryMiner::for_git_repo(repo.path(), &MinerConfig::default())
        .mine(&tally)
        .unwrap();

    let stats = StatisticsArtifact::from_snapshot(&tally.snapshot(), Utc::now());
    let rows = report_rows(&records, "https://example.org/c/");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].offset_days, Some(60));

    write_commits_json(&out.path().join("commits.json"), &records).unwrap();
    write_statistics_json(&out.path().join("statistics.json"), &stats).unwrap();
    write_summary_md(&out.path().join("summary.md"), &stats, &rows).unwrap();

    let md = std::fs::read_to_string(out.path().join("summary.md")).unwrap();
    assert!(md.contains("- Commits exclusively of JavaDoc tag changes: 1"));
    assert!(md.contains("https://example.org/c/"));
}

#[test]
fn enumeration_outside_repo_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = HistoryMiner::for_git_repo(dir.path(), &MinerConfig::default())
        .mine(&CommitTally::new())
        .unwrap_err();
    assert!(err.to_string().contains("history error"));
}
