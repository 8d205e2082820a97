use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::{CommitRecord, ModificationEvent};
use crate::metrics::TallySnapshot;

const ROW_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One row of the modifications table.
///
/// Commit columns are filled only on the first row of each commit; event
/// columns are empty for a pure-tag commit without events.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportRow {
    pub category: String,
    pub commit_url: String,
    pub commit_date: String,
    pub file_name: String,
    pub removed_tag_text: String,
    pub header_text: String,
    pub header_date: String,
    pub offset_days: Option<i64>,
    pub offset_hours: Option<i64>,
}

impl ReportRow {
    fn fill_event(&mut self, ev: &ModificationEvent) {
        self.file_name = ev.file_name.clone();
        self.removed_tag_text = ev.removed_tag_text.clone();
        self.header_text = ev.header_text.clone().unwrap_or_default();
        self.header_date = ev.prior_change.map(format_date).unwrap_or_default();
        self.offset_days = ev.offset_days();
        self.offset_hours = ev.offset_hours();
    }
}

fn format_date(when: DateTime<Utc>) -> String {
    when.format(ROW_DATE_FORMAT).to_string()
}

/// Rows for every commit in a pure-tag category, in record order.
pub fn report_rows(records: &[CommitRecord], url_prefix: &str) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    for record in records.iter().filter(|r| r.taxonomy.retains_events()) {
        let head = ReportRow {
            category: record.taxonomy.label().to_string(),
            commit_url: format!("{url_prefix}{}", record.id),
            commit_date: format_date(record.timestamp),
            ..ReportRow::default()
        };

        let mut events = record.modification_events.iter();
        let Some(first) = events.next() else {
            rows.push(head);
            continue;
        };

        let mut row = head;
        row.fill_event(first);
        rows.push(row);

        for ev in events {
            let mut row = ReportRow::default();
            row.fill_event(ev);
            rows.push(row);
        }
    }
    rows
}

/// Summary counts persisted in statistics.json.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatisticsArtifact {
    pub generated_at: DateTime<Utc>,
    pub total_commits: u64,
    pub tracked_commits: u64,
    pub tag_change_commits: u64,
    pub mixed_everywhere: u64,
    pub pure_tag_some_files: u64,
    pub pure_tag_all_files: u64,
}

impl StatisticsArtifact {
    pub fn from_snapshot(snapshot: &TallySnapshot, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            total_commits: snapshot.total_commits,
            tracked_commits: snapshot.tracked_commits,
            tag_change_commits: snapshot.tag_change_commits(),
            mixed_everywhere: snapshot.mixed_everywhere,
            pure_tag_some_files: snapshot.pure_tag_some_files,
            pure_tag_all_files: snapshot.pure_tag_all_files,
        }
    }

    /// The five labelled summary lines, in report order.
    pub fn summary_lines(&self) -> [(&'static str, u64); 5] {
        [
            ("Commits with tracked file changes", self.tracked_commits),
            ("Commits having JavaDoc tags changed", self.tag_change_commits),
            (
                "Commits having Code and JavaDoc tags changed in all files",
                self.mixed_everywhere,
            ),
            (
                "Commits having files with only JavaDoc tag changes",
                self.pure_tag_some_files,
            ),
            (
                "Commits exclusively of JavaDoc tag changes",
                self.pure_tag_all_files,
            ),
        ]
    }
}

/// Write commits.json (all classified commits) in pretty JSON format.
pub fn write_commits_json(path: &Path, records: &[CommitRecord]) -> Result<()> {
    let content = serde_json::to_string_pretty(records).context("serialize commit records")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Write statistics.json in pretty JSON format.
pub fn write_statistics_json(path: &Path, artifact: &StatisticsArtifact) -> Result<()> {
    let content = serde_json::to_string_pretty(artifact).context("serialize statistics")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Render the markdown summary: counts, then the modifications table.
pub fn render_summary_md(stats: &StatisticsArtifact, rows: &[ReportRow]) -> String {
    let mut out = String::new();
    out.push_str("# Tag Drift Summary\n\n");
    out.push_str("## Statistics\n");
    out.push_str(&format!("- total commits: {}\n", stats.total_commits));
    for (label, count) in stats.summary_lines() {
        out.push_str(&format!("- {}: {}\n", label, count));
    }

    if !rows.is_empty() {
        out.push_str("\n## Modifications\n");
        out.push_str("| Category | Commit | Date | File | Removed tags | Header | Header date | Days | Hours |\n");
        out.push_str("|---|---|---|---|---|---|---|---|---|\n");
        for row in rows {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
                row.category,
                row.commit_url,
                row.commit_date,
                row.file_name,
                md_cell(&row.removed_tag_text),
                md_cell(&row.header_text),
                row.header_date,
                row.offset_days.map(|d| d.to_string()).unwrap_or_default(),
                row.offset_hours.map(|h| h.to_string()).unwrap_or_default(),
            ));
        }
    }
    out
}

fn md_cell(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        collapsed
    } else {
        format!("`{}`", collapsed.replace('|', "\\|").replace('`', "'"))
    }
}

/// Write summary.md.
pub fn write_summary_md(path: &Path, stats: &StatisticsArtifact, rows: &[ReportRow]) -> Result<()> {
    let md = render_summary_md(stats, rows);
    std::fs::write(path, md).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Plain-text report printed at the end of a run.
pub fn render_text_report(stats: &StatisticsArtifact) -> String {
    let mut out = String::from("Report\n======\n");
    out.push_str(&format!("Total commits: {}\n", stats.total_commits));
    for (label, count) in stats.summary_lines() {
        out.push_str(&format!("{}: {}\n", label, count));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommitCategory, CommitMeta, FileClassification, ScanVerdict};
    use chrono::TimeZone;
    use serde_json::json;

    fn ts(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn record(id: &str, taxonomy: CommitCategory, events: Vec<ModificationEvent>) -> CommitRecord {
        CommitRecord::classified(
            CommitMeta::new(id, ts(2020, 6, 1, 12), vec!["A.java".to_string()]),
            taxonomy,
            vec![FileClassification::new(
                "A.java",
                ScanVerdict::new(false, false, true),
            )],
            events,
        )
    }

    fn stats() -> StatisticsArtifact {
        StatisticsArtifact::from_snapshot(
            &TallySnapshot {
                total_commits: 20,
                tracked_commits: 8,
                mixed_everywhere: 2,
                pure_tag_some_files: 1,
                pure_tag_all_files: 3,
            },
            DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .expect("parse RFC3339")
                .with_timezone(&Utc),
        )
    }

    #[test]
    fn rows_carry_commit_columns_once() {
        let linked = ModificationEvent::matched(
            "A.java",
            "- * @param x old".to_string(),
            " void run(int x) {".to_string(),
            ts(2020, 6, 1, 12),
            Some(ts(2020, 5, 30, 6)),
        );
        let unlinked = ModificationEvent::unmatched("A.java", "- * @return y".to_string());
        let records = vec![
            record("aaa", CommitCategory::PureTagAllFiles, vec![linked, unlinked]),
            record("bbb", CommitCategory::MixedEverywhere, vec![]),
            record("ccc", CommitCategory::PureTagSomeFiles, vec![]),
        ];

        let rows = report_rows(&records, "https://example.org/c/");
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].category, "Whole commit has only JavaDoc tag changes");
        assert_eq!(rows[0].commit_url, "https://example.org/c/aaa");
        assert_eq!(rows[0].commit_date, "2020-06-01T12:00:00");
        assert_eq!(rows[0].header_date, "2020-05-30T06:00:00");
        assert_eq!(rows[0].offset_days, Some(2));
        assert_eq!(rows[0].offset_hours, Some(54));

        assert_eq!(rows[1].category, "");
        assert_eq!(rows[1].commit_url, "");
        assert_eq!(rows[1].removed_tag_text, "- * @return y");
        assert_eq!(rows[1].offset_days, None);

        assert_eq!(rows[2].commit_url, "https://example.org/c/ccc");
        assert_eq!(rows[2].file_name, "");
    }

    #[test]
    fn statistics_schema_has_expected_keys() {
        let raw = serde_json::to_value(stats()).expect("serialize statistics");
        assert_eq!(raw["total_commits"], json!(20));
        assert_eq!(raw["tag_change_commits"], json!(6));
        assert_eq!(raw["pure_tag_all_files"], json!(3));
        assert!(raw.as_object().expect("object").contains_key("generated_at"));
    }

    #[test]
    fn text_report_is_stable() {
        let expected = "Report\n======\nTotal commits: 20\nCommits with tracked file changes: 8\nCommits having JavaDoc tags changed: 6\n\
                        Commits having Code and JavaDoc tags changed in all files: 2\n\
                        Commits having files with only JavaDoc tag changes: 1\n\
                        Commits exclusively of JavaDoc tag changes: 3\n";
        assert_eq!(render_text_report(&stats()), expected);
    }

    #[test]
    fn summary_markdown_escapes_cells() {
        let row = ReportRow {
            removed_tag_text: "- * @param a|b\n- * @return x".to_string(),
            ..ReportRow::default()
        };
        let md = render_summary_md(&stats(), &[row]);
        assert!(md.starts_with("# Tag Drift Summary\n\n## Statistics\n- total commits: 20\n"));
        assert!(md.contains("`- * @param a\\|b - * @return x`"));
    }

    #[test]
    fn summary_without_rows_has_no_table() {
        let md = render_summary_md(&stats(), &[]);
        assert!(!md.contains("## Modifications"));
    }

    #[test]
    fn writers_create_files() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![record("aaa", CommitCategory::PureTagAllFiles, vec![])];

        write_commits_json(&dir.path().join("commits.json"), &records).unwrap();
        write_statistics_json(&dir.path().join("statistics.json"), &stats()).unwrap();
        write_summary_md(&dir.path().join("summary.md"), &stats(), &[]).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("commits.json")).unwrap();
        let back: Vec<CommitRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, records);
        assert!(dir.path().join("statistics.json").exists());
        assert!(dir.path().join("summary.md").exists());
    }
}
