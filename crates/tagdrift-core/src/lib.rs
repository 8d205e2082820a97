//! Tagdrift Core Library
//!
//! Classifies source patches by whether they change code, documentation
//! prose or only documentation tags, and mines git history for commits
//! whose only semantic change is to tags.

pub mod classify;
pub mod config;
pub mod decode;
pub mod domain;
pub mod fakes;
pub mod git;
pub mod history;
pub mod metrics;
pub mod miner;
pub mod obs;
pub mod reporting;
pub mod scan;
pub mod telemetry;

pub use classify::{categorize, fold_commit, CommitClassifier};
pub use config::MinerConfig;
pub use decode::TextDecoder;
pub use domain::{
    CommitCategory, CommitLog, CommitMeta, CommitRecord, ConfigError, DecodeError,
    FileClassification, HistoryError, ModificationEvent, Result, ScanError, ScanVerdict,
    TagdriftError,
};
pub use git::{is_git_repo, GitHistory};
pub use history::{
    CommitEnumerator, DiffProvider, HeaderQuery, HistoryResult, NoHistory, OffsetResolver,
};
pub use metrics::{CommitTally, TallySnapshot};
pub use miner::HistoryMiner;
pub use obs::{emit_commit_classified, emit_file_degraded, emit_mining_finished, CommitSpan};
pub use reporting::{
    render_summary_md, render_text_report, report_rows, write_commits_json,
    write_statistics_json, write_summary_md, ReportRow, StatisticsArtifact,
};
pub use scan::{
    HeaderMatcher, JavaHeaderMatcher, PatchScan, PatchScanner, ScanTarget, DEFAULT_HEADER_WINDOW,
};
pub use telemetry::init_tracing;

/// Tagdrift version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
