//! History mining pipeline.
//!
//! Enumerates commits, classifies each one and counts the outcome:
//! - `mine`: one commit after another on the calling thread
//! - `mine_parallel`: commits on tokio's blocking pool, at most `jobs` at a
//!   time, results returned in enumeration order

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::info;

use crate::classify::CommitClassifier;
use crate::config::MinerConfig;
use crate::decode::TextDecoder;
use crate::domain::{CommitLog, CommitMeta, CommitRecord, Result, TagdriftError};
use crate::git::GitHistory;
use crate::history::{CommitEnumerator, DiffProvider, OffsetResolver};
use crate::metrics::CommitTally;
use crate::obs::emit_mining_finished;
use crate::scan::{HeaderMatcher, JavaHeaderMatcher, DEFAULT_HEADER_WINDOW};

/// Shared handles to everything a classification needs.
#[derive(Clone)]
struct Collaborators {
    provider: Arc<dyn DiffProvider>,
    resolver: Arc<dyn OffsetResolver>,
    matcher: Arc<dyn HeaderMatcher>,
    decoder: TextDecoder,
    header_window: usize,
}

impl Collaborators {
    fn classify(&self, meta: CommitMeta, tally: &CommitTally) -> CommitRecord {
        CommitClassifier::new(
            self.provider.as_ref(),
            self.resolver.as_ref(),
            self.matcher.as_ref(),
        )
        .with_decoder(self.decoder.clone())
        .with_header_window(self.header_window)
        .classify(meta, tally)
    }
}

/// Drives a mining run over one history.
pub struct HistoryMiner {
    enumerator: Arc<dyn CommitEnumerator>,
    parts: Collaborators,
    only_commit: Option<String>,
    jobs: usize,
}

impl HistoryMiner {
    pub fn new(
        enumerator: Arc<dyn CommitEnumerator>,
        provider: Arc<dyn DiffProvider>,
        resolver: Arc<dyn OffsetResolver>,
    ) -> Self {
        Self {
            enumerator,
            parts: Collaborators {
                provider,
                resolver,
                matcher: Arc::new(JavaHeaderMatcher),
                decoder: TextDecoder::new(),
                header_window: DEFAULT_HEADER_WINDOW,
            },
            only_commit: None,
            jobs: 1,
        }
    }

    /// A miner over the git repository at `repo_dir`, configured by `config`.
    pub fn for_git_repo(repo_dir: impl Into<std::path::PathBuf>, config: &MinerConfig) -> Self {
        let git = Arc::new(
            GitHistory::new(repo_dir, config.normalized_extension())
                .with_diff_context(config.diff_context),
        );
        Self::new(git.clone(), git.clone(), git)
            .with_decoder(TextDecoder::from_labels(&config.fallback_encodings))
            .with_header_window(config.header_window)
            .with_only_commit(config.only_commit.clone())
            .with_jobs(config.jobs)
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn HeaderMatcher>) -> Self {
        self.parts.matcher = matcher;
        self
    }

    pub fn with_decoder(mut self, decoder: TextDecoder) -> Self {
        self.parts.decoder = decoder;
        self
    }

    pub fn with_header_window(mut self, header_window: usize) -> Self {
        self.parts.header_window = header_window;
        self
    }

    pub fn with_only_commit(mut self, only_commit: Option<String>) -> Self {
        self.only_commit = only_commit;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    fn enumerate(&self, tally: &CommitTally) -> Result<CommitLog> {
        let log = self.enumerator.enumerate(self.only_commit.as_deref())?;
        tally.record_enumeration(&log);
        info!(
            total = log.total_commits,
            tracked = log.commits.len(),
            "analyzing commits"
        );
        Ok(log)
    }

    /// Classify every enumerated commit sequentially.
    pub fn mine(&self, tally: &CommitTally) -> Result<Vec<CommitRecord>> {
        let started = Instant::now();
        let log = self.enumerate(tally)?;

        let records: Vec<CommitRecord> = log
            .commits
            .into_iter()
            .map(|meta| self.parts.classify(meta, tally))
            .collect();

        emit_mining_finished(
            started.elapsed().as_millis() as u64,
            records.len(),
            &tally.snapshot(),
        );
        Ok(records)
    }

    /// Classify commits on the blocking pool, at most `jobs` at once.
    pub async fn mine_parallel(&self, tally: Arc<CommitTally>) -> Result<Vec<CommitRecord>> {
        let started = Instant::now();
        let log = self.enumerate(&tally)?;
        let limit = Arc::new(Semaphore::new(self.jobs));

        let mut tasks: Vec<JoinHandle<CommitRecord>> = Vec::with_capacity(log.commits.len());
        for meta in log.commits {
            let permit = Arc::clone(&limit)
                .acquire_owned()
                .await
                .map_err(|e| TagdriftError::Join(e.to_string()))?;
            let parts = self.parts.clone();
            let tally = Arc::clone(&tally);

            tasks.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                parts.classify(meta, &tally)
            }));
        }

        let mut records = Vec::with_capacity(tasks.len());
        for task in tasks {
            records.push(task.await.map_err(|e| TagdriftError::Join(e.to_string()))?);
        }

        emit_mining_finished(
            started.elapsed().as_millis() as u64,
            records.len(),
            &tally.snapshot(),
        );
        Ok(records)
    }
}
