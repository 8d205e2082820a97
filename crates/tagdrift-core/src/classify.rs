//! Commit-level classification.
//!
//! Every tracked file of a commit is fetched, decoded and scanned. The
//! per-file verdicts are folded into a [`CommitCategory`]; modification
//! events survive only for pure-tag categories, and only from files whose
//! own verdict is pure-tag.

use crate::decode::TextDecoder;
use crate::domain::{
    CommitCategory, CommitMeta, CommitRecord, FileClassification, ScanVerdict, TagdriftError,
};
use crate::history::{DiffProvider, OffsetResolver};
use crate::metrics::CommitTally;
use crate::obs::{emit_commit_classified, emit_file_degraded, CommitSpan};
use crate::scan::{HeaderMatcher, PatchScan, PatchScanner, ScanTarget, DEFAULT_HEADER_WINDOW};

/// Fold per-file verdicts into a commit category.
///
/// Checks run in order: all files pure-tag, some file pure-tag, no tag
/// change anywhere, otherwise mixed. An empty slice is vacuously pure-tag.
pub fn categorize(verdicts: &[ScanVerdict]) -> CommitCategory {
    let pure = verdicts.iter().filter(|v| v.is_pure_tag()).count();
    let tagged = verdicts.iter().filter(|v| v.doc_tag_changed).count();

    if pure == verdicts.len() {
        CommitCategory::PureTagAllFiles
    } else if pure > 0 {
        CommitCategory::PureTagSomeFiles
    } else if tagged == 0 {
        CommitCategory::NoTagChange
    } else {
        CommitCategory::MixedEverywhere
    }
}

/// Build a [`CommitRecord`] from per-file scan outcomes, in file order.
/// A missing scan counts as the neutral verdict with no events.
pub fn fold_commit(meta: CommitMeta, scans: Vec<(String, Option<PatchScan>)>) -> CommitRecord {
    let verdicts: Vec<ScanVerdict> = scans
        .iter()
        .map(|(_, scan)| scan.as_ref().map_or_else(ScanVerdict::neutral, |s| s.verdict))
        .collect();
    let taxonomy = categorize(&verdicts);

    let mut classifications = Vec::with_capacity(scans.len());
    let mut events = Vec::new();
    for ((file, scan), verdict) in scans.into_iter().zip(verdicts) {
        if taxonomy.retains_events() && verdict.is_pure_tag() {
            if let Some(scan) = scan {
                events.extend(scan.events);
            }
        }
        classifications.push(FileClassification::new(file, verdict));
    }

    CommitRecord::classified(meta, taxonomy, classifications, events)
}

/// Classifies whole commits with injected history collaborators.
pub struct CommitClassifier<'a> {
    provider: &'a dyn DiffProvider,
    resolver: &'a dyn OffsetResolver,
    matcher: &'a dyn HeaderMatcher,
    decoder: TextDecoder,
    header_window: usize,
}

impl<'a> CommitClassifier<'a> {
    pub fn new(
        provider: &'a dyn DiffProvider,
        resolver: &'a dyn OffsetResolver,
        matcher: &'a dyn HeaderMatcher,
    ) -> Self {
        Self {
            provider,
            resolver,
            matcher,
            decoder: TextDecoder::new(),
            header_window: DEFAULT_HEADER_WINDOW,
        }
    }

    pub fn with_decoder(mut self, decoder: TextDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_header_window(mut self, header_window: usize) -> Self {
        self.header_window = header_window;
        self
    }

    /// Fetch, decode and scan one file of `meta`.
    pub fn scan_file(&self, meta: &CommitMeta, path: &str) -> Result<PatchScan, TagdriftError> {
        let bytes = self.provider.file_patch(&meta.id, path)?;
        let text = self.decoder.decode(&bytes)?;
        let scanner =
            PatchScanner::new(self.matcher, self.resolver).with_header_window(self.header_window);
        let scan = scanner.scan(ScanTarget::new(path, &meta.id, meta.timestamp), &text)?;
        Ok(scan)
    }

    /// Classify `meta` and count it in `tally`.
    ///
    /// A file whose patch cannot be fetched, decoded or scanned is logged and
    /// contributes a neutral verdict.
    pub fn classify(&self, meta: CommitMeta, tally: &CommitTally) -> CommitRecord {
        let _span = CommitSpan::enter(meta.short_id());

        let scans = meta
            .changed_files
            .iter()
            .map(|path| {
                let scan = match self.scan_file(&meta, path) {
                    Ok(scan) => Some(scan),
                    Err(e) => {
                        emit_file_degraded(&meta.id, path, &e);
                        None
                    }
                };
                (path.clone(), scan)
            })
            .collect();

        let record = fold_commit(meta, scans);
        tally.record(record.taxonomy);
        emit_commit_classified(
            &record.id,
            record.taxonomy,
            record.file_classifications.len(),
            record.modification_events.len(),
        );
        record
    }
}
