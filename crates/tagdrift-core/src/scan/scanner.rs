//! Line-oriented state machine over one file's unified diff.
//!
//! The scanner walks the patch once and tracks two pieces of state:
//!
//! - [`DocContext`]: whether the current line is code, inside a documentation
//!   comment, or inside the tag section of that comment.
//! - [`HeaderSearch`]: progress of the lookahead that pairs a changed tag
//!   block with the code construct following the comment.
//!
//! Each line is processed in a fixed order: header lookahead, hunk activity,
//! comment entry, tag section entry/exit, comment exit, then change
//! bookkeeping. Later steps see state updated by earlier ones on the same
//! line.

use tracing::debug;

use super::extract::{ModificationExtractor, ScanTarget};
use super::header::HeaderMatcher;
use super::line::{
    collapse_whitespace, is_addition, is_bare_asterisk, is_blank, is_deletion, is_doc_end,
    is_doc_start, is_tag_marker, is_uninteresting_tag_marker, is_well_formed_hunk, payload,
    split_patch, LineMarker, PatchLine,
};
use crate::domain::{ModificationEvent, ScanError, ScanVerdict};
use crate::history::OffsetResolver;

/// Lines a header search may accumulate before giving up.
pub const DEFAULT_HEADER_WINDOW: usize = 10;

/// Lexical position relative to documentation comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocContext {
    #[default]
    Code,
    Comment,
    TagSection,
}

/// Progress of the search for the header governed by a changed tag block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderSearch {
    #[default]
    Idle,
    /// A tag line changed; start looking once the comment closes.
    AfterTagSection,
    /// The comment closed; the next non-blank line opens the window.
    AwaitingFirstLine,
    /// Accumulating header lines and re-matching after each one.
    Collecting,
}

/// Verdict and events from one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchScan {
    pub verdict: ScanVerdict,
    pub events: Vec<ModificationEvent>,
}

/// Classifies single-file patches.
pub struct PatchScanner<'a> {
    matcher: &'a dyn HeaderMatcher,
    resolver: &'a dyn OffsetResolver,
    header_window: usize,
}

impl<'a> PatchScanner<'a> {
    pub fn new(matcher: &'a dyn HeaderMatcher, resolver: &'a dyn OffsetResolver) -> Self {
        Self {
            matcher,
            resolver,
            header_window: DEFAULT_HEADER_WINDOW,
        }
    }

    /// Override the number of lines a header search may span.
    pub fn with_header_window(mut self, header_window: usize) -> Self {
        self.header_window = header_window.max(1);
        self
    }

    /// Scan `patch`, the full-context diff of `target.file_name`.
    pub fn scan(&self, target: ScanTarget<'_>, patch: &str) -> Result<PatchScan, ScanError> {
        let mut run = ScanRun::new(self, ModificationExtractor::new(self.resolver, target));
        for (idx, line) in split_patch(patch).iter().enumerate() {
            run.step(idx + 1, line)?;
        }
        let scan = run.finish();
        debug!(
            file = %target.file_name,
            code = scan.verdict.code_changed,
            doc_body = scan.verdict.doc_body_changed,
            doc_tag = scan.verdict.doc_tag_changed,
            events = scan.events.len(),
            "patch scanned"
        );
        Ok(scan)
    }
}

/// Before/after text of one kind of documentation, for the whitespace check.
#[derive(Debug, Default)]
struct TextPair {
    before: String,
    after: String,
}

impl TextPair {
    fn push_changed(&mut self, line: &str) {
        if is_deletion(line) {
            self.before.push_str(payload(line));
        } else if is_addition(line) {
            self.after.push_str(payload(line));
        }
    }

    fn push_context(&mut self, line: &str) {
        let text = payload(line);
        self.before.push_str(text);
        self.after.push_str(text);
    }

    fn differs(&self) -> bool {
        collapse_whitespace(&self.before) != collapse_whitespace(&self.after)
    }
}

/// Mutable state of a single scan.
struct ScanRun<'s> {
    matcher: &'s dyn HeaderMatcher,
    header_window: usize,
    extractor: ModificationExtractor<'s>,

    in_diff: bool,
    past_mail_body: bool,
    active: bool,
    doc: DocContext,
    search: HeaderSearch,

    first_header_line: String,
    header_lines: Vec<String>,
    tag_lines: Vec<String>,

    doc_text: TextPair,
    tag_text: TextPair,

    code_changed: bool,
    doc_body_changed: bool,
    doc_tag_changed: bool,

    events: Vec<ModificationEvent>,
}

impl<'s> ScanRun<'s> {
    fn new(scanner: &PatchScanner<'s>, extractor: ModificationExtractor<'s>) -> Self {
        Self {
            matcher: scanner.matcher,
            header_window: scanner.header_window,
            extractor,
            in_diff: false,
            past_mail_body: false,
            active: false,
            doc: DocContext::Code,
            search: HeaderSearch::Idle,
            first_header_line: String::new(),
            header_lines: Vec::new(),
            tag_lines: Vec::new(),
            doc_text: TextPair::default(),
            tag_text: TextPair::default(),
            code_changed: false,
            doc_body_changed: false,
            doc_tag_changed: false,
            events: Vec::new(),
        }
    }

    fn step(&mut self, line_no: usize, text: &str) -> Result<(), ScanError> {
        let line = PatchLine::parse(text);

        self.advance_header_search(text);

        // A `diff --git` line inside a format-patch message body does not
        // start the diff; only one on the first line or after the `---`
        // diffstat separator does.
        if text.trim_end() == "---" {
            self.past_mail_body = true;
        } else if text.starts_with("diff --git ") && (line_no == 1 || self.past_mail_body) {
            self.in_diff = true;
        }
        match line.marker {
            LineMarker::HunkHeader => {
                if is_well_formed_hunk(text) {
                    self.in_diff = true;
                } else if self.in_diff {
                    return Err(ScanError::MalformedHunk {
                        line_no,
                        line: text.to_string(),
                    });
                }
                self.active = true;
            }
            LineMarker::FileSeparator => self.active = false,
            _ => {
                if self.active && self.doc == DocContext::Code && is_doc_start(text) {
                    self.doc = DocContext::Comment;
                }
            }
        }

        let mut tag_line = false;
        if self.active && self.doc == DocContext::Comment && is_tag_marker(text) {
            tag_line = true;
            self.doc = DocContext::TagSection;
            // A new tag section supersedes any pending association.
            if matches!(
                self.search,
                HeaderSearch::AfterTagSection | HeaderSearch::Collecting
            ) {
                self.search = HeaderSearch::Idle;
            }
            self.header_lines.clear();
            self.tag_lines.clear();
        } else if self.active
            && self.doc == DocContext::TagSection
            && is_uninteresting_tag_marker(text)
        {
            self.doc = DocContext::Comment;
        }

        let mut closed_comment = false;
        if self.active && self.doc != DocContext::Code && is_doc_end(text) {
            self.doc = DocContext::Code;
            closed_comment = true;
            if self.search == HeaderSearch::AfterTagSection {
                self.search = HeaderSearch::AwaitingFirstLine;
                self.header_lines.clear();
            }
        }

        if self.active && line.is_changed() {
            if !is_bare_asterisk(text) {
                self.record_change(text, tag_line, closed_comment);
            }
        } else {
            self.record_context(text);
        }
        Ok(())
    }

    /// Feed the line to an in-flight header search, emitting an event when
    /// the search ends.
    fn advance_header_search(&mut self, text: &str) {
        match self.search {
            HeaderSearch::AwaitingFirstLine if !is_blank(text) => {
                self.first_header_line = text.trim_start().to_string();
                self.search = HeaderSearch::Collecting;
            }
            HeaderSearch::Collecting => {}
            _ => return,
        }

        self.header_lines.push(text.to_string());
        let window = self.header_lines.concat();

        let event = if self.matcher.is_header(&window) {
            self.extractor
                .header_matched(&self.tag_lines, &self.header_lines, &self.first_header_line)
        } else if self.header_lines.len() >= self.header_window {
            self.extractor.header_missing(&self.tag_lines)
        } else {
            return;
        };

        self.events.push(event);
        self.search = HeaderSearch::Idle;
        self.header_lines.clear();
        self.tag_lines.clear();
    }

    fn record_change(&mut self, text: &str, tag_line: bool, closed_comment: bool) {
        let in_tags = self.doc == DocContext::TagSection;

        if in_tags || closed_comment {
            // A tag line that also closes the comment counts as a tag change,
            // as does any change inside the tag section. Other comment-closing
            // lines only feed the whitespace comparison.
            if in_tags || tag_line {
                self.doc_tag_changed = true;
                self.tag_lines.push(text.to_string());
            }
            self.tag_text.push_changed(text);

            if in_tags {
                self.search = HeaderSearch::AfterTagSection;
            } else if tag_line {
                self.search = HeaderSearch::AwaitingFirstLine;
                self.header_lines.clear();
            }
        } else if self.doc == DocContext::Comment {
            self.doc_body_changed = true;
            self.doc_text.push_changed(text);
        } else {
            self.code_changed = true;
            // A fresh code edit invalidates a pending association.
            if matches!(
                self.search,
                HeaderSearch::AwaitingFirstLine | HeaderSearch::Collecting
            ) {
                self.search = HeaderSearch::Idle;
            }
            self.header_lines.clear();
            self.tag_lines.clear();
        }
    }

    fn record_context(&mut self, text: &str) {
        match self.doc {
            DocContext::TagSection => self.tag_text.push_context(text),
            DocContext::Comment => self.doc_text.push_context(text),
            DocContext::Code => {}
        }
    }

    fn finish(self) -> PatchScan {
        let verdict = ScanVerdict {
            code_changed: self.code_changed,
            doc_body_changed: self.doc_body_changed && self.doc_text.differs(),
            doc_tag_changed: self.doc_tag_changed && self.tag_text.differs(),
        };
        PatchScan {
            verdict,
            events: self.events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::NoHistory;
    use crate::scan::header::JavaHeaderMatcher;
    use chrono::{TimeZone, Utc};

    fn scan(patch: &str) -> PatchScan {
        let target = ScanTarget::new(
            "A.java",
            "c0ffee",
            Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
        );
        PatchScanner::new(&JavaHeaderMatcher, &NoHistory)
            .scan(target, patch)
            .unwrap()
    }

    #[test]
    fn test_context_only_patch_is_clean() {
        let patch = "@@ -1,6 +1,6 @@\n /**\n  * Summary.\n  * @param x input\n  */\n void run(int x) {\n }\n";
        let out = scan(patch);
        assert_eq!(out.verdict, ScanVerdict::neutral());
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_lines_before_first_hunk_are_ignored() {
        let patch = "From abc\n- removed in header\n+ added in header\n@@ -1 +1 @@\n int x;\n";
        assert_eq!(scan(patch).verdict, ScanVerdict::neutral());
    }

    #[test]
    fn test_code_change() {
        let patch = "@@ -1,3 +1,3 @@\n void run() {\n-    a();\n+    b();\n }\n";
        assert_eq!(scan(patch).verdict, ScanVerdict::new(true, false, false));
    }

    #[test]
    fn test_doc_body_change() {
        let patch = "@@ -1,4 +1,4 @@\n /**\n- * Old summary.\n+ * New summary.\n  */\n";
        assert_eq!(scan(patch).verdict, ScanVerdict::new(false, true, false));
    }

    #[test]
    fn test_separator_ends_tracking() {
        let patch = "@@ -1,2 +1,2 @@\n int x;\n-- \n+ int y;\n";
        assert_eq!(scan(patch).verdict, ScanVerdict::neutral());
    }

    #[test]
    fn test_malformed_hunk_after_diff_start_is_an_error() {
        let target = ScanTarget::new("A.java", "c0ffee", Utc::now());
        let patch = "diff --git a/A.java b/A.java\n@@ nonsense\n int x;\n";
        let err = PatchScanner::new(&JavaHeaderMatcher, &NoHistory)
            .scan(target, patch)
            .unwrap_err();
        assert!(matches!(err, ScanError::MalformedHunk { line_no: 2, .. }));
    }

    #[test]
    fn test_diff_line_in_message_body_does_not_arm_hunk_check() {
        let patch = "From c0ffee Mon Sep 17 00:00:00 2001\nSubject: [PATCH] tweak\n\n\
                     diff --git in message\n\n@@ note @@\n---\n A.java | 1 -\n\
                     diff --git a/A.java b/A.java\n@@ -1,4 +1,3 @@\n /**\n- * @param x old\n  */\n void run(int x) {\n";
        let out = scan(patch);
        assert!(out.verdict.is_pure_tag());
        assert_eq!(out.events.len(), 1);
    }

    #[test]
    fn test_malformed_hunk_after_diffstat_is_an_error() {
        let target = ScanTarget::new("A.java", "c0ffee", Utc::now());
        let patch = "Subject: x\n---\n A.java | 1 -\ndiff --git a/A.java b/A.java\n@@ nonsense\n";
        let err = PatchScanner::new(&JavaHeaderMatcher, &NoHistory)
            .scan(target, patch)
            .unwrap_err();
        assert!(matches!(err, ScanError::MalformedHunk { line_no: 5, .. }));
    }

    #[test]
    fn test_header_window_override() {
        let target = ScanTarget::new("A.java", "c0ffee", Utc::now());
        let patch = "@@ -1,5 +1,4 @@\n /**\n- * @param x old\n  */\n int a;\n void run(int x) {\n";
        let out = PatchScanner::new(&JavaHeaderMatcher, &NoHistory)
            .with_header_window(1)
            .scan(target, patch)
            .unwrap();
        assert_eq!(out.events.len(), 1);
        assert!(out.events[0].header_text.is_none());
    }
}
