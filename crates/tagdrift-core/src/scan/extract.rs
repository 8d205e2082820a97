//! Packaging of modification events once a header search ends.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::ModificationEvent;
use crate::history::{HeaderQuery, OffsetResolver};

/// The file and commit a patch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTarget<'a> {
    pub file_name: &'a str,
    pub commit_id: &'a str,
    pub commit_time: DateTime<Utc>,
}

impl<'a> ScanTarget<'a> {
    pub fn new(file_name: &'a str, commit_id: &'a str, commit_time: DateTime<Utc>) -> Self {
        Self {
            file_name,
            commit_id,
            commit_time,
        }
    }
}

/// Builds [`ModificationEvent`]s for one scan, consulting history for
/// matched headers.
pub struct ModificationExtractor<'a> {
    resolver: &'a dyn OffsetResolver,
    target: ScanTarget<'a>,
}

impl<'a> ModificationExtractor<'a> {
    pub fn new(resolver: &'a dyn OffsetResolver, target: ScanTarget<'a>) -> Self {
        Self { resolver, target }
    }

    /// A header was recognised after the changed tag block.
    ///
    /// Resolver failures are logged and treated like "no earlier change".
    pub fn header_matched(
        &self,
        tag_lines: &[String],
        header_lines: &[String],
        first_line: &str,
    ) -> ModificationEvent {
        let query = HeaderQuery {
            file_path: self.target.file_name,
            first_line,
            line_count: header_lines.len(),
            commit_id: self.target.commit_id,
            before: self.target.commit_time,
        };

        let prior_change = match self.resolver.last_change_before(&query) {
            Ok(found) => found,
            Err(e) => {
                warn!(
                    file = %self.target.file_name,
                    commit = %self.target.commit_id,
                    error = %e,
                    "history lookup failed"
                );
                None
            }
        };

        if let Some(prior) = prior_change {
            if prior > self.target.commit_time {
                warn!(
                    file = %self.target.file_name,
                    commit = %self.target.commit_id,
                    prior = %prior,
                    "resolver returned a change newer than the commit"
                );
            }
        }

        debug!(
            file = %self.target.file_name,
            signature = %query.signature(),
            resolved = prior_change.is_some(),
            "tag change linked to header"
        );

        ModificationEvent::matched(
            self.target.file_name,
            tag_lines.join("\n"),
            header_lines.join("\n"),
            self.target.commit_time,
            prior_change,
        )
    }

    /// The header search ran out of lines.
    pub fn header_missing(&self, tag_lines: &[String]) -> ModificationEvent {
        debug!(file = %self.target.file_name, "no header found after tag change");
        ModificationEvent::unmatched(self.target.file_name, tag_lines.join("\n"))
    }
}
