//! Per-file scan verdicts.

use serde::{Deserialize, Serialize};

/// What a single file's patch changed.
///
/// The three flags are independent: one patch can touch code, prose and tags
/// at the same time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ScanVerdict {
    pub code_changed: bool,
    pub doc_body_changed: bool,
    pub doc_tag_changed: bool,
}

impl ScanVerdict {
    pub fn new(code_changed: bool, doc_body_changed: bool, doc_tag_changed: bool) -> Self {
        Self {
            code_changed,
            doc_body_changed,
            doc_tag_changed,
        }
    }

    /// Verdict recorded for files whose diff could not be read or scanned.
    pub fn neutral() -> Self {
        Self::default()
    }

    /// True when the only semantic change is to documentation tags.
    pub fn is_pure_tag(&self) -> bool {
        self.doc_tag_changed && !self.code_changed && !self.doc_body_changed
    }
}

/// A changed file together with its verdict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileClassification {
    pub file_name: String,
    pub verdict: ScanVerdict,
}

impl FileClassification {
    pub fn new(file_name: impl Into<String>, verdict: ScanVerdict) -> Self {
        Self {
            file_name: file_name.into(),
            verdict,
        }
    }

    pub fn is_pure_tag(&self) -> bool {
        self.verdict.is_pure_tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_tag_requires_tag_only() {
        assert!(ScanVerdict::new(false, false, true).is_pure_tag());
        assert!(!ScanVerdict::new(true, false, true).is_pure_tag());
        assert!(!ScanVerdict::new(false, true, true).is_pure_tag());
        assert!(!ScanVerdict::new(false, false, false).is_pure_tag());
    }

    #[test]
    fn test_neutral_is_all_false() {
        let v = ScanVerdict::neutral();
        assert!(!v.code_changed && !v.doc_body_changed && !v.doc_tag_changed);
    }
}
