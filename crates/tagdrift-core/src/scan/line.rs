//! Single-line predicates over unified diff text.
//!
//! Everything here is stateless. The scanner decides which predicates apply
//! based on where it is in the patch.

use std::sync::LazyLock;

use regex::Regex;

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -\d+(,\d+)? \+\d+(,\d+)? @@").expect("Invalid hunk header regex")
});

static DOC_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-][ \t])?\s*/\*\*\s*").expect("Invalid doc start regex"));

static DOC_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*(\*/|\*\s*\*/)\s*$").expect("Invalid doc end regex"));

static TAG_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-][ \t])?\s*(\*|/\*\*)?\s*@(param|return|exception|throw|throws)\s+")
        .expect("Invalid tag marker regex")
});

static UNINTERESTING_TAG_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-][ \t])?\s*(\*|/\*\*)?\s*@(author|deprecated|see|since|version|serial)\s+")
        .expect("Invalid uninteresting tag regex")
});

static BARE_ASTERISK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-][ \t]*\*\s*$").expect("Invalid bare asterisk regex"));

static BLANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[ \t]*\s*$").expect("Invalid blank line regex"));

/// Diff marker carried by a patch line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMarker {
    HunkHeader,
    FileSeparator,
    Addition,
    Deletion,
    Context,
}

/// A patch line with its marker. Borrowed from the patch text for the
/// duration of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchLine<'a> {
    pub text: &'a str,
    pub marker: LineMarker,
}

impl<'a> PatchLine<'a> {
    pub fn parse(text: &'a str) -> Self {
        let marker = if is_hunk_boundary(text) {
            LineMarker::HunkHeader
        } else if is_file_separator(text) {
            LineMarker::FileSeparator
        } else if text.starts_with('+') {
            LineMarker::Addition
        } else if text.starts_with('-') {
            LineMarker::Deletion
        } else {
            LineMarker::Context
        };
        Self { text, marker }
    }

    /// Added or removed, with or without a separator after the marker.
    pub fn is_changed(&self) -> bool {
        matches!(self.marker, LineMarker::Addition | LineMarker::Deletion)
    }
}

/// Split patch text into lines, dropping carriage returns.
pub fn split_patch(patch: &str) -> Vec<String> {
    patch.replace('\r', "").split('\n').map(str::to_owned).collect()
}

pub fn is_hunk_boundary(line: &str) -> bool {
    line.starts_with("@@")
}

/// Hunk header carrying both line ranges.
pub fn is_well_formed_hunk(line: &str) -> bool {
    HUNK_HEADER.is_match(line)
}

/// Mail-style separator (`-- ` signature, `---` file header) that ends the
/// tracked region of a patch.
pub fn is_file_separator(line: &str) -> bool {
    line.starts_with("--")
}

/// `+` followed by a space or tab.
pub fn is_addition(line: &str) -> bool {
    let mut chars = line.chars();
    chars.next() == Some('+') && matches!(chars.next(), Some(' ' | '\t'))
}

/// `-` followed by a space or tab.
pub fn is_deletion(line: &str) -> bool {
    let mut chars = line.chars();
    chars.next() == Some('-') && matches!(chars.next(), Some(' ' | '\t'))
}

/// Added or removed line holding nothing but a comment-continuation `*`.
pub fn is_bare_asterisk(line: &str) -> bool {
    BARE_ASTERISK.is_match(line)
}

pub fn is_doc_start(line: &str) -> bool {
    DOC_START.is_match(line)
}

pub fn is_doc_end(line: &str) -> bool {
    DOC_END.is_match(line)
}

/// `@param`, `@return`, `@exception`, `@throw` or `@throws`.
pub fn is_tag_marker(line: &str) -> bool {
    TAG_MARKER.is_match(line)
}

/// Tags whose edits never count as tag changes.
pub fn is_uninteresting_tag_marker(line: &str) -> bool {
    UNINTERESTING_TAG_MARKER.is_match(line)
}

/// Whitespace only, ignoring a leading diff marker.
pub fn is_blank(line: &str) -> bool {
    BLANK.is_match(line)
}

/// Line text past the two leading columns (marker plus separator).
pub fn payload(line: &str) -> &str {
    line.char_indices()
        .nth(2)
        .map_or("", |(idx, _)| &line[idx..])
}

/// Remove every whitespace character.
pub fn collapse_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
