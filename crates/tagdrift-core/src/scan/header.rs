//! Heuristic recognition of method and constructor headers.

use std::sync::LazyLock;

use regex::Regex;

/// Optional annotations, return type and name, a parameter list (which may
/// hold `/*placeholder*/` comments), trailing modifiers, then `{` or `;`.
static JAVA_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(@\w+)*\s*",
        r"(\w|\s|\[|\]|<|>|\?|,|\.|(/\*\w+\*/))+",
        r"\((\w|\s|,|\.|\[|\]|<|>|\?|(/\*\w+\*/))*\)",
        r"(\w|\s|,)*",
        r"(\{|;)",
    ))
    .expect("Invalid java header regex")
});

/// Decides whether an accumulated window of code lines starts a construct
/// signature.
///
/// The window is the raw patch lines (diff markers included) concatenated
/// without separators.
pub trait HeaderMatcher: Send + Sync {
    fn is_header(&self, window: &str) -> bool;
}

/// Regex heuristic for Java-like method and constructor declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaHeaderMatcher;

impl HeaderMatcher for JavaHeaderMatcher {
    fn is_header(&self, window: &str) -> bool {
        JAVA_HEADER.is_match(window)
    }
}

impl<F> HeaderMatcher for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_header(&self, window: &str) -> bool {
        self(window)
    }
}
