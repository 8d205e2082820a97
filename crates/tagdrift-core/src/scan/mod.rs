//! Patch semantic classification.
//!
//! Decides, for one file's unified diff, whether code, documentation prose or
//! documentation tags changed, and links changed tag blocks to the headers
//! they document.

pub mod extract;
pub mod header;
pub mod line;
pub mod scanner;

pub use extract::{ModificationExtractor, ScanTarget};
pub use header::{HeaderMatcher, JavaHeaderMatcher};
pub use line::{LineMarker, PatchLine};
pub use scanner::{DocContext, HeaderSearch, PatchScan, PatchScanner, DEFAULT_HEADER_WINDOW};
