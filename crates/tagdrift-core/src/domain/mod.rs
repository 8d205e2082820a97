//! Domain models for tagdrift.
//!
//! - `ScanVerdict` / `FileClassification`: what one file's patch changed
//! - `ModificationEvent`: a changed tag block tied to the code it documents
//! - `CommitMeta` / `CommitRecord`: a commit before and after classification

pub mod commit;
pub mod error;
pub mod modification;
pub mod verdict;

pub use commit::{CommitCategory, CommitLog, CommitMeta, CommitRecord};
pub use error::{ConfigError, DecodeError, HistoryError, Result, ScanError, TagdriftError};
pub use modification::ModificationEvent;
pub use verdict::{FileClassification, ScanVerdict};
