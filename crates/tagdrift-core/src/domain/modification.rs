//! Tag-removal events linked to the code construct they documented.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// One (changed tag block -> following code construct) pairing found in a
/// single file's patch.
///
/// `header_text`, `prior_change` and `time_offset` are all `None` when the
/// scanner gave up looking for a header. When a header was found but history
/// has no earlier change to it, only `prior_change` and `time_offset` are
/// `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModificationEvent {
    pub file_name: String,
    /// Changed tag lines, diff markers included, joined with `\n`.
    pub removed_tag_text: String,
    /// Header window lines, diff markers included, joined with `\n`.
    pub header_text: Option<String>,
    pub prior_change: Option<DateTime<Utc>>,
    #[serde(with = "offset_seconds")]
    pub time_offset: Option<TimeDelta>,
}

impl ModificationEvent {
    /// Event for a tag block whose header search ran out of lines.
    pub fn unmatched(file_name: impl Into<String>, removed_tag_text: String) -> Self {
        Self {
            file_name: file_name.into(),
            removed_tag_text,
            header_text: None,
            prior_change: None,
            time_offset: None,
        }
    }

    /// Event for a tag block followed by a recognised header.
    ///
    /// The offset is `commit_time - prior_change`. A negative offset means the
    /// resolver returned a change that is not actually older than the commit;
    /// it is kept as-is.
    pub fn matched(
        file_name: impl Into<String>,
        removed_tag_text: String,
        header_text: String,
        commit_time: DateTime<Utc>,
        prior_change: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            removed_tag_text,
            header_text: Some(header_text),
            prior_change,
            time_offset: prior_change.map(|prior| commit_time - prior),
        }
    }

    /// Whole days in the offset, rounded towards negative infinity.
    pub fn offset_days(&self) -> Option<i64> {
        self.time_offset.map(|d| d.num_seconds().div_euclid(86_400))
    }

    /// Whole hours in the offset, rounded towards negative infinity.
    pub fn offset_hours(&self) -> Option<i64> {
        self.time_offset.map(|d| d.num_seconds().div_euclid(3_600))
    }
}

/// Serialize an optional duration as whole seconds.
mod offset_seconds {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<TimeDelta>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.num_seconds()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<TimeDelta>, D::Error> {
        let secs: Option<i64> = Option::deserialize(d)?;
        Ok(secs.map(TimeDelta::seconds))
    }
}
