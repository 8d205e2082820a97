//! Error taxonomy for tagdrift.

/// Structural anomalies found while scanning a single file's patch.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("malformed hunk header at line {line_no}: {line}")]
    MalformedHunk { line_no: usize, line: String },
}

/// Patch bytes that could not be turned into text.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("patch bytes are malformed even as detected encoding {encoding}")]
    Undecodable { encoding: String },
}

/// Failures of the git-backed history collaborators.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    GitFailed { command: String, stderr: String },

    #[error("unparseable commit timestamp: {0}")]
    BadTimestamp(String),

    #[error("commit {0} has a file list but no Date line")]
    MissingDate(String),
}

/// Invalid miner configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Top-level tagdrift errors.
#[derive(Debug, thiserror::Error)]
pub enum TagdriftError {
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("history error: {0}")]
    History(#[from] HistoryError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("worker task failed: {0}")]
    Join(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tagdrift operations.
pub type Result<T> = std::result::Result<T, TagdriftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_display_carries_line() {
        let err = ScanError::MalformedHunk {
            line_no: 7,
            line: "@@ broken".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("@@ broken"));
    }

    #[test]
    fn test_history_error_wraps_into_top_level() {
        let err: TagdriftError = HistoryError::GitFailed {
            command: "log".to_string(),
            stderr: "not a git repository".to_string(),
        }
        .into();
        assert!(err.to_string().contains("history error"));
        assert!(err.to_string().contains("not a git repository"));
    }

    #[test]
    fn test_config_error_invalid() {
        let err = ConfigError::Invalid("jobs must be at least 1".to_string());
        assert!(err.to_string().contains("jobs must be at least 1"));
    }
}
