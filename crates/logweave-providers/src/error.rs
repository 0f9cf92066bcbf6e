use thiserror::Error;

/// Result type for logweave-providers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading session logs
#[derive(Debug, Error)]
pub enum Error {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Walkdir error
    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

/// A single log line that could not be decoded into a record
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("line {line}: {source}")]
    Json {
        /// 1-based line number within the log file
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: not valid UTF-8")]
    Encoding { line: usize },
}

impl DecodeError {
    pub fn line(&self) -> usize {
        match self {
            DecodeError::Json { line, .. } | DecodeError::Encoding { line } => *line,
        }
    }
}
