use thiserror::Error;

/// Classifies filter list loading errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// File open/read failure
    FileError,
    /// Download or HTTP failure
    DownloadFailed,
    /// Content could not be decoded (not UTF-8, etc.)
    InvalidData,
}

/// Filter engine error types
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("List load error: {message}")]
    ListLoadError {
        kind: LoadErrorKind,
        message: String,
    },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FilterError {
    pub(crate) fn invalid_rule(rule: &str, reason: impl Into<String>) -> Self {
        FilterError::InvalidRule {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn load(kind: LoadErrorKind, message: impl Into<String>) -> Self {
        FilterError::ListLoadError {
            kind,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
