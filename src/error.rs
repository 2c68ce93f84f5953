use thiserror::Error;

/// Main error type for weekly-recap
#[derive(Error, Debug)]
pub enum RecapError {
    /// Git-related errors
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A category keyword that cannot be used in the matching rule
    #[error("Invalid category {keyword:?}: {reason}")]
    InvalidCategory { keyword: String, reason: String },

    /// TOML parsing errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid date passed as --since/--until
    #[error("Invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// Malformed --param value
    #[error("Invalid parameter {0:?} (expected key=value)")]
    InvalidParam(String),

    /// Regex errors
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for weekly-recap operations
pub type Result<T> = std::result::Result<T, RecapError>;

impl RecapError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new invalid category error
    pub fn invalid_category<K: Into<String>, R: Into<String>>(keyword: K, reason: R) -> Self {
        Self::InvalidCategory {
            keyword: keyword.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error comes from fetching the log rather than from configuration
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Self::Git(_) | Self::Io(_))
    }
}
