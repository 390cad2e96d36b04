use thiserror::Error;

/// Errors raised while converting nodes into a subscription document.
///
/// A conversion either succeeds with a complete document or fails with one of
/// these before any content is produced.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed rename rule '{pattern}': {source}")]
    MalformedRenameRule {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid value '{value}' for option '{name}'")]
    InvalidOption { name: String, value: String },

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<serde_yaml::Error> for ConvertError {
    fn from(err: serde_yaml::Error) -> Self {
        ConvertError::Serialize(err.to_string())
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::Serialize(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
