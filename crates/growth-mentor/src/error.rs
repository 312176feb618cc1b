//! Error types for the mentor client

use thiserror::Error;

/// Result type alias for mentor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Mentor client errors
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration (usually the API key) is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single uploaded file could not be turned into text
    #[error("Failed to extract '{filename}': {message}")]
    Extraction { filename: String, message: String },

    /// The generative backend call failed
    #[error("Generation failed: {0}")]
    Generation(String),

    /// A chart block in a reply did not match the chart schema
    #[error("Invalid chart block: {0}")]
    ChartParse(String),

    /// The conversation handed to the composer cannot be sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A generation request is already in flight
    #[error("A reply is still being generated")]
    Busy,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error for a named file
    pub fn extraction(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for the missing-credential precondition failure
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Filename attached to an extraction failure
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Extraction { filename, .. } => Some(filename),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_names_file() {
        let err = Error::extraction("deck.pptx", "corrupt archive");
        assert_eq!(err.filename(), Some("deck.pptx"));
        assert_eq!(err.to_string(), "Failed to extract 'deck.pptx': corrupt archive");
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_config_error_is_configuration() {
        assert!(Error::config("missing key").is_configuration());
        assert!(Error::generation("quota").filename().is_none());
    }
}
