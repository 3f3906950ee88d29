//! Error types for the termpal application.

use thiserror::Error;

/// A shared error type for the termpal crates.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. An operation referencing a
/// chat id with no backing chat is not an error at all: the public chat
/// operations treat it as a silent no-op.
#[derive(Error, Debug)]
pub enum TermpalError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },
}

impl TermpalError {
    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for TermpalError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<toml::de::Error> for TermpalError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TermpalError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TermpalError>`.
pub type Result<T> = std::result::Result<T, TermpalError>;
