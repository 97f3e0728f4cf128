use thiserror::Error;

#[derive(Debug, Error)]
pub enum FidcError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FidcError {
    fn from(e: serde_json::Error) -> Self {
        FidcError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for FidcError {
    fn from(e: std::io::Error) -> Self {
        FidcError::Io(e.to_string())
    }
}
