// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A non-empty timestamp string matched none of the accepted layouts
    #[error("Malformed timestamp: {raw:?}")]
    MalformedTimestamp { raw: String },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
