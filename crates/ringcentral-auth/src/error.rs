//! Error types for token state operations

/// Errors from token state operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unusable token data: {0}")]
    TokenData(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
