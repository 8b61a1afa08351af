//! Error types for platform operations

use reqwest::Method;

use crate::response::Response;

/// Errors from platform operations.
///
/// Non-2xx answers to generic REST calls are not errors; they come back as
/// an ordinary `Response`. `Api` is reserved for calls whose failure leaves
/// nothing useful to return (the OAuth flows) and for callers who opt in
/// through `Response::into_api_error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("access has expired, authenticate again")]
    AccessExpired,

    #[error("refresh token has expired")]
    RefreshTokenExpired,

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Api(Box<ApiError>),

    #[error("response deserialization failed: {0}")]
    Deserialize(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Auth(#[from] ringcentral_auth::Error),
}

/// A failed API response together with the request that produced it.
#[derive(Debug, thiserror::Error)]
#[error("{message}: {method} {endpoint} returned {}", .response.status())]
pub struct ApiError {
    pub message: String,
    pub method: Method,
    pub endpoint: String,
    pub response: Response,
}

impl ApiError {
    pub fn status(&self) -> u16 {
        self.response.status()
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(Box::new(err))
    }
}

/// Result alias for platform operations.
pub type Result<T> = std::result::Result<T, Error>;
