//! Error handling for the Ledo storefront client

use std::fmt;
use thiserror::Error;

/// Unified error type for the Ledo storefront client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Authentication errors (sign-in rejected)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The backend rejected a request with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// An authenticated request failed because the session is no longer valid
    #[error("Session expired")]
    SessionExpired,

    /// Token/profile persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Client-side validation failed before a request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// The HTTP status the backend answered with, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::SessionExpired => Some(401),
            _ => None,
        }
    }

    /// Whether the backend answered 404; fallback sequences advance on this
    /// and on nothing else
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }
}
