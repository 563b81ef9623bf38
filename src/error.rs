use std::io;
use thiserror::Error;

use crate::core::credentials::CredentialError;
use crate::core::login::LoginError;

/// Custom error type for the cookie-forge application
#[derive(Error, Debug)]
pub enum CookieForgeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Login error: {0}")]
    Login(#[from] LoginError),

    #[error("Cookie file error: {0}")]
    CookieFile(String),

    #[error("no login handler for site '{site}'; supported sites: {supported}")]
    UnsupportedSite { site: String, supported: String },

    #[error("no stored credentials for '{0}' and none given; save credentials first or pass them explicitly")]
    MissingCredentials(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("yt-dlp error: {0}")]
    YtDlp(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the cookie-forge application
pub type Result<T> = std::result::Result<T, CookieForgeError>;

impl CookieForgeError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        CookieForgeError::Config(msg.into())
    }

    /// Create a cookie file error
    pub fn cookie_file<S: Into<String>>(msg: S) -> Self {
        CookieForgeError::CookieFile(msg.into())
    }

    /// Create an invalid URL error
    pub fn invalid_url<S: Into<String>>(msg: S) -> Self {
        CookieForgeError::InvalidUrl(msg.into())
    }

    /// Create a yt-dlp error
    pub fn yt_dlp<S: Into<String>>(msg: S) -> Self {
        CookieForgeError::YtDlp(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        CookieForgeError::Other(msg.into())
    }
}
