// Login handler framework
//
// Every supported site implements the same small capability set; the
// registry maps normalized site keys to handler instances. Expected negative
// outcomes (wrong password, 2FA, rate limiting) are return values, not
// errors — only genuinely unexpected conditions surface as `HandlerError`.

pub mod registry;
pub mod youtube;

pub use registry::LoginHandlerRegistry;
pub use youtube::YouTubeLoginHandler;

use std::fmt;
use thiserror::Error;

use crate::core::session::CookieSession;

/// Classification of one login attempt. Exactly one variant per attempt;
/// never collapsed into a bare boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    InvalidCredentials,
    TwoFactorRequired,
    RateLimited,
    HandlerError(String),
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success)
    }
}

impl fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginOutcome::Success => write!(f, "success"),
            LoginOutcome::InvalidCredentials => write!(f, "invalid credentials"),
            LoginOutcome::TwoFactorRequired => write!(f, "two-factor authentication required"),
            LoginOutcome::RateLimited => write!(f, "rate limited"),
            LoginOutcome::HandlerError(detail) => write!(f, "handler error: {}", detail),
        }
    }
}

/// Error family surfaced by the orchestrator for non-success outcomes.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("authentication failed: invalid username or password")]
    InvalidCredentials,

    #[error("two-factor authentication required; this flow cannot be automated")]
    TwoFactorRequired,

    #[error("rate limited by the site; wait before retrying")]
    RateLimited,

    #[error("login handler failed: {0}")]
    Handler(String),
}

impl LoginError {
    /// Map a non-success outcome to its error. `Success` maps to `None`.
    pub fn from_outcome(outcome: &LoginOutcome) -> Option<LoginError> {
        match outcome {
            LoginOutcome::Success => None,
            LoginOutcome::InvalidCredentials => Some(LoginError::InvalidCredentials),
            LoginOutcome::TwoFactorRequired => Some(LoginError::TwoFactorRequired),
            LoginOutcome::RateLimited => Some(LoginError::RateLimited),
            LoginOutcome::HandlerError(detail) => Some(LoginError::Handler(detail.clone())),
        }
    }
}

/// Capability set every site-specific login handler implements.
///
/// Handlers drive the given session through the site's authentication
/// sequence and classify the result. They never retry internally; retry
/// policy belongs to the caller.
pub trait LoginHandler: Send + Sync {
    /// Normalized site identifier this handler serves.
    fn site_name(&self) -> &'static str;

    /// Perform the site's login sequence with the given credentials.
    fn login(&self, session: &CookieSession, username: &str, password: &str) -> LoginOutcome;

    /// Lightweight authenticated-only probe. Reports without mutating the
    /// login state.
    fn is_logged_in(&self, session: &CookieSession) -> bool;
}
