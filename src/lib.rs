// cookie-forge library - Public API

// Re-export error types
pub mod error;
pub use error::{CookieForgeError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use crate::core::config::Config;
pub use crate::core::cookies::{CookieJar, CookieRecord};
pub use crate::core::credentials::{Credential, CredentialManager};
pub use crate::core::login::{LoginHandler, LoginHandlerRegistry, LoginOutcome};
pub use crate::core::orchestrator::SessionOrchestrator;
pub use crate::core::session::CookieSession;

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
}
