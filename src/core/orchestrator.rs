use log::{info, warn};
use url::Url;

use crate::core::credentials::CredentialManager;
use crate::core::login::{LoginError, LoginHandlerRegistry, LoginOutcome};
use crate::core::session::CookieSession;
use crate::error::{CookieForgeError, Result};

/// Composes the credential manager, the login handler registry, and a
/// cookie-collecting session into one authenticated visit flow.
///
/// The orchestrator performs no retries: the first blocking failure is
/// surfaced with its step and classification, and the caller decides what
/// to do with it. Credentials used for login are never persisted as a side
/// effect.
pub struct SessionOrchestrator {
    credentials: CredentialManager,
    registry: LoginHandlerRegistry,
}

impl SessionOrchestrator {
    pub fn new(credentials: CredentialManager) -> Self {
        Self {
            credentials,
            registry: LoginHandlerRegistry::with_defaults(),
        }
    }

    /// Construct with a custom handler registry (tests, embedders).
    pub fn with_registry(credentials: CredentialManager, registry: LoginHandlerRegistry) -> Self {
        Self {
            credentials,
            registry,
        }
    }

    pub fn registry(&self) -> &LoginHandlerRegistry {
        &self.registry
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    /// Log in to `site` and then visit `url` with the authenticated session.
    ///
    /// Credential resolution: an explicit username+password pair wins; else
    /// the stored credential for `site`; else the call fails — requesting a
    /// login never silently degrades to an anonymous visit. An unsupported
    /// site fails before any network request is made.
    pub fn visit_with_login(
        &self,
        session: &CookieSession,
        url: &Url,
        site: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<String> {
        let site_key = site.trim().to_lowercase();
        let Some(handler) = self.registry.handler_for(&site_key) else {
            return Err(CookieForgeError::UnsupportedSite {
                site: site_key,
                supported: self.registry.supported_sites().join(", "),
            });
        };

        let (username, password) = match (username, password) {
            (Some(username), Some(password)) => (username.to_string(), password.to_string()),
            (maybe_user, maybe_pass) => {
                if maybe_user.is_some() != maybe_pass.is_some() {
                    warn!("only one of username/password given explicitly; using stored credentials");
                }
                match self.credentials.get_credential(&site_key)? {
                    Some(stored) => (stored.username, stored.password),
                    None => return Err(CookieForgeError::MissingCredentials(site_key)),
                }
            }
        };

        info!("logging in to {} as {}", site_key, username);
        let outcome = handler.login(session, &username, &password);
        if let Some(login_error) = LoginError::from_outcome(&outcome) {
            return Err(CookieForgeError::Login(login_error));
        }

        let message = session.visit(url)?;
        info!("authenticated visit to {} complete", url);
        Ok(format!("Logged in to {}. {}", site_key, message))
    }
}
