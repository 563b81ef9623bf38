// Command handlers module

pub mod config;
pub mod cookies;
pub mod credentials;
pub mod sites;
pub mod visit;
pub mod ytdlp;

use crate::core::config::Config;
use crate::core::credentials::CredentialManager;

/// Build the credential manager for the configured storage directory.
pub(crate) fn credential_manager(config: &Config) -> anyhow::Result<CredentialManager> {
    let manager = match config.credential_dir_path() {
        Some(dir) => CredentialManager::with_storage_dir(&dir)?,
        None => CredentialManager::new()?,
    };
    Ok(manager)
}
