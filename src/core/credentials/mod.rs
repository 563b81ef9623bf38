// Credential management module
//
// Secure storage and retrieval of per-site credentials. The native OS secret
// store is preferred; an AES-256-GCM encrypted file store is the fallback.

pub mod backend;
pub mod encrypted_store;
pub mod keyring_store;
pub mod manager;

pub use backend::SecretBackend;
pub use encrypted_store::EncryptedFileStore;
pub use keyring_store::KeyringStore;
pub use manager::CredentialManager;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored credential: one per normalized site key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Description of the storage backend in use. Derived on query, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct StorageInfo {
    pub using_native_store: bool,
    pub using_encrypted_fallback: bool,
    pub storage_location: String,
}

/// Errors raised by credential storage operations.
///
/// `Retrieval` is distinct from absence: a corrupted or unreadable store
/// never reads as "no credential found". Absence is expressed as `Ok(None)`
/// or `Ok(false)` by the operations themselves.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("credential storage failed: {0}")]
    Storage(String),

    #[error("credential retrieval failed: {0}")]
    Retrieval(String),
}

impl CredentialError {
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        CredentialError::Validation(msg.into())
    }

    pub fn storage<S: Into<String>>(msg: S) -> Self {
        CredentialError::Storage(msg.into())
    }

    pub fn retrieval<S: Into<String>>(msg: S) -> Self {
        CredentialError::Retrieval(msg.into())
    }
}

/// Result type for credential operations.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;
