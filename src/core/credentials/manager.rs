use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::backend::SecretBackend;
use super::{Credential, CredentialError, CredentialResult, EncryptedFileStore, KeyringStore, StorageInfo};
use crate::core::validation;

/// Directory under the user's home for the encrypted fallback files.
const DEFAULT_STORAGE_DIR: &str = ".cookie-forge";

/// Manages secure storage and retrieval of per-site credentials.
///
/// The native OS secret store is probed exactly once at construction; if it
/// is usable, every operation routes there, otherwise everything routes to
/// the encrypted file store. The decision is never revisited mid-lifetime,
/// so reads and writes can not end up split across backends.
pub struct CredentialManager {
    native: Option<KeyringStore>,
    encrypted: EncryptedFileStore,
    storage_dir: PathBuf,
}

impl CredentialManager {
    /// Create a manager with the default storage directory, probing the
    /// native secret store.
    pub fn new() -> CredentialResult<Self> {
        let dir = default_storage_dir()?;
        Self::with_storage_dir(&dir)
    }

    /// Create a manager rooted at `storage_dir`, probing the native secret
    /// store.
    pub fn with_storage_dir(storage_dir: &Path) -> CredentialResult<Self> {
        let keyring = KeyringStore::new();
        let native = if keyring.is_available() {
            info!("credential manager using native secret store");
            Some(keyring)
        } else {
            info!("native secret store unavailable, using encrypted file storage");
            None
        };

        Ok(Self {
            native,
            encrypted: EncryptedFileStore::new(storage_dir)?,
            storage_dir: storage_dir.to_path_buf(),
        })
    }

    /// Create a manager that skips the native store entirely.
    ///
    /// Used by tests and by callers that must not touch the OS keyring.
    pub fn encrypted_only(storage_dir: &Path) -> CredentialResult<Self> {
        Ok(Self {
            native: None,
            encrypted: EncryptedFileStore::new(storage_dir)?,
            storage_dir: storage_dir.to_path_buf(),
        })
    }

    fn backend(&self) -> &dyn SecretBackend {
        match &self.native {
            Some(keyring) => keyring,
            None => &self.encrypted,
        }
    }

    /// Store credentials for a site, overwriting any existing entry.
    pub fn save_credential(
        &self,
        site: &str,
        username: &str,
        password: &str,
    ) -> CredentialResult<()> {
        let site = validation::normalize_site(site)?;
        let (username, password) = validation::validate_credentials(username, password)?;

        self.backend()
            .store(&site, &Credential::new(username, password))?;
        info!("stored credentials for {} using {}", site, self.backend().name());
        Ok(())
    }

    /// Retrieve stored credentials for a site.
    ///
    /// `Ok(None)` means nothing is stored. A backend malfunction or a
    /// corrupted store is an error, never `None`.
    pub fn get_credential(&self, site: &str) -> CredentialResult<Option<Credential>> {
        let site = validation::normalize_site(site)?;
        let found = self.backend().retrieve(&site)?;
        if found.is_some() {
            debug!("retrieved credentials for {} from {}", site, self.backend().name());
        }
        Ok(found)
    }

    /// List all sites with stored credentials.
    ///
    /// During a backend migration window both stores may hold entries; the
    /// result is their union with native-store entries taking precedence.
    pub fn list_sites(&self) -> CredentialResult<Vec<String>> {
        let mut sites: BTreeSet<String> = self.backend().list_sites()?.into_iter().collect();

        if self.native.is_some() {
            match self.encrypted.list_sites() {
                Ok(extra) => sites.extend(extra),
                Err(e) => warn!("could not list encrypted fallback entries: {}", e),
            }
        }

        Ok(sites.into_iter().collect())
    }

    /// Remove credentials for a site.
    ///
    /// Returns `Ok(true)` when an entry existed, `Ok(false)` otherwise;
    /// deleting a missing site is not an error.
    pub fn delete_credential(&self, site: &str) -> CredentialResult<bool> {
        let site = validation::normalize_site(site)?;
        self.backend().delete(&site)
    }

    /// Check whether credentials exist for a site. Never raises; any
    /// backend failure reads as `false`.
    pub fn has_credential(&self, site: &str) -> bool {
        match self.get_credential(site) {
            Ok(found) => found.is_some(),
            Err(e) => {
                warn!("has_credential({}) treated error as absence: {}", site, e);
                false
            }
        }
    }

    /// Describe the storage backend in use. Recomputed on every call.
    pub fn storage_info(&self) -> StorageInfo {
        let using_native = self.native.is_some();
        StorageInfo {
            using_native_store: using_native,
            using_encrypted_fallback: !using_native,
            storage_location: self.backend().location(),
        }
    }

    /// Directory holding the encrypted fallback files.
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }
}

/// Resolve the default storage directory (`~/.cookie-forge`).
pub fn default_storage_dir() -> CredentialResult<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_STORAGE_DIR))
        .ok_or_else(|| CredentialError::storage("could not determine home directory".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager_in(dir: &TempDir) -> CredentialManager {
        CredentialManager::encrypted_only(dir.path()).unwrap()
    }

    #[test]
    fn test_save_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);

        manager.save_credential("SiteA", "user", "pass").unwrap();
        let cred = manager.get_credential("sitea").unwrap().unwrap();
        assert_eq!(cred.username, "user");
        assert_eq!(cred.password, "pass");
    }

    #[test]
    fn test_site_key_is_normalized() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);

        manager.save_credential("  YouTube  ", "u", "p").unwrap();
        assert!(manager.has_credential("youtube"));
        assert_eq!(manager.list_sites().unwrap(), vec!["youtube"]);
    }

    #[test]
    fn test_validation_rejects_bad_input() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);

        assert!(matches!(
            manager.save_credential("", "u", "p"),
            Err(CredentialError::Validation(_))
        ));
        assert!(matches!(
            manager.save_credential("site", "", "p"),
            Err(CredentialError::Validation(_))
        ));
        assert!(matches!(
            manager.save_credential("site", "u", ""),
            Err(CredentialError::Validation(_))
        ));
        assert!(matches!(
            manager.save_credential("bad site!", "u", "p"),
            Err(CredentialError::Validation(_))
        ));
    }

    #[test]
    fn test_has_credential_false_on_absence() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);

        assert!(!manager.has_credential("nothing"));
    }

    #[test]
    fn test_delete_reports_absence() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);

        manager.save_credential("site", "u", "p").unwrap();
        assert!(manager.delete_credential("site").unwrap());
        assert!(!manager.delete_credential("site").unwrap());
    }

    #[test]
    fn test_storage_info_reports_fallback() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);

        let info = manager.storage_info();
        assert!(!info.using_native_store);
        assert!(info.using_encrypted_fallback);
        assert!(info.storage_location.contains("credentials.enc"));
    }
}
