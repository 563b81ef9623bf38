use super::{Credential, CredentialResult};

/// Uniform capability over one credential storage backend.
///
/// Implementations handle the platform-specific secure storage (OS keyring)
/// or the encrypted file fallback. All entries are scoped under a fixed
/// service namespace so they never collide with unrelated secrets on the
/// host.
pub trait SecretBackend {
    /// Human-readable backend name for logs and storage info.
    fn name(&self) -> &'static str;

    /// Store a credential for a site, overwriting any existing entry.
    fn store(&self, site: &str, credential: &Credential) -> CredentialResult<()>;

    /// Retrieve the credential for a site.
    ///
    /// Returns `Ok(None)` when no entry exists. Backend malfunction or a
    /// corrupted store is an error, never `None`.
    fn retrieve(&self, site: &str) -> CredentialResult<Option<Credential>>;

    /// Delete the credential for a site.
    ///
    /// Returns `Ok(true)` when an entry was removed, `Ok(false)` when there
    /// was nothing to remove. Deleting twice never errors on the second call.
    fn delete(&self, site: &str) -> CredentialResult<bool>;

    /// Whether a credential exists for the site.
    fn exists(&self, site: &str) -> CredentialResult<bool> {
        Ok(self.retrieve(site)?.is_some())
    }

    /// List all site keys with stored credentials, sorted.
    fn list_sites(&self) -> CredentialResult<Vec<String>>;

    /// Lightweight availability probe.
    ///
    /// Must report `false` instead of raising when the backing store is
    /// entirely absent on this host.
    fn is_available(&self) -> bool;

    /// Where this backend keeps its data, for storage info output.
    fn location(&self) -> String;
}
