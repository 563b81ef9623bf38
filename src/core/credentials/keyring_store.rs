use keyring::Entry;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::backend::SecretBackend;
use super::{Credential, CredentialError, CredentialResult};

/// Fixed namespace for all entries owned by this tool.
const SERVICE_PREFIX: &str = "cookie-forge";

/// Account name of the per-site credential entry.
const CREDENTIAL_ACCOUNT: &str = "credential";

/// Account name of the index entry that tracks stored site keys.
///
/// OS keyrings provide no way to enumerate entries, so the backend keeps its
/// own site list under the service namespace and updates it on every
/// store/delete.
const INDEX_ACCOUNT: &str = "sites-index";

/// Account name used by the availability probe.
const PROBE_ACCOUNT: &str = "availability-probe";

/// Payload stored as the keyring secret for one site.
#[derive(Serialize, Deserialize)]
struct StoredPayload {
    username: String,
    password: String,
}

/// Native OS secret store backend (Windows Credential Manager, macOS
/// Keychain, Linux Secret Service).
pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        Self
    }

    fn service_name(site: &str) -> String {
        format!("{}:{}", SERVICE_PREFIX, site)
    }

    fn entry_for(site: &str) -> CredentialResult<Entry> {
        Entry::new(&Self::service_name(site), CREDENTIAL_ACCOUNT)
            .map_err(|e| CredentialError::storage(format!("keyring entry for {}: {}", site, e)))
    }

    fn index_entry() -> CredentialResult<Entry> {
        Entry::new(SERVICE_PREFIX, INDEX_ACCOUNT)
            .map_err(|e| CredentialError::storage(format!("keyring index entry: {}", e)))
    }

    fn read_index(&self) -> CredentialResult<Vec<String>> {
        let entry = Self::index_entry()?;
        match entry.get_password() {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| CredentialError::retrieval(format!("corrupted keyring index: {}", e))),
            Err(keyring::Error::NoEntry) => Ok(Vec::new()),
            Err(e) => Err(CredentialError::retrieval(format!(
                "keyring index read failed: {}",
                e
            ))),
        }
    }

    fn write_index(&self, sites: &[String]) -> CredentialResult<()> {
        let entry = Self::index_entry()?;
        let raw = serde_json::to_string(sites)
            .map_err(|e| CredentialError::storage(format!("serialize keyring index: {}", e)))?;
        entry
            .set_password(&raw)
            .map_err(|e| CredentialError::storage(format!("keyring index write failed: {}", e)))
    }

    fn index_add(&self, site: &str) -> CredentialResult<()> {
        let mut sites = self.read_index()?;
        if !sites.iter().any(|s| s == site) {
            sites.push(site.to_string());
            sites.sort();
            self.write_index(&sites)?;
        }
        Ok(())
    }

    fn index_remove(&self, site: &str) -> CredentialResult<()> {
        let mut sites = self.read_index()?;
        let before = sites.len();
        sites.retain(|s| s != site);
        if sites.len() != before {
            self.write_index(&sites)?;
        }
        Ok(())
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretBackend for KeyringStore {
    fn name(&self) -> &'static str {
        "keyring"
    }

    fn store(&self, site: &str, credential: &Credential) -> CredentialResult<()> {
        let payload = StoredPayload {
            username: credential.username.clone(),
            password: credential.password.clone(),
        };
        let raw = serde_json::to_string(&payload)
            .map_err(|e| CredentialError::storage(format!("serialize credential: {}", e)))?;

        let entry = Self::entry_for(site)?;
        entry
            .set_password(&raw)
            .map_err(|e| CredentialError::storage(format!("keyring write for {}: {}", site, e)))?;

        self.index_add(site)?;
        debug!("stored credential for {} in keyring", site);
        Ok(())
    }

    fn retrieve(&self, site: &str) -> CredentialResult<Option<Credential>> {
        let entry = Self::entry_for(site)?;
        match entry.get_password() {
            Ok(raw) => {
                let payload: StoredPayload = serde_json::from_str(&raw).map_err(|e| {
                    CredentialError::retrieval(format!("corrupted keyring payload for {}: {}", site, e))
                })?;
                Ok(Some(Credential::new(payload.username, payload.password)))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialError::retrieval(format!(
                "keyring read for {}: {}",
                site, e
            ))),
        }
    }

    fn delete(&self, site: &str) -> CredentialResult<bool> {
        let entry = Self::entry_for(site)?;
        let deleted = match entry.delete_password() {
            Ok(()) => true,
            Err(keyring::Error::NoEntry) => false,
            Err(e) => {
                return Err(CredentialError::storage(format!(
                    "keyring delete for {}: {}",
                    site, e
                )))
            }
        };
        self.index_remove(site)?;
        if deleted {
            debug!("deleted credential for {} from keyring", site);
        }
        Ok(deleted)
    }

    fn list_sites(&self) -> CredentialResult<Vec<String>> {
        self.read_index()
    }

    fn is_available(&self) -> bool {
        // Harmless store + read + delete round trip. Any failure, including
        // a missing platform service, reports unavailable instead of raising.
        let entry = match Entry::new(SERVICE_PREFIX, PROBE_ACCOUNT) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("keyring unavailable: {}", e);
                return false;
            }
        };
        if let Err(e) = entry.set_password("probe") {
            warn!("keyring unavailable: {}", e);
            return false;
        }
        let readable = entry.get_password().is_ok();
        let _ = entry.delete_password();
        readable
    }

    fn location(&self) -> String {
        format!("OS secret store (service namespace '{}')", SERVICE_PREFIX)
    }
}
