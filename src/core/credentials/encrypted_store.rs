// Encrypted fallback credential store
// AES-256-GCM container file plus a separate key file, both owner-only.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::backend::SecretBackend;
use super::{Credential, CredentialError, CredentialResult};

const CONTAINER_FILE_NAME: &str = "credentials.enc";
const KEY_FILE_NAME: &str = "credential.key";

/// Container layout: `[12-byte nonce][ciphertext + 16-byte auth tag]`.
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Encrypted on-disk credential store, used when the OS secret store is
/// unavailable.
///
/// The whole site map is serialized and sealed as one AES-256-GCM blob with a
/// fresh random nonce per write. Every mutation re-reads, decrypts, modifies
/// and atomically replaces the container (write-temp-then-rename), so a crash
/// mid-write never leaves a partial file. An interior mutex serializes
/// read-modify-write cycles against concurrent operations in the same
/// process.
#[derive(Debug)]
pub struct EncryptedFileStore {
    container_path: PathBuf,
    key_path: PathBuf,
    lock: Mutex<()>,
}

impl EncryptedFileStore {
    /// Open (or initialize) the store under `storage_dir`.
    ///
    /// Generates the encryption key on first use. The key is never
    /// regenerated automatically: a missing key file next to an existing
    /// container is an error, because a new key would orphan the ciphertext.
    pub fn new(storage_dir: &Path) -> CredentialResult<Self> {
        fs::create_dir_all(storage_dir).map_err(|e| {
            CredentialError::storage(format!(
                "failed to create storage directory {}: {}",
                storage_dir.display(),
                e
            ))
        })?;

        let store = Self {
            container_path: storage_dir.join(CONTAINER_FILE_NAME),
            key_path: storage_dir.join(KEY_FILE_NAME),
            lock: Mutex::new(()),
        };
        store.ensure_key()?;
        Ok(store)
    }

    fn ensure_key(&self) -> CredentialResult<()> {
        if self.key_path.exists() {
            return Ok(());
        }
        if self.container_path.exists() {
            return Err(CredentialError::storage(format!(
                "key file {} is missing but the credential container exists; \
                 restore the key file or remove the container",
                self.key_path.display()
            )));
        }

        let key = Aes256Gcm::generate_key(OsRng);
        let encoded = STANDARD.encode(key.as_slice());
        write_atomic(&self.key_path, encoded.as_bytes())
            .map_err(|e| CredentialError::storage(format!("failed to create key file: {}", e)))?;
        restrict_permissions(&self.key_path)?;
        info!("generated new encryption key for credential storage");
        Ok(())
    }

    fn load_key(&self) -> CredentialResult<Vec<u8>> {
        let encoded = fs::read_to_string(&self.key_path)
            .map_err(|e| CredentialError::retrieval(format!("failed to read key file: {}", e)))?;
        let key = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CredentialError::retrieval(format!("corrupted key file: {}", e)))?;
        if key.len() != KEY_LEN {
            return Err(CredentialError::retrieval(format!(
                "corrupted key file: expected {} key bytes, found {}",
                KEY_LEN,
                key.len()
            )));
        }
        Ok(key)
    }

    /// Decrypt the container into the in-memory site map.
    ///
    /// A missing container means "nothing stored yet". Any decryption or
    /// authentication failure is a retrieval error, never an empty map.
    fn load_map(&self) -> CredentialResult<BTreeMap<String, Credential>> {
        if !self.container_path.exists() {
            return Ok(BTreeMap::new());
        }

        let blob = fs::read(&self.container_path).map_err(|e| {
            CredentialError::retrieval(format!("failed to read credential container: {}", e))
        })?;
        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(CredentialError::retrieval(format!(
                "credential container is truncated: {} bytes",
                blob.len()
            )));
        }

        let key = self.load_key()?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CredentialError::retrieval(format!("invalid encryption key: {}", e)))?;

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = cipher.decrypt(nonce, ciphertext).map_err(|_| {
            CredentialError::retrieval(
                "credential container failed authentication (tampered or wrong key)".to_string(),
            )
        })?;

        serde_json::from_slice(&plaintext).map_err(|e| {
            CredentialError::retrieval(format!("corrupted credential container: {}", e))
        })
    }

    fn save_map(&self, map: &BTreeMap<String, Credential>) -> CredentialResult<()> {
        let key = self.load_key().map_err(|e| match e {
            CredentialError::Retrieval(msg) => CredentialError::Storage(msg),
            other => other,
        })?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CredentialError::storage(format!("invalid encryption key: {}", e)))?;

        let plaintext = serde_json::to_vec(map)
            .map_err(|e| CredentialError::storage(format!("serialize credentials: {}", e)))?;

        let nonce = Aes256Gcm::generate_nonce(OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|_| CredentialError::storage("encryption failed".to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(&ciphertext);

        write_atomic(&self.container_path, &blob).map_err(|e| {
            CredentialError::storage(format!("failed to write credential container: {}", e))
        })?;
        restrict_permissions(&self.container_path)?;
        Ok(())
    }
}

impl SecretBackend for EncryptedFileStore {
    fn name(&self) -> &'static str {
        "encrypted-file"
    }

    fn store(&self, site: &str, credential: &Credential) -> CredentialResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.load_map().map_err(|e| match e {
            // A read failure during a write is still a storage failure from
            // the caller's point of view.
            CredentialError::Retrieval(msg) => CredentialError::Storage(msg),
            other => other,
        })?;
        map.insert(site.to_string(), credential.clone());
        self.save_map(&map)?;
        debug!("stored credential for {} in encrypted file store", site);
        Ok(())
    }

    fn retrieve(&self, site: &str) -> CredentialResult<Option<Credential>> {
        let _guard = self.lock.lock();
        let map = self.load_map()?;
        Ok(map.get(site).cloned())
    }

    fn delete(&self, site: &str) -> CredentialResult<bool> {
        let _guard = self.lock.lock();
        let mut map = self.load_map().map_err(|e| match e {
            CredentialError::Retrieval(msg) => CredentialError::Storage(msg),
            other => other,
        })?;
        if map.remove(site).is_none() {
            return Ok(false);
        }
        self.save_map(&map)?;
        debug!("deleted credential for {} from encrypted file store", site);
        Ok(true)
    }

    fn list_sites(&self) -> CredentialResult<Vec<String>> {
        let _guard = self.lock.lock();
        let map = self.load_map()?;
        Ok(map.keys().cloned().collect())
    }

    fn is_available(&self) -> bool {
        // The fallback is compiled in; it only needs a writable storage dir,
        // which construction already guaranteed.
        true
    }

    fn location(&self) -> String {
        self.container_path.display().to_string()
    }
}

/// Write a file via a temp sibling and an atomic rename.
fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}

/// Re-assert owner-only permissions after every write.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> CredentialResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
        CredentialError::storage(format!(
            "failed to restrict permissions on {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> CredentialResult<()> {
    // Per-user profile directories are the ownership boundary on platforms
    // without unix mode bits.
    Ok(())
}
