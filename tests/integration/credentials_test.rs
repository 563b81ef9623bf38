use cookie_forge::core::credentials::{CredentialError, CredentialManager};
use std::fs;
use tempfile::TempDir;

fn manager_in(dir: &TempDir) -> CredentialManager {
    CredentialManager::encrypted_only(dir.path()).unwrap()
}

#[test]
fn test_credential_lifecycle() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager.save_credential("siteA", "u", "p").unwrap();
    assert!(manager.has_credential("siteA"));

    // Listing reports the normalized key.
    assert_eq!(manager.list_sites().unwrap(), vec!["sitea"]);

    assert!(manager.delete_credential("siteA").unwrap());
    assert!(!manager.has_credential("siteA"));
    assert_eq!(manager.list_sites().unwrap(), Vec::<String>::new());
}

#[test]
fn test_round_trip_preserves_exact_values() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    let password = "pä$$w0rd with spaces\tand tabs";
    manager
        .save_credential("my.site-1", "user@example.com", password)
        .unwrap();

    let cred = manager.get_credential("my.site-1").unwrap().unwrap();
    assert_eq!(cred.username, "user@example.com");
    assert_eq!(cred.password, password);
}

#[test]
fn test_persists_across_manager_instances() {
    let dir = TempDir::new().unwrap();
    {
        let manager = manager_in(&dir);
        manager.save_credential("youtube", "alice", "pw").unwrap();
    }

    let manager = manager_in(&dir);
    let cred = manager.get_credential("youtube").unwrap().unwrap();
    assert_eq!(cred.username, "alice");
}

#[test]
fn test_tampered_container_is_retrieval_error_not_absence() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);
    manager.save_credential("site", "u", "p").unwrap();

    let container = dir.path().join("credentials.enc");
    let mut blob = fs::read(&container).unwrap();
    let mid = blob.len() / 2;
    blob[mid] ^= 0xFF;
    fs::write(&container, &blob).unwrap();

    // get and list both fail closed with a retrieval error.
    assert!(matches!(
        manager.get_credential("site"),
        Err(CredentialError::Retrieval(_))
    ));
    assert!(matches!(
        manager.list_sites(),
        Err(CredentialError::Retrieval(_))
    ));

    // has_credential swallows the error into "false", never panics.
    assert!(!manager.has_credential("site"));
}

#[test]
fn test_delete_missing_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    assert!(!manager.delete_credential("ghost").unwrap());
    manager.save_credential("ghost", "u", "p").unwrap();
    assert!(manager.delete_credential("ghost").unwrap());
    assert!(!manager.delete_credential("ghost").unwrap());
}

#[test]
fn test_storage_info_for_fallback() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    let info = manager.storage_info();
    assert!(!info.using_native_store);
    assert!(info.using_encrypted_fallback);
    assert!(info
        .storage_location
        .starts_with(dir.path().to_str().unwrap()));
}

#[test]
fn test_concurrent_saves_do_not_lose_updates() {
    use std::sync::Arc;
    use std::thread;

    let dir = TempDir::new().unwrap();
    let manager = Arc::new(manager_in(&dir));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                manager
                    .save_credential(&format!("site{}", i), "u", "p")
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(manager.list_sites().unwrap().len(), 8);
}
