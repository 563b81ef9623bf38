use cookie_forge::core::cookies::{self, CookieJar, CookieRecord};
use std::fs;
use tempfile::TempDir;

fn record(name: &str, domain: &str, include_subdomains: bool) -> CookieRecord {
    CookieRecord {
        name: name.to_string(),
        value: format!("{}-value", name),
        domain: domain.to_string(),
        include_subdomains,
        path: "/".to_string(),
        expires: 1999999999,
        secure: true,
        http_only: false,
    }
}

#[test]
fn test_jar_snapshot_to_netscape_and_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cookies.txt");

    let jar = CookieJar::new();
    jar.insert(record("SID", "google.com", true));
    jar.insert(record("session", "example.com", false));

    cookies::save_netscape(&path, &jar.snapshot()).unwrap();
    let loaded = cookies::load_netscape(&path).unwrap();

    let reloaded = CookieJar::new();
    reloaded.merge(loaded);
    assert_eq!(reloaded.snapshot(), jar.snapshot());
}

#[test]
fn test_netscape_file_is_ytdlp_shaped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cookies.txt");

    cookies::save_netscape(&path, &[record("SID", "google.com", true)]).unwrap();
    let content = fs::read_to_string(&path).unwrap();

    assert!(content.starts_with("# Netscape HTTP Cookie File"));
    let data_line = content
        .lines()
        .find(|line| !line.starts_with('#') && !line.is_empty())
        .unwrap();
    assert_eq!(data_line.split('\t').count(), 7);
    assert!(data_line.starts_with(".google.com\tTRUE\t"));
}

#[test]
fn test_session_cookie_round_trips_with_zero_expiry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cookies.txt");

    let mut session_cookie = record("temp", "example.com", false);
    session_cookie.expires = 0;

    cookies::save_netscape(&path, std::slice::from_ref(&session_cookie)).unwrap();
    let loaded = cookies::load_netscape(&path).unwrap();
    assert_eq!(loaded, vec![session_cookie]);
}

#[test]
fn test_json_export_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cookies.json");

    cookies::export_json(
        &path,
        &[record("a", "one.com", false), record("b", "two.com", true)],
    )
    .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed["one.com"]["a"], "a-value");
    assert_eq!(parsed["two.com"]["b"], "b-value");
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/deeper/cookies.txt");

    cookies::save_netscape(&path, &[record("x", "example.com", false)]).unwrap();
    assert!(path.exists());
}
