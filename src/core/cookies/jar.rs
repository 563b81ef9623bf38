use chrono::Utc;
use log::debug;
use parking_lot::Mutex;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// One cookie as kept by the jar and written to export files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    /// Registered domain without a leading dot.
    pub domain: String,
    /// True when the cookie carried a Domain attribute and therefore also
    /// matches subdomains.
    pub include_subdomains: bool,
    pub path: String,
    /// Unix seconds; 0 marks a session cookie.
    pub expires: i64,
    pub secure: bool,
    pub http_only: bool,
}

impl CookieRecord {
    fn is_expired(&self, now: i64) -> bool {
        self.expires != 0 && self.expires <= now
    }

    fn matches_domain(&self, host: &str) -> bool {
        domain_matches(host, &self.domain, self.include_subdomains)
    }

    fn matches_path(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }
        request_path.starts_with(&self.path)
            && (self.path.ends_with('/')
                || request_path.as_bytes().get(self.path.len()) == Some(&b'/'))
    }
}

/// Accumulating cookie jar shared between the session client and the
/// export layer.
///
/// Keyed by domain. Setting a cookie replaces any existing entry with the
/// same name and path; an already-expired Set-Cookie acts as a removal, which
/// is how sites delete cookies.
#[derive(Default)]
pub struct CookieJar {
    store: Mutex<HashMap<String, Vec<CookieRecord>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record directly (used when loading cookie files).
    pub fn insert(&self, record: CookieRecord) {
        let mut store = self.store.lock();
        let entry = store.entry(record.domain.clone()).or_default();
        entry.retain(|c| c.name != record.name || c.path != record.path);
        entry.push(record);
    }

    /// Merge a batch of records into the jar.
    pub fn merge(&self, records: Vec<CookieRecord>) {
        for record in records {
            self.insert(record);
        }
    }

    /// Snapshot of all live cookies, sorted by domain then name.
    pub fn snapshot(&self) -> Vec<CookieRecord> {
        let now = Utc::now().timestamp();
        let store = self.store.lock();
        let mut cookies: Vec<CookieRecord> = store
            .values()
            .flatten()
            .filter(|c| !c.is_expired(now))
            .cloned()
            .collect();
        cookies.sort_by(|a, b| a.domain.cmp(&b.domain).then(a.name.cmp(&b.name)));
        cookies
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.store.lock().clear();
    }

    /// Does the jar hold a live cookie with this name for the given domain
    /// (or one of its registrable parents)?
    pub fn contains(&self, domain: &str, name: &str) -> bool {
        self.snapshot()
            .iter()
            .any(|c| c.name == name && c.matches_domain(domain))
    }

    fn apply_set_cookie(&self, raw: &str, url: &Url) {
        let parsed = match cookie::Cookie::parse(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("ignoring unparseable Set-Cookie from {}: {}", url, e);
                return;
            }
        };
        let Some(host) = url.host_str() else { return };
        let host = host.to_lowercase();

        let (domain, include_subdomains) = match parsed.domain() {
            Some(domain) => {
                let domain = domain.trim_start_matches('.').to_lowercase();
                // Reject Domain attributes the request host is not under.
                if !domain_matches(&host, &domain, true) {
                    debug!("ignoring cookie for foreign domain {} from {}", domain, host);
                    return;
                }
                (domain, true)
            }
            None => (host, false),
        };

        let path = match parsed.path() {
            Some(path) if path.starts_with('/') => path.to_string(),
            _ => default_path(url),
        };

        // Max-Age wins over Expires when both are present.
        let expires = if let Some(max_age) = parsed.max_age() {
            Utc::now().timestamp() + max_age.whole_seconds()
        } else if let Some(cookie::Expiration::DateTime(datetime)) = parsed.expires() {
            datetime.unix_timestamp()
        } else {
            0
        };

        let record = CookieRecord {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain,
            include_subdomains,
            path,
            expires,
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
        };

        let now = Utc::now().timestamp();
        let mut store = self.store.lock();
        let entry = store.entry(record.domain.clone()).or_default();
        entry.retain(|c| c.name != record.name || c.path != record.path);
        if !record.is_expired(now) {
            entry.push(record);
        }
    }

    fn matching(&self, url: &Url) -> Vec<CookieRecord> {
        let Some(host) = url.host_str() else {
            return Vec::new();
        };
        let host = host.to_lowercase();
        let request_path = if url.path().is_empty() { "/" } else { url.path() };
        let https = url.scheme() == "https";
        let now = Utc::now().timestamp();

        let store = self.store.lock();
        let mut matched: Vec<CookieRecord> = store
            .values()
            .flatten()
            .filter(|c| !c.is_expired(now))
            .filter(|c| c.matches_domain(&host))
            .filter(|c| c.matches_path(request_path))
            .filter(|c| !c.secure || https)
            .cloned()
            .collect();
        // Longest path first, the order browsers use.
        matched.sort_by(|a, b| b.path.len().cmp(&a.path.len()).then(a.name.cmp(&b.name)));
        matched
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for header in cookie_headers {
            if let Ok(raw) = header.to_str() {
                self.apply_set_cookie(raw, url);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let matched = self.matching(url);
        if matched.is_empty() {
            return None;
        }
        let header = matched
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&header).ok()
    }
}

/// Host/domain match: exact, or a label-aligned suffix when the cookie
/// covers subdomains.
fn domain_matches(host: &str, domain: &str, include_subdomains: bool) -> bool {
    if host == domain {
        return true;
    }
    include_subdomains
        && host.len() > domain.len()
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

/// RFC 6265 default path: the request path up to its last slash.
fn default_path(url: &Url) -> String {
    let path = url.path();
    if !path.starts_with('/') {
        return "/".to_string();
    }
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}
