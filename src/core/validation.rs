// Validation module for input sanitization
// Reusable validation for URLs, site keys, and credential fields

use anyhow::{ensure, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::core::credentials::{CredentialError, CredentialResult};

/// Maximum URL length to prevent pathological inputs
const MAX_URL_LENGTH: usize = 2048;

/// Site keys: lowercase letters, digits, dots, underscores, hyphens
static SITE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9._-]+$").expect("site key regex"));

/// Validates and completes a URL for a visit operation.
///
/// Accepts bare hostnames (`example.com`) and completes them to https, the
/// way a browser address bar would. Rejects non-http(s) schemes, control
/// characters, and oversized input. URLs end up both in HTTP requests and in
/// yt-dlp command lines, so hostile characters are rejected here once.
pub fn validate_url(url_str: &str) -> Result<Url> {
    let trimmed = url_str.trim();

    ensure!(!trimmed.is_empty(), "URL cannot be empty");
    ensure!(
        trimmed.len() <= MAX_URL_LENGTH,
        "URL is too long ({} characters, max {})",
        trimmed.len(),
        MAX_URL_LENGTH
    );
    ensure!(
        !trimmed.chars().any(|c| c.is_control()),
        "URL contains control characters"
    );

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        ensure!(
            !trimmed.contains("://"),
            "URL scheme must be http or https"
        );
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).with_context(|| format!("invalid URL: {}", trimmed))?;
    ensure!(url.host_str().is_some(), "URL must have a hostname");

    Ok(url)
}

/// Validate and normalize a site key: lowercase, trimmed, restricted charset.
pub fn normalize_site(site: &str) -> CredentialResult<String> {
    let site = site.trim().to_lowercase();
    if site.is_empty() {
        return Err(CredentialError::validation(
            "site name must be a non-empty string",
        ));
    }
    if !SITE_KEY_RE.is_match(&site) {
        return Err(CredentialError::validation(
            "site name can only contain lowercase letters, numbers, dots, underscores, and hyphens",
        ));
    }
    Ok(site)
}

/// Validate username and password for a save operation.
pub fn validate_credentials(username: &str, password: &str) -> CredentialResult<(String, String)> {
    let username = username.trim();
    if username.is_empty() {
        return Err(CredentialError::validation(
            "username cannot be empty or whitespace only",
        ));
    }
    if password.is_empty() {
        return Err(CredentialError::validation("password cannot be empty"));
    }
    Ok((username.to_string(), password.to_string()))
}
