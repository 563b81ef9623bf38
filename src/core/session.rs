use log::{debug, info};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::core::cookies::{self, CookieJar};
use crate::error::{CookieForgeError, Result};

/// Browser-like user agent sent with every request.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Bounded wait for any single network call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A cookie-collecting HTTP session.
///
/// Wraps a blocking client around a shared [`CookieJar`] so every request
/// accumulates cookies, and exposes the jar for export. One session is owned
/// by one visit/login flow at a time; requests within a flow are strictly
/// sequential.
pub struct CookieSession {
    client: Client,
    jar: Arc<CookieJar>,
}

impl CookieSession {
    pub fn new() -> Result<Self> {
        Self::with_jar(Arc::new(CookieJar::new()))
    }

    pub fn with_jar(jar: Arc<CookieJar>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self { client, jar })
    }

    /// Create a session pre-loaded from a Netscape cookie file, when it
    /// exists.
    pub fn with_cookie_file(path: &Path) -> Result<Self> {
        let session = Self::new()?;
        if path.exists() {
            let records = cookies::load_netscape(path)
                .map_err(|e| CookieForgeError::cookie_file(e.to_string()))?;
            info!("loaded {} cookies from {}", records.len(), path.display());
            session.jar.merge(records);
        }
        Ok(session)
    }

    /// Persist the accumulated jar to a Netscape cookie file.
    pub fn save_cookie_file(&self, path: &Path) -> Result<()> {
        cookies::save_netscape(path, &self.jar.snapshot())
            .map_err(|e| CookieForgeError::cookie_file(e.to_string()))
    }

    /// Visit a URL, collecting whatever cookies it sets.
    pub fn visit(&self, url: &Url) -> Result<String> {
        debug!("visiting {}", url);
        let response = self.client.get(url.clone()).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(CookieForgeError::other(format!(
                "visit to {} returned HTTP {}",
                url, status
            )));
        }
        // Drain the body so the whole exchange, including trailing
        // Set-Cookie handling, completes.
        let _ = response.bytes()?;

        let total = self.jar.len();
        Ok(format!(
            "Visited {}. Jar now holds {} cookies.",
            url, total
        ))
    }

    /// Plain GET, for login handlers that classify responses themselves.
    pub fn get(&self, url: &str) -> reqwest::Result<Response> {
        self.client.get(url).send()
    }

    /// Form POST with an optional Referer, for login steps.
    pub fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        referer: Option<&str>,
    ) -> reqwest::Result<Response> {
        let mut request = self.client.post(url).form(form);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }
        request.send()
    }

    /// The shared cookie jar backing this session.
    pub fn jar(&self) -> &Arc<CookieJar> {
        &self.jar
    }
}
