use cookie_forge::core::credentials::CredentialManager;
use cookie_forge::core::login::{LoginHandler, LoginHandlerRegistry, LoginOutcome};
use cookie_forge::core::orchestrator::SessionOrchestrator;
use cookie_forge::core::session::CookieSession;
use cookie_forge::error::CookieForgeError;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;
use url::Url;

/// Minimal scripted HTTP server: fixed response per path, one request per
/// connection.
fn spawn_server(routes: Vec<(&'static str, Vec<&'static str>, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let routes: HashMap<String, (Vec<String>, String)> = routes
        .into_iter()
        .map(|(path, headers, body)| {
            (
                path.to_string(),
                (
                    headers.into_iter().map(str::to_string).collect(),
                    body.to_string(),
                ),
            )
        })
        .collect();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            serve_one(stream, &routes);
        }
    });

    base
}

fn serve_one(mut stream: TcpStream, routes: &HashMap<String, (Vec<String>, String)>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    // Read the full header block.
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let header_end = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|p| p + 4)
        .unwrap_or(buf.len());
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();

    // Drain any request body so the client never sees a reset mid-write.
    let content_length = head
        .lines()
        .find_map(|line| {
            line.to_ascii_lowercase()
                .strip_prefix("content-length:")
                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
        })
        .unwrap_or(0);
    let mut body_read = buf.len() - header_end;
    while body_read < content_length {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => body_read += n,
        }
    }

    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let response = match routes.get(&path) {
        Some((headers, body)) => {
            let mut out = String::from("HTTP/1.1 200 OK\r\n");
            for header in headers {
                out.push_str(header);
                out.push_str("\r\n");
            }
            out.push_str(&format!(
                "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            ));
            out
        }
        None => {
            "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found"
                .to_string()
        }
    };
    let _ = stream.write_all(response.as_bytes());
}

/// Two-step scripted handler: fetch a token page, then submit the
/// credentials with the token.
struct ScriptedLoginHandler {
    base_url: String,
    seen_username: Arc<Mutex<Option<String>>>,
}

impl ScriptedLoginHandler {
    fn new(base_url: String) -> Self {
        Self {
            base_url,
            seen_username: Arc::new(Mutex::new(None)),
        }
    }
}

impl LoginHandler for ScriptedLoginHandler {
    fn site_name(&self) -> &'static str {
        "mocksite"
    }

    fn login(&self, session: &CookieSession, username: &str, password: &str) -> LoginOutcome {
        *self.seen_username.lock().unwrap() = Some(username.to_string());

        let step1 = match session.get(&format!("{}/login/step1", self.base_url)) {
            Ok(response) => response,
            Err(e) => return LoginOutcome::HandlerError(format!("step1 failed: {}", e)),
        };
        let token = match step1.text() {
            Ok(body) => body.trim().to_string(),
            Err(e) => return LoginOutcome::HandlerError(format!("step1 unreadable: {}", e)),
        };
        if token.is_empty() {
            return LoginOutcome::HandlerError("no token in step1 page".to_string());
        }

        let form = [("user", username), ("pass", password), ("token", token.as_str())];
        let step2 = match session.post_form(&format!("{}/login/step2", self.base_url), &form, None)
        {
            Ok(response) => response,
            Err(e) => return LoginOutcome::HandlerError(format!("step2 failed: {}", e)),
        };
        let body = step2.text().unwrap_or_default();
        if body.contains("granted") {
            LoginOutcome::Success
        } else if body.contains("denied") {
            LoginOutcome::InvalidCredentials
        } else {
            LoginOutcome::HandlerError("unclassifiable step2 response".to_string())
        }
    }

    fn is_logged_in(&self, session: &CookieSession) -> bool {
        session.jar().contains("127.0.0.1", "mock_session")
    }
}

/// Handler that returns a fixed outcome without touching the network.
struct StaticOutcomeHandler(LoginOutcome);

impl LoginHandler for StaticOutcomeHandler {
    fn site_name(&self) -> &'static str {
        "mocksite"
    }

    fn login(&self, _session: &CookieSession, _username: &str, _password: &str) -> LoginOutcome {
        self.0.clone()
    }

    fn is_logged_in(&self, _session: &CookieSession) -> bool {
        false
    }
}

fn scripted_server() -> String {
    spawn_server(vec![
        (
            "/login/step1",
            vec!["Set-Cookie: flow_token=tok-123; Path=/"],
            "tok-123",
        ),
        (
            "/login/step2",
            vec!["Set-Cookie: mock_session=authed; Path=/"],
            "access granted",
        ),
        (
            "/landing",
            vec!["Set-Cookie: post_login=yes; Path=/"],
            "<html>welcome back</html>",
        ),
    ])
}

#[test]
fn test_unknown_site_fails_without_network() {
    let dir = TempDir::new().unwrap();
    let manager = CredentialManager::encrypted_only(dir.path()).unwrap();
    let orchestrator = SessionOrchestrator::new(manager);
    let session = CookieSession::new().unwrap();

    // Unroutable port: any network attempt would error differently.
    let url = Url::parse("http://127.0.0.1:9/").unwrap();
    let err = orchestrator
        .visit_with_login(&session, &url, "unknown-site", None, None)
        .unwrap_err();

    match err {
        CookieForgeError::UnsupportedSite { site, supported } => {
            assert_eq!(site, "unknown-site");
            assert!(supported.contains("youtube"));
        }
        other => panic!("expected UnsupportedSite, got {:?}", other),
    }
    assert!(session.jar().is_empty());
}

#[test]
fn test_missing_credentials_fails_before_login() {
    let dir = TempDir::new().unwrap();
    let manager = CredentialManager::encrypted_only(dir.path()).unwrap();

    let mut registry = LoginHandlerRegistry::empty();
    registry.register(Box::new(StaticOutcomeHandler(LoginOutcome::Success)));
    let orchestrator = SessionOrchestrator::with_registry(manager, registry);
    let session = CookieSession::new().unwrap();

    let url = Url::parse("http://127.0.0.1:9/").unwrap();
    let err = orchestrator
        .visit_with_login(&session, &url, "mocksite", None, None)
        .unwrap_err();
    assert!(matches!(err, CookieForgeError::MissingCredentials(_)));
}

#[test]
fn test_scripted_login_collects_post_login_cookies() {
    let base = scripted_server();

    let dir = TempDir::new().unwrap();
    let manager = CredentialManager::encrypted_only(dir.path()).unwrap();
    manager
        .save_credential("mocksite", "alice", "correct-horse")
        .unwrap();

    let mut registry = LoginHandlerRegistry::empty();
    registry.register(Box::new(ScriptedLoginHandler::new(base.clone())));
    let orchestrator = SessionOrchestrator::with_registry(manager, registry);

    let session = CookieSession::new().unwrap();
    let landing = Url::parse(&format!("{}/landing", base)).unwrap();
    let message = orchestrator
        .visit_with_login(&session, &landing, "mocksite", None, None)
        .unwrap();

    assert!(message.contains("mocksite"));
    // Cookies from both login steps and from the post-login navigation.
    let jar = session.jar();
    assert!(jar.contains("127.0.0.1", "flow_token"));
    assert!(jar.contains("127.0.0.1", "mock_session"));
    assert!(jar.contains("127.0.0.1", "post_login"));
}

#[test]
fn test_explicit_credentials_win_over_stored() {
    let base = scripted_server();

    let dir = TempDir::new().unwrap();
    let manager = CredentialManager::encrypted_only(dir.path()).unwrap();
    manager
        .save_credential("mocksite", "stored-user", "stored-pass")
        .unwrap();

    let handler = ScriptedLoginHandler::new(base.clone());
    let seen_username = Arc::clone(&handler.seen_username);
    let mut registry = LoginHandlerRegistry::empty();
    registry.register(Box::new(handler));
    let orchestrator = SessionOrchestrator::with_registry(manager, registry);

    let session = CookieSession::new().unwrap();
    let landing = Url::parse(&format!("{}/landing", base)).unwrap();
    orchestrator
        .visit_with_login(
            &session,
            &landing,
            "mocksite",
            Some("explicit-user"),
            Some("pw"),
        )
        .unwrap();

    let seen = seen_username.lock().unwrap().clone();
    assert_eq!(seen.as_deref(), Some("explicit-user"));
}

#[test]
fn test_non_success_outcome_stops_the_flow() {
    let dir = TempDir::new().unwrap();
    let manager = CredentialManager::encrypted_only(dir.path()).unwrap();
    manager.save_credential("mocksite", "u", "p").unwrap();

    for (outcome, expected_fragment) in [
        (LoginOutcome::InvalidCredentials, "invalid"),
        (LoginOutcome::TwoFactorRequired, "two-factor"),
        (LoginOutcome::RateLimited, "rate limited"),
        (
            LoginOutcome::HandlerError("no such page".to_string()),
            "no such page",
        ),
    ] {
        let mut registry = LoginHandlerRegistry::empty();
        registry.register(Box::new(StaticOutcomeHandler(outcome)));
        let manager = CredentialManager::encrypted_only(dir.path()).unwrap();
        let orchestrator = SessionOrchestrator::with_registry(manager, registry);

        let session = CookieSession::new().unwrap();
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let err = orchestrator
            .visit_with_login(&session, &url, "mocksite", None, None)
            .unwrap_err();

        assert!(matches!(err, CookieForgeError::Login(_)));
        assert!(
            err.to_string().to_lowercase().contains(expected_fragment),
            "{} should mention '{}'",
            err,
            expected_fragment
        );
        // The target URL was never fetched.
        assert!(session.jar().is_empty());
    }
}
