// Google/YouTube login handler
//
// Drives the accounts.google.com multi-step flow: fetch the entry page,
// submit the identifier, submit the password, classify the final response.
// Tokens extracted at each step are single-use and feed the next step.

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::{LoginHandler, LoginOutcome};
use crate::core::session::CookieSession;

const SITE_NAME: &str = "youtube";
const LOGIN_URL: &str = "https://accounts.google.com/signin";
const LOOKUP_URL: &str = "https://accounts.google.com/signin/v1/lookup";
const PASSWORD_URL: &str = "https://accounts.google.com/signin/challenge/pwd";
const YOUTUBE_URL: &str = "https://www.youtube.com";

/// Markers checked against lowercased response bodies.
const IDENTIFIER_ERROR_MARKERS: &[&str] = &[
    "couldn't find your google account",
    "enter a valid email",
    "this email address doesn't match",
];

const PASSWORD_ERROR_MARKERS: &[&str] = &[
    "wrong password",
    "incorrect password",
    "couldn't sign you in",
    "password is incorrect",
];

const TWO_FACTOR_MARKERS: &[&str] = &[
    "verify it's you",
    "two-step verification",
    "2-step verification",
    "verify your identity",
    "security code",
];

const RATE_LIMIT_MARKERS: &[&str] = &["too many attempts", "try again later"];

/// Hosts a successful password step redirects to.
const AUTHENTICATED_HOSTS: &[&str] = &[
    "myaccount.google.com",
    "accounts.youtube.com",
    "www.youtube.com",
    "www.google.com",
];

/// Session cookies Google sets once authenticated.
const AUTH_COOKIE_NAMES: &[&str] = &["SID", "HSID", "SSID", "APISID", "SAPISID"];

/// Indicators of a signed-in YouTube page (lowercased).
const LOGGED_IN_MARKERS: &[&str] = &[
    "\"signed_in\":true",
    "\"issignedin\":true",
    "id=\"avatar-btn\"",
    "aria-label=\"account menu\"",
];

static FLOW_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""flowName":"([^"]+)""#).expect("flowName regex"));
static FLOW_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""flowEntry":"([^"]+)""#).expect("flowEntry regex"));

/// Anti-automation tokens scraped from one step's page, consumed by the next
/// step's request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct FlowTokens {
    flow_name: Option<String>,
    flow_entry: Option<String>,
    tl_token: Option<String>,
}

impl FlowTokens {
    /// Prefer freshly extracted tokens, falling back to the previous step's.
    fn refreshed_from(&self, fresh: FlowTokens) -> FlowTokens {
        FlowTokens {
            flow_name: fresh.flow_name.or_else(|| self.flow_name.clone()),
            flow_entry: fresh.flow_entry.or_else(|| self.flow_entry.clone()),
            tl_token: fresh.tl_token.or_else(|| self.tl_token.clone()),
        }
    }
}

/// Login progress. Transitions are strictly forward; any page that cannot be
/// classified deterministically terminates with `HandlerError`.
enum LoginState {
    Start,
    IdentifierSubmitted {
        tokens: FlowTokens,
    },
    PasswordSubmitted {
        status: u16,
        final_host: String,
        body: String,
    },
    Terminal(LoginOutcome),
}

pub struct YouTubeLoginHandler;

impl YouTubeLoginHandler {
    pub fn new() -> Self {
        Self
    }

    /// Step 1 + 2: fetch the entry page, extract tokens, submit the
    /// identifier, and re-extract fresh tokens from the response.
    fn submit_identifier(&self, session: &CookieSession, username: &str) -> LoginState {
        let body = match fetch_text(session, LOGIN_URL) {
            Ok((_, _, body)) => body,
            Err(detail) => {
                return LoginState::Terminal(LoginOutcome::HandlerError(format!(
                    "failed to load login page: {}",
                    detail
                )))
            }
        };
        let tokens = extract_tokens(&body);
        debug!("extracted entry-page tokens: {:?}", tokens);

        let flow_name = tokens.flow_name.as_deref().unwrap_or("GlifWebSignIn");
        let flow_entry = tokens.flow_entry.as_deref().unwrap_or("ServiceLogin");
        let mut form: Vec<(&str, &str)> = vec![
            ("Email", username),
            ("flowName", flow_name),
            ("flowEntry", flow_entry),
        ];
        if let Some(tl) = tokens.tl_token.as_deref() {
            form.push(("TL", tl));
        }

        let response = match session.post_form(LOOKUP_URL, &form, Some(LOGIN_URL)) {
            Ok(response) => response,
            Err(e) => {
                return LoginState::Terminal(LoginOutcome::HandlerError(format!(
                    "identifier submission failed: {}",
                    e
                )))
            }
        };
        let status = response.status().as_u16();
        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                return LoginState::Terminal(LoginOutcome::HandlerError(format!(
                    "unreadable identifier response: {}",
                    e
                )))
            }
        };

        if let Some(outcome) = classify_identifier_response(status, &body) {
            return LoginState::Terminal(outcome);
        }

        LoginState::IdentifierSubmitted {
            tokens: tokens.refreshed_from(extract_tokens(&body)),
        }
    }

    /// Step 3: submit the password with the refreshed tokens and the cookies
    /// accumulated so far.
    fn submit_password(
        &self,
        session: &CookieSession,
        password: &str,
        tokens: FlowTokens,
    ) -> LoginState {
        let flow_name = tokens.flow_name.as_deref().unwrap_or("GlifWebSignIn");
        let flow_entry = tokens.flow_entry.as_deref().unwrap_or("ServiceLogin");
        let mut form: Vec<(&str, &str)> = vec![
            ("Passwd", password),
            ("flowName", flow_name),
            ("flowEntry", flow_entry),
        ];
        if let Some(tl) = tokens.tl_token.as_deref() {
            form.push(("TL", tl));
        }

        let response =
            match session.post_form(PASSWORD_URL, &form, Some("https://accounts.google.com/")) {
                Ok(response) => response,
                Err(e) => {
                    return LoginState::Terminal(LoginOutcome::HandlerError(format!(
                        "password submission failed: {}",
                        e
                    )))
                }
            };

        let status = response.status().as_u16();
        let final_host = response
            .url()
            .host_str()
            .unwrap_or_default()
            .to_lowercase();
        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                return LoginState::Terminal(LoginOutcome::HandlerError(format!(
                    "unreadable password response: {}",
                    e
                )))
            }
        };

        LoginState::PasswordSubmitted {
            status,
            final_host,
            body,
        }
    }
}

impl Default for YouTubeLoginHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginHandler for YouTubeLoginHandler {
    fn site_name(&self) -> &'static str {
        SITE_NAME
    }

    fn login(&self, session: &CookieSession, username: &str, password: &str) -> LoginOutcome {
        debug!("starting login flow for {}", SITE_NAME);
        let mut state = LoginState::Start;
        loop {
            state = match state {
                LoginState::Start => self.submit_identifier(session, username),
                LoginState::IdentifierSubmitted { tokens } => {
                    self.submit_password(session, password, tokens)
                }
                LoginState::PasswordSubmitted {
                    status,
                    final_host,
                    body,
                } => LoginState::Terminal(classify_password_response(status, &final_host, &body)),
                LoginState::Terminal(outcome) => {
                    debug!("login flow for {} finished: {}", SITE_NAME, outcome);
                    return outcome;
                }
            };
        }
    }

    fn is_logged_in(&self, session: &CookieSession) -> bool {
        let jar = session.jar();
        let has_auth_cookie = AUTH_COOKIE_NAMES.iter().any(|name| {
            jar.contains("www.google.com", name) || jar.contains("www.youtube.com", name)
        });
        if !has_auth_cookie {
            debug!("no google auth cookies present");
            return false;
        }

        match fetch_text(session, YOUTUBE_URL) {
            Ok((status, _, body)) if (200..300).contains(&status) => {
                let body = body.to_lowercase();
                LOGGED_IN_MARKERS.iter().any(|marker| body.contains(marker))
            }
            Ok(_) => false,
            Err(detail) => {
                warn!("login probe failed: {}", detail);
                false
            }
        }
    }
}

/// GET a page and return (status, final host, body text).
fn fetch_text(session: &CookieSession, url: &str) -> std::result::Result<(u16, String, String), String> {
    let response = session.get(url).map_err(|e| e.to_string())?;
    let status = response.status().as_u16();
    let host = response
        .url()
        .host_str()
        .unwrap_or_default()
        .to_lowercase();
    let body = response.text().map_err(|e| e.to_string())?;
    Ok((status, host, body))
}

/// Pull flow tokens out of a response page: hidden form fields first, then
/// the JSON blobs Google embeds in page scripts.
fn extract_tokens(body: &str) -> FlowTokens {
    let mut tokens = FlowTokens::default();

    let document = Html::parse_document(body);
    let hidden_inputs = match Selector::parse(r#"input[type="hidden"]"#) {
        Ok(selector) => selector,
        Err(e) => {
            warn!("hidden input selector failed to parse: {:?}", e);
            return tokens;
        }
    };
    for element in document.select(&hidden_inputs) {
        let (Some(name), Some(value)) = (element.value().attr("name"), element.value().attr("value"))
        else {
            continue;
        };
        match name {
            "flowName" => tokens.flow_name = Some(value.to_string()),
            "flowEntry" => tokens.flow_entry = Some(value.to_string()),
            "TL" => tokens.tl_token = Some(value.to_string()),
            _ => {}
        }
    }

    if tokens.flow_name.is_none() {
        tokens.flow_name = FLOW_NAME_RE
            .captures(body)
            .map(|c| c[1].to_string());
    }
    if tokens.flow_entry.is_none() {
        tokens.flow_entry = FLOW_ENTRY_RE
            .captures(body)
            .map(|c| c[1].to_string());
    }

    tokens
}

/// Classify the identifier-step response. `None` means proceed to the
/// password step.
fn classify_identifier_response(status: u16, body: &str) -> Option<LoginOutcome> {
    let body = body.to_lowercase();

    if IDENTIFIER_ERROR_MARKERS.iter().any(|m| body.contains(m)) {
        return Some(LoginOutcome::InvalidCredentials);
    }
    if status == 429 || RATE_LIMIT_MARKERS.iter().any(|m| body.contains(m)) {
        return Some(LoginOutcome::RateLimited);
    }
    if !(200..400).contains(&status) {
        return Some(LoginOutcome::HandlerError(format!(
            "identifier submission returned HTTP {}",
            status
        )));
    }
    None
}

/// Classify the password-step response into the terminal outcome.
///
/// Marker checks come first; a success requires landing on an authenticated
/// surface with none of the negative markers present. Anything else is a
/// handler error, never an optimistic pass.
fn classify_password_response(status: u16, final_host: &str, body: &str) -> LoginOutcome {
    let body = body.to_lowercase();

    if TWO_FACTOR_MARKERS.iter().any(|m| body.contains(m)) {
        return LoginOutcome::TwoFactorRequired;
    }
    if PASSWORD_ERROR_MARKERS.iter().any(|m| body.contains(m)) {
        return LoginOutcome::InvalidCredentials;
    }
    if status == 429 || RATE_LIMIT_MARKERS.iter().any(|m| body.contains(m)) {
        return LoginOutcome::RateLimited;
    }
    if (200..400).contains(&status) && AUTHENTICATED_HOSTS.contains(&final_host) {
        return LoginOutcome::Success;
    }

    LoginOutcome::HandlerError(format!(
        "unclassifiable password response: HTTP {} from {}",
        status, final_host
    ))
}
