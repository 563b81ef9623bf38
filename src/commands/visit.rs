use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::core::orchestrator::SessionOrchestrator;
use crate::core::session::CookieSession;
use crate::core::validation;
use crate::core::Config;
use crate::ui::prompts;

/// `visit <url> [--login <site>] [--username <u>] [--password <p>]`
pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let url_arg = matches
        .get_one::<String>("url")
        .context("URL argument is required")?;
    let url = validation::validate_url(url_arg)?;

    let config = Config::load()?;
    let cookie_path = matches
        .get_one::<String>("cookie-file")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.cookie_file_path());

    let session = CookieSession::with_cookie_file(&cookie_path)?;

    if let Some(site) = matches.get_one::<String>("login") {
        let username = matches.get_one::<String>("username").map(String::as_str);
        let mut password = matches.get_one::<String>("password").cloned();
        if password.is_none() {
            if let Some(username) = username {
                password = Some(prompts::password(&format!("Password for {}", username))?);
            }
        }

        let manager = super::credential_manager(&config)?;
        let orchestrator = SessionOrchestrator::new(manager);

        prompts::info(&format!("Logging in to {} and visiting {}...", site, url));
        let message =
            orchestrator.visit_with_login(&session, &url, site, username, password.as_deref())?;
        prompts::success(&message);
    } else {
        prompts::info(&format!("Visiting {}...", url));
        let message = session.visit(&url)?;
        prompts::success(&message);
    }

    session.save_cookie_file(&cookie_path)?;
    prompts::dimmed(&format!("Cookies saved to {}", cookie_path.display()));

    Ok(())
}
