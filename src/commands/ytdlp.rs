use anyhow::{Context, Result};
use std::path::PathBuf;
use url::Url;

use crate::core::session::CookieSession;
use crate::core::validation;
use crate::core::ytdlp::{self, YtDlp};
use crate::core::Config;
use crate::ui::prompts;

fn parse_urls(matches: &clap::ArgMatches) -> Result<Vec<Url>> {
    matches
        .get_many::<String>("urls")
        .context("at least one URL is required")?
        .map(|raw| validation::validate_url(raw))
        .collect()
}

/// `ytdlp download <url> [--output <template>] [-- <extra args>]`
pub fn download(matches: &clap::ArgMatches) -> Result<()> {
    let url_arg = matches
        .get_one::<String>("url")
        .context("URL argument is required")?;
    let url = validation::validate_url(url_arg)?;

    let config = Config::load()?;
    let runner = YtDlp::locate(&config)?;
    let cookie_path = config.cookie_file_path();

    let session = CookieSession::with_cookie_file(&cookie_path)?;
    if matches.get_flag("no-visit") {
        prompts::dimmed("Skipping pre-visit; using existing cookies.");
        session.save_cookie_file(&cookie_path)?;
    } else {
        prompts::info(&format!("Collecting cookies from {}...", url));
        ytdlp::prepare_cookies(&session, std::slice::from_ref(&url), &cookie_path)?;
    }

    let output = matches.get_one::<String>("output").map(String::as_str);
    let extra_args: Vec<String> = matches
        .get_many::<String>("args")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    prompts::info(&format!("Downloading {} with yt-dlp...", url));
    runner.download(&url, &cookie_path, output, &extra_args)?;
    prompts::success("✓ Download finished");
    Ok(())
}

/// `ytdlp prepare <urls...> [--output-file <path>]`
pub fn prepare(matches: &clap::ArgMatches) -> Result<()> {
    let urls = parse_urls(matches)?;

    let config = Config::load()?;
    let out = matches
        .get_one::<String>("output-file")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("cookies_for_ytdlp.txt"));

    let session = CookieSession::with_cookie_file(&config.cookie_file_path())?;
    prompts::info(&format!("Visiting {} URL(s) to collect cookies...", urls.len()));
    let path = ytdlp::prepare_cookies(&session, &urls, &out)?;

    prompts::success(&format!("✓ Cookie file ready: {}", path.display()));
    prompts::dimmed(&format!("Use with yt-dlp: yt-dlp --cookies {} <url>", path.display()));
    Ok(())
}

/// `ytdlp write-config <urls...> [--config-path <path>]`
pub fn write_config(matches: &clap::ArgMatches) -> Result<()> {
    let urls = parse_urls(matches)?;

    let config = Config::load()?;
    let config_path = matches
        .get_one::<String>("config-path")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("ytdlp_config.conf"));

    let cookie_path = config.cookie_file_path();
    let session = CookieSession::with_cookie_file(&cookie_path)?;
    ytdlp::prepare_cookies(&session, &urls, &cookie_path)?;
    ytdlp::write_config_file(&cookie_path, &config_path)?;

    prompts::success(&format!("✓ yt-dlp config written to {}", config_path.display()));
    Ok(())
}
