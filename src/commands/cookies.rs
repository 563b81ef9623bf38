use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use crate::core::cookies::{self, CookieRecord};
use crate::core::Config;
use crate::ui::prompts;

fn cookie_path(matches: &clap::ArgMatches, config: &Config) -> PathBuf {
    matches
        .get_one::<String>("cookie-file")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.cookie_file_path())
}

fn load(matches: &clap::ArgMatches, config: &Config) -> Result<(PathBuf, Vec<CookieRecord>)> {
    let path = cookie_path(matches, config);
    if !path.exists() {
        return Ok((path, Vec::new()));
    }
    let records = cookies::load_netscape(&path)?;
    Ok((path, records))
}

/// `cookies list`
pub fn list(matches: &clap::ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let (path, records) = load(matches, &config)?;

    if records.is_empty() {
        prompts::info(&format!("No cookies in {}.", path.display()));
        return Ok(());
    }

    println!("{}", format!("{} cookies in {}:", records.len(), path.display()).white().bold());
    for (index, cookie) in records.iter().enumerate() {
        let value = if cookie.value.len() > 50 {
            format!("{}...", &cookie.value[..50])
        } else {
            cookie.value.clone()
        };
        println!("{}. {} = {}", index + 1, cookie.name.cyan().bold(), value);
        println!(
            "   {}",
            format!(
                "Domain: {}, Path: {}, Secure: {}, HttpOnly: {}",
                cookie.domain, cookie.path, cookie.secure, cookie.http_only
            )
            .dimmed()
        );
    }

    Ok(())
}

/// `cookies export [--format netscape|json] [--output <path>]`
pub fn export(matches: &clap::ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let (path, records) = load(matches, &config)?;

    if records.is_empty() {
        prompts::warn("no cookies to export; visit a site first");
        return Ok(());
    }

    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("netscape");

    let out = match matches.get_one::<String>("output") {
        Some(output) => PathBuf::from(output),
        None => default_export_path(&path, format),
    };

    match format {
        "json" => cookies::export_json(&out, &records)?,
        "netscape" => cookies::save_netscape(&out, &records)?,
        other => anyhow::bail!("unknown export format '{}' (use netscape or json)", other),
    }

    prompts::success(&format!("Exported {} cookies to {}", records.len(), out.display()));
    if format == "netscape" {
        prompts::dimmed(&format!("Use with yt-dlp: yt-dlp --cookies {} <url>", out.display()));
    }
    Ok(())
}

/// `cookies clear`
pub fn clear(matches: &clap::ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let path = cookie_path(matches, &config);

    if !path.exists() {
        prompts::info("No cookie file to clear.");
        return Ok(());
    }
    if !prompts::confirm("Clear all cookies? (y/N):")? {
        prompts::info("Operation cancelled.");
        return Ok(());
    }

    fs::remove_file(&path).with_context(|| format!("failed to remove {}", path.display()))?;
    prompts::success("All cookies cleared.");
    Ok(())
}

/// Derived export path next to the working cookie file, in the shape the
/// original tool used (`cookies.txt` -> `cookies_ytdlp.txt`).
fn default_export_path(cookie_file: &PathBuf, format: &str) -> PathBuf {
    let stem = cookie_file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "cookies".to_string());
    let extension = if format == "json" { "json" } else { "txt" };
    cookie_file.with_file_name(format!("{}_ytdlp.{}", stem, extension))
}
