use anyhow::{Context, Result};
use colored::Colorize;

use crate::core::Config;
use crate::ui::prompts;

/// `config set <key> <value>`
pub fn handle_set(matches: &clap::ArgMatches) -> Result<()> {
    let key = matches
        .get_one::<String>("key")
        .context("key argument is required")?;
    let value = matches
        .get_one::<String>("value")
        .context("value argument is required")?;

    let mut config = Config::load()?;
    match key.as_str() {
        "cookie-file" => config.set_cookie_file(value.clone()),
        "credential-dir" => config.set_credential_dir(value.clone()),
        "ytdlp-path" => config.set_yt_dlp_path(value.clone()),
        other => anyhow::bail!(
            "unknown config key '{}' (use cookie-file, credential-dir, or ytdlp-path)",
            other
        ),
    }
    config.save()?;

    prompts::success(&format!("✓ {} set to {}", key, value));
    Ok(())
}

/// `config show`
pub fn handle_show(_matches: &clap::ArgMatches) -> Result<()> {
    let config = Config::load()?;

    println!("{}", "Configuration:".white().bold());
    print_entry("cookie-file", config.cookie_file.as_deref());
    print_entry("credential-dir", config.credential_dir.as_deref());
    print_entry("ytdlp-path", config.yt_dlp_path.as_deref());
    Ok(())
}

fn print_entry(key: &str, value: Option<&str>) {
    match value {
        Some(value) => println!("  {}: {}", key, value.cyan()),
        None => println!("  {}: {}", key, "(default)".dimmed()),
    }
}
