use anyhow::{Context, Result};
use colored::Colorize;

use crate::core::Config;
use crate::ui::prompts;

/// `cred save <site> [--username <u>]`
///
/// The password is always prompted hidden; it never appears in shell
/// history or process listings.
pub fn save(matches: &clap::ArgMatches) -> Result<()> {
    let site = matches
        .get_one::<String>("site")
        .context("site argument is required")?;

    let username = match matches.get_one::<String>("username") {
        Some(username) => username.clone(),
        None => prompts::input(&format!("Username for {}", site))?,
    };
    let password = prompts::password(&format!("Password for {} on {}", username, site))?;

    let config = Config::load()?;
    let manager = super::credential_manager(&config)?;
    manager.save_credential(site, &username, &password)?;

    let info = manager.storage_info();
    let backend = if info.using_native_store {
        "OS secret store"
    } else {
        "encrypted file storage"
    };
    prompts::success(&format!("✓ Credentials for {} saved to the {}", site, backend));
    Ok(())
}

/// `cred list`
pub fn list(_matches: &clap::ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let manager = super::credential_manager(&config)?;

    let sites = manager.list_sites()?;
    if sites.is_empty() {
        prompts::info("No stored credentials.");
        return Ok(());
    }

    println!("{}", "Sites with stored credentials:".white().bold());
    for site in sites {
        println!("  {}", site.cyan());
    }
    Ok(())
}

/// `cred delete <site>`
pub fn delete(matches: &clap::ArgMatches) -> Result<()> {
    let site = matches
        .get_one::<String>("site")
        .context("site argument is required")?;

    if !prompts::confirm(&format!("Delete credentials for {}? (y/N):", site))? {
        prompts::info("Operation cancelled.");
        return Ok(());
    }

    let config = Config::load()?;
    let manager = super::credential_manager(&config)?;

    if manager.delete_credential(site)? {
        prompts::success(&format!("✓ Deleted credentials for {}", site));
    } else {
        prompts::warn(&format!("no stored credentials for {}", site));
    }
    Ok(())
}

/// `cred info`
pub fn info(_matches: &clap::ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let manager = super::credential_manager(&config)?;
    let info = manager.storage_info();

    println!("{}", "Credential storage:".white().bold());
    println!(
        "  Native OS secret store: {}",
        if info.using_native_store { "active".green() } else { "unavailable".yellow() }
    );
    println!(
        "  Encrypted file fallback: {}",
        if info.using_encrypted_fallback { "active".green() } else { "standby".dimmed() }
    );
    println!("  Location: {}", info.storage_location.cyan());
    Ok(())
}
