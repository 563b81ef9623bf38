use anyhow::Result;
use colored::Colorize;

use crate::core::login::LoginHandlerRegistry;

/// `sites` - list sites with a registered login handler
pub fn execute(_matches: &clap::ArgMatches) -> Result<()> {
    let registry = LoginHandlerRegistry::with_defaults();

    println!("{}", "Sites with automated login support:".white().bold());
    for site in registry.supported_sites() {
        println!("  {}", site.cyan());
    }
    println!();
    println!(
        "{}",
        "Use: cookie-forge visit <url> --login <site>".dimmed()
    );
    Ok(())
}
