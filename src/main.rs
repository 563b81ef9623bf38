use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use cookie_forge::commands;
use cookie_forge::ui::prompts;

fn main() -> Result<()> {
    cookie_forge::init_logging();

    let matches = Command::new("cookie-forge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Cookie collection utility with authenticated login flows and yt-dlp integration")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("visit")
                .about("Visit a website and collect its cookies")
                .arg(
                    Arg::new("url")
                        .help("Website URL to visit")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("login")
                        .short('l')
                        .long("login")
                        .value_name("SITE")
                        .help("Log in to this site before visiting (see 'sites')"),
                )
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .value_name("USERNAME")
                        .help("Username for the login (prompts for password)"),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .value_name("PASSWORD")
                        .help("Password for the login (prefer the hidden prompt)"),
                )
                .arg(
                    Arg::new("cookie-file")
                        .short('c')
                        .long("cookie-file")
                        .value_name("FILE")
                        .help("Cookie file to load and save (default: cookies.txt)"),
                ),
        )
        .subcommand(
            Command::new("cookies")
                .about("Inspect and export collected cookies")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .arg(
                    Arg::new("cookie-file")
                        .short('c')
                        .long("cookie-file")
                        .value_name("FILE")
                        .global(true)
                        .help("Cookie file to operate on (default: cookies.txt)"),
                )
                .subcommand(Command::new("list").about("List all collected cookies"))
                .subcommand(
                    Command::new("export")
                        .about("Export cookies for yt-dlp")
                        .arg(
                            Arg::new("format")
                                .short('f')
                                .long("format")
                                .value_name("FORMAT")
                                .value_parser(["netscape", "json"])
                                .default_value("netscape")
                                .help("Export format"),
                        )
                        .arg(
                            Arg::new("output")
                                .short('o')
                                .long("output")
                                .value_name("FILE")
                                .help("Output path (default: derived from the cookie file)"),
                        ),
                )
                .subcommand(Command::new("clear").about("Delete the cookie file")),
        )
        .subcommand(
            Command::new("cred")
                .about("Manage stored site credentials")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("save")
                        .about("Store credentials for a site (password prompted hidden)")
                        .arg(
                            Arg::new("site")
                                .help("Site identifier, e.g. youtube")
                                .required(true)
                                .index(1),
                        )
                        .arg(
                            Arg::new("username")
                                .short('u')
                                .long("username")
                                .value_name("USERNAME")
                                .help("Username (prompted when omitted)"),
                        ),
                )
                .subcommand(Command::new("list").about("List sites with stored credentials"))
                .subcommand(
                    Command::new("delete")
                        .about("Delete stored credentials for a site")
                        .arg(
                            Arg::new("site")
                                .help("Site identifier")
                                .required(true)
                                .index(1),
                        ),
                )
                .subcommand(Command::new("info").about("Show which storage backend is in use")),
        )
        .subcommand(Command::new("sites").about("List sites with automated login support"))
        .subcommand(
            Command::new("ytdlp")
                .about("Prepare cookies for yt-dlp and run downloads")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("download")
                        .about("Collect cookies for a URL and download it with yt-dlp")
                        .arg(
                            Arg::new("url")
                                .help("URL to download")
                                .required(true)
                                .index(1),
                        )
                        .arg(
                            Arg::new("output")
                                .short('o')
                                .long("output")
                                .value_name("TEMPLATE")
                                .help("yt-dlp output template"),
                        )
                        .arg(
                            Arg::new("no-visit")
                                .long("no-visit")
                                .action(ArgAction::SetTrue)
                                .help("Skip visiting the URL first; use existing cookies"),
                        )
                        .arg(
                            Arg::new("args")
                                .help("Extra arguments passed through to yt-dlp")
                                .num_args(0..)
                                .last(true),
                        ),
                )
                .subcommand(
                    Command::new("prepare")
                        .about("Visit URLs and write a cookie file for yt-dlp")
                        .arg(
                            Arg::new("urls")
                                .help("URLs to visit")
                                .required(true)
                                .num_args(1..),
                        )
                        .arg(
                            Arg::new("output-file")
                                .short('o')
                                .long("output-file")
                                .value_name("FILE")
                                .help("Cookie file to write (default: cookies_for_ytdlp.txt)"),
                        ),
                )
                .subcommand(
                    Command::new("write-config")
                        .about("Generate a yt-dlp config file wired to the cookie file")
                        .arg(
                            Arg::new("urls")
                                .help("URLs to visit for cookies")
                                .required(true)
                                .num_args(1..),
                        )
                        .arg(
                            Arg::new("config-path")
                                .long("config-path")
                                .value_name("FILE")
                                .help("Config file to write (default: ytdlp_config.conf)"),
                        ),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Get or set tool configuration")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("set")
                        .about("Set a configuration value")
                        .arg(
                            Arg::new("key")
                                .help("cookie-file, credential-dir, or ytdlp-path")
                                .required(true)
                                .index(1),
                        )
                        .arg(Arg::new("value").help("Value to set").required(true).index(2)),
                )
                .subcommand(Command::new("show").about("Show the current configuration")),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("visit", sub_matches)) => commands::visit::execute(sub_matches),
        Some(("cookies", sub_matches)) => match sub_matches.subcommand() {
            Some(("list", m)) => commands::cookies::list(m),
            Some(("export", m)) => commands::cookies::export(m),
            Some(("clear", m)) => commands::cookies::clear(m),
            _ => unreachable!("subcommand required"),
        },
        Some(("cred", sub_matches)) => match sub_matches.subcommand() {
            Some(("save", m)) => commands::credentials::save(m),
            Some(("list", m)) => commands::credentials::list(m),
            Some(("delete", m)) => commands::credentials::delete(m),
            Some(("info", m)) => commands::credentials::info(m),
            _ => unreachable!("subcommand required"),
        },
        Some(("sites", sub_matches)) => commands::sites::execute(sub_matches),
        Some(("ytdlp", sub_matches)) => match sub_matches.subcommand() {
            Some(("download", m)) => commands::ytdlp::download(m),
            Some(("prepare", m)) => commands::ytdlp::prepare(m),
            Some(("write-config", m)) => commands::ytdlp::write_config(m),
            _ => unreachable!("subcommand required"),
        },
        Some(("config", sub_matches)) => match sub_matches.subcommand() {
            Some(("set", m)) => commands::config::handle_set(m),
            Some(("show", m)) => commands::config::handle_show(m),
            _ => unreachable!("subcommand required"),
        },
        _ => unreachable!("subcommand required"),
    };

    if let Err(e) = result {
        prompts::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
