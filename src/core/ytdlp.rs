use anyhow::{anyhow, Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use url::Url;

use crate::core::config::Config;
use crate::core::session::CookieSession;

/// Output template used when the caller gives none, matching yt-dlp's own
/// default naming.
const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Integration with an installed yt-dlp binary.
///
/// This tool prepares cookie files; yt-dlp does the downloading. The binary
/// is located through the config override first, then PATH.
#[derive(Debug)]
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    /// Locate the yt-dlp binary or fail with installation guidance.
    pub fn locate(config: &Config) -> Result<Self> {
        if let Some(configured) = config.get_yt_dlp_path() {
            let path = PathBuf::from(configured);
            if path.exists() {
                return Ok(Self { binary: path });
            }
            return Err(anyhow!(
                "configured yt-dlp path {} does not exist",
                path.display()
            ));
        }

        let binary = which::which("yt-dlp").context(
            "yt-dlp not found on PATH. Install it (e.g. 'pip install yt-dlp') or set its \
             location with 'cookie-forge config set-ytdlp <path>'",
        )?;
        Ok(Self { binary })
    }

    /// Whether a usable binary can be located.
    pub fn is_installed(config: &Config) -> bool {
        Self::locate(config).is_ok()
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary
    }

    /// Run yt-dlp against `url` with the prepared cookie file.
    pub fn download(
        &self,
        url: &Url,
        cookie_file: &Path,
        output: Option<&str>,
        extra_args: &[String],
    ) -> Result<()> {
        let args = build_args(cookie_file, url, output, extra_args);
        info!("running {} {}", self.binary.display(), args.join(" "));

        let status = Command::new(&self.binary)
            .args(&args)
            .status()
            .with_context(|| format!("failed to launch {}", self.binary.display()))?;

        if !status.success() {
            return Err(anyhow!(
                "yt-dlp exited with {}",
                status.code().map_or("signal".to_string(), |c| c.to_string())
            ));
        }
        Ok(())
    }
}

/// Argument list for a cookie-backed download. `--cookies` always comes
/// first so it is visible in logs and never shadowed by user args.
pub fn build_args(
    cookie_file: &Path,
    url: &Url,
    output: Option<&str>,
    extra_args: &[String],
) -> Vec<String> {
    let mut args = vec![
        "--cookies".to_string(),
        cookie_file.display().to_string(),
        "-o".to_string(),
        output.unwrap_or(DEFAULT_OUTPUT_TEMPLATE).to_string(),
    ];
    args.extend(extra_args.iter().cloned());
    args.push(url.to_string());
    args
}

/// Visit every URL with the session and export the jar as a Netscape file
/// for yt-dlp.
pub fn prepare_cookies(session: &CookieSession, urls: &[Url], out: &Path) -> Result<PathBuf> {
    for url in urls {
        if let Err(e) = session.visit(url) {
            // A single unreachable page should not sink the batch; yt-dlp
            // may still succeed with the cookies collected so far.
            log::warn!("could not visit {}: {}", url, e);
        }
    }
    session
        .save_cookie_file(out)
        .map_err(|e| anyhow!("failed to export cookies: {}", e))?;
    info!("prepared cookie file {}", out.display());
    Ok(out.to_path_buf())
}

/// Write a yt-dlp configuration file wired to the prepared cookie file.
pub fn write_config_file(cookie_file: &Path, path: &Path) -> Result<()> {
    let content = format!(
        "# yt-dlp configuration with cookies\n\
         --cookies {}\n\
         --output \"%(uploader)s - %(title)s.%(ext)s\"\n\
         --write-description\n\
         --write-info-json\n",
        cookie_file.display()
    );
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
