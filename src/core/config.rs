use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Cookie file used when none is configured.
const DEFAULT_COOKIE_FILE: &str = "cookies.txt";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path of the working Netscape cookie file
    #[serde(default)]
    pub cookie_file: Option<String>,
    /// Override for the credential storage directory
    #[serde(default)]
    pub credential_dir: Option<String>,
    /// Path of the yt-dlp binary, when not on PATH
    #[serde(default)]
    pub yt_dlp_path: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        // An empty or corrupted file falls back to defaults rather than
        // blocking every command.
        if data.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_json::from_str(&data).unwrap_or_default())
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("cookie-forge").join("config.json"))
    }

    /// Working cookie file, defaulting to `cookies.txt` in the current
    /// directory.
    pub fn cookie_file_path(&self) -> PathBuf {
        PathBuf::from(self.cookie_file.as_deref().unwrap_or(DEFAULT_COOKIE_FILE))
    }

    pub fn set_cookie_file(&mut self, path: String) {
        self.cookie_file = Some(path);
    }

    pub fn credential_dir_path(&self) -> Option<PathBuf> {
        self.credential_dir.as_deref().map(PathBuf::from)
    }

    pub fn set_credential_dir(&mut self, path: String) {
        self.credential_dir = Some(path);
    }

    pub fn get_yt_dlp_path(&self) -> Option<&String> {
        self.yt_dlp_path.as_ref()
    }

    pub fn set_yt_dlp_path(&mut self, path: String) {
        self.yt_dlp_path = Some(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cookie_file() {
        let config = Config::default();
        assert_eq!(config.cookie_file_path(), PathBuf::from("cookies.txt"));
    }

    #[test]
    fn test_setters() {
        let mut config = Config::default();
        config.set_cookie_file("/tmp/jar.txt".to_string());
        config.set_yt_dlp_path("/usr/bin/yt-dlp".to_string());
        config.set_credential_dir("/tmp/creds".to_string());

        assert_eq!(config.cookie_file_path(), PathBuf::from("/tmp/jar.txt"));
        assert_eq!(config.get_yt_dlp_path().unwrap(), "/usr/bin/yt-dlp");
        assert_eq!(config.credential_dir_path().unwrap(), PathBuf::from("/tmp/creds"));
    }

    #[test]
    fn test_config_json_round_trip() {
        let mut config = Config::default();
        config.set_cookie_file("jar.txt".to_string());

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.cookie_file.as_deref(), Some("jar.txt"));
        assert!(parsed.yt_dlp_path.is_none());
    }
}
