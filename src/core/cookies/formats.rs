// Cookie file formats
// Netscape cookies.txt (what yt-dlp --cookies consumes) and a JSON export.

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::jar::CookieRecord;

const NETSCAPE_HEADER: &str = "# Netscape HTTP Cookie File";

/// Prefix curl and yt-dlp use to mark HttpOnly cookies in cookies.txt.
const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// Write cookies in Netscape format.
///
/// Seven tab-separated fields per line: domain, include-subdomains flag,
/// path, secure flag, expiry (0 for session cookies), name, value.
pub fn save_netscape(path: &Path, cookies: &[CookieRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let mut out = String::new();
    out.push_str(NETSCAPE_HEADER);
    out.push('\n');
    out.push_str("# https://curl.haxx.se/rfc/cookie_spec.html\n");
    out.push_str("# This is a generated file! Do not edit.\n\n");

    for cookie in cookies {
        let domain = if cookie.include_subdomains {
            format!(".{}", cookie.domain)
        } else {
            cookie.domain.clone()
        };
        let line = format!(
            "{}{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            if cookie.http_only { HTTP_ONLY_PREFIX } else { "" },
            domain,
            bool_flag(cookie.include_subdomains),
            cookie.path,
            bool_flag(cookie.secure),
            cookie.expires,
            cookie.name,
            cookie.value,
        );
        out.push_str(&line);
    }

    fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))?;
    debug!("saved {} cookies to {}", cookies.len(), path.display());
    Ok(())
}

/// Load cookies from a Netscape format file.
///
/// Comment and blank lines are skipped, except the `#HttpOnly_` marker
/// lines, which are real cookies. Malformed lines are an error rather than
/// silently dropped.
pub fn load_netscape(path: &Path) -> Result<Vec<CookieRecord>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let mut cookies = Vec::new();
    for (lineno, raw_line) in content.lines().enumerate() {
        let (line, http_only) = match raw_line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (rest, true),
            None => (raw_line, false),
        };
        let line = line.trim_end();
        if line.is_empty() || (!http_only && line.starts_with('#')) {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 7 {
            return Err(anyhow!(
                "{}:{}: expected 7 tab-separated fields, found {}",
                path.display(),
                lineno + 1,
                fields.len()
            ));
        }

        let raw_domain = fields[0];
        let include_subdomains = raw_domain.starts_with('.') || fields[1].eq_ignore_ascii_case("TRUE");
        let expires: i64 = fields[4]
            .parse()
            .with_context(|| format!("{}:{}: invalid expiry", path.display(), lineno + 1))?;

        cookies.push(CookieRecord {
            name: fields[5].to_string(),
            value: fields[6].to_string(),
            domain: raw_domain.trim_start_matches('.').to_lowercase(),
            include_subdomains,
            path: fields[2].to_string(),
            expires,
            secure: fields[3].eq_ignore_ascii_case("TRUE"),
            http_only,
        });
    }

    debug!("loaded {} cookies from {}", cookies.len(), path.display());
    Ok(cookies)
}

/// Export cookies as JSON: domain -> name -> value.
pub fn export_json(path: &Path, cookies: &[CookieRecord]) -> Result<()> {
    let mut by_domain: BTreeMap<String, Map<String, Value>> = BTreeMap::new();
    for cookie in cookies {
        by_domain
            .entry(cookie.domain.clone())
            .or_default()
            .insert(cookie.name.clone(), Value::String(cookie.value.clone()));
    }

    let json = serde_json::to_string_pretty(&by_domain).context("serialize cookies")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn bool_flag(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<CookieRecord> {
        vec![
            CookieRecord {
                name: "SID".to_string(),
                value: "abc123".to_string(),
                domain: "google.com".to_string(),
                include_subdomains: true,
                path: "/".to_string(),
                expires: 1999999999,
                secure: true,
                http_only: false,
            },
            CookieRecord {
                name: "session".to_string(),
                value: "xyz".to_string(),
                domain: "example.com".to_string(),
                include_subdomains: false,
                path: "/app".to_string(),
                expires: 0,
                secure: false,
                http_only: true,
            },
        ]
    }

    #[test]
    fn test_netscape_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.txt");

        let cookies = sample();
        save_netscape(&path, &cookies).unwrap();
        let loaded = load_netscape(&path).unwrap();

        assert_eq!(loaded, cookies);
    }

    #[test]
    fn test_netscape_header_and_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.txt");

        save_netscape(&path, &sample()).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert!(content.starts_with(NETSCAPE_HEADER));
        assert!(content.contains(".google.com\tTRUE\t/\tTRUE\t1999999999\tSID\tabc123"));
        assert!(content.contains("#HttpOnly_example.com\tFALSE\t/app\tFALSE\t0\tsession\txyz"));
    }

    #[test]
    fn test_load_skips_comments_and_blanks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.txt");
        fs::write(
            &path,
            "# Netscape HTTP Cookie File\n\n# comment\nexample.com\tFALSE\t/\tFALSE\t0\ta\t1\n",
        )
        .unwrap();

        let loaded = load_netscape(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "a");
    }

    #[test]
    fn test_load_rejects_malformed_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.txt");
        fs::write(&path, "example.com\tFALSE\t/\n").unwrap();

        assert!(load_netscape(&path).is_err());
    }

    #[test]
    fn test_export_json_groups_by_domain() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");

        export_json(&path, &sample()).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(parsed["google.com"]["SID"], "abc123");
        assert_eq!(parsed["example.com"]["session"], "xyz");
    }
}
