//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$WARENPOST_LABEL_CONFIG` (environment variable)
//! 2. `~/.config/warenpost-label/config.toml` (Linux/macOS)
//!    `%APPDATA%\warenpost-label\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! Command-line flags (and the environment variables clap maps onto them)
//! are applied on top by the binary; the library only ever sees the
//! resulting [`Config`] value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LabelError, Result};

/// Upper bound on how many messages a single run inspects.
pub const MAX_SCAN_LIMIT: usize = 100;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Mailbox access.
    pub mail: MailConfig,
    /// CUPS printer target.
    pub printer: PrinterConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where label PDFs are stored.
    pub output_dir: PathBuf,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Timeout for every HTTP request, in seconds.
    pub timeout_secs: u64,
}

/// Mailbox access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Exact `From` header value of label notifications.
    pub sender: String,
    /// How many of the newest messages to inspect.
    pub scan_limit: usize,
    /// Cached OAuth credentials (refresh token, client id/secret).
    pub token_file: PathBuf,
    /// OAuth client secret downloaded from the Google Cloud console.
    pub client_secret_file: PathBuf,
    /// Redirect URI registered for the OAuth client.
    pub redirect_uri: String,
    /// Base URL of the Gmail REST API.
    pub api_base: String,
}

/// CUPS printer target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// CUPS server address (`CUPS_SERVER_IP`).
    pub server: String,
    /// Printer queue name (`CUPS_PRINTER_NAME`).
    pub name: String,
    /// Print command, invoked as `<command> -h <server> -d <name> <file>`.
    pub command: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            cache_dir: None,
            log_level: "warn".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: "service-shop@deutschepost.de".to_string(),
            scan_limit: 10,
            token_file: PathBuf::from("token.json"),
            client_secret_file: PathBuf::from("client_secret.json"),
            redirect_uri: "http://127.0.0.1:8080".to_string(),
            api_base: "https://gmail.googleapis.com/gmail/v1".to_string(),
        }
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1".to_string(),
            name: "QL1110".to_string(),
            command: "lp".to_string(),
        }
    }
}

impl Config {
    /// Request timeout shared by the mail and document clients.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.general.timeout_secs.max(1))
    }

    /// Number of messages to inspect, clamped to [`MAX_SCAN_LIMIT`].
    pub fn scan_limit(&self) -> usize {
        self.mail.scan_limit.min(MAX_SCAN_LIMIT)
    }

    /// Reject values that would make a run silently do nothing or fail late.
    pub fn validate(&self) -> Result<()> {
        if self.mail.sender.trim().is_empty() {
            return Err(LabelError::Config("mail.sender is empty".to_string()));
        }
        if self.mail.scan_limit == 0 {
            return Err(LabelError::Config(
                "mail.scan_limit must be at least 1".to_string(),
            ));
        }
        let api_base = &self.mail.api_base;
        if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
            return Err(LabelError::Config(format!(
                "mail.api_base '{}' is not an http(s) URL",
                self.mail.api_base
            )));
        }
        if self.printer.command.trim().is_empty() || self.printer.name.trim().is_empty() {
            return Err(LabelError::Config(
                "printer.command and printer.name must be set".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration from `explicit` or the standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config(explicit: Option<&Path>) -> Config {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => config_file_path(),
    };
    if let Some(path) = path {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Load `KEY=value` pairs from `dir/.env` into the process environment.
///
/// Variables already set in the environment win. Returns the file path when
/// one was read; a missing file is not an error.
pub fn load_env_file(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(".env");
    match dotenvy::from_path(&path) {
        Ok(()) => Some(path),
        Err(e) if e.not_found() => None,
        Err(e) => {
            eprintln!("Ignoring unreadable {}: {e}", path.display());
            None
        }
    }
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("WARENPOST_LABEL_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("warenpost-label").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("warenpost-label")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.printer.server, "127.0.0.1");
        assert_eq!(cfg.printer.name, "QL1110");
        assert_eq!(cfg.mail.redirect_uri, "http://127.0.0.1:8080");
        assert_eq!(cfg.mail.sender, "service-shop@deutschepost.de");
        assert_eq!(cfg.scan_limit(), 10);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[printer]
name = "Brother"

[mail]
scan_limit = 25
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.printer.name, "Brother");
        assert_eq!(cfg.printer.server, "127.0.0.1");
        assert_eq!(cfg.scan_limit(), 25);
        assert_eq!(cfg.general.timeout_secs, 30);
    }

    #[test]
    fn test_scan_limit_is_clamped() {
        let mut cfg = Config::default();
        cfg.mail.scan_limit = 5000;
        assert_eq!(cfg.scan_limit(), MAX_SCAN_LIMIT);
    }

    #[test]
    fn test_timeout_never_zero() {
        let mut cfg = Config::default();
        cfg.general.timeout_secs = 0;
        assert_eq!(cfg.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut cfg = Config::default();
        cfg.mail.scan_limit = 0;
        assert!(matches!(cfg.validate(), Err(LabelError::Config(_))));

        let mut cfg = Config::default();
        cfg.mail.sender = " ".to_string();
        assert!(matches!(cfg.validate(), Err(LabelError::Config(_))));

        let mut cfg = Config::default();
        cfg.mail.api_base = "gmail.googleapis.com".to_string();
        assert!(matches!(cfg.validate(), Err(LabelError::Config(_))));

        let mut cfg = Config::default();
        cfg.printer.name = String::new();
        assert!(matches!(cfg.validate(), Err(LabelError::Config(_))));
    }

    #[test]
    fn test_env_file_is_loaded_without_overriding() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(".env"),
            "WARENPOST_LABEL_TEST_PRINTER=Brother\nPATH=/nowhere\n",
        )
        .unwrap();
        let path = std::env::var("PATH").unwrap_or_default();

        assert_eq!(load_env_file(tmp.path()), Some(tmp.path().join(".env")));
        assert_eq!(
            std::env::var("WARENPOST_LABEL_TEST_PRINTER").as_deref(),
            Ok("Brother")
        );
        assert_eq!(std::env::var("PATH").unwrap_or_default(), path);
    }

    #[test]
    fn test_missing_env_file() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(load_env_file(tmp.path()), None);
    }

    #[test]
    fn test_explicit_missing_file_falls_back() {
        let cfg = load_config(Some(Path::new("/nonexistent/warenpost.toml")));
        assert_eq!(cfg.printer.command, "lp");
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[printer]\nserver = \"10.0.0.5\"\n").unwrap();
        let cfg = load_config(Some(&path));
        assert_eq!(cfg.printer.server, "10.0.0.5");
    }
}
