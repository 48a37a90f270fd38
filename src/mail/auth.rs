//! Cached OAuth credentials and the refresh-token grant.
//!
//! The one-time consent flow that produces the token cache is done outside
//! this tool; here we only read the cache and trade the refresh token for a
//! short-lived access token.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MailConfig;
use crate::error::{LabelError, Result};

/// Contents of `token.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCache {
    pub refresh_token: String,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl TokenCache {
    /// Read the cache, pointing the operator at the consent flow when absent.
    pub fn load(path: &Path, mail: &MailConfig) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LabelError::Auth(format!(
                    "no cached credentials at '{}'; authorize the client in '{}' \
                     (redirect URI {}) and store the resulting token there",
                    path.display(),
                    mail.client_secret_file.display(),
                    mail.redirect_uri
                )));
            }
            Err(e) => return Err(LabelError::io(path, e)),
        };
        serde_json::from_str(&contents).map_err(|e| {
            LabelError::Auth(format!("token cache '{}' is invalid: {e}", path.display()))
        })
    }

    /// Exchange the refresh token for a fresh access token.
    pub fn refresh(&self, http: &reqwest::blocking::Client) -> Result<String> {
        let response = http
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.refresh_token.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LabelError::Auth(format!(
                "token endpoint answered {status}: {}",
                body.trim()
            )));
        }

        let token: TokenResponse = response.json()?;
        debug!(
            expires_in = ?token.expires_in,
            scopes = ?self.scopes,
            "Refreshed access token"
        );
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_token_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("token.json");
        std::fs::write(
            &path,
            r#"{"token": "ya29.x", "refresh_token": "1//r", "token_uri": "https://oauth2.googleapis.com/token",
                "client_id": "cid", "client_secret": "sec",
                "scopes": ["https://www.googleapis.com/auth/gmail.readonly"], "expiry": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let cache = TokenCache::load(&path, &MailConfig::default()).unwrap();
        assert_eq!(cache.refresh_token, "1//r");
        assert_eq!(cache.client_id, "cid");
        assert_eq!(cache.scopes.len(), 1);
    }

    #[test]
    fn test_missing_cache_is_auth_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = TokenCache::load(&tmp.path().join("token.json"), &MailConfig::default())
            .unwrap_err();
        match err {
            LabelError::Auth(msg) => assert!(msg.contains("client_secret.json")),
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_cache_is_auth_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("token.json");
        std::fs::write(&path, "{\"refresh_token\": 1}").unwrap();
        assert!(matches!(
            TokenCache::load(&path, &MailConfig::default()),
            Err(LabelError::Auth(_))
        ));
    }
}
