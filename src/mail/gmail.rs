//! Gmail REST v1 client.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::auth::TokenCache;
use super::MailSource;
use crate::config::Config;
use crate::error::{LabelError, Result};
use crate::model::message::{Message, MessageRef};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

/// Reads the authenticated user's mailbox.
pub struct GmailClient {
    http: Client,
    api_base: String,
    access_token: String,
    page_size: usize,
}

impl GmailClient {
    /// Build a client from configuration, refreshing the cached credentials.
    pub fn connect(config: &Config) -> Result<Self> {
        let http = http_client(config.timeout())?;
        let cache = TokenCache::load(&config.mail.token_file, &config.mail)?;
        let access_token = cache.refresh(&http)?;
        Ok(Self::with_token(
            http,
            &config.mail.api_base,
            access_token,
            config.scan_limit(),
        ))
    }

    /// Build a client around an already valid access token.
    pub fn with_token(
        http: Client,
        api_base: &str,
        access_token: String,
        page_size: usize,
    ) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
            page_size: page_size.max(1),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/users/me/messages", self.api_base)
    }

    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(LabelError::Auth(format!(
                "Gmail rejected the access token ({})",
                response.status()
            ))),
            _ => Ok(response.error_for_status()?),
        }
    }
}

impl MailSource for GmailClient {
    fn list_message_ids(&self) -> Result<Vec<String>> {
        let list: ListResponse = self
            .get(
                &self.messages_url(),
                &[("maxResults", self.page_size.to_string())],
            )?
            .json()?;
        debug!(count = list.messages.len(), "Listed messages");
        Ok(list.messages.into_iter().map(|m| m.id).collect())
    }

    fn get_message(&self, id: &str) -> Result<Message> {
        let url = format!("{}/{id}", self.messages_url());
        Ok(self.get(&url, &[("format", "full".to_string())])?.json()?)
    }
}

/// Blocking HTTP client with the run-wide timeout.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url_trims_slash() {
        let client = GmailClient::with_token(
            Client::new(),
            "https://gmail.googleapis.com/gmail/v1/",
            "t".into(),
            10,
        );
        assert_eq!(
            client.messages_url(),
            "https://gmail.googleapis.com/gmail/v1/users/me/messages"
        );
    }

    #[test]
    fn test_list_response_without_messages() {
        let list: ListResponse = serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).unwrap();
        assert!(list.messages.is_empty());
    }

    #[test]
    fn test_list_response_order_preserved() {
        let list: ListResponse = serde_json::from_str(
            r#"{"messages": [{"id": "b", "threadId": "b"}, {"id": "a", "threadId": "a"}]}"#,
        )
        .unwrap();
        let ids: Vec<_> = list.messages.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
