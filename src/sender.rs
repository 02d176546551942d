//! Delivery of annotated messages into Workspace spaces.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crate::auth::CredentialExchanger;
use crate::config::Config;
use crate::error::SendError;
use crate::types::OutboundMessage;

/// Seam between the HTTP handlers and outbound delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<(), SendError>;
}

/// Authenticates, then posts to `/v1/spaces/{space_id}/messages`.
#[derive(Clone)]
pub struct WorkspaceClient {
    client: Client,
    api_url: String,
    exchanger: CredentialExchanger,
}

impl WorkspaceClient {
    pub fn new(client: Client, api_url: &str, exchanger: CredentialExchanger) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            exchanger,
        }
    }

    /// One pooled HTTP client with the configured timeout, shared by the
    /// token exchange and the message post.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        let exchanger =
            CredentialExchanger::new(client.clone(), &config.api_url, config.credentials.clone());
        Ok(Self::new(client, &config.api_url, exchanger))
    }

    fn messages_url(&self, space_id: &str) -> String {
        format!("{}/v1/spaces/{space_id}/messages", self.api_url)
    }
}

#[async_trait]
impl Notifier for WorkspaceClient {
    async fn send(&self, message: OutboundMessage) -> Result<(), SendError> {
        let token = self.exchanger.authenticate().await?;

        let url = self.messages_url(&message.space_id);
        debug!(url = %url, title = %message.title, "posting message");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.bearer())
            .json(&message.to_app_message())
            .send()
            .await
            .map_err(SendError::Transport)?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Delivery { status, body });
        }

        info!(space_id = %message.space_id, "message delivered");
        Ok(())
    }
}
