// src/conversation/mod.rs
//! Relay to the Watson Conversation service. Replies are returned exactly as
//! decoded; nothing here interprets dialog output.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::NlcConfig;
use crate::error::{json_or_api_error, NlcResult};

/// Body of `POST /v1/workspaces/{id}/message`
#[derive(Debug, Serialize)]
pub struct MessageRequest<'a> {
    pub input: &'a Value,
    pub context: &'a Map<String, Value>,
}

#[async_trait]
pub trait ConversationApi: Send + Sync {
    async fn message(
        &self,
        workspace_id: &str,
        message_input: &Value,
        context: &Map<String, Value>,
    ) -> NlcResult<Value>;
}

#[derive(Debug, Clone)]
pub struct ConversationClient {
    client: Client,
    base_url: String,
    version: String,
    credentials: Option<(String, String)>,
}

impl ConversationClient {
    pub fn new(config: &NlcConfig) -> NlcResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        debug!(
            "Initialized conversation client: url={}, version={}",
            config.conversation_url, config.conversation_version
        );

        Ok(Self {
            client,
            base_url: config.conversation_url.trim_end_matches('/').to_string(),
            version: config.conversation_version.clone(),
            credentials: config
                .credentials()
                .map(|(user, pass)| (user.to_string(), pass.to_string())),
        })
    }

    pub fn with_base_url(base_url: impl Into<String>) -> NlcResult<Self> {
        let config = NlcConfig {
            conversation_url: base_url.into(),
            ..NlcConfig::default()
        };
        Self::new(&config)
    }

    pub fn message_url(&self, workspace_id: &str) -> String {
        format!(
            "{}/v1/workspaces/{}/message",
            self.base_url,
            urlencoding::encode(workspace_id)
        )
    }
}

#[async_trait]
impl ConversationApi for ConversationClient {
    async fn message(
        &self,
        workspace_id: &str,
        message_input: &Value,
        context: &Map<String, Value>,
    ) -> NlcResult<Value> {
        let url = self.message_url(workspace_id);
        debug!("POST {} ({} context keys)", url, context.len());

        let mut builder = self
            .client
            .post(url)
            .query(&[("version", self.version.as_str())])
            .header(header::ACCEPT, "application/json")
            .json(&MessageRequest {
                input: message_input,
                context,
            });
        if let Some((user, pass)) = &self.credentials {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder.send().await?;
        json_or_api_error(response).await
    }
}
