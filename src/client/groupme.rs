use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::ChatApi;
use crate::error::ClientError;
use crate::models::{Group, Message};

const GROUPS_PER_PAGE: u32 = 100;
const MAX_GROUP_PAGES: u32 = 50;

#[derive(Debug, Clone)]
pub struct GroupMeConfig {
    pub base_url: String,
    pub token: String,
    pub bot_id: String,
    pub page_limit: u32,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<T>,
}

#[derive(Debug, Deserialize)]
struct MessagePage {
    #[serde(default)]
    messages: Vec<Message>,
}

/// GroupMe v3 REST client: group listing, message paging and bot posts.
#[derive(Debug, Clone)]
pub struct GroupMeClient {
    client: Client,
    base_url: String,
    token: String,
    bot_id: String,
    page_limit: u32,
}

impl GroupMeClient {
    pub fn new(config: GroupMeConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
            bot_id: config.bot_id,
            page_limit: config.page_limit,
        })
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatApi for GroupMeClient {
    async fn list_groups(&self) -> Result<Vec<Group>, ClientError> {
        let url = format!("{}/groups", self.base_url);
        let mut groups = Vec::new();

        for page in 1..=MAX_GROUP_PAGES {
            let response = self
                .client
                .get(&url)
                .query(&[("token", self.token.as_str()), ("omit", "memberships")])
                .query(&[("page", page), ("per_page", GROUPS_PER_PAGE)])
                .send()
                .await?;
            let envelope: Envelope<Vec<Group>> = Self::check(response).await?.json().await?;
            let batch = envelope.response.unwrap_or_default();
            let done = batch.len() < GROUPS_PER_PAGE as usize;
            groups.extend(batch);
            if done {
                break;
            }
        }

        debug!(count = groups.len(), "listed groups");
        Ok(groups)
    }

    async fn fetch_messages_after(
        &self,
        conversation_id: &str,
        after_id: Option<&str>,
    ) -> Result<Vec<Message>, ClientError> {
        let url = format!("{}/groups/{}/messages", self.base_url, conversation_id);
        let mut request = self
            .client
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .query(&[("limit", self.page_limit)]);
        if let Some(id) = after_id {
            request = request.query(&[("after_id", id)]);
        }

        let response = request.send().await?;
        // GroupMe answers 304 when nothing is newer than the cursor.
        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(Vec::new());
        }

        let envelope: Envelope<MessagePage> = Self::check(response).await?.json().await?;
        let mut messages = envelope
            .response
            .ok_or_else(|| ClientError::Payload("messages response without body".into()))?
            .messages;

        // Without after_id the page comes newest first.
        if after_id.is_none() {
            messages.reverse();
        }
        Ok(messages)
    }

    async fn post_text(&self, text: &str) -> Result<(), ClientError> {
        let url = format!("{}/bots/post", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("token", self.token.as_str())])
            .json(&json!({ "bot_id": self.bot_id, "text": text }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
