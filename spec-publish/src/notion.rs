//! # Notion page client
//!
//! Implements [`PageClient`] against the Notion REST API:
//!
//! - `POST {base}/pages` creates a page under a parent page with its
//!   initial children.
//! - `PATCH {base}/blocks/{id}/children` appends further blocks.
//!
//! Every request carries the integration token as a bearer token and the
//! pinned `Notion-Version` header. Non-success statuses become
//! [`RemoteError::Status`] with the response body attached; nothing is retried.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};

use spec_publish_core::block::{ContentBlock, HeadingLevel};
use spec_publish_core::contract::{PageClient, PageId, RemotePageHandle};
use spec_publish_core::error::RemoteError;

use crate::load_config::NotionSettings;

pub const DEFAULT_API_BASE: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct NotionClient {
    token: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient")
            .field("token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
    url: String,
}

impl NotionClient {
    pub fn new(settings: NotionSettings) -> Result<Self, RemoteError> {
        let api_base = settings
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RemoteError::Transport(format!("failed to create HTTP client: {e}")))?;

        info!(api_base = %api_base, "Initialized Notion client");
        Ok(Self {
            token: settings.token,
            api_base,
            client,
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = request
            .bearer_auth(self.token.expose_secret())
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Notion API returned an error");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl PageClient for NotionClient {
    async fn create_page(
        &self,
        parent: &PageId,
        title: &str,
        blocks: &[ContentBlock],
    ) -> Result<RemotePageHandle, RemoteError> {
        debug!(parent = %parent, title, blocks = blocks.len(), "Creating Notion page");
        let body = create_page_body(parent, title, blocks);
        let response = self
            .send(self.client.post(format!("{}/pages", self.api_base)).json(&body))
            .await?;

        let page: CreatedPage = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(format!("page creation response: {e}")))?;
        info!(page_id = %page.id, title, "Created Notion page");
        Ok(RemotePageHandle {
            id: PageId::new(page.id),
            address: page.url,
        })
    }

    async fn append_blocks(&self, page: &PageId, blocks: &[ContentBlock]) -> Result<(), RemoteError> {
        debug!(page = %page, blocks = blocks.len(), "Appending blocks to Notion page");
        let body = json!({ "children": blocks.iter().map(block_json).collect::<Vec<_>>() });
        self.send(
            self.client
                .patch(format!("{}/blocks/{}/children", self.api_base, page))
                .json(&body),
        )
        .await?;
        Ok(())
    }
}

fn create_page_body(parent: &PageId, title: &str, blocks: &[ContentBlock]) -> Value {
    json!({
        "parent": { "page_id": parent.as_str() },
        "properties": {
            "title": { "title": rich_text(title) }
        },
        "children": blocks.iter().map(block_json).collect::<Vec<_>>(),
    })
}

fn rich_text(text: &str) -> Value {
    json!([{ "type": "text", "text": { "content": text } }])
}

/// Notion block object for a [`ContentBlock`].
pub fn block_json(block: &ContentBlock) -> Value {
    match block {
        ContentBlock::Heading { level, text } => {
            let kind = match level {
                HeadingLevel::One => "heading_1",
                HeadingLevel::Two => "heading_2",
                HeadingLevel::Three => "heading_3",
            };
            json!({
                "object": "block",
                "type": kind,
                kind: { "rich_text": rich_text(text) }
            })
        }
        ContentBlock::Paragraph { text } => json!({
            "object": "block",
            "type": "paragraph",
            "paragraph": { "rich_text": rich_text(text) }
        }),
        ContentBlock::BulletedItem { text } => json!({
            "object": "block",
            "type": "bulleted_list_item",
            "bulleted_list_item": { "rich_text": rich_text(text) }
        }),
        ContentBlock::Code { language, text } => json!({
            "object": "block",
            "type": "code",
            "code": { "rich_text": rich_text(text), "language": language }
        }),
    }
}
