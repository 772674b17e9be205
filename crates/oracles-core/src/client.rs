use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChatError;

/// Path of the chat endpoint, appended to the configured base URL.
pub const CHAT_PATH: &str = "/api/v1/chat";

/// Assistant text used when the backend answers without a usable `response`.
pub const NO_RESPONSE: &str = "No response returned.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

/// Body of a successful reply. Unknown fields are ignored and `response`
/// may be missing or null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
}

impl ChatResponse {
    /// The trimmed answer, or [`NO_RESPONSE`] when it is absent or blank.
    pub fn answer(&self) -> String {
        match self.response.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => NO_RESPONSE.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, CHAT_PATH)
    }

    /// POST one query. No retries and no timeout: the call waits for either a
    /// response or a transport error.
    pub async fn send(&self, query: &str) -> Result<ChatResponse, ChatError> {
        let url = self.endpoint();
        let request = ChatRequest {
            query: query.to_string(),
        };

        debug!(%url, chars = query.chars().count(), "sending chat request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "chat request failed");
            return Err(ChatError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = serde_json::from_str(&body)?;
        debug!(status = status.as_u16(), "chat request succeeded");
        Ok(chat_response)
    }
}
