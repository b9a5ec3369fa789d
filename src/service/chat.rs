//! Thin proxy to an external text-completion endpoint. Forwards the
//! visitor's message plus prior turns and relays the text reply; no state
//! machine or retry policy of its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ChatConfig;
use crate::error::FountainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Seam for the completion upstream, like `Mailer` and `ObjectStore`.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn complete(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String, FountainError>;
}

pub struct ChatClient {
    client: reqwest::Client,
    api_url: Option<Url>,
    api_key: Option<String>,
    model: String,
}

const SYSTEM_PROMPT: &str = "You are a friendly assistant for an assisted-living facility's \
website. Answer questions about services, tours, and admissions briefly and warmly. If you \
do not know something, suggest contacting the facility directly.";

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatTurn,
}

impl ChatClient {
    pub fn new(client: reqwest::Client, cfg: &ChatConfig) -> Self {
        Self {
            client,
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        }
    }
}

#[async_trait]
impl ChatCompleter for ChatClient {
    async fn complete(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String, FountainError> {
        let Some(api_url) = self.api_url.clone() else {
            return Err(FountainError::Upstream(
                "chat upstream is not configured".to_string(),
            ));
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatTurn {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        });
        messages.extend_from_slice(history);
        messages.push(ChatTurn {
            role: "user".to_string(),
            content: message.to_string(),
        });

        let mut req = self.client.post(api_url).json(&serde_json::json!({
            "model": self.model,
            "messages": messages,
        }));
        if let Some(key) = self.api_key.as_deref() {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| FountainError::Upstream(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(FountainError::Upstream(format!(
                "completion endpoint returned {}",
                resp.status()
            )));
        }
        let parsed: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| FountainError::Upstream(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| FountainError::Upstream("completion had no choices".to_string()))
    }
}
