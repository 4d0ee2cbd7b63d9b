//! Local-model HTTP client (spec.md §6.4).
//!
//! A thin `reqwest`-based client reaching the Ollama-shaped local runner:
//! a reachability probe and a chat-completion call. Grounded on the
//! teacher's HTTP-client-factory pattern (`vtcode-core/src/http_client.rs`
//! re-exporting `vtcode-commons/src/http.rs`), simplified to devgate's single
//! local-model backend.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(2);
const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ModelClient {
    base_url: String,
    model: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    content: Vec<ChatResponseBlock>,
}

impl ModelClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            http: reqwest::Client::new(),
        }
    }

    /// `GET /api/tags`-style reachability probe with a 2s timeout
    /// (spec.md §6.4, §5 "Timeouts").
    pub async fn is_reachable(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.http.get(&url).timeout(REACHABILITY_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Chat completion call with a 60s timeout. Returns the concatenated
    /// text of the model's content blocks.
    pub async fn chat(&self, prompt: &str, system: Option<&str>) -> anyhow::Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: 2048,
            system,
        };

        let response = self
            .http
            .post(&url)
            .timeout(CHAT_TIMEOUT)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        Ok(response
            .content
            .into_iter()
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_endpoint_reports_false() {
        let client = ModelClient::new("http://127.0.0.1:1", "llama3");
        assert!(!client.is_reachable().await);
    }
}
