use crate::config::ChatConfig;
use crate::error::{CropCastError, Result};
use crate::models::ChatMessage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CHAT_TIMEOUT_SECS: u64 = 60;

/// Client for the farming-assistant chat endpoint.
pub struct ChatClient {
    client: reqwest::Client,
    config: ChatConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    history: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(CHAT_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, config })
    }

    /// Ask a question, sending `history` as conversational context.
    pub async fn ask(&self, message: &str, history: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat", self.config.url.trim_end_matches('/'));
        tracing::debug!(%url, context = history.len(), "Sending chat message");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message, history })
            .send()
            .await
            .map_err(|e| CropCastError::DataSourceUnavailable(format!("Chat service: {}", e)))?;

        let body = response.text().await?;
        parse_reply(&body)
    }

    pub async fn test_connection(&self) -> Result<bool> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| CropCastError::DataSourceUnavailable(format!("Chat service: {}", e)))?;

        Ok(!response.status().is_server_error())
    }
}

pub fn parse_reply(body: &str) -> Result<String> {
    let reply: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CropCastError::InvalidData(format!("Malformed chat response: {}", e)))?;

    if let Some(error) = reply.error {
        return Err(CropCastError::DataSourceUnavailable(format!(
            "Chat service: {}",
            error
        )));
    }

    reply
        .response
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| CropCastError::InvalidData("Chat response was empty".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_history() {
        let history = vec![ChatMessage::bot("Hi"), ChatMessage::user("NPK?")];
        let json = serde_json::to_value(ChatRequest {
            message: "What about potash?",
            history: &history,
        })
        .unwrap();
        assert_eq!(json["message"], "What about potash?");
        assert_eq!(json["history"][1]["sender"], "user");
        assert_eq!(json["history"][0]["text"], "Hi");
    }

    #[test]
    fn parses_reply() {
        assert_eq!(
            parse_reply(r#"{"response": "Rotate your crops."}"#).unwrap(),
            "Rotate your crops."
        );
    }

    #[test]
    fn error_field_fails() {
        assert!(parse_reply(r#"{"error": "OpenAI key missing"}"#).is_err());
        assert!(parse_reply(r#"{"response": "  "}"#).is_err());
        assert!(parse_reply("not json").is_err());
    }
}
