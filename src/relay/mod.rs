pub mod payload;

use log::{debug, info, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use thiserror::Error;

use crate::config::RelayConfig;
use crate::web::models::ConversationMessage;
use payload::{ChatRequest, CompletionResponse};

pub use payload::ChatResponse;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Forwards single-turn chat messages to a hosted chat-completion endpoint.
pub struct ChatRelay {
    config: RelayConfig,
    client: Client,
}

impl ChatRelay {
    pub fn new(config: RelayConfig) -> Self {
        info!(
            "Chat relay targeting {} (default model: {})",
            config.api_url, config.default_model
        );
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Builds the outbound payload. Only `user_text` is sent; nothing from
    /// earlier calls is carried over.
    pub fn build_request(&self, user_text: &str, model: Option<&str>) -> ChatRequest {
        ChatRequest {
            model: model.unwrap_or(&self.config.default_model).to_string(),
            messages: vec![ConversationMessage::user(user_text)],
            max_tokens: self.config.max_tokens,
        }
    }

    pub async fn relay(
        &self,
        user_text: &str,
        model: Option<&str>,
    ) -> Result<ChatResponse, RelayError> {
        let request = self.build_request(user_text, model);
        info!(
            "Relaying message to model {} (max_tokens: {})",
            request.model, request.max_tokens
        );
        debug!("Message: {}", user_text);

        let response = self
            .client
            .post(&self.config.api_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Chat endpoint returned {}", status);
            return Ok(ChatResponse::Failure {
                error_code: status.as_u16(),
                error_body: body,
            });
        }

        debug!("Response body: {}", body);
        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| RelayError::MalformedResponse(e.to_string()))?;
        let content = parsed
            .into_first_content()
            .ok_or_else(|| RelayError::MalformedResponse("response has no choices".to_string()))?;

        info!("Reply length: {} characters", content.len());
        Ok(ChatResponse::Reply(content))
    }
}
