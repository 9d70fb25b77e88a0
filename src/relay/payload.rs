use serde::{Deserialize, Serialize};

use crate::web::models::ConversationMessage;

/// Outbound body for an OpenAI-compatible `/chat/completions` call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ConversationMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: String,
}

impl CompletionResponse {
    pub fn into_first_content(self) -> Option<String> {
        self.choices.into_iter().next().map(|c| c.message.content)
    }
}

/// Result of one relay call. A non-success upstream status is not an error:
/// it is carried as `Failure` and flattened into the reply text by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatResponse {
    Reply(String),
    Failure { error_code: u16, error_body: String },
}

impl ChatResponse {
    pub fn into_reply(self) -> String {
        match self {
            ChatResponse::Reply(reply) => reply,
            ChatResponse::Failure {
                error_code,
                error_body,
            } => format!("Error {}: {}", error_code, error_body),
        }
    }
}
