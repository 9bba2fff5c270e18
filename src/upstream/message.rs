//! Chat-completion message and response types.
//!
//! Requests are built with the `async-openai` wire types. Responses are
//! parsed into local types because annotation records are not part of the
//! SDK's typed response and must survive in both of their shapes.

use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use serde::{Deserialize, Serialize};

use crate::core::RawAnnotation;

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// User input.
    User,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Message content.
    pub content: String,
}

/// Creates a system message.
#[must_use]
pub fn system_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::System,
        content: content.to_string(),
    }
}

/// Creates a user message.
#[must_use]
pub fn user_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::User,
        content: content.to_string(),
    }
}

/// Builds the message list: optional system message first, then the prompt.
///
/// An empty system prompt is treated as absent.
#[must_use]
pub fn build_messages(prompt: &str, system_prompt: Option<&str>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
        messages.push(system_message(system));
    }
    messages.push(user_message(prompt));
    messages
}

fn convert_message(msg: &ChatMessage) -> ChatCompletionRequestMessage {
    match msg.role {
        Role::System => ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
            name: None,
        }),
        Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
            name: None,
        }),
    }
}

/// Builds the chat-completion request body for one model call.
#[must_use]
pub fn build_request(model: &str, messages: &[ChatMessage]) -> CreateChatCompletionRequest {
    CreateChatCompletionRequest {
        model: model.to_string(),
        messages: messages.iter().map(convert_message).collect(),
        ..Default::default()
    }
}

/// Result of one upstream completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResult {
    /// Answer text; empty if the upstream returned none.
    pub content: String,
    /// Model identifier the upstream actually used.
    pub model: String,
    /// Total tokens consumed; zero if usage was not reported.
    pub tokens: u32,
    /// Raw annotation records, if the response carried any.
    pub annotations: Option<Vec<RawAnnotation>>,
}

/// Chat-completion response body.
#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub annotations: Option<Vec<RawAnnotation>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionUsage {
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl CompletionResponse {
    /// Flattens the first choice into a [`CompletionResult`].
    ///
    /// Returns `None` when the response has no choices.
    pub(crate) fn into_result(self, requested_model: &str) -> Option<CompletionResult> {
        let choice = self.choices.into_iter().next()?;
        Some(CompletionResult {
            content: choice.message.content.unwrap_or_default(),
            model: self.model.unwrap_or_else(|| requested_model.to_string()),
            tokens: self.usage.and_then(|u| u.total_tokens).unwrap_or(0),
            annotations: choice.message.annotations,
        })
    }
}
