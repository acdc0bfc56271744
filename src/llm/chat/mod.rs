pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;

use super::{ LlmConfig, LlmError, LlmType };
use crate::models::chat::ChatMessage;
use self::openai::OpenAIChatClient;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends the whole conversation and returns the assistant's reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;

    fn get_model(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn CompletionProvider>, LlmError> {
    let client: Arc<dyn CompletionProvider> = Arc::new(OpenAIChatClient::from_config(config)?);
    Ok(client)
}

/// Stands in when no API key is configured so the weather pages still run.
/// Every chat request fails with the missing-key error.
pub struct UnconfiguredClient {
    llm_type: LlmType,
    model: String,
}

impl UnconfiguredClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            llm_type: config.llm_type,
            model: config.completion_model.clone().unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl CompletionProvider for UnconfiguredClient {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        Err(LlmError::MissingApiKey(self.llm_type))
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
