pub mod chat;
use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use std::fmt;
use thiserror::Error;

/// Chat-completion backends. All of them speak the OpenAI wire format and only
/// differ in where they live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmType {
    OpenAI,
    DeepSeek,
    XAI,
    Groq,
}

impl LlmType {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmType::OpenAI => "https://api.openai.com",
            LlmType::DeepSeek => "https://api.deepseek.com",
            LlmType::XAI => "https://api.x.ai",
            LlmType::Groq => "https://api.groq.com/openai",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmType::OpenAI => "openai",
            LlmType::DeepSeek => "deepseek",
            LlmType::XAI => "xai",
            LlmType::Groq => "groq",
        }
    }
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseLlmTypeError {
    message: String,
}

impl fmt::Display for ParseLlmTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseLlmTypeError {}
impl FromStr for LlmType {
    type Err = ParseLlmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LlmType::OpenAI),
            "deepseek" => Ok(LlmType::DeepSeek),
            "xai" => Ok(LlmType::XAI),
            "groq" => Ok(LlmType::Groq),
            _ =>
                Err(ParseLlmTypeError {
                    message: format!("Invalid LLM type: '{}'", s),
                }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::OpenAI,
            api_key: None,
            completion_model: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0} API key is required")]
    MissingApiKey(LlmType),
    #[error("Invalid API key format: {0}")]
    InvalidApiKey(String),
    #[error("Invalid completion API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success response. `message` is the provider's own error text when it sent one.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("No response from completion API")]
    EmptyResponse,
}
