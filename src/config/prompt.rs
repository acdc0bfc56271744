use clap::ValueEnum;
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use log::info;

pub const WEATHER_SYSTEM_PROMPT: &str = r#"You are a helpful weather assistant. You should ONLY answer questions related to weather, meteorology, climate, forecasts, and atmospheric conditions.

If a user asks about topics unrelated to weather, politely redirect them by saying something like: "I'm specialized in weather-related questions. Please ask me about weather, forecasts, climate, or atmospheric conditions!"

You can discuss:
- Weather forecasts and current conditions
- Climate patterns and phenomena
- Meteorological concepts
- Weather-related safety tips
- Seasonal weather patterns
- Historical weather events

Keep your responses concise and helpful."#;

/// Whether the chat endpoint pins the conversation to a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SystemPromptMode {
    /// Prepend the topic-restricting prompt, dropping any client-supplied one.
    WeatherOnly,
    /// Forward the conversation untouched.
    None,
}

impl fmt::Display for SystemPromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemPromptMode::WeatherOnly => f.write_str("weather-only"),
            SystemPromptMode::None => f.write_str("none"),
        }
    }
}

#[derive(Debug)]
pub enum PromptError {
    EmptyPrompt(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::EmptyPrompt(path) => write!(f, "Prompt file '{}' has an empty system_prompt", path),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PromptConfig {
    pub system_prompt: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { system_prompt: WEATHER_SYSTEM_PROMPT.to_string() }
    }
}

pub fn load_prompts(path: &str) -> Result<PromptConfig, PromptError> {
    let file_content = fs::read_to_string(path)?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    if config.system_prompt.trim().is_empty() {
        return Err(PromptError::EmptyPrompt(path.to_string()));
    }
    info!("Loaded system prompt from {}", path);
    Ok(config)
}

/// Where the active system prompt came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    BuiltIn,
    File(String),
    Inline,
}

impl fmt::Display for PromptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptSource::BuiltIn => f.write_str("built-in weather-only prompt"),
            PromptSource::File(path) => write!(f, "prompt file '{}'", path),
            PromptSource::Inline => f.write_str("inline prompt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt {
    pub text: String,
    pub source: PromptSource,
}

impl SystemPrompt {
    pub fn built_in() -> Self {
        Self { text: WEATHER_SYSTEM_PROMPT.to_string(), source: PromptSource::BuiltIn }
    }

    pub fn inline(text: impl Into<String>) -> Self {
        Self { text: text.into(), source: PromptSource::Inline }
    }
}

/// Resolves the prompt the chat endpoint should prepend, if any.
pub fn resolve_system_prompt(
    mode: SystemPromptMode,
    prompts_path: Option<&str>
) -> Result<Option<SystemPrompt>, PromptError> {
    match mode {
        SystemPromptMode::None => Ok(None),
        SystemPromptMode::WeatherOnly => {
            let prompt = match prompts_path {
                Some(path) => SystemPrompt {
                    text: load_prompts(path)?.system_prompt,
                    source: PromptSource::File(path.to_string()),
                },
                None => SystemPrompt::built_in(),
            };
            Ok(Some(prompt))
        }
    }
}
