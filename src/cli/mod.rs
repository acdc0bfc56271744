use clap::Parser;
use crate::config::prompt::SystemPromptMode;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Chat completion provider (openai, groq, deepseek, xai)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openai")]
    pub chat_llm_type: String,

    /// Base URL for the chat provider API (e.g., https://api.openai.com)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, the provider type decides
    pub chat_base_url: Option<String>,

    /// API key for the chat provider
    #[arg(long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Model name for chat completion
    #[arg(long, env = "CHAT_MODEL", default_value = "gpt-4o-mini")]
    pub chat_model: String,

    /// Whether /api/chat prepends the weather-only system prompt
    #[arg(long, env = "SYSTEM_PROMPT_MODE", value_enum, default_value_t = SystemPromptMode::WeatherOnly)]
    pub system_prompt_mode: SystemPromptMode,

    /// Optional JSON file ({"system_prompt": "..."}) replacing the built-in prompt.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    // --- Weather Args ---
    /// Base URL of the Open-Meteo forecast API
    #[arg(long, env = "WEATHER_BASE_URL", default_value = "https://api.open-meteo.com")]
    pub weather_base_url: String,

    #[arg(long, env = "WEATHER_LATITUDE", default_value = "40.7128", allow_hyphen_values = true)]
    pub latitude: f64,

    #[arg(long, env = "WEATHER_LONGITUDE", default_value = "-74.006", allow_hyphen_values = true)]
    pub longitude: f64,

    /// Display name for the coordinates above
    #[arg(long, env = "WEATHER_LOCATION", default_value = "New York City, NY")]
    pub location_name: String,

    /// Seconds before the ISR page regenerates in the background
    #[arg(long, env = "REVALIDATE_SECS", default_value = "30")]
    pub revalidate_secs: u64,

    // --- General App Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

/// Arguments for the terminal chat client.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Chat with the weather assistant from a terminal", long_about = None)]
pub struct ChatArgs {
    /// Base URL of a running weather-playground server
    #[arg(long, env = "CHAT_ENDPOINT", default_value = "http://127.0.0.1:3000")]
    pub endpoint: String,

    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
