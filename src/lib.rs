pub mod agent;
pub mod cli;
pub mod client;
pub mod config;
pub mod llm;
pub mod models;
pub mod render;
pub mod server;
pub mod weather;

use agent::ChatAgent;
use cli::Args;
use config::prompt::resolve_system_prompt;
use llm::{ LlmConfig, LlmError, LlmType };
use llm::chat::{ new_client, CompletionProvider, UnconfiguredClient };
use log::{ info, warn };
use models::weather::Coordinates;
use server::api::AppState;
use server::Server;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use weather::{ OpenMeteoClient, WeatherSource, WeatherTarget };

fn initialize_chat_provider(
    args: &Args
) -> Result<Arc<dyn CompletionProvider>, Box<dyn Error + Send + Sync>> {
    let llm_type: LlmType = args.chat_llm_type.parse()?;
    let config = LlmConfig {
        llm_type,
        api_key: Some(args.chat_api_key.clone()).filter(|k| !k.trim().is_empty()),
        completion_model: Some(args.chat_model.clone()),
        base_url: args.chat_base_url.clone(),
    };

    match new_client(&config) {
        Ok(client) => {
            info!(
                "Chat client configured: Type={}, Model={}, BaseURL={}",
                llm_type,
                args.chat_model,
                config.base_url.as_deref().unwrap_or(llm_type.default_base_url())
            );
            Ok(client)
        }
        Err(LlmError::MissingApiKey(_)) => {
            warn!("No API key set (OPENAI_API_KEY); /api/chat will answer with an error.");
            Ok(Arc::new(UnconfiguredClient::new(&config)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Wires every component from the parsed arguments.
pub fn build_state(args: &Args) -> Result<AppState, Box<dyn Error + Send + Sync>> {
    let provider = initialize_chat_provider(args)?;
    let system_prompt = resolve_system_prompt(args.system_prompt_mode, args.prompts_path.as_deref())?;
    let agent = ChatAgent::new(provider, system_prompt);

    let weather: Arc<dyn WeatherSource> = Arc::new(
        OpenMeteoClient::new(Some(args.weather_base_url.clone()))?
    );
    let target = WeatherTarget {
        coordinates: Coordinates { latitude: args.latitude, longitude: args.longitude },
        location: args.location_name.clone(),
    };

    Ok(AppState::new(agent, weather, target, Duration::from_secs(args.revalidate_secs)))
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Model: {}", args.chat_model);
    info!("System Prompt Mode: {}", args.system_prompt_mode);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("Weather API: {}", args.weather_base_url);
    info!("Location: {} ({}, {})", args.location_name, args.latitude, args.longitude);
    info!("ISR Revalidate: {}s", args.revalidate_secs);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let state = build_state(&args)?;
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, state, args);
    server.run().await?;

    Ok(())
}
