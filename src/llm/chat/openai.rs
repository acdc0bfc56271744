use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use url::Url;

use super::{ CompletionProvider, DEFAULT_CHAT_MODEL };
use crate::llm::{ LlmConfig, LlmError, LlmType };
use crate::models::chat::ChatMessage;

pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    completions_url: Url,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIErrorBody {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        llm_type: LlmType,
    ) -> Result<Self, LlmError> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        let base = base_url.unwrap_or_else(|| llm_type.default_base_url().to_string());
        let completions_url = Url::parse(
            &format!("{}/v1/chat/completions", base.trim_end_matches('/'))
        )?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| LlmError::InvalidApiKey(e.to_string()))?
        );

        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            model: chat_model,
            completions_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey(config.llm_type))?;

        Self::new(
            api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
            config.llm_type,
        )
    }

    pub fn completions_url(&self) -> &Url {
        &self.completions_url
    }
}

#[async_trait]
impl CompletionProvider for OpenAIChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let req = OpenAIChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };
        debug!("Sending {} message(s) to {}", messages.len(), self.completions_url);

        let resp = self.http
            .post(self.completions_url.clone())
            .json(&req)
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json
                ::from_str::<OpenAIErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("Completion API returned status {}", status));
            warn!("Completion API error ({}): {}", status, message);
            return Err(LlmError::Api { status: status.as_u16(), message });
        }

        let resp = resp.json::<OpenAIResponse>().await?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
