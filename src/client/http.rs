use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use serde_json::Value as JsonValue;
use url::Url;

use super::{ ChatTransport, ClientError };
use crate::models::chat::ChatMessage;

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

/// Calls `POST {endpoint}/api/chat` on a running server.
#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    http: HttpClient,
    chat_url: Url,
}

impl HttpChatTransport {
    pub fn new(endpoint: &str) -> Result<Self, url::ParseError> {
        let chat_url = Url::parse(&format!("{}/api/chat", endpoint.trim_end_matches('/')))?;
        Ok(Self { http: HttpClient::new(), chat_url })
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        let resp = self.http
            .post(self.chat_url.clone())
            .json(&ChatRequest { messages })
            .send().await?;

        let status = resp.status();
        let data: JsonValue = resp.json().await?;

        if !status.is_success() {
            let message = data
                .get("error")
                .and_then(JsonValue::as_str)
                .unwrap_or("Failed to get response");
            return Err(ClientError::Endpoint(message.to_string()));
        }

        data.get("message")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::Malformed(data.to_string()))
    }
}
