//! Client side of the chat widget: holds the conversation and talks to
//! `POST /api/chat`.

pub mod http;

use async_trait::async_trait;
use log::error;
use thiserror::Error;

use crate::models::chat::{ ChatMessage, Conversation };

pub use self::http::HttpChatTransport;

/// Appended instead of a reply whenever the endpoint call fails.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Endpoint(String),
    #[error("Malformed chat response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, messages: &[ChatMessage]) -> Result<String, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing was sent.
    Ignored,
    Replied,
    /// The request failed and the fallback reply was appended.
    Fallback,
}

/// One conversation with the assistant. `send` takes `&mut self`, so a
/// session never has more than one request in flight.
pub struct ChatSession<T: ChatTransport> {
    transport: T,
    conversation: Conversation,
}

impl<T: ChatTransport> ChatSession<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, conversation: Conversation::new() }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    pub async fn send(&mut self, input: &str) -> SendOutcome {
        if input.trim().is_empty() {
            return SendOutcome::Ignored;
        }

        self.append(ChatMessage::user(input));

        match self.transport.send(self.conversation.messages()).await {
            Ok(reply) => {
                self.append(ChatMessage::assistant(reply));
                SendOutcome::Replied
            }
            Err(e) => {
                error!("Chat error: {}", e);
                self.append(ChatMessage::assistant(FALLBACK_REPLY));
                SendOutcome::Fallback
            }
        }
    }

    fn append(&mut self, message: ChatMessage) {
        // Only user and assistant turns are ever pushed here.
        if let Err(e) = self.conversation.push(message) {
            error!("Dropped message: {}", e);
        }
    }
}
